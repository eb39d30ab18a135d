//! Logging system initialization
//!
//! Sets up tracing-based logging with file output to %APPDATA%\FloatingLauncher\app.log.
//! The previous session logs are shifted on every startup, keeping nine of them.

use crate::config::ConfigManager;
use crate::error::{LauncherError, Result, StringError};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt};

/// Number of previous session logs kept (app.log.1 through app.log.9)
const MAX_LOG_FILES: u8 = 9;

const LOG_FILE_NAME: &str = "app.log";

/// Initialize logging into the per-user configuration directory
///
/// Log level defaults to INFO and can be changed with `RUST_LOG`.
pub fn init_logging() -> Result<PathBuf> {
    init_logging_in(&ConfigManager::get_config_dir())
}

/// Initialize logging into `log_dir`, returning the active log file path
pub fn init_logging_in(log_dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(log_dir)?;

    let log_path = log_dir.join(LOG_FILE_NAME);
    rotate_logs_on_startup(&log_path)?;

    // Rotation is handled above, per session rather than per time period
    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix("app")
        .filename_suffix("log")
        .build(log_dir)
        .map_err(|e| LauncherError::ConfigError(Box::new(e)))?;

    let subscriber = fmt()
        .with_writer(file_appender)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| LauncherError::ConfigError(Box::new(e)))?;

    tracing::info!("FloatingLauncher v{} started", env!("CARGO_PKG_VERSION"));

    Ok(log_path)
}

/// Shift session logs by one: app.log -> app.log.1 -> ... -> app.log.9, dropping the oldest
fn rotate_logs_on_startup(log_path: &Path) -> Result<()> {
    if !log_path.is_file() {
        return Ok(());
    }

    let base_name = log_path
        .file_name()
        .ok_or_else(|| LauncherError::ConfigError(StringError::new("Invalid log filename")))?;
    let session = |index: u8| {
        let mut name = base_name.to_os_string();
        name.push(format!(".{index}"));
        log_path.with_file_name(name)
    };

    // Highest slot first so every rename lands on a free name
    skip_missing(fs::remove_file(session(MAX_LOG_FILES)))?;
    for index in (1..MAX_LOG_FILES).rev() {
        skip_missing(fs::rename(session(index), session(index + 1)))?;
    }

    fs::rename(log_path, session(1))?;
    Ok(())
}

/// Gaps in the numbered sequence are expected
fn skip_missing(result: io::Result<()>) -> io::Result<()> {
    match result {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}
