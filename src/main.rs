//! `FloatingLauncher` command-line host
//!
//! Runs the same flow as a click on the floating icon (load the configuration,
//! launch `app_path`) and exposes the configuration maintenance operations the
//! settings dialog uses. Logs go to `app.log` next to the configuration file.

use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, Subcommand};
use floating_launcher::{
    config::ConfigManager,
    error::get_user_friendly_error,
    launcher::AppLauncher,
    utils,
};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "floating-launcher", version)]
#[command(about = "Launch the configured application and manage its settings", long_about = None)]
struct Cli {
    /// Configuration file (defaults to %APPDATA%\FloatingLauncher\config.json)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Launch the configured application (default)
    Launch {
        /// Extra arguments passed to the application
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Print the current configuration
    Show,
    /// Strictly validate the current configuration
    Validate,
    /// Back up the current configuration
    Backup,
    /// List backups, newest first
    Backups,
    /// Replace the configuration with a backup
    Restore {
        /// Backup file to restore
        backup: PathBuf,
    },
    /// Reset the configuration to defaults
    Reset,
    /// Report whether the configured application is running
    Running,
    /// Terminate running instances of the configured application
    Kill,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let manager = match &cli.config {
        Some(path) => ConfigManager::new(path),
        None => ConfigManager::with_default_path()
            .context("Failed to prepare the configuration directory")?,
    };

    let logging = match &cli.config {
        Some(_) => {
            let log_dir = manager
                .config_path()
                .parent()
                .filter(|dir| !dir.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            utils::init_logging_in(log_dir)
        }
        None => utils::init_logging(),
    };
    logging.context("Failed to initialize logging system")?;

    match cli.command.unwrap_or(Commands::Launch { args: Vec::new() }) {
        Commands::Launch { args } => launch(&manager, &args),
        Commands::Show => {
            let config = Value::Object(manager.load());
            println!("{}", serde_json::to_string_pretty(&config)?);
            Ok(())
        }
        Commands::Validate => validate(&manager),
        Commands::Backup => {
            match manager
                .backup_config()
                .map_err(|e| anyhow!(get_user_friendly_error(&e)))?
            {
                Some(path) => println!("Backed up to {}", path.display()),
                None => println!("No configuration file to back up"),
            }
            Ok(())
        }
        Commands::Backups => {
            for backup in manager.list_backups()? {
                println!("{}", backup.display());
            }
            Ok(())
        }
        Commands::Restore { backup } => {
            manager
                .restore_from_backup(&backup)
                .map_err(|e| anyhow!(get_user_friendly_error(&e)))?;
            println!("Restored configuration from {}", backup.display());
            Ok(())
        }
        Commands::Reset => {
            manager
                .reset_to_default()
                .map_err(|e| anyhow!(get_user_friendly_error(&e)))?;
            println!("Configuration reset to defaults");
            Ok(())
        }
        Commands::Running => {
            let app_path = configured_app_path(&manager)?;
            let running = AppLauncher::is_application_running(&app_path);
            println!("{app_path}: {}", if running { "running" } else { "not running" });
            Ok(())
        }
        Commands::Kill => {
            let app_path = configured_app_path(&manager)?;
            if AppLauncher::kill_application(&app_path) {
                println!("Terminated {app_path}");
            } else {
                println!("No running instance of {app_path}");
            }
            Ok(())
        }
    }
}

/// The icon click flow
fn launch(manager: &ConfigManager, args: &[String]) -> Result<()> {
    let app_path = configured_app_path(manager)?;

    if AppLauncher::requires_admin_privileges(&app_path) {
        warn!("{app_path} may require administrator privileges");
        eprintln!("Note: {app_path} may require administrator privileges.");
    }

    let result = AppLauncher::launch(&app_path, args);
    if !result.success {
        let reason = result
            .error_message
            .unwrap_or_else(|| "unknown error".to_string());
        bail!("Failed to launch {app_path}: {reason}");
    }

    if let Some(process_id) = result.process_id {
        info!(
            "Launch took {:.1} ms (PID {process_id})",
            result.execution_time
        );
        println!("Launched {app_path} (PID {process_id})");
    }
    Ok(())
}

fn validate(manager: &ConfigManager) -> Result<()> {
    let config = Value::Object(manager.load());
    match ConfigManager::validate(&config) {
        Ok(()) => {
            println!("Configuration is valid");
            Ok(())
        }
        Err(errors) => {
            for error in &errors {
                eprintln!("- {error}");
            }
            bail!("Configuration has {} problem(s)", errors.len())
        }
    }
}

fn configured_app_path(manager: &ConfigManager) -> Result<String> {
    let config = manager.load();
    let app_path = config
        .get("app_path")
        .and_then(Value::as_str)
        .map(str::trim)
        .unwrap_or_default();

    if app_path.is_empty() {
        bail!(
            "No application configured. Set \"app_path\" in {}",
            manager.config_path().display()
        );
    }
    Ok(app_path.to_string())
}
