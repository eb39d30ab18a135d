//! Application launch gate
//!
//! Validates a configured path and starts it as a detached process. Every attempt
//! produces a [`LaunchResult`]; failures are never propagated as errors.

use crate::launcher::process::{self, ProcessInfo};
use crate::launcher::security::{self, SecurityViolation};
use serde::Serialize;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Instant;
use thiserror::Error;
use tracing::{info, warn};

/// Why a launch attempt failed
#[derive(Debug, Error)]
pub enum LaunchError {
    /// Path refused by the security gate
    #[error(transparent)]
    Security(#[from] SecurityViolation),

    /// Nothing exists at the path
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Path exists but is not a launchable, non-empty file
    #[error("invalid file type: {}", .0.display())]
    InvalidExecutable(PathBuf),

    /// The OS refused to execute the file
    #[error("permission denied: {0}")]
    PermissionDenied(#[source] io::Error),

    /// The OS reported an error with a native error code
    #[error("system error (code {code}): {source}")]
    Os {
        /// Native OS error code
        code: i32,
        /// Underlying error
        #[source]
        source: io::Error,
    },

    /// Any other spawn failure
    #[error("unexpected error: {0}")]
    Unexpected(#[source] io::Error),
}

impl LaunchError {
    /// Native error code, if the OS reported one
    pub fn os_error_code(&self) -> Option<i32> {
        match self {
            Self::Os { code, .. } => Some(*code),
            _ => None,
        }
    }

    fn from_spawn(path: &Path, error: io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(error),
            _ => match error.raw_os_error() {
                Some(code) => Self::Os {
                    code,
                    source: error,
                },
                None => Self::Unexpected(error),
            },
        }
    }
}

/// Outcome of one launch attempt
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LaunchResult {
    /// Whether the process was started
    pub success: bool,
    /// Identifier of the started process
    pub process_id: Option<u32>,
    /// Native OS error code for system errors
    pub error_code: Option<i32>,
    /// Human-readable failure reason
    pub error_message: Option<String>,
    /// Wall-clock time spent on the attempt, in milliseconds
    pub execution_time: f64,
}

impl LaunchResult {
    fn started(process_id: u32, started_at: Instant) -> Self {
        Self {
            success: true,
            process_id: Some(process_id),
            error_code: None,
            error_message: None,
            execution_time: elapsed_ms(started_at),
        }
    }

    fn failed(error: &LaunchError, started_at: Instant) -> Self {
        Self {
            success: false,
            process_id: None,
            error_code: error.os_error_code(),
            error_message: Some(error.to_string()),
            execution_time: elapsed_ms(started_at),
        }
    }
}

fn elapsed_ms(started_at: Instant) -> f64 {
    started_at.elapsed().as_secs_f64() * 1000.0
}

/// Launch gate and process queries for the configured application
pub struct AppLauncher;

impl AppLauncher {
    /// Validate and start an application
    ///
    /// Runs the security gate, the existence check and the file type check in that
    /// order, then spawns the file detached from the caller with `args` appended.
    /// The child is not waited on.
    pub fn launch(app_path: &str, args: &[String]) -> LaunchResult {
        let started_at = Instant::now();

        match Self::try_launch(app_path, args) {
            Ok(process_id) => {
                info!("Launched {app_path} (PID {process_id})");
                LaunchResult::started(process_id, started_at)
            }
            Err(e) => {
                warn!("Failed to launch {app_path}: {e}");
                LaunchResult::failed(&e, started_at)
            }
        }
    }

    fn try_launch(app_path: &str, args: &[String]) -> Result<u32, LaunchError> {
        security::validate_security(app_path)?;

        let path = Path::new(app_path);
        if !path.exists() {
            return Err(LaunchError::NotFound(path.to_path_buf()));
        }
        if !security::is_valid_executable(path) {
            return Err(LaunchError::InvalidExecutable(path.to_path_buf()));
        }

        let mut command = build_command(path, args);
        command
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        detach(&mut command);

        let child = command
            .spawn()
            .map_err(|e| LaunchError::from_spawn(path, e))?;
        Ok(child.id())
    }

    /// See [`security::is_valid_executable`]
    pub fn is_valid_executable(path: &Path) -> bool {
        security::is_valid_executable(path)
    }

    /// See [`security::requires_admin_privileges`]
    pub fn requires_admin_privileges(app_path: &str) -> bool {
        security::requires_admin_privileges(app_path)
    }

    /// See [`process::is_application_running`]
    pub fn is_application_running(app_path: &str) -> bool {
        process::is_application_running(app_path)
    }

    /// See [`process::kill_application`]
    pub fn kill_application(app_path: &str) -> bool {
        process::kill_application(app_path)
    }

    /// See [`process::get_process_info`]
    pub fn get_process_info(process_id: u32) -> Option<ProcessInfo> {
        process::get_process_info(process_id)
    }
}

fn build_command(path: &Path, args: &[String]) -> Command {
    let mut command = match host_program(path) {
        Some((program, leading_args)) => {
            let mut command = Command::new(program);
            command.args(leading_args).arg(path);
            command
        }
        None => Command::new(path),
    };
    command.args(args);
    command
}

/// Host program for file types Windows cannot execute directly
#[cfg(windows)]
fn host_program(path: &Path) -> Option<(&'static str, &'static [&'static str])> {
    match security::lowercase_extension(path)?.as_str() {
        "msi" => Some(("msiexec", &["/i"])),
        "ps1" => Some((
            "powershell",
            &["-NoProfile", "-ExecutionPolicy", "Bypass", "-File"],
        )),
        _ => None,
    }
}

#[cfg(not(windows))]
fn host_program(_path: &Path) -> Option<(&'static str, &'static [&'static str])> {
    None
}

/// Start the child in its own process group so it outlives the launcher's console
#[cfg(windows)]
fn detach(command: &mut Command) {
    use std::os::windows::process::CommandExt;

    const CREATE_NEW_PROCESS_GROUP: u32 = 0x0000_0200;
    command.creation_flags(CREATE_NEW_PROCESS_GROUP);
}

#[cfg(unix)]
fn detach(command: &mut Command) {
    use std::os::unix::process::CommandExt;

    command.process_group(0);
}

#[cfg(not(any(windows, unix)))]
fn detach(_command: &mut Command) {}
