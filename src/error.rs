//! Error types for `FloatingLauncher`
//!
//! This module defines the error type shared by the configuration store and the
//! command-line host. Launch failures have their own type
//! ([`crate::launcher::LaunchError`]) because they are reported through
//! [`crate::launcher::LaunchResult`] rather than propagated.
//!
//! Error variants use `#[source]` to preserve error chains for better
//! observability and debugging.

use crate::config::ValidationError;
use std::path::PathBuf;
use thiserror::Error;

/// Simple error type for wrapping string messages while implementing `std::error::Error`
#[derive(Debug, Error)]
#[error("{0}")]
pub struct StringError(pub String);

impl StringError {
    /// Create a new `StringError` from a string message
    pub fn new(msg: impl Into<String>) -> Box<Self> {
        Box::new(Self(msg.into()))
    }
}

/// Main error type for `FloatingLauncher`
#[derive(Debug, Error)]
pub enum LauncherError {
    /// Configuration error
    /// Preserves the underlying error source for full error chain transparency
    #[error("Configuration error: {0}")]
    ConfigError(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Configuration rejected by validation before it was written
    #[error("Invalid configuration: {}", join_errors(.0))]
    InvalidConfig(Vec<ValidationError>),

    /// Requested backup file does not exist
    #[error("Backup not found: {}", .0.display())]
    BackupNotFound(PathBuf),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Result type alias for `FloatingLauncher` operations
pub type Result<T> = std::result::Result<T, LauncherError>;

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Convert an error to a user-friendly message
///
/// Returns text suitable for an error dialog in the settings UI, including a
/// short hint on how to resolve the problem.
pub fn get_user_friendly_error(error: &LauncherError) -> String {
    match error {
        LauncherError::ConfigError(_) => "Failed to load or save configuration.\n\n\
             Your settings may not persist.\n\
             Check that you have write permissions to:\n\
             %APPDATA%\\FloatingLauncher"
            .to_string(),
        LauncherError::InvalidConfig(errors) => {
            let details = errors
                .iter()
                .map(|e| format!("- {e}"))
                .collect::<Vec<_>>()
                .join("\n");
            format!(
                "The settings could not be saved:\n\n{details}\n\n\
                 Please correct the values and try again."
            )
        }
        LauncherError::BackupNotFound(path) => {
            format!(
                "Backup not found: {}\n\n\
                 The backup may have been removed by rotation.\n\
                 Choose a more recent backup.",
                path.display()
            )
        }
        LauncherError::IoError(e) => {
            format!(
                "A file system error occurred:\n\n{e}\n\n\
                 Please check file permissions and disk space."
            )
        }
        LauncherError::JsonError(e) => {
            format!(
                "Configuration file is corrupted:\n\n{e}\n\n\
                 The application will use default settings."
            )
        }
    }
}
