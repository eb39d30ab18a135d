//! Configuration management module
//!
//! This module handles loading, saving, validating and backing up the launcher
//! configuration. Configuration is stored in %APPDATA%\FloatingLauncher\config.json
//! with atomic writes and a rotating set of backups in `backups/` next to it.

pub mod manager;
pub mod models;
pub mod validation;

pub use manager::{ConfigManager, DEFAULT_MAX_BACKUPS};
pub use models::{ConfigMap, ConfigMetadata, IconPosition, LauncherConfig};
pub use validation::{ValidationError, basic_validation, validate_config};
