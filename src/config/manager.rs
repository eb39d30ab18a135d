//! Configuration manager for loading and saving launcher settings
//!
//! The settings live in %APPDATA%\FloatingLauncher\config.json. Every save first
//! copies the current file into the sibling `backups` directory and rotates old
//! backups out. A file that fails to parse is recovered from the newest readable
//! backup, or replaced by the defaults when no backup can be restored.
//!
//! The file is re-read on every [`ConfigManager::load`]; nothing is cached.

use crate::config::models::{ConfigMap, ConfigMetadata, LauncherConfig, METADATA_KEY};
use crate::config::validation::{ValidationError, basic_validation, validate_config};
use crate::error::{LauncherError, Result};
use chrono::Local;
use serde_json::Value;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

/// Directory name under %APPDATA%
const APP_DIR_NAME: &str = "FloatingLauncher";
/// Settings file name
const CONFIG_FILE_NAME: &str = "config.json";
/// Backup directory name, sibling of the settings file
const BACKUP_DIR_NAME: &str = "backups";
const BACKUP_PREFIX: &str = "config_backup_";
const BACKUP_SUFFIX: &str = ".json";

/// Number of backups kept after each save unless overridden
pub const DEFAULT_MAX_BACKUPS: usize = 5;

/// Configuration manager
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_path: PathBuf,
    backup_dir: PathBuf,
    max_backups: usize,
}

impl ConfigManager {
    /// Get the per-user configuration directory
    ///
    /// Returns: %APPDATA%\FloatingLauncher, falling back to the home directory and
    /// then the working directory when APPDATA is not set.
    pub fn get_config_dir() -> PathBuf {
        let base = std::env::var_os("APPDATA")
            .or_else(|| std::env::var_os("HOME"))
            .map_or_else(|| PathBuf::from("."), PathBuf::from);
        base.join(APP_DIR_NAME)
    }

    /// Get the path to the per-user configuration file
    pub fn get_config_path() -> PathBuf {
        Self::get_config_dir().join(CONFIG_FILE_NAME)
    }

    /// Create a manager for an explicit configuration file path
    ///
    /// Backups go to a `backups` directory next to the file.
    pub fn new(config_path: impl Into<PathBuf>) -> Self {
        let config_path = config_path.into();
        let backup_dir = config_path
            .parent()
            .map_or_else(|| PathBuf::from(BACKUP_DIR_NAME), |dir| dir.join(BACKUP_DIR_NAME));
        Self {
            config_path,
            backup_dir,
            max_backups: DEFAULT_MAX_BACKUPS,
        }
    }

    /// Create a manager for the per-user configuration file
    ///
    /// Creates the configuration and backup directories if they don't exist.
    pub fn with_default_path() -> Result<Self> {
        let manager = Self::new(Self::get_config_path());
        fs::create_dir_all(&manager.backup_dir)?;
        Ok(manager)
    }

    /// Override how many backups survive rotation
    #[must_use]
    pub fn with_max_backups(mut self, max_backups: usize) -> Self {
        self.max_backups = max_backups;
        self
    }

    /// Path of the live configuration file
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Directory holding the backups
    pub fn backup_dir(&self) -> &Path {
        &self.backup_dir
    }

    /// Default configuration mapping
    pub fn get_default_config() -> ConfigMap {
        LauncherConfig::default().to_map()
    }

    /// Load the configuration mapping from disk
    ///
    /// - Missing file: the defaults are written and returned.
    /// - Unparseable file: the newest readable backup is restored and the load is
    ///   retried once; without a usable backup the defaults are written and returned.
    /// - Any other I/O failure: the defaults are returned without touching the file.
    ///
    /// `_metadata` is stripped. No schema validation is applied.
    pub fn load(&self) -> ConfigMap {
        match self.read_config() {
            Ok(Some(config)) => {
                debug!("Configuration loaded from {}", self.config_path.display());
                config
            }
            Ok(None) => {
                info!("Configuration file not found, creating defaults");
                self.persist_defaults()
            }
            Err(LauncherError::JsonError(e)) => {
                warn!("Configuration file is corrupted: {e}");
                if self.try_restore_from_latest_backup() {
                    match self.read_config() {
                        Ok(Some(config)) => {
                            info!("Configuration recovered from backup");
                            return config;
                        }
                        Ok(None) => {}
                        Err(e) => warn!("Restored configuration still unreadable: {e}"),
                    }
                }
                warn!("No usable backup, falling back to defaults");
                self.persist_defaults()
            }
            Err(e) => {
                warn!("Failed to read configuration, using defaults: {e}");
                Self::get_default_config()
            }
        }
    }

    /// Load the configuration as a typed value
    ///
    /// Falls back to the defaults when the stored mapping does not fit the typed
    /// model or fails strict validation.
    pub fn load_config(&self) -> LauncherConfig {
        let map = self.load();
        if let Err(errors) = validate_config(&Value::Object(map.clone())) {
            warn!("Stored configuration is invalid, using defaults: {errors:?}");
            return LauncherConfig::default();
        }
        LauncherConfig::from_map(&map).unwrap_or_else(|e| {
            warn!("Stored configuration does not fit the model, using defaults: {e}");
            LauncherConfig::default()
        })
    }

    /// Save a configuration document
    ///
    /// Only the save-time type check runs (see [`basic_validation`]); missing keys and
    /// out-of-range values are written as given. An existing file is backed up first.
    /// `_metadata` is attached to the written document.
    pub fn save(&self, config: &Value) -> Result<()> {
        basic_validation(config).map_err(LauncherError::InvalidConfig)?;
        let Some(map) = config.as_object() else {
            return Err(LauncherError::InvalidConfig(vec![ValidationError::NotAnObject]));
        };

        if self.config_path.exists() {
            if let Err(e) = self.backup_config() {
                warn!("Failed to back up configuration before save: {e}");
            }
        }

        let metadata = ConfigMetadata {
            last_modified: Local::now().to_rfc3339(),
            backup_count: self.backup_count(),
        };
        let mut document = map.clone();
        document.insert(METADATA_KEY.to_string(), serde_json::to_value(metadata)?);

        let json = serde_json::to_string_pretty(&document)?;
        self.write_atomically(json.as_bytes())?;

        info!("Configuration saved to {}", self.config_path.display());
        Ok(())
    }

    /// Save a typed configuration
    pub fn save_config(&self, config: &LauncherConfig) -> Result<()> {
        self.save(&Value::Object(config.to_map()))
    }

    /// Strictly validate a configuration document
    pub fn validate(config: &Value) -> std::result::Result<(), Vec<ValidationError>> {
        validate_config(config)
    }

    /// Overwrite the configuration with the defaults
    pub fn reset_to_default(&self) -> Result<()> {
        info!("Resetting configuration to defaults");
        self.save(&Value::Object(Self::get_default_config()))
    }

    /// Copy the live configuration into the backup directory
    ///
    /// Returns `None` when there is no live file. Old backups beyond the retention
    /// limit are deleted afterwards.
    pub fn backup_config(&self) -> Result<Option<PathBuf>> {
        if !self.config_path.exists() {
            return Ok(None);
        }

        fs::create_dir_all(&self.backup_dir)?;
        let backup_path = self.next_backup_path();
        // A fresh file rather than fs::copy: no inherited read-only bit, mtime is now
        fs::write(&backup_path, fs::read(&self.config_path)?)?;

        info!("Configuration backed up to {}", backup_path.display());

        if let Err(e) = self.cleanup_old_backups() {
            warn!("Failed to rotate old backups: {e}");
        }

        Ok(Some(backup_path))
    }

    /// Replace the live configuration with a backup
    ///
    /// The backup must parse as a JSON object; its values are not validated.
    pub fn restore_from_backup(&self, backup_path: &Path) -> Result<()> {
        if !backup_path.exists() {
            return Err(LauncherError::BackupNotFound(backup_path.to_path_buf()));
        }

        let bytes = fs::read(backup_path)?;
        serde_json::from_slice::<ConfigMap>(&bytes)?;
        self.write_atomically(&bytes)?;

        info!("Configuration restored from {}", backup_path.display());
        Ok(())
    }

    /// Backups currently on disk, newest first
    pub fn list_backups(&self) -> Result<Vec<PathBuf>> {
        let entries = match fs::read_dir(&self.backup_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut backups = Vec::new();
        for entry in entries {
            let entry = entry?;
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if !is_backup_file_name(&name) {
                continue;
            }
            let metadata = entry.metadata()?;
            if !metadata.is_file() {
                continue;
            }
            let modified = metadata.modified()?;
            backups.push((modified, entry.path()));
        }

        // Newest first; file names break mtime ties
        backups.sort_by(|a, b| b.cmp(a));
        Ok(backups.into_iter().map(|(_, path)| path).collect())
    }

    /// Number of backups currently on disk
    pub fn backup_count(&self) -> usize {
        self.list_backups().map_or(0, |backups| backups.len())
    }

    fn read_config(&self) -> Result<Option<ConfigMap>> {
        let bytes = match fs::read(&self.config_path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let mut config: ConfigMap = serde_json::from_slice(&bytes)?;
        config.remove(METADATA_KEY);
        Ok(Some(config))
    }

    fn persist_defaults(&self) -> ConfigMap {
        let defaults = Self::get_default_config();
        if let Err(e) = self.save(&Value::Object(defaults.clone())) {
            warn!("Failed to write default configuration: {e}");
        }
        defaults
    }

    fn try_restore_from_latest_backup(&self) -> bool {
        let backups = match self.list_backups() {
            Ok(backups) => backups,
            Err(e) => {
                warn!("Failed to list backups: {e}");
                return false;
            }
        };

        for backup in backups {
            match self.restore_from_backup(&backup) {
                Ok(()) => return true,
                Err(e) => warn!("Skipping unusable backup {}: {e}", backup.display()),
            }
        }
        false
    }

    fn next_backup_path(&self) -> PathBuf {
        let timestamp = Local::now().format("%Y%m%d_%H%M%S");
        let mut candidate = self
            .backup_dir
            .join(format!("{BACKUP_PREFIX}{timestamp}{BACKUP_SUFFIX}"));
        let mut sequence = 1;
        while candidate.exists() {
            candidate = self
                .backup_dir
                .join(format!("{BACKUP_PREFIX}{timestamp}_{sequence:02}{BACKUP_SUFFIX}"));
            sequence += 1;
        }
        candidate
    }

    fn cleanup_old_backups(&self) -> Result<()> {
        for stale in self.list_backups()?.into_iter().skip(self.max_backups) {
            match fs::remove_file(&stale) {
                Ok(()) => debug!("Removed old backup {}", stale.display()),
                Err(e) => warn!("Failed to remove old backup {}: {e}", stale.display()),
            }
        }
        Ok(())
    }

    /// Write through a temp file in the same directory, then rename over the target
    fn write_atomically(&self, contents: &[u8]) -> Result<()> {
        let dir = match self.config_path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)?;

        let mut temp = NamedTempFile::new_in(&dir)?;
        temp.write_all(contents)?;
        temp.as_file().sync_all()?;
        temp.persist(&self.config_path).map_err(|e| e.error)?;
        Ok(())
    }
}

fn is_backup_file_name(name: &str) -> bool {
    name.starts_with(BACKUP_PREFIX) && name.ends_with(BACKUP_SUFFIX)
}
