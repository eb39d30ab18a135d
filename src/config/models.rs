//! Configuration data models
//!
//! This module defines the typed view of the settings file. The store itself
//! works on the raw JSON mapping (see [`ConfigMap`]) so that partially valid
//! documents can still be loaded, saved and reported on.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Raw configuration mapping as stored on disk
pub type ConfigMap = Map<String, Value>;

/// Key of the bookkeeping object attached on save and stripped on load
pub const METADATA_KEY: &str = "_metadata";

/// Keys every configuration must carry
pub const REQUIRED_KEYS: [&str; 6] = [
    "app_path",
    "icon_position",
    "icon_fixed",
    "auto_start",
    "icon_size",
    "version",
];

/// Top-level launcher configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LauncherConfig {
    /// Executable launched when the icon is clicked (may be empty)
    pub app_path: String,
    /// Screen position of the floating icon
    pub icon_position: IconPosition,
    /// Whether dragging the icon is disabled
    pub icon_fixed: bool,
    /// Whether the launcher starts on Windows login
    pub auto_start: bool,
    /// Icon edge length in pixels (16-128)
    pub icon_size: u32,
    /// Configuration schema version
    pub version: String,
}

/// Icon position in screen coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IconPosition {
    /// X position
    pub x: i32,
    /// Y position
    pub y: i32,
}

/// Bookkeeping written alongside the configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigMetadata {
    /// RFC 3339 local timestamp of the last save
    pub last_modified: String,
    /// Number of backups present when the file was written
    pub backup_count: usize,
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            app_path: String::new(),
            icon_position: IconPosition::default(),
            icon_fixed: false,
            auto_start: false,
            icon_size: 32,
            version: "1.0.0".to_string(),
        }
    }
}

impl Default for IconPosition {
    fn default() -> Self {
        Self { x: 100, y: 100 }
    }
}

impl LauncherConfig {
    /// Convert into the raw mapping handed to the store
    pub fn to_map(&self) -> ConfigMap {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            // A struct of plain fields always serializes to an object
            _ => ConfigMap::new(),
        }
    }

    /// Build a typed configuration from a raw mapping
    ///
    /// Unknown keys (including `_metadata`) are ignored. Fails if a required key is
    /// missing or has a type that does not fit the typed model.
    pub fn from_map(map: &ConfigMap) -> serde_json::Result<Self> {
        serde_json::from_value(Value::Object(map.clone()))
    }
}
