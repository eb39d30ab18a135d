//! `FloatingLauncher` - one-click application launcher for the Windows desktop
//!
//! A small floating icon starts one configured application when clicked. This crate
//! holds the parts with real behavior behind that icon:
//!
//! - [`config`]: the JSON settings file with validation, backups and corruption recovery
//! - [`launcher`]: the launch gate that vets a path and starts it as a detached process,
//!   plus queries for running instances
//!
//! The icon window, settings dialog and tray are thin collaborators that call into
//! these modules. All operations are synchronous and keep no state between calls.

// Module declarations
pub mod config;
pub mod error;
pub mod launcher;
pub mod utils;

#[cfg(test)]
mod test_utils;

// Re-export commonly used types
pub use error::{LauncherError, Result};
