//! Application launch module
//!
//! Validates the configured application path and starts it as a detached process,
//! and answers questions about running instances of it.
//!
//! # Launch sequence
//!
//! 1. Security gate ([`validate_security`]): length, `..`, forbidden characters,
//!    absolute path, no UNC share
//! 2. Existence check
//! 3. File type check ([`is_valid_executable`]): not a directory, known extension,
//!    non-empty
//! 4. Detached spawn in a new process group, extra arguments appended
//!
//! Every step short-circuits into a failed [`LaunchResult`]. Nothing here keeps
//! state between calls; the OS process table is queried fresh each time.

pub mod app_launcher;
pub mod process;
pub mod security;

pub use app_launcher::{AppLauncher, LaunchError, LaunchResult};
pub use process::{ProcessInfo, get_process_info, is_application_running, kill_application};
pub use security::{
    SecurityViolation, is_valid_executable, requires_admin_privileges, validate_security,
};
