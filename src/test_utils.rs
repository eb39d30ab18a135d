//! Shared test utilities for `FloatingLauncher` unit tests.
//!
//! Only compiled during testing (`#[cfg(test)]`).

use std::sync::{Mutex, MutexGuard};
use tempfile::TempDir;

/// Serializes tests that point APPDATA somewhere else.
static APPDATA_LOCK: Mutex<()> = Mutex::new(());

/// Create a temporary directory that is removed when dropped.
pub fn create_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp directory")
}

/// Points APPDATA at a temp directory for the guard's lifetime and restores the
/// previous value on drop.
///
/// # Safety Considerations
///
/// `std::env::set_var` and `std::env::remove_var` are unsafe because another thread
/// may read the environment at the same time. Every test that changes APPDATA holds
/// `APPDATA_LOCK` for as long as the override is in place, and only the default-path
/// tests read APPDATA, so no read races with a write.
pub struct AppdataGuard {
    original: Option<std::ffi::OsString>,
    _lock: MutexGuard<'static, ()>,
}

#[expect(
    unsafe_code,
    reason = "Test-only environment override, serialized by APPDATA_LOCK"
)]
impl AppdataGuard {
    /// Set APPDATA to `temp_dir` until the guard is dropped.
    pub fn new(temp_dir: &TempDir) -> Self {
        // A panicking test poisons the lock; the guarded data is `()` so carry on
        let lock = APPDATA_LOCK
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        let original = std::env::var_os("APPDATA");
        // SAFETY: APPDATA_LOCK is held, see the type-level documentation.
        unsafe {
            std::env::set_var("APPDATA", temp_dir.path());
        }
        Self {
            original,
            _lock: lock,
        }
    }
}

#[expect(
    unsafe_code,
    reason = "Test-only environment restore, serialized by APPDATA_LOCK"
)]
impl Drop for AppdataGuard {
    fn drop(&mut self) {
        // SAFETY: the lock is still held; it is released after this body runs.
        unsafe {
            match &self.original {
                Some(original) => std::env::set_var("APPDATA", original),
                None => std::env::remove_var("APPDATA"),
            }
        }
    }
}
