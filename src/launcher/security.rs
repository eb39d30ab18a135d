//! Path checks run before anything is executed
//!
//! [`validate_security`] rejects path shapes that are commonly used to smuggle
//! something other than the configured program into a launch. It is purely
//! textual and never touches the file system. [`is_valid_executable`] then checks
//! the file itself.

use std::path::Path;
use thiserror::Error;

/// Longest accepted path, in characters
pub const MAX_PATH_LENGTH: usize = 260;

/// Launchable file extensions (lowercase, without the dot)
pub const VALID_EXTENSIONS: [&str; 6] = ["exe", "com", "bat", "cmd", "msi", "ps1"];

/// Characters that never appear in a legitimate Windows path
pub const INVALID_CHARS: [char; 6] = ['<', '>', '|', '"', '*', '?'];

/// Programs that need elevation when started from a system directory
const ADMIN_APPS: [&str; 4] = ["regedit.exe", "gpedit.msc", "secpol.msc", "services.msc"];

/// Reason a path was refused by the security gate
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SecurityViolation {
    /// Path exceeds [`MAX_PATH_LENGTH`]
    #[error("file path is too long ({length} characters, maximum {max})")]
    PathTooLong {
        /// Length of the rejected path in characters
        length: usize,
        /// Maximum accepted length
        max: usize,
    },

    /// Path contains `..`
    #[error("security error: path traversal is not allowed")]
    PathTraversal,

    /// Path contains one of [`INVALID_CHARS`]
    #[error("security error: path contains invalid character '{0}'")]
    InvalidCharacter(char),

    /// Path is relative
    #[error("security error: an absolute path is required")]
    NotAbsolute,

    /// Path points at a network share
    #[error("security error: network paths are not supported")]
    UncPath,
}

/// Check a path against the launch security rules
///
/// Rules are applied in order and the first failure is reported: length, `..`,
/// forbidden characters, absoluteness, UNC prefix (either separator).
pub fn validate_security(path: &str) -> Result<(), SecurityViolation> {
    let length = path.chars().count();
    if length > MAX_PATH_LENGTH {
        return Err(SecurityViolation::PathTooLong {
            length,
            max: MAX_PATH_LENGTH,
        });
    }

    if path.contains("..") {
        return Err(SecurityViolation::PathTraversal);
    }

    if let Some(c) = path.chars().find(|c| INVALID_CHARS.contains(c)) {
        return Err(SecurityViolation::InvalidCharacter(c));
    }

    if !Path::new(path).is_absolute() {
        return Err(SecurityViolation::NotAbsolute);
    }

    // `\\server`, `//server` and mixed spellings all name a share on Windows
    let mut leading = path.chars();
    if matches!(
        (leading.next(), leading.next()),
        (Some('\\' | '/'), Some('\\' | '/'))
    ) {
        return Err(SecurityViolation::UncPath);
    }

    Ok(())
}

/// Check that a path names a non-empty file with a launchable extension
///
/// Directories, unknown extensions, empty files and unreadable paths are rejected.
pub fn is_valid_executable(path: &Path) -> bool {
    let Ok(metadata) = std::fs::metadata(path) else {
        return false;
    };

    if metadata.is_dir() {
        return false;
    }

    let Some(extension) = lowercase_extension(path) else {
        return false;
    };
    if !VALID_EXTENSIONS.contains(&extension.as_str()) {
        return false;
    }

    metadata.len() > 0
}

/// Advisory check for programs that need elevation
///
/// True only for a small set of administrative tools located under
/// `%WINDIR%\System32`, `%WINDIR%\SysWOW64` or `%ProgramFiles%\Windows NT`.
/// This is a hint for the UI, not a security boundary.
pub fn requires_admin_privileges(path: &str) -> bool {
    let windir = std::env::var("WINDIR").ok();
    let program_files = std::env::var("ProgramFiles").ok();

    let mut roots = Vec::new();
    if let Some(windir) = windir.filter(|d| !d.is_empty()) {
        roots.push(format!(r"{windir}\System32"));
        roots.push(format!(r"{windir}\SysWOW64"));
    }
    if let Some(program_files) = program_files.filter(|d| !d.is_empty()) {
        roots.push(format!(r"{program_files}\Windows NT"));
    }

    requires_admin_under(path, &roots)
}

fn requires_admin_under(path: &str, system_dirs: &[String]) -> bool {
    let normalized = normalize_path(path);
    let in_system_dir = system_dirs.iter().any(|dir| {
        let dir = normalize_path(dir);
        normalized
            .strip_prefix(dir.as_str())
            .is_some_and(|rest| rest.starts_with('\\'))
    });

    in_system_dir && ADMIN_APPS.contains(&file_name_lowercase(&normalized).as_str())
}

/// Lowercase a path and collapse it to single backslash separators
///
/// `.` components are dropped and `..` pops the previous component, so
/// equivalent spellings of the same Windows path compare equal.
pub(crate) fn normalize_path(path: &str) -> String {
    let unified = path.replace('/', "\\").to_lowercase();
    let rooted = unified.starts_with('\\');

    let mut parts: Vec<&str> = Vec::new();
    for part in unified.split('\\') {
        match part {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            _ => parts.push(part),
        }
    }

    let joined = parts.join("\\");
    if rooted { format!("\\{joined}") } else { joined }
}

/// Final path component, lowercased, splitting on either separator
pub(crate) fn file_name_lowercase(path: &str) -> String {
    path.rsplit(['\\', '/'])
        .next()
        .unwrap_or_default()
        .to_lowercase()
}

pub(crate) fn lowercase_extension(path: &Path) -> Option<String> {
    path.extension()
        .map(|extension| extension.to_string_lossy().to_lowercase())
}
