//! Integration tests for `FloatingLauncher`
//!
//! Tests configuration persistence, backup rotation and corruption recovery,
//! the launch gate, and process queries against real child processes.

#![allow(clippy::unwrap_used)]

use floating_launcher::{
    config::{ConfigManager, ConfigMap, LauncherConfig, validate_config},
    error::{LauncherError, get_user_friendly_error},
    launcher::AppLauncher,
};
use serde_json::{Value, json};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn manager_in(dir: &TempDir) -> ConfigManager {
    ConfigManager::new(dir.path().join("config.json"))
}

fn sample_config() -> ConfigMap {
    let mut config = ConfigManager::get_default_config();
    config.insert("app_path".to_string(), json!("C:\\Tools\\editor.exe"));
    config.insert("icon_position".to_string(), json!({"x": -1200, "y": 640}));
    config.insert("icon_fixed".to_string(), json!(true));
    config.insert("icon_size".to_string(), json!(48));
    config
}

/// Save followed by load returns the input without `_metadata`
#[test]
fn test_config_round_trip() {
    let temp_dir = tempfile::tempdir().unwrap();
    let manager = manager_in(&temp_dir);

    let config = sample_config();
    assert!(validate_config(&Value::Object(config.clone())).is_ok());
    manager.save(&Value::Object(config.clone())).unwrap();

    assert_eq!(manager.load(), config);
}

/// Loading with no file creates exactly the defaults on disk
#[test]
fn test_default_on_missing() {
    let temp_dir = tempfile::tempdir().unwrap();
    let manager = manager_in(&temp_dir);
    assert!(!manager.config_path().exists());

    let config = manager.load();
    assert_eq!(config, LauncherConfig::default().to_map());

    let mut on_disk: ConfigMap =
        serde_json::from_str(&fs::read_to_string(manager.config_path()).unwrap()).unwrap();
    assert!(on_disk.remove("_metadata").is_some());
    assert_eq!(on_disk, config);
}

/// A corrupt file is replaced by the newest valid backup
#[test]
fn test_corruption_recovery_uses_latest_backup() {
    let temp_dir = tempfile::tempdir().unwrap();
    let manager = manager_in(&temp_dir);

    let mut older = sample_config();
    older.insert("version".to_string(), json!("1.0.1"));
    let mut newer = sample_config();
    newer.insert("version".to_string(), json!("1.0.2"));

    manager.save(&Value::Object(older)).unwrap();
    manager.save(&Value::Object(newer.clone())).unwrap();
    // Backs up `newer`
    manager.backup_config().unwrap();

    fs::write(manager.config_path(), "{\"app_path\": ").unwrap();

    assert_eq!(manager.load(), newer);
    // The live file was repaired, not just read around
    assert_eq!(manager.load(), newer);
}

/// A corrupt file with no backups falls back to persisted defaults
#[test]
fn test_corruption_without_backups() {
    let temp_dir = tempfile::tempdir().unwrap();
    let manager = manager_in(&temp_dir);
    fs::write(manager.config_path(), "\u{feff}{ not json at all").unwrap();

    assert_eq!(manager.load(), ConfigManager::get_default_config());

    let raw = fs::read_to_string(manager.config_path()).unwrap();
    assert!(serde_json::from_str::<Value>(&raw).is_ok());
}

/// After more saves than the retention limit, only the newest five backups remain
#[test]
fn test_backup_rotation() {
    let temp_dir = tempfile::tempdir().unwrap();
    let manager = manager_in(&temp_dir);

    for i in 1..=7 {
        let mut config = sample_config();
        config.insert("version".to_string(), json!(format!("1.0.{i}")));
        manager.save(&Value::Object(config)).unwrap();
    }

    let backups = manager.list_backups().unwrap();
    assert_eq!(backups.len(), 5);

    // Save N backs up the file written by save N-1; newest first
    let versions: Vec<String> = backups
        .iter()
        .map(|path| {
            let backup: Value = serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
            backup["version"].as_str().unwrap().to_string()
        })
        .collect();
    assert_eq!(versions, ["1.0.6", "1.0.5", "1.0.4", "1.0.3", "1.0.2"]);
}

/// Strict validation flags the range error that the save-time check lets through
#[test]
fn test_validation_asymmetry() {
    let temp_dir = tempfile::tempdir().unwrap();
    let manager = manager_in(&temp_dir);

    let config = json!({
        "app_path": "",
        "icon_position": {"x": 9_999_999, "y": 5},
        "icon_fixed": false,
        "auto_start": false,
        "icon_size": 32,
        "version": "1.0.0"
    });

    let errors = ConfigManager::validate(&config).unwrap_err();
    assert_eq!(errors.len(), 1);
    let message = errors[0].to_string();
    assert!(message.contains("icon_position.x"));
    assert!(message.contains("range"));

    assert!(manager.save(&config).is_ok());
    assert_eq!(manager.load()["icon_position"]["x"], json!(9_999_999));
}

#[test]
fn test_save_type_error_is_reported_to_user() {
    let temp_dir = tempfile::tempdir().unwrap();
    let manager = manager_in(&temp_dir);

    let error = manager.save(&json!({"auto_start": "yes"})).unwrap_err();
    assert!(matches!(error, LauncherError::InvalidConfig(_)));
    assert!(get_user_friendly_error(&error).contains("auto_start"));
}

/// Every attack-shaped path fails before anything is spawned
#[test]
fn test_security_rejection_set() {
    let long_path = format!("C:\\{}\\x.exe", "a".repeat(300));
    let inputs = [
        "../x.exe".to_string(),
        "relative\\x.exe".to_string(),
        "x.exe".to_string(),
        long_path,
        "C:\\Tools\\\"x\".exe".to_string(),
        "C:\\Tools\\*.exe".to_string(),
        "\\\\server\\share\\x.exe".to_string(),
    ];

    for input in inputs {
        let result = AppLauncher::launch(&input, &[]);
        assert!(!result.success, "{input} should be rejected");
        assert!(result.process_id.is_none());
        assert!(result.error_message.is_some());
    }
}

#[test]
fn test_zero_byte_file_and_directory_are_not_executables() {
    let temp_dir = tempfile::tempdir().unwrap();

    let empty = temp_dir.path().join("empty.exe");
    fs::write(&empty, b"").unwrap();
    assert!(!AppLauncher::is_valid_executable(&empty));

    let dir = temp_dir.path().join("tools.exe");
    fs::create_dir(&dir).unwrap();
    assert!(!AppLauncher::is_valid_executable(&dir));
}

/// Write a small script that runs for `seconds` and exits
fn write_script(dir: &Path, name: &str, seconds: u32) -> PathBuf {
    #[cfg(windows)]
    {
        let path = dir.join(format!("{name}.cmd"));
        let pings = seconds + 1;
        fs::write(
            &path,
            format!("@echo off\r\nping -n {pings} 127.0.0.1 > nul\r\n"),
        )
        .unwrap();
        path
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join(format!("{name}.bat"));
        // Trailing exit keeps the shell (and its name) alive until sleep returns
        fs::write(&path, format!("#!/bin/sh\nsleep {seconds}\nexit 0\n")).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }
}

/// A real, non-empty, correctly named executable starts and reports its PID
#[test]
fn test_valid_launch() {
    let temp_dir = tempfile::tempdir().unwrap();
    let script = write_script(temp_dir.path(), "quick", 0);

    let result = AppLauncher::launch(&script.to_string_lossy(), &["--ignored".to_string()]);
    assert!(result.success, "{:?}", result.error_message);
    assert!(result.process_id.is_some_and(|pid| pid > 0));
    assert!(result.error_message.is_none());
    assert!(result.execution_time >= 0.0);
}

/// The configured path from the store is what gets launched
#[test]
fn test_launch_configured_application() {
    let temp_dir = tempfile::tempdir().unwrap();
    let manager = manager_in(&temp_dir);
    let script = write_script(temp_dir.path(), "configured", 0);

    let mut config = LauncherConfig::default();
    config.app_path = script.to_string_lossy().into_owned();
    manager.save_config(&config).unwrap();

    let loaded = manager.load_config();
    let result = AppLauncher::launch(&loaded.app_path, &[]);
    assert!(result.success, "{:?}", result.error_message);
}

/// Launch, find, inspect and terminate a uniquely named script
///
/// Relies on Linux reporting a script's own file name as the process name.
#[cfg(target_os = "linux")]
#[test]
fn test_process_lifecycle() {
    use std::thread;
    use std::time::Duration;

    let temp_dir = tempfile::tempdir().unwrap();
    // Process names are truncated to 15 characters
    let name = format!("fl{}", std::process::id() % 1_000_000);
    let script = write_script(temp_dir.path(), &name, 5);
    let app_path = script.to_string_lossy().into_owned();

    let result = AppLauncher::launch(&app_path, &[]);
    assert!(result.success, "{:?}", result.error_message);
    let pid = result.process_id.unwrap();

    thread::sleep(Duration::from_millis(300));
    assert!(AppLauncher::is_application_running(&app_path));

    let info = AppLauncher::get_process_info(pid).unwrap();
    assert_eq!(info.process_id, pid);

    assert!(AppLauncher::kill_application(&app_path));
    thread::sleep(Duration::from_millis(500));
    assert!(!AppLauncher::is_application_running(&app_path));
}
