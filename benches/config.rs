//! Benchmarks for configuration store operations
//!
//! Measures the cost of the save path (type check, backup, atomic write),
//! the load path and strict validation.

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use criterion::{Criterion, criterion_group, criterion_main};
use floating_launcher::config::{ConfigManager, LauncherConfig, basic_validation, validate_config};
use serde_json::{Value, json};
use std::hint::black_box;

fn sample_config() -> Value {
    let mut config = LauncherConfig::default().to_map();
    config.insert(
        "app_path".to_string(),
        json!("C:\\Program Files\\Editor\\editor.exe"),
    );
    config.insert("icon_position".to_string(), json!({"x": 1820, "y": 40}));
    config.insert("icon_size".to_string(), json!(64));
    Value::Object(config)
}

fn bench_validation(c: &mut Criterion) {
    let config = sample_config();

    c.bench_function("config_basic_validation", |b| {
        b.iter(|| basic_validation(black_box(&config)));
    });

    c.bench_function("config_strict_validation", |b| {
        b.iter(|| validate_config(black_box(&config)));
    });
}

fn bench_save(c: &mut Criterion) {
    let temp_dir = tempfile::tempdir().unwrap();
    let manager = ConfigManager::new(temp_dir.path().join("config.json"));
    let config = sample_config();

    c.bench_function("config_save", |b| {
        b.iter(|| manager.save(black_box(&config)).unwrap());
    });
}

fn bench_load(c: &mut Criterion) {
    let temp_dir = tempfile::tempdir().unwrap();
    let manager = ConfigManager::new(temp_dir.path().join("config.json"));
    manager.save(&sample_config()).unwrap();

    c.bench_function("config_load", |b| {
        b.iter(|| black_box(manager.load()));
    });

    c.bench_function("config_load_typed", |b| {
        b.iter(|| black_box(manager.load_config()));
    });
}

criterion_group!(benches, bench_validation, bench_save, bench_load);
criterion_main!(benches);
