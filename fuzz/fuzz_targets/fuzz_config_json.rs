#![no_main]

use floating_launcher::config::{LauncherConfig, basic_validation, validate_config};
use libfuzzer_sys::fuzz_target;
use serde_json::Value;

fuzz_target!(|data: &[u8]| {
    // Arbitrary JSON through both validation levels and the typed view
    if let Ok(value) = serde_json::from_slice::<Value>(data) {
        let strict = validate_config(&value);
        let basic = basic_validation(&value);

        // Anything the strict check accepts the save-time check accepts too
        if strict.is_ok() {
            assert!(basic.is_ok());
            if let Value::Object(map) = &value {
                let _ = LauncherConfig::from_map(map);
            }
        }
    }
});
