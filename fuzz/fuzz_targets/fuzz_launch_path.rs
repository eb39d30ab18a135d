#![no_main]

use floating_launcher::launcher::{requires_admin_privileges, validate_security};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(path) = std::str::from_utf8(data) {
        if validate_security(path).is_ok() {
            assert!(!path.contains(".."));
        }
        let _ = requires_admin_privileges(path);
    }
});
