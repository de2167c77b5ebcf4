#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Parse as a .restqa.yml descriptor - only attempt if valid UTF-8
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(config) = serde_yaml::from_str::<restqa_types::ProjectConfig>(s) {
            if config.validate().is_ok() {
                assert!(config.default_environment().is_some());
            }
        }
    }
});
