#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|name: &str| {
    let code = restqa_types::project_code(name);
    assert!(!code.starts_with('-') && !code.ends_with('-'));
    assert!(!code.contains("--"));
    assert!(code.chars().all(|c| c == '-' || c.is_ascii_uppercase() || c.is_ascii_digit()));
    assert_eq!(restqa_types::project_code(&code), code);
});
