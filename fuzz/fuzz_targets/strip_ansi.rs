#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|text: &str| {
    let stripped = restqa_app::strip_ansi(text);
    assert!(stripped.len() <= text.len());
    if !text.contains(['\u{1b}', '\u{9b}']) {
        assert_eq!(stripped, text);
    }
});
