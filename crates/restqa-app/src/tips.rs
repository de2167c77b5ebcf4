use rand::seq::IndexedRandom;
use regex::Regex;
use restqa_types::TipsConfig;
use std::borrow::Cow;
use std::sync::LazyLock;

pub const DEFAULT_TIPS: &[&str] = &[
    "Turn any curl command into a scenario with \u{1b}[1mrestqa generate\u{1b}[22m",
    "Browse and edit your feature files from the dashboard: \u{1b}[1mrestqa dashboard\u{1b}[22m",
    "Declare one environment per target (local, staging, ...) in \u{1b}[33m.restqa.yml\u{1b}[39m",
    "Need a pipeline? \u{1b}[1mrestqa init --ci github-action\u{1b}[22m writes one for you",
    "Read the documentation at \u{1b}[33mhttps://docs.restqa.io\u{1b}[39m",
];

/// Terminal escape sequences (colors, cursor movement, OSC titles).
static ANSI_ESCAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"[\x1B\x{9B}][\[\]()#;?]*",
        r"(?:(?:(?:[a-zA-Z\d]*(?:;[-a-zA-Z\d/#&.:=?%@~_]*)*)?\x07)",
        r"|(?:(?:\d{1,4}(?:;\d{0,4})*)?[\dA-PR-TZcf-ntqry=><~]))",
    ))
    .expect("ansi escape pattern compiles")
});

/// Pick one tip, or none when tips are switched off.
pub fn pick_tip(config: Option<&TipsConfig>) -> Option<String> {
    let enabled = config.is_none_or(|c| c.enabled);
    if !enabled {
        return None;
    }

    let mut rng = rand::rng();
    match config.map(|c| c.messages.as_slice()) {
        Some(messages) if !messages.is_empty() => messages.choose(&mut rng).cloned(),
        _ => DEFAULT_TIPS.choose(&mut rng).map(|s| s.to_string()),
    }
}

/// Remove terminal escape sequences, leaving every other character as is.
pub fn strip_ansi(text: &str) -> Cow<'_, str> {
    ANSI_ESCAPE.replace_all(text, "")
}
