use std::sync::LazyLock;

use regex_lite::{Captures, Regex};

static SINGLE_QUOTED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?im)'([^']+)'").expect("single quote pattern is valid"));

static DOUBLE_QUOTED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?im)"([^"]+)""#).expect("double quote pattern is valid"));

/// Replace every quoted span with the same text wrapped in `marker`,
/// dropping the quotes. Single-quoted spans are rewritten before
/// double-quoted ones. Quote characters inside a span are not escaped and
/// markup characters inside it pass through unchanged.
pub fn emphasize_quotes(message: &str, marker: &str) -> String {
    let wrap = |caps: &Captures| format!("{marker}{}{marker}", &caps[1]);
    let single = SINGLE_QUOTED.replace_all(message, wrap);
    DOUBLE_QUOTED.replace_all(&single, wrap).into_owned()
}

/// Inline-code variant used in chat messages.
pub fn code_quotes(message: &str) -> String {
    emphasize_quotes(message, "`")
}
