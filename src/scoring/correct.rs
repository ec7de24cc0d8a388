use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("static whitespace pattern"));
static DOT_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.{2,}").expect("static dot-run pattern"));
// dotless domain ending in a bare TLD: "@examplecom"
static BARE_TLD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)@([a-z0-9-]+)(com|net|org|edu)$").expect("static bare-TLD pattern")
});

/// Repairs common keying mistakes: surrounding and embedded whitespace,
/// repeated dots, and a missing dot before `com|net|org|edu`
/// (`user@examplecom` → `user@example.com`).
///
/// Applying it to its own output changes nothing.
pub fn correct_syntax_errors(email: &str) -> String {
    let trimmed = email.trim();
    let compact = WHITESPACE.replace_all(trimmed, "");
    let single_dots = DOT_RUNS.replace_all(&compact, ".");
    let dotted: Cow<'_, str> = BARE_TLD.replace(&single_dots, "@$1.$2");
    dotted.into_owned()
}
