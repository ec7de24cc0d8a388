use std::collections::HashSet;

const MAX_SEPARATORS: usize = 3;
const MIN_VOWELLESS_LEN: usize = 5;

/// `true` when the local part is a function mailbox: equal to a keyword, or
/// starting with `keyword.` (`support.eu`).
pub fn is_role_based(local: &str, keywords: &HashSet<String>) -> bool {
    let local = local.to_lowercase();
    if keywords.contains(&local) {
        return true;
    }
    keywords.iter().any(|keyword| {
        local
            .strip_prefix(keyword.as_str())
            .is_some_and(|rest| rest.starts_with('.'))
    })
}

/// `true` when the local part looks machine-generated: more than half
/// digits, more than three `_`/`-`, or no vowel at all past five characters.
pub fn is_bot_pattern(local: &str) -> bool {
    let len = local.chars().count();
    if len == 0 {
        return false;
    }
    let digits = local.chars().filter(char::is_ascii_digit).count();
    let separators = local.chars().filter(|c| matches!(c, '_' | '-')).count();
    let has_vowel = local
        .chars()
        .any(|c| matches!(c.to_ascii_lowercase(), 'a' | 'e' | 'i' | 'o' | 'u'));

    digits * 2 > len || separators > MAX_SEPARATORS || (!has_vowel && len > MIN_VOWELLESS_LEN)
}
