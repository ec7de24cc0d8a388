const ATEXT_SPECIALS: &str = "!#$%&'*+-/=?^_`{|}~";

fn is_atext(c: char) -> bool {
    c.is_ascii_alphanumeric() || ATEXT_SPECIALS.contains(c)
}

/// Règles strictes: dot-atom ASCII, pas de '.' initial/terminal ni de "..".
pub(crate) fn is_local_strict(s: &str) -> bool {
    if s.is_empty() || s.starts_with('.') || s.ends_with('.') || s.contains("..") {
        return false;
    }
    s.chars().all(|c| c == '.' || is_atext(c))
}

/// Règles relaxed: accepte en plus une quoted-string sans guillemet interne
/// non échappé.
pub(crate) fn is_local_relaxed(s: &str) -> bool {
    match s.strip_prefix('"').and_then(|rest| rest.strip_suffix('"')) {
        Some(inner) => is_quoted_content(inner),
        None => is_local_strict(s),
    }
}

fn is_quoted_content(inner: &str) -> bool {
    let mut escaped = false;
    for c in inner.chars() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '"' | '\r' | '\n' => return false,
            _ => {}
        }
    }
    !escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strict_dots() {
        assert!(!is_local_strict(".abc"));
        assert!(!is_local_strict("abc."));
        assert!(!is_local_strict("a..b"));
        assert!(is_local_strict("a.b"));
        assert!(is_local_strict("o'brien+news"));
    }

    #[test]
    fn strict_rejects_whitespace_and_empty() {
        assert!(!is_local_strict(""));
        assert!(!is_local_strict("john doe"));
        assert!(!is_local_strict(" john"));
    }

    #[test]
    fn relaxed_quoted() {
        assert!(is_local_relaxed("\"a b\""));
        assert!(is_local_relaxed("\"a\\\"b\""));
        assert!(!is_local_relaxed("\"a\"b\""));
        assert!(!is_local_relaxed("\"dangling\\\""));
    }
}
