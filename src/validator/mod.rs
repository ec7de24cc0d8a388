//! Syntactic email checks (RFC 5322 subset).
//!
//! [`check_format`] never trims or rewrites its input: surrounding
//! whitespace is a format failure here, and fixing it is the job of
//! [`correct_syntax_errors`](crate::correct_syntax_errors).

mod domain;
mod local;
mod types;

pub use types::{FormatIssue, FormatReport, ValidationMode};

use domain::check_domain;
use local::{is_local_relaxed, is_local_strict};

const MAX_ADDRESS_LEN: usize = 254;
const MAX_LOCAL_LEN: usize = 64;

pub fn check_format(email: &str, mode: ValidationMode) -> FormatReport {
    let mut issues = Vec::new();

    if email.len() > MAX_ADDRESS_LEN {
        issues.push(FormatIssue::TooLong(email.len()));
    }

    let at_count = email.matches('@').count();
    let Some((local, domain)) = split_address(email).filter(|_| at_count == 1) else {
        issues.push(FormatIssue::AtSignCount(at_count));
        return FormatReport::from_issues(issues);
    };

    if local.is_empty() || local.len() > MAX_LOCAL_LEN {
        issues.push(FormatIssue::LocalLength(local.len()));
    }

    check_domain(domain, &mut issues);

    let local_ok = match mode {
        ValidationMode::Strict => is_local_strict(local),
        ValidationMode::Relaxed => is_local_relaxed(local),
    };
    if !local_ok {
        issues.push(FormatIssue::InvalidLocal(mode));
    }

    FormatReport::from_issues(issues)
}

/// Splits at the first `@`. Returns `None` when there is none.
pub fn split_address(email: &str) -> Option<(&str, &str)> {
    email.split_once('@')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strict_ok(email: &str) -> bool {
        check_format(email, ValidationMode::Strict).ok
    }

    #[test]
    fn accepts_basic() {
        let r = check_format("alice@example.com", ValidationMode::Strict);
        assert!(r.ok, "{:?}", r.reasons());
    }

    #[test]
    fn rejects_double_at() {
        let r = check_format("a@@b.com", ValidationMode::Strict);
        assert!(!r.ok);
        assert_eq!(r.issues, vec![FormatIssue::AtSignCount(2)]);
    }

    #[test]
    fn rejects_missing_at_and_empty() {
        assert!(!strict_ok("plainaddress"));
        assert!(!strict_ok(""));
    }

    #[test]
    fn surrounding_whitespace_is_not_trimmed() {
        assert!(!strict_ok(" alice@example.com"));
        assert!(!strict_ok("alice@example.com "));
    }

    #[test]
    fn relaxed_accepts_quoted_local() {
        assert!(!check_format("\"john doe\"@example.com", ValidationMode::Strict).ok);
        assert!(check_format("\"john doe\"@example.com", ValidationMode::Relaxed).ok);
    }

    #[test]
    fn split_uses_first_at() {
        assert_eq!(split_address("a@b@c"), Some(("a", "b@c")));
        assert_eq!(split_address("abc"), None);
    }

    #[test]
    fn reasons_are_human_readable() {
        let r = check_format("@example.com", ValidationMode::Strict);
        assert!(r.reasons().iter().any(|reason| reason.contains("local part length 0")));
    }
}
