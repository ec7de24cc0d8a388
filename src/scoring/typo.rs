use textdistance::str::levenshtein;

/// Providers checked for near-miss spellings, in priority order.
pub const COMMON_DOMAINS: [&str; 4] = ["gmail.com", "yahoo.com", "outlook.com", "hotmail.com"];

pub const DEFAULT_TYPO_DISTANCE: usize = 2;

/// First candidate within `1..=max_distance` edits of `domain`
/// (case-insensitive). An exact match is not a typo.
pub fn closest_common_domain<'a, S>(
    domain: &str,
    candidates: &'a [S],
    max_distance: usize,
) -> Option<&'a str>
where
    S: AsRef<str>,
{
    let domain = domain.to_lowercase();
    candidates.iter().map(|candidate| candidate.as_ref()).find(|candidate| {
        let distance = levenshtein(&domain, candidate);
        distance > 0 && distance <= max_distance
    })
}

/// `local@<common domain>` when `domain` looks like a misspelling of one of
/// [`COMMON_DOMAINS`].
pub fn detect_typo(local: &str, domain: &str) -> Option<String> {
    closest_common_domain(domain, &COMMON_DOMAINS, DEFAULT_TYPO_DISTANCE)
        .map(|common| format!("{local}@{common}"))
}
