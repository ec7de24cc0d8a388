use std::time::Duration;

use crate::dns::DnsOptions;
use crate::lists::DEFAULT_LIST_TTL;
use crate::reputation::DEFAULT_REPUTATION_TTL;
use crate::validator::ValidationMode;

use super::typo::{COMMON_DOMAINS, DEFAULT_TYPO_DISTANCE};

/// Minimum score for an address to be reported as valid.
pub const VALID_THRESHOLD: u8 = 60;

/// Outcome of each pipeline check.
///
/// For classification checks `true` means the address passed, so
/// `free_provider: Some(true)` reads "not a free webmail domain". `typo`,
/// `syntax_corrected` and `catch_all` are detection flags instead (`true`:
/// something was detected). `None` marks checks the pipeline never reached.
/// `domain_reputation` is the only non-boolean entry: the 0..=100 score of
/// the domain.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Checks {
    pub format: bool,
    pub typo: bool,
    #[cfg_attr(feature = "with-serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub dns: Option<bool>,
    #[cfg_attr(feature = "with-serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub mx_records: Option<bool>,
    #[cfg_attr(feature = "with-serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub disposable: Option<bool>,
    #[cfg_attr(feature = "with-serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub free_provider: Option<bool>,
    #[cfg_attr(feature = "with-serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub role_based: Option<bool>,
    #[cfg_attr(feature = "with-serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub bot_pattern: Option<bool>,
    #[cfg_attr(feature = "with-serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub syntax_corrected: Option<bool>,
    #[cfg_attr(feature = "with-serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub catch_all: Option<bool>,
    #[cfg_attr(feature = "with-serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub domain_reputation: Option<u8>,
}

impl Checks {
    /// Hard requirements for a valid verdict, independent of the score.
    pub fn passes_gate(&self) -> bool {
        self.format
            && self.dns == Some(true)
            && self.mx_records == Some(true)
            && self.disposable == Some(true)
    }

    /// Names of the checks that counted against the address.
    pub fn failures(&self) -> Vec<&'static str> {
        let mut out = Vec::new();
        if !self.format {
            out.push("format");
        }
        if self.typo {
            out.push("typo");
        }
        let negatives = [
            ("dns", self.dns),
            ("mx_records", self.mx_records),
            ("disposable", self.disposable),
            ("free_provider", self.free_provider),
            ("role_based", self.role_based),
            ("bot_pattern", self.bot_pattern),
        ];
        out.extend(
            negatives
                .into_iter()
                .filter(|(_, passed)| *passed == Some(false))
                .map(|(name, _)| name),
        );
        if self.syntax_corrected == Some(true) {
            out.push("syntax_corrected");
        }
        out
    }
}

#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    pub email: String,
    pub valid: bool,
    pub score: u8,
    pub checks: Checks,
    pub suggestion: Option<String>,
}

impl ValidationResult {
    /// Clamps `raw_score` to `0..=100` and applies the validity gate.
    pub(crate) fn finalize(
        email: &str,
        raw_score: i32,
        checks: Checks,
        suggestion: Option<String>,
    ) -> Self {
        let score = clamp_score(raw_score);
        Self {
            email: email.to_string(),
            valid: is_valid(score, &checks),
            score,
            checks,
            suggestion,
        }
    }

    /// Result for input that failed the format check: score 0, only the
    /// `format` and `typo` checks set.
    pub(crate) fn malformed(email: &str, suggestion: Option<String>) -> Self {
        let checks = Checks {
            format: false,
            typo: suggestion.is_some(),
            ..Checks::default()
        };
        Self {
            email: email.to_string(),
            valid: false,
            score: 0,
            checks,
            suggestion,
        }
    }
}

pub(crate) fn clamp_score(raw: i32) -> u8 {
    u8::try_from(raw.clamp(0, 100)).unwrap_or(0)
}

pub fn is_valid(score: u8, checks: &Checks) -> bool {
    score >= VALID_THRESHOLD && checks.passes_gate()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatorOptions {
    pub format_mode: ValidationMode,
    pub common_domains: Vec<String>,
    pub typo_max_distance: usize,
    pub list_ttl: Duration,
    pub reputation_ttl: Duration,
    pub dns: DnsOptions,
    /// Resolvers in the default system pool; match it to the bulk job count.
    pub dns_pool: usize,
}

impl Default for ValidatorOptions {
    fn default() -> Self {
        Self {
            format_mode: ValidationMode::Strict,
            common_domains: COMMON_DOMAINS.iter().map(|d| d.to_string()).collect(),
            typo_max_distance: DEFAULT_TYPO_DISTANCE,
            list_ttl: DEFAULT_LIST_TTL,
            reputation_ttl: DEFAULT_REPUTATION_TTL,
            dns: DnsOptions::default(),
            dns_pool: 1,
        }
    }
}

impl ValidatorOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mode(mut self, mode: ValidationMode) -> Self {
        self.format_mode = mode;
        self
    }

    /// Replaces the typo reference domains; order sets priority.
    pub fn with_common_domains<I, S>(mut self, domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.common_domains = domains
            .into_iter()
            .map(|d| d.into().trim().to_lowercase())
            .filter(|d| !d.is_empty())
            .collect();
        self
    }

    pub fn with_typo_distance(mut self, max_distance: usize) -> Self {
        self.typo_max_distance = max_distance;
        self
    }

    pub fn with_list_ttl(mut self, ttl: Duration) -> Self {
        self.list_ttl = ttl;
        self
    }

    pub fn with_reputation_ttl(mut self, ttl: Duration) -> Self {
        self.reputation_ttl = ttl;
        self
    }

    pub fn with_dns(mut self, dns: DnsOptions) -> Self {
        self.dns = dns;
        self
    }

    pub fn with_dns_pool(mut self, size: usize) -> Self {
        self.dns_pool = size.max(1);
        self
    }
}
