//! The scoring pipeline: one [`Validator::validate`] call per address.
//!
//! Checks run in a fixed order and add to or subtract from a running score.
//! DNS and MX failures end the pipeline early; every other check always
//! runs. The score is clamped to `0..=100` at the end, and an address is
//! valid when it reaches [`VALID_THRESHOLD`] and passes
//! [`Checks::passes_gate`].

mod correct;
mod heuristics;
mod types;
mod typo;

pub use correct::correct_syntax_errors;
pub use heuristics::{is_bot_pattern, is_role_based};
pub use types::{Checks, VALID_THRESHOLD, ValidationResult, ValidatorOptions, is_valid};
pub use typo::{COMMON_DOMAINS, closest_common_domain, detect_typo};

use std::sync::Arc;

use tracing::debug;

use crate::cache::{Cache, MemoryCache};
use crate::dns::{DnsError, DomainResolver, SystemResolver, normalize_domain, resolve_with};
use crate::lists::{DomainSet, ReferenceLists};
use crate::reputation::{DomainReputation, NEUTRAL_SCORE, ReputationError, ReputationTracker};
use crate::store::{MemoryStore, ReferenceStore, ReputationStore};
use crate::validator::{check_format, split_address};

const FORMAT_POINTS: i32 = 15;
const TYPO_PENALTY: i32 = 5;
const DNS_POINTS: i32 = 20;
const MX_POINTS: i32 = 20;
const DISPOSABLE_PENALTY: i32 = 20;
const NOT_DISPOSABLE_POINTS: i32 = 10;
const NOT_FREE_POINTS: i32 = 5;
const ROLE_PENALTY: i32 = 10;
const NOT_ROLE_POINTS: i32 = 10;
const BOT_PENALTY: i32 = 15;
const NOT_BOT_POINTS: i32 = 10;

pub struct Validator {
    options: ValidatorOptions,
    resolver: Arc<dyn DomainResolver>,
    lists: ReferenceLists,
    reputation: ReputationTracker,
}

impl Validator {
    pub fn builder() -> ValidatorBuilder {
        ValidatorBuilder::default()
    }

    pub fn options(&self) -> &ValidatorOptions {
        &self.options
    }

    /// Scores `email`. Never fails: malformed input, DNS errors and store
    /// outages all end up as data in the returned result.
    pub fn validate(&self, email: &str) -> ValidationResult {
        if !check_format(email, self.options.format_mode).ok {
            return self.malformed(email);
        }
        let Some((local, domain)) = split_address(email) else {
            return self.malformed(email);
        };

        let mut score = FORMAT_POINTS;
        let mut checks = Checks {
            format: true,
            ..Checks::default()
        };

        let mut suggestion = self.typo_suggestion(local, domain);
        if suggestion.is_some() {
            checks.typo = true;
            score -= TYPO_PENALTY;
        }

        let has_address = self.has_address(domain);
        checks.dns = Some(has_address);
        if !has_address {
            debug!(%domain, "no A/AAAA record, stopping");
            return ValidationResult::finalize(email, score, checks, suggestion);
        }
        score += DNS_POINTS;

        let has_mx = self.has_mx(domain);
        checks.mx_records = Some(has_mx);
        if !has_mx {
            debug!(%domain, "no MX record, stopping");
            return ValidationResult::finalize(email, score, checks, suggestion);
        }
        score += MX_POINTS;

        let lists = self.lists.load();
        let domain = domain.to_lowercase();

        if lists.is_disposable(&domain) {
            checks.disposable = Some(false);
            score -= DISPOSABLE_PENALTY;
        } else {
            checks.disposable = Some(true);
            score += NOT_DISPOSABLE_POINTS;
        }

        let free = lists.is_free_provider(&domain);
        checks.free_provider = Some(!free);
        if !free {
            score += NOT_FREE_POINTS;
        }

        if is_role_based(local, &lists.role_keywords) {
            checks.role_based = Some(false);
            score -= ROLE_PENALTY;
        } else {
            checks.role_based = Some(true);
            score += NOT_ROLE_POINTS;
        }

        if is_bot_pattern(local) {
            checks.bot_pattern = Some(false);
            score -= BOT_PENALTY;
        } else {
            checks.bot_pattern = Some(true);
            score += NOT_BOT_POINTS;
        }

        let corrected = correct_syntax_errors(email);
        let was_corrected = corrected != email;
        checks.syntax_corrected = Some(was_corrected);
        if was_corrected {
            suggestion = Some(corrected);
        }

        // no SMTP probing: catch-all behaviour is never established
        checks.catch_all = Some(false);

        let reputation = self.reputation.get_domain_reputation(&domain);
        checks.domain_reputation = Some(reputation);
        score += reputation_adjustment(reputation);

        let result = ValidationResult::finalize(email, score, checks, suggestion);
        debug!(%domain, score = result.score, valid = result.valid, "address scored");
        result
    }

    /// Validates every address, fanning out over up to `jobs` scoped
    /// threads. Output order matches input order.
    pub fn validate_many<S>(&self, emails: &[S], jobs: usize) -> Vec<ValidationResult>
    where
        S: AsRef<str> + Sync,
    {
        if jobs <= 1 || emails.len() < 2 {
            return emails.iter().map(|email| self.validate(email.as_ref())).collect();
        }

        let chunk_len = emails.len().div_ceil(jobs);
        std::thread::scope(|scope| {
            let workers: Vec<_> = emails
                .chunks(chunk_len)
                .map(|chunk| {
                    scope.spawn(move || {
                        chunk
                            .iter()
                            .map(|email| self.validate(email.as_ref()))
                            .collect::<Vec<_>>()
                    })
                })
                .collect();

            let mut results = Vec::with_capacity(emails.len());
            for worker in workers {
                match worker.join() {
                    Ok(chunk) => results.extend(chunk),
                    Err(panic) => std::panic::resume_unwind(panic),
                }
            }
            results
        })
    }

    pub fn get_domain_reputation(&self, domain: &str) -> u8 {
        self.reputation.get_domain_reputation(domain)
    }

    pub fn update_domain_reputation(
        &self,
        domain: &str,
        was_valid: bool,
    ) -> Result<DomainReputation, ReputationError> {
        self.reputation.update_domain_reputation(domain, was_valid)
    }

    /// Reloads the reference lists so administrative edits apply without
    /// waiting for the cache TTL.
    pub fn refresh_cache(&self) {
        self.lists.refresh();
    }

    fn malformed(&self, email: &str) -> ValidationResult {
        let suggestion =
            split_address(email).and_then(|(local, domain)| self.typo_suggestion(local, domain));
        ValidationResult::malformed(email, suggestion)
    }

    fn typo_suggestion(&self, local: &str, domain: &str) -> Option<String> {
        closest_common_domain(
            domain,
            &self.options.common_domains,
            self.options.typo_max_distance,
        )
        .map(|common| format!("{local}@{common}"))
    }

    fn has_address(&self, domain: &str) -> bool {
        normalize_domain(domain)
            .and_then(|ascii| self.resolver.lookup_address(&ascii))
            .unwrap_or_else(|err| {
                debug!(%domain, error = %err, "address lookup failed");
                false
            })
    }

    fn has_mx(&self, domain: &str) -> bool {
        normalize_domain(domain)
            .and_then(|ascii| resolve_with(self.resolver.as_ref(), &ascii))
            .map(|status| status.has_records())
            .unwrap_or_else(|err| {
                debug!(%domain, error = %err, "MX lookup failed");
                false
            })
    }
}

/// Reputation nudge of at most ±5 points, truncated toward zero.
fn reputation_adjustment(reputation: u8) -> i32 {
    (i32::from(reputation) - i32::from(NEUTRAL_SCORE)) / 10
}

/// Wires a [`Validator`] from its collaborators. Anything left unset gets an
/// in-memory default; the resolver defaults to the system one.
#[derive(Default)]
pub struct ValidatorBuilder {
    options: ValidatorOptions,
    resolver: Option<Arc<dyn DomainResolver>>,
    reference_store: Option<Arc<dyn ReferenceStore>>,
    reputation_store: Option<Arc<dyn ReputationStore>>,
    list_cache: Option<Arc<dyn Cache<DomainSet>>>,
    score_cache: Option<Arc<dyn Cache<u8>>>,
}

impl ValidatorBuilder {
    pub fn options(mut self, options: ValidatorOptions) -> Self {
        self.options = options;
        self
    }

    pub fn resolver(mut self, resolver: Arc<dyn DomainResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Uses one store for both reference lists and reputation rows.
    pub fn store<S>(mut self, store: Arc<S>) -> Self
    where
        S: ReferenceStore + ReputationStore + 'static,
    {
        let reference: Arc<dyn ReferenceStore> = store.clone();
        let reputation: Arc<dyn ReputationStore> = store;
        self.reference_store = Some(reference);
        self.reputation_store = Some(reputation);
        self
    }

    pub fn reference_store(mut self, store: Arc<dyn ReferenceStore>) -> Self {
        self.reference_store = Some(store);
        self
    }

    pub fn reputation_store(mut self, store: Arc<dyn ReputationStore>) -> Self {
        self.reputation_store = Some(store);
        self
    }

    pub fn list_cache(mut self, cache: Arc<dyn Cache<DomainSet>>) -> Self {
        self.list_cache = Some(cache);
        self
    }

    pub fn score_cache(mut self, cache: Arc<dyn Cache<u8>>) -> Self {
        self.score_cache = Some(cache);
        self
    }

    pub fn build(self) -> Result<Validator, DnsError> {
        let resolver: Arc<dyn DomainResolver> = match self.resolver {
            Some(resolver) => resolver,
            None => Arc::new(SystemResolver::with_pool(
                &self.options.dns,
                self.options.dns_pool,
            )?),
        };

        let (reference_store, reputation_store) =
            match (self.reference_store, self.reputation_store) {
                (Some(reference), Some(reputation)) => (reference, reputation),
                (reference, reputation) => {
                    let defaults = Arc::new(MemoryStore::with_defaults());
                    let default_reference: Arc<dyn ReferenceStore> = defaults.clone();
                    let default_reputation: Arc<dyn ReputationStore> = defaults;
                    (
                        reference.unwrap_or(default_reference),
                        reputation.unwrap_or(default_reputation),
                    )
                }
            };

        let list_cache: Arc<dyn Cache<DomainSet>> = match self.list_cache {
            Some(cache) => cache,
            None => Arc::new(MemoryCache::<DomainSet>::new()),
        };
        let score_cache: Arc<dyn Cache<u8>> = match self.score_cache {
            Some(cache) => cache,
            None => Arc::new(MemoryCache::<u8>::new()),
        };

        let lists =
            ReferenceLists::new(reference_store, list_cache).with_ttl(self.options.list_ttl);
        let reputation = ReputationTracker::new(reputation_store, score_cache)
            .with_ttl(self.options.reputation_ttl);

        Ok(Validator {
            options: self.options,
            resolver,
            lists,
            reputation,
        })
    }
}

#[cfg(test)]
mod tests;
