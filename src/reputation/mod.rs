//! Per-domain reputation: cache-first reads, atomic feedback writes.
//!
//! Scores only move through [`ReputationTracker::update_domain_reputation`],
//! which callers invoke once deliverability has been confirmed out of band.
//! Validation itself never writes here.

mod error;
mod types;

pub use error::ReputationError;
pub use types::DomainReputation;

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tracing::{info, warn};

use crate::cache::Cache;
use crate::store::ReputationStore;

/// Score of a domain with no recorded history.
pub const NEUTRAL_SCORE: u8 = 50;

pub const DEFAULT_REPUTATION_TTL: Duration = Duration::from_secs(24 * 60 * 60);

pub struct ReputationTracker {
    store: Arc<dyn ReputationStore>,
    cache: Arc<dyn Cache<u8>>,
    ttl: Duration,
    // read-miss (find + put) and update (upsert + forget) never interleave
    refill_lock: Mutex<()>,
}

impl ReputationTracker {
    pub fn new(store: Arc<dyn ReputationStore>, cache: Arc<dyn Cache<u8>>) -> Self {
        Self {
            store,
            cache,
            ttl: DEFAULT_REPUTATION_TTL,
            refill_lock: Mutex::new(()),
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Current score for `domain`, [`NEUTRAL_SCORE`] when unknown.
    ///
    /// Never fails: a store error is logged and reported as neutral without
    /// being cached, so the next call retries the store.
    pub fn get_domain_reputation(&self, domain: &str) -> u8 {
        let domain = normalize(domain);
        if domain.is_empty() {
            return NEUTRAL_SCORE;
        }
        let key = cache_key(&domain);
        if let Some(score) = self.cache.get(&key) {
            return score;
        }

        let _refill = self.refill_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let store = &self.store;
        let lookup = self.cache.remember(&key, self.ttl, &mut || {
            Ok(store
                .find(&domain)?
                .map_or(NEUTRAL_SCORE, |row| row.score))
        });
        match lookup {
            Ok(score) => score,
            Err(err) => {
                warn!(%domain, error = %err, "reputation store unavailable, using neutral score");
                NEUTRAL_SCORE
            }
        }
    }

    /// Records one confirmed outcome for `domain` and returns the updated row.
    pub fn update_domain_reputation(
        &self,
        domain: &str,
        was_valid: bool,
    ) -> Result<DomainReputation, ReputationError> {
        let domain = normalize(domain);
        if domain.is_empty() {
            return Err(ReputationError::EmptyDomain);
        }
        let row = {
            let _refill = self.refill_lock.lock().unwrap_or_else(PoisonError::into_inner);
            let row = self
                .store
                .upsert_with(&domain, &mut |row| row.record(was_valid))?;
            self.cache.forget(&cache_key(&domain));
            row
        };
        info!(
            %domain,
            was_valid,
            score = row.score,
            total = row.total_validations,
            "domain reputation updated"
        );
        Ok(row)
    }
}

fn normalize(domain: &str) -> String {
    domain.trim().to_lowercase()
}

fn cache_key(domain: &str) -> String {
    format!("domain_reputation_{domain}")
}
