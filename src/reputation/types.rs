use super::NEUTRAL_SCORE;

/// Rolling acceptance rate for one mail domain.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainReputation {
    pub domain: String,
    /// 0..=100, `NEUTRAL_SCORE` until the first outcome is recorded.
    pub score: u8,
    pub total_validations: u64,
    pub valid_count: u64,
    pub invalid_count: u64,
    /// Reserved for administrative blocking; not consulted when scoring.
    #[cfg_attr(feature = "with-serde", serde(default))]
    pub is_blacklisted: bool,
}

impl DomainReputation {
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            score: NEUTRAL_SCORE,
            total_validations: 0,
            valid_count: 0,
            invalid_count: 0,
            is_blacklisted: false,
        }
    }

    /// Counts one confirmed outcome and recomputes `score`.
    pub fn record(&mut self, was_valid: bool) {
        self.total_validations += 1;
        if was_valid {
            self.valid_count += 1;
        } else {
            self.invalid_count += 1;
        }
        self.score = acceptance_score(self.valid_count, self.total_validations);
    }
}

/// `round(valid / total * 100)`, halves rounded up; neutral when `total == 0`.
pub(crate) fn acceptance_score(valid: u64, total: u64) -> u8 {
    if total == 0 {
        return NEUTRAL_SCORE;
    }
    let valid = u128::from(valid.min(total));
    let total = u128::from(total);
    let rounded = (valid * 200 + total) / (total * 2);
    u8::try_from(rounded).unwrap_or(100)
}
