//! Persistence seams: reference lists and per-domain reputation rows.

mod defaults;
mod error;
mod memory;

pub use error::StoreError;
pub use memory::MemoryStore;

use std::fmt;

use crate::reputation::DomainReputation;

/// The three reference lists consulted by the scoring pipeline.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListKind {
    Disposable,
    FreeProvider,
    RoleKeyword,
}

impl ListKind {
    pub const ALL: [ListKind; 3] = [Self::Disposable, Self::FreeProvider, Self::RoleKeyword];

    pub fn cache_key(self) -> &'static str {
        match self {
            Self::Disposable => "disposable_domains",
            Self::FreeProvider => "free_email_providers",
            Self::RoleKeyword => "role_based_keywords",
        }
    }
}

impl fmt::Display for ListKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.cache_key())
    }
}

#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListEntry {
    pub value: String,
    pub is_active: bool,
}

impl ListEntry {
    pub fn active(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            is_active: true,
        }
    }
}

pub trait ReferenceStore: Send + Sync {
    fn entries(&self, kind: ListKind) -> Result<Vec<ListEntry>, StoreError>;

    /// Active values only, in store order.
    fn active_values(&self, kind: ListKind) -> Result<Vec<String>, StoreError> {
        Ok(self
            .entries(kind)?
            .into_iter()
            .filter(|entry| entry.is_active)
            .map(|entry| entry.value)
            .collect())
    }
}

pub trait ReputationStore: Send + Sync {
    fn find(&self, domain: &str) -> Result<Option<DomainReputation>, StoreError>;

    /// Get-or-create the row for `domain`, apply `mutation` and persist it,
    /// atomically with respect to other writers of the same domain.
    fn upsert_with(
        &self,
        domain: &str,
        mutation: &mut dyn FnMut(&mut DomainReputation),
    ) -> Result<DomainReputation, StoreError>;
}
