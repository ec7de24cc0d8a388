use std::collections::HashMap;
use std::io::BufRead;
use std::sync::{Mutex, PoisonError, RwLock};

use tracing::debug;

use super::defaults::{DISPOSABLE_DOMAINS, FREE_PROVIDERS, ROLE_KEYWORDS};
use super::{ListEntry, ListKind, ReferenceStore, ReputationStore, StoreError};
use crate::reputation::DomainReputation;

/// In-process store for both reference lists and reputation rows.
///
/// Reputation upserts hold a single mutex for the whole read-modify-write,
/// which is the in-memory equivalent of a row lock.
#[derive(Default)]
pub struct MemoryStore {
    lists: RwLock<HashMap<ListKind, Vec<ListEntry>>>,
    reputations: Mutex<HashMap<String, DomainReputation>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with the built-in disposable, free-provider and
    /// role-keyword lists.
    pub fn with_defaults() -> Self {
        let store = Self::new();
        for (kind, set) in [
            (ListKind::Disposable, &DISPOSABLE_DOMAINS),
            (ListKind::FreeProvider, &FREE_PROVIDERS),
            (ListKind::RoleKeyword, &ROLE_KEYWORDS),
        ] {
            let mut values: Vec<&str> = set.iter().copied().collect();
            values.sort_unstable();
            for value in values {
                store.insert(kind, value);
            }
        }
        store
    }

    /// Adds `value` (trimmed, lower-cased) as an active entry, reactivating
    /// it if already present. Returns `true` when the active set changed.
    pub fn insert(&self, kind: ListKind, value: impl AsRef<str>) -> bool {
        let normalized = value.as_ref().trim().to_lowercase();
        if normalized.is_empty() {
            return false;
        }
        let mut lists = self.lists.write().unwrap_or_else(PoisonError::into_inner);
        let entries = lists.entry(kind).or_default();
        match entries.iter_mut().find(|entry| entry.value == normalized) {
            Some(entry) => {
                let changed = !entry.is_active;
                entry.is_active = true;
                changed
            }
            None => {
                entries.push(ListEntry::active(normalized));
                true
            }
        }
    }

    /// Flips the `is_active` flag of an existing entry. Returns `false` when
    /// the value is unknown.
    pub fn set_active(&self, kind: ListKind, value: &str, active: bool) -> bool {
        let normalized = value.trim().to_lowercase();
        let mut lists = self.lists.write().unwrap_or_else(PoisonError::into_inner);
        let Some(entry) = lists
            .get_mut(&kind)
            .and_then(|entries| entries.iter_mut().find(|entry| entry.value == normalized))
        else {
            return false;
        };
        entry.is_active = active;
        true
    }

    /// Reads one value per line; blank lines and `#` comments are skipped.
    /// Returns the number of entries that became active.
    pub fn load_list<R: BufRead>(&self, kind: ListKind, reader: R) -> Result<usize, StoreError> {
        let mut added = 0;
        for line in reader.lines() {
            let line = line.map_err(StoreError::io)?;
            let value = match line.split_once('#') {
                Some((head, _)) => head,
                None => line.as_str(),
            };
            if self.insert(kind, value) {
                added += 1;
            }
        }
        debug!(list = %kind, added, "list file loaded");
        Ok(added)
    }

    /// Snapshot of every reputation row, sorted by domain.
    pub fn reputations(&self) -> Vec<DomainReputation> {
        let rows = self.reputations.lock().unwrap_or_else(PoisonError::into_inner);
        let mut out: Vec<DomainReputation> = rows.values().cloned().collect();
        out.sort_by(|a, b| a.domain.cmp(&b.domain));
        out
    }

    /// Replaces rows with the given ones (keyed by lower-cased domain).
    pub fn restore_reputations<I>(&self, rows: I) -> usize
    where
        I: IntoIterator<Item = DomainReputation>,
    {
        let mut table = self.reputations.lock().unwrap_or_else(PoisonError::into_inner);
        let mut restored = 0;
        for mut row in rows {
            row.domain = row.domain.trim().to_lowercase();
            if row.domain.is_empty() {
                continue;
            }
            table.insert(row.domain.clone(), row);
            restored += 1;
        }
        restored
    }

    #[cfg(feature = "with-serde")]
    pub fn reputations_to_json(&self) -> Result<String, StoreError> {
        serde_json::to_string_pretty(&self.reputations()).map_err(StoreError::snapshot)
    }

    #[cfg(feature = "with-serde")]
    pub fn restore_reputations_json(&self, json: &str) -> Result<usize, StoreError> {
        let rows: Vec<DomainReputation> = serde_json::from_str(json).map_err(StoreError::snapshot)?;
        Ok(self.restore_reputations(rows))
    }
}

impl ReferenceStore for MemoryStore {
    fn entries(&self, kind: ListKind) -> Result<Vec<ListEntry>, StoreError> {
        let lists = self.lists.read().unwrap_or_else(PoisonError::into_inner);
        Ok(lists.get(&kind).cloned().unwrap_or_default())
    }
}

impl ReputationStore for MemoryStore {
    fn find(&self, domain: &str) -> Result<Option<DomainReputation>, StoreError> {
        let rows = self.reputations.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(rows.get(domain).cloned())
    }

    fn upsert_with(
        &self,
        domain: &str,
        mutation: &mut dyn FnMut(&mut DomainReputation),
    ) -> Result<DomainReputation, StoreError> {
        let mut rows = self.reputations.lock().unwrap_or_else(PoisonError::into_inner);
        let row = rows
            .entry(domain.to_string())
            .or_insert_with(|| DomainReputation::new(domain));
        mutation(row);
        Ok(row.clone())
    }
}
