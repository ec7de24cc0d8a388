//! Read-through view of the reference lists, cached per list.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tracing::{info, warn};

use crate::cache::Cache;
use crate::store::{ListKind, ReferenceStore};

pub type DomainSet = Arc<HashSet<String>>;

pub const DEFAULT_LIST_TTL: Duration = Duration::from_secs(60 * 60);

/// The three lists as consumed by one validation call.
#[derive(Debug, Clone, Default)]
pub struct ListSnapshot {
    pub disposable: DomainSet,
    pub free_providers: DomainSet,
    pub role_keywords: DomainSet,
}

impl ListSnapshot {
    pub fn is_disposable(&self, domain: &str) -> bool {
        self.disposable.contains(&domain.to_lowercase())
    }

    pub fn is_free_provider(&self, domain: &str) -> bool {
        self.free_providers.contains(&domain.to_lowercase())
    }
}

pub struct ReferenceLists {
    store: Arc<dyn ReferenceStore>,
    cache: Arc<dyn Cache<DomainSet>>,
    ttl: Duration,
    // one loader at a time on a cold cache
    load_lock: Mutex<()>,
}

impl ReferenceLists {
    pub fn new(store: Arc<dyn ReferenceStore>, cache: Arc<dyn Cache<DomainSet>>) -> Self {
        Self {
            store,
            cache,
            ttl: DEFAULT_LIST_TTL,
            load_lock: Mutex::new(()),
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// All three lists, loading any that are not cached yet.
    pub fn load(&self) -> ListSnapshot {
        ListSnapshot {
            disposable: self.get(ListKind::Disposable),
            free_providers: self.get(ListKind::FreeProvider),
            role_keywords: self.get(ListKind::RoleKeyword),
        }
    }

    pub fn get(&self, kind: ListKind) -> DomainSet {
        if let Some(set) = self.cache.get(kind.cache_key()) {
            return set;
        }

        let _guard = self.load_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let store = &self.store;
        let loaded = self.cache.remember(kind.cache_key(), self.ttl, &mut || {
            let set: HashSet<String> = store
                .active_values(kind)?
                .iter()
                .map(|value| value.trim().to_lowercase())
                .filter(|value| !value.is_empty())
                .collect();
            info!(list = %kind, entries = set.len(), "reference list loaded");
            Ok(Arc::new(set))
        });

        loaded.unwrap_or_else(|err| {
            warn!(list = %kind, error = %err, "reference list unavailable, treating as empty");
            DomainSet::default()
        })
    }

    /// Drops the cached lists and reloads them from the store.
    pub fn refresh(&self) -> ListSnapshot {
        for kind in ListKind::ALL {
            self.cache.forget(kind.cache_key());
        }
        self.load()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use crate::store::{ListEntry, MemoryStore, StoreError};

    fn lists(store: Arc<MemoryStore>) -> ReferenceLists {
        ReferenceLists::new(store, Arc::new(MemoryCache::<DomainSet>::new()))
    }

    struct FlakyStore;

    impl ReferenceStore for FlakyStore {
        fn entries(&self, kind: ListKind) -> Result<Vec<ListEntry>, StoreError> {
            match kind {
                ListKind::RoleKeyword => Ok(vec![
                    ListEntry::active(" Support "),
                    ListEntry {
                        value: "sales".to_string(),
                        is_active: false,
                    },
                ]),
                _ => Err(StoreError::unavailable("table locked")),
            }
        }
    }

    #[test]
    fn snapshot_is_cached_until_refresh() {
        let store = Arc::new(MemoryStore::new());
        store.insert(ListKind::Disposable, "old.test");
        let lists = lists(store.clone());

        assert!(lists.load().is_disposable("OLD.test"));
        store.insert(ListKind::Disposable, "new.test");
        assert!(!lists.load().is_disposable("new.test"));

        let refreshed = lists.refresh();
        assert!(refreshed.is_disposable("new.test"));
        assert!(refreshed.is_disposable("old.test"));
    }

    #[test]
    fn store_errors_degrade_to_empty_lists() {
        let lists = ReferenceLists::new(
            Arc::new(FlakyStore),
            Arc::new(MemoryCache::<DomainSet>::new()),
        );
        let snapshot = lists.load();
        assert!(snapshot.disposable.is_empty());
        assert!(snapshot.free_providers.is_empty());
        assert_eq!(snapshot.role_keywords.len(), 1);
        assert!(snapshot.role_keywords.contains("support"));
    }

    #[test]
    fn concurrent_first_use_sees_same_set() {
        let store = Arc::new(MemoryStore::with_defaults());
        let lists = lists(store);
        let sets: Vec<DomainSet> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|_| scope.spawn(|| lists.get(ListKind::FreeProvider)))
                .collect();
            handles
                .into_iter()
                .map(|handle| handle.join().expect("worker"))
                .collect()
        });
        assert!(sets.windows(2).all(|pair| Arc::ptr_eq(&pair[0], &pair[1])));
        assert!(sets[0].contains("gmail.com"));
    }
}
