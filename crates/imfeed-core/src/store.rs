//! Persistence store trait and in-memory reference implementation
//!
//! The pipeline talks to persistence through [`Store`]; backends own their
//! schema and transactions. Each trait call is one all-or-nothing logical
//! unit of work. [`MemoryStore`] is the reference backend used by tests and
//! by embedders that bring no database.

use imfeed_domain::{Feed, Library, MuteRule, Publication};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

/// Errors from the store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Record not found: {0}")]
    NotFound(Uuid),

    #[error("Record already exists: {0}")]
    AlreadyExists(Uuid),

    #[error("Storage error: {0}")]
    Storage(String),
}

/// The trait that all persistence backends implement.
pub trait Store: Send + Sync {
    /// Insert a new publication.
    fn insert_publication(&self, publication: Publication) -> Result<(), StoreError>;

    /// Get a publication by ID.
    fn publication(&self, id: Uuid) -> Result<Option<Publication>, StoreError>;

    /// Replace an existing publication.
    fn update_publication(&self, publication: Publication) -> Result<(), StoreError>;

    /// Delete a publication by ID.
    fn delete_publication(&self, id: Uuid) -> Result<(), StoreError>;

    /// All persisted publications.
    fn publications(&self) -> Result<Vec<Publication>, StoreError>;

    /// Count unread publications belonging to the given library.
    fn count_unread_in_library(&self, library_id: Uuid) -> Result<u64, StoreError>;

    /// Insert a new library.
    fn insert_library(&self, library: Library) -> Result<(), StoreError>;

    /// Get a library by ID.
    fn library(&self, id: Uuid) -> Result<Option<Library>, StoreError>;

    /// All libraries.
    fn libraries(&self) -> Result<Vec<Library>, StoreError>;

    /// Insert a new mute rule.
    fn insert_mute_rule(&self, rule: MuteRule) -> Result<(), StoreError>;

    /// Delete a mute rule by ID.
    fn delete_mute_rule(&self, id: Uuid) -> Result<(), StoreError>;

    /// Delete all mute rules.
    fn clear_mute_rules(&self) -> Result<(), StoreError>;

    /// All mute rules.
    fn mute_rules(&self) -> Result<Vec<MuteRule>, StoreError>;

    /// Insert a new feed.
    fn insert_feed(&self, feed: Feed) -> Result<(), StoreError>;

    /// Get a feed by ID.
    fn feed(&self, id: Uuid) -> Result<Option<Feed>, StoreError>;

    /// Replace an existing feed.
    fn update_feed(&self, feed: Feed) -> Result<(), StoreError>;

    /// All feeds, in a stable order.
    fn feeds(&self) -> Result<Vec<Feed>, StoreError>;
}

#[derive(Debug, Default)]
struct MemoryInner {
    publications: HashMap<Uuid, Publication>,
    libraries: HashMap<Uuid, Library>,
    mute_rules: HashMap<Uuid, MuteRule>,
    feeds: HashMap<Uuid, Feed>,
}

/// In-memory store backend.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<MemoryInner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn inner(&self) -> MutexGuard<'_, MemoryInner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Store for MemoryStore {
    fn insert_publication(&self, publication: Publication) -> Result<(), StoreError> {
        let mut inner = self.inner();
        if inner.publications.contains_key(&publication.id) {
            return Err(StoreError::AlreadyExists(publication.id));
        }
        inner.publications.insert(publication.id, publication);
        Ok(())
    }

    fn publication(&self, id: Uuid) -> Result<Option<Publication>, StoreError> {
        Ok(self.inner().publications.get(&id).cloned())
    }

    fn update_publication(&self, publication: Publication) -> Result<(), StoreError> {
        let mut inner = self.inner();
        if !inner.publications.contains_key(&publication.id) {
            return Err(StoreError::NotFound(publication.id));
        }
        inner.publications.insert(publication.id, publication);
        Ok(())
    }

    fn delete_publication(&self, id: Uuid) -> Result<(), StoreError> {
        self.inner()
            .publications
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound(id))
    }

    fn publications(&self) -> Result<Vec<Publication>, StoreError> {
        let mut publications: Vec<Publication> =
            self.inner().publications.values().cloned().collect();
        publications.sort_by_key(|p| (p.date_added, p.id));
        Ok(publications)
    }

    fn count_unread_in_library(&self, library_id: Uuid) -> Result<u64, StoreError> {
        Ok(self
            .inner()
            .publications
            .values()
            .filter(|p| !p.is_read && p.is_in_library(library_id))
            .count() as u64)
    }

    fn insert_library(&self, library: Library) -> Result<(), StoreError> {
        let mut inner = self.inner();
        if inner.libraries.contains_key(&library.id) {
            return Err(StoreError::AlreadyExists(library.id));
        }
        inner.libraries.insert(library.id, library);
        Ok(())
    }

    fn library(&self, id: Uuid) -> Result<Option<Library>, StoreError> {
        Ok(self.inner().libraries.get(&id).cloned())
    }

    fn libraries(&self) -> Result<Vec<Library>, StoreError> {
        let mut libraries: Vec<Library> = self.inner().libraries.values().cloned().collect();
        libraries.sort_by_key(|l| (l.sort_order, l.id));
        Ok(libraries)
    }

    fn insert_mute_rule(&self, rule: MuteRule) -> Result<(), StoreError> {
        let mut inner = self.inner();
        if inner.mute_rules.contains_key(&rule.id) {
            return Err(StoreError::AlreadyExists(rule.id));
        }
        inner.mute_rules.insert(rule.id, rule);
        Ok(())
    }

    fn delete_mute_rule(&self, id: Uuid) -> Result<(), StoreError> {
        self.inner()
            .mute_rules
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound(id))
    }

    fn clear_mute_rules(&self) -> Result<(), StoreError> {
        self.inner().mute_rules.clear();
        Ok(())
    }

    fn mute_rules(&self) -> Result<Vec<MuteRule>, StoreError> {
        let mut rules: Vec<MuteRule> = self.inner().mute_rules.values().cloned().collect();
        rules.sort_by_key(|r| (r.date_added, r.id));
        Ok(rules)
    }

    fn insert_feed(&self, feed: Feed) -> Result<(), StoreError> {
        let mut inner = self.inner();
        if inner.feeds.contains_key(&feed.id) {
            return Err(StoreError::AlreadyExists(feed.id));
        }
        inner.feeds.insert(feed.id, feed);
        Ok(())
    }

    fn feed(&self, id: Uuid) -> Result<Option<Feed>, StoreError> {
        Ok(self.inner().feeds.get(&id).cloned())
    }

    fn update_feed(&self, feed: Feed) -> Result<(), StoreError> {
        let mut inner = self.inner();
        if !inner.feeds.contains_key(&feed.id) {
            return Err(StoreError::NotFound(feed.id));
        }
        inner.feeds.insert(feed.id, feed);
        Ok(())
    }

    fn feeds(&self) -> Result<Vec<Feed>, StoreError> {
        let mut feeds: Vec<Feed> = self.inner().feeds.values().cloned().collect();
        feeds.sort_by_key(|f| (f.name.clone(), f.id));
        Ok(feeds)
    }
}
