//! In-memory identifier cache
//!
//! A membership index over the five identifier namespaces, answering
//! "have we already imported this paper?" in O(1). Rebuilt from the store
//! on demand and advanced incrementally as candidates are accepted.

use crate::normalize;
use crate::store::{Store, StoreError};
use imfeed_domain::{CandidateResult, Identifiers};
use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

#[derive(Debug, Default)]
struct IdentifierSets {
    dois: HashSet<String>,
    arxiv_ids: HashSet<String>,
    bibcodes: HashSet<String>,
    pmids: HashSet<String>,
    openalex_ids: HashSet<String>,
}

impl IdentifierSets {
    fn insert(&mut self, identifiers: &Identifiers) {
        if let Some(ref doi) = identifiers.doi {
            self.dois.insert(normalize::normalize_doi(doi));
        }
        if let Some(ref arxiv_id) = identifiers.arxiv_id {
            self.arxiv_ids.insert(normalize::normalize_arxiv_id(arxiv_id));
        }
        if let Some(ref bibcode) = identifiers.bibcode {
            self.bibcodes.insert(normalize::normalize_bibcode(bibcode));
        }
        if let Some(ref pmid) = identifiers.pmid {
            self.pmids.insert(normalize::normalize_pmid(pmid));
        }
        if let Some(ref openalex_id) = identifiers.openalex_id {
            self.openalex_ids
                .insert(normalize::normalize_openalex_id(openalex_id));
        }
    }

    fn contains(&self, identifiers: &Identifiers) -> bool {
        if let Some(ref doi) = identifiers.doi {
            if self.dois.contains(&normalize::normalize_doi(doi)) {
                return true;
            }
        }
        if let Some(ref arxiv_id) = identifiers.arxiv_id {
            if self
                .arxiv_ids
                .contains(&normalize::normalize_arxiv_id(arxiv_id))
            {
                return true;
            }
        }
        if let Some(ref bibcode) = identifiers.bibcode {
            if self.bibcodes.contains(&normalize::normalize_bibcode(bibcode)) {
                return true;
            }
        }
        if let Some(ref pmid) = identifiers.pmid {
            if self.pmids.contains(&normalize::normalize_pmid(pmid)) {
                return true;
            }
        }
        if let Some(ref openalex_id) = identifiers.openalex_id {
            if self
                .openalex_ids
                .contains(&normalize::normalize_openalex_id(openalex_id))
            {
                return true;
            }
        }
        false
    }

    fn clear(&mut self) {
        self.dois.clear();
        self.arxiv_ids.clear();
        self.bibcodes.clear();
        self.pmids.clear();
        self.openalex_ids.clear();
    }

    fn len(&self) -> usize {
        self.dois.len()
            + self.arxiv_ids.len()
            + self.bibcodes.len()
            + self.pmids.len()
            + self.openalex_ids.len()
    }
}

/// Multi-namespace identifier index guarding against re-import.
///
/// Single-writer: every read and mutation takes the one internal lock, so
/// concurrent fetch batches observe a total order over cache updates. The
/// lock is never held across an await point.
#[derive(Debug, Default)]
pub struct IdentifierCache {
    sets: Mutex<IdentifierSets>,
}

impl IdentifierCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn sets(&self) -> MutexGuard<'_, IdentifierSets> {
        self.sets.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Rebuild all namespaces from persisted publications.
    ///
    /// Idempotent: clears the index and refills it, so it is safe to call
    /// after any external mutation of the store.
    pub fn load_from_store(&self, store: &dyn Store) -> Result<(), StoreError> {
        let publications = store.publications()?;
        let mut sets = self.sets();
        sets.clear();
        for publication in &publications {
            sets.insert(&publication.identifiers);
        }
        debug!(
            publications = publications.len(),
            entries = sets.len(),
            "identifier cache reloaded"
        );
        Ok(())
    }

    /// Whether any identifier of `candidate` is already known.
    ///
    /// A candidate carrying no identifiers at all is never considered a
    /// duplicate by identity.
    pub fn contains(&self, candidate: &CandidateResult) -> bool {
        if candidate.identifiers.is_empty() {
            return false;
        }
        self.sets().contains(&candidate.identifiers)
    }

    /// Insert all present identifiers, normalized.
    pub fn insert(&self, identifiers: &Identifiers) {
        self.sets().insert(identifiers);
    }

    /// Insert the identifiers of an accepted candidate.
    ///
    /// Must run synchronously as part of accepting a result, before the
    /// next result in the same batch is evaluated; this is the only thing
    /// preventing an in-batch duplicate pair from both being accepted.
    pub fn insert_from_candidate(&self, candidate: &CandidateResult) {
        self.insert(&candidate.identifiers);
    }

    /// Total entries across all namespaces.
    pub fn len(&self) -> usize {
        self.sets().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use imfeed_domain::Publication;

    fn candidate_with(identifiers: Identifiers) -> CandidateResult {
        CandidateResult::new("arxiv", "Test").with_identifiers(identifiers)
    }

    #[test]
    fn empty_identifiers_are_never_duplicates() {
        let cache = IdentifierCache::new();
        let candidate = candidate_with(Identifiers::default());
        cache.insert_from_candidate(&candidate);
        assert!(!cache.contains(&candidate));
    }

    #[test]
    fn contains_matches_any_namespace() {
        let cache = IdentifierCache::new();
        cache.insert(&Identifiers {
            doi: Some("10.1234/a".to_string()),
            bibcode: Some("2024ApJ...1...1A".to_string()),
            ..Default::default()
        });

        // Same bibcode, different DOI: still a duplicate.
        let candidate = candidate_with(Identifiers {
            doi: Some("10.9999/other".to_string()),
            bibcode: Some("2024apj...1...1a".to_string()),
            ..Default::default()
        });
        assert!(cache.contains(&candidate));

        let unrelated = candidate_with(Identifiers {
            doi: Some("10.9999/other".to_string()),
            ..Default::default()
        });
        assert!(!cache.contains(&unrelated));
    }

    #[test]
    fn arxiv_versions_compare_equal() {
        let cache = IdentifierCache::new();
        cache.insert(&Identifiers {
            arxiv_id: Some("2401.12345v1".to_string()),
            ..Default::default()
        });

        let candidate = candidate_with(Identifiers {
            arxiv_id: Some("arXiv:2401.12345v3".to_string()),
            ..Default::default()
        });
        assert!(cache.contains(&candidate));
    }

    #[test]
    fn doi_comparison_is_case_insensitive() {
        let cache = IdentifierCache::new();
        cache.insert(&Identifiers {
            doi: Some("10.1234/Test".to_string()),
            ..Default::default()
        });

        let candidate = candidate_with(Identifiers {
            doi: Some("https://doi.org/10.1234/TEST".to_string()),
            ..Default::default()
        });
        assert!(cache.contains(&candidate));
    }

    #[test]
    fn load_from_store_is_idempotent() {
        let store = MemoryStore::new();
        let candidate = candidate_with(Identifiers {
            doi: Some("10.1234/a".to_string()),
            arxiv_id: Some("2401.00001".to_string()),
            ..Default::default()
        });
        store
            .insert_publication(Publication::from_candidate(&candidate))
            .unwrap();

        let cache = IdentifierCache::new();
        cache.load_from_store(&store).unwrap();
        let first = cache.len();
        cache.load_from_store(&store).unwrap();
        assert_eq!(cache.len(), first);
        assert!(cache.contains(&candidate));
    }

    #[test]
    fn reload_drops_stale_entries() {
        let store = MemoryStore::new();
        let cache = IdentifierCache::new();
        cache.insert(&Identifiers {
            doi: Some("10.1234/stale".to_string()),
            ..Default::default()
        });

        cache.load_from_store(&store).unwrap();
        let stale = candidate_with(Identifiers {
            doi: Some("10.1234/stale".to_string()),
            ..Default::default()
        });
        assert!(!cache.contains(&stale));
    }
}
