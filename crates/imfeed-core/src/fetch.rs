//! Per-batch import pipeline
//!
//! [`FetchService`] runs each candidate through the mute filter, the
//! duplicate check, persistence, the identifier cache, and inbox filing,
//! in that order. Every external producer of candidates (scheduled feeds,
//! manual searches, imports) routes through
//! [`FetchService::send_to_inbox`] so filtering stays consistent.

use crate::cache::IdentifierCache;
use crate::error::{CoreError, Result};
use crate::inbox::InboxManager;
use crate::store::Store;
use async_trait::async_trait;
use chrono::Utc;
use imfeed_domain::{CandidateResult, Publication};
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

/// Errors from a search source.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// A remote catalog the pipeline can query.
///
/// Implementations own authentication and rate limiting; the scheduler only
/// promises to call sources sequentially within a cycle.
#[async_trait]
pub trait SourceClient: Send + Sync {
    /// Run a feed's query and return the matching candidate records.
    async fn search(&self, query: &str)
        -> std::result::Result<Vec<CandidateResult>, SourceError>;
}

/// Filter, dedup, persist, and file candidates into the Inbox.
pub struct FetchService {
    store: Arc<dyn Store>,
    cache: Arc<IdentifierCache>,
    inbox: Arc<InboxManager>,
    source: Arc<dyn SourceClient>,
}

impl FetchService {
    pub fn new(
        store: Arc<dyn Store>,
        cache: Arc<IdentifierCache>,
        inbox: Arc<InboxManager>,
        source: Arc<dyn SourceClient>,
    ) -> Self {
        Self {
            store,
            cache,
            inbox,
            source,
        }
    }

    /// Run one batch through the pipeline; returns the number accepted.
    ///
    /// Candidates are evaluated strictly in input order, and each
    /// accept/reject decision is independent: an error on one candidate is
    /// logged and never aborts the rest of the batch.
    pub fn send_to_inbox(&self, results: &[CandidateResult]) -> u64 {
        let mut accepted: u64 = 0;
        for candidate in results {
            match self.admit(candidate) {
                Ok(true) => accepted += 1,
                Ok(false) => {}
                Err(error) => {
                    warn!(
                        candidate = %candidate.id,
                        title = %candidate.title,
                        error = %error,
                        "candidate dropped after pipeline error"
                    );
                }
            }
        }
        accepted
    }

    /// Evaluate one candidate. `Ok(true)` means persisted and filed.
    fn admit(&self, candidate: &CandidateResult) -> Result<bool> {
        if self.inbox.should_filter(candidate)? {
            return Ok(false);
        }
        if self.cache.contains(candidate) {
            debug!(candidate = %candidate.id, title = %candidate.title, "duplicate, skipping");
            return Ok(false);
        }

        let publication = Publication::from_candidate(candidate);
        let publication_id = publication.id;
        // Persist first: if the write fails, the cache must not have
        // advanced for this candidate.
        self.store.insert_publication(publication)?;
        // The cache advances before the next candidate in this batch is
        // evaluated, so an in-batch duplicate pair is accepted only once.
        self.cache.insert_from_candidate(candidate);
        self.inbox.add_to_inbox(publication_id)?;
        Ok(true)
    }

    /// Fetch a feed's query results and route them into the Inbox.
    ///
    /// Feeds with `feeds_to_inbox` disabled return 0 without touching the
    /// source. Source errors propagate to the caller; on success the feed's
    /// execution timestamp and count are recorded even for an empty batch.
    pub async fn fetch_for_inbox(&self, feed_id: Uuid) -> Result<u64> {
        let Some(mut feed) = self.store.feed(feed_id)? else {
            return Err(CoreError::FeedNotFound(feed_id));
        };
        if !feed.feeds_to_inbox {
            debug!(feed = %feed.name, "feed does not route to the inbox");
            return Ok(0);
        }

        let results = self.source.search(&feed.query).await?;
        let accepted = self.send_to_inbox(&results);

        feed.mark_executed(Utc::now(), accepted);
        self.store.update_feed(feed)?;
        debug!(
            feed = %feed_id,
            results = results.len(),
            accepted,
            "feed fetch complete"
        );
        Ok(accepted)
    }
}
