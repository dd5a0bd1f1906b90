//! Shared fixtures for integration tests

use async_trait::async_trait;
use imfeed_core::{
    AlwaysOn, FetchService, IdentifierCache, InboxManager, InboxScheduler, MemoryStore,
    SchedulerConfig, SourceClient, SourceError, Store,
};
use imfeed_domain::{CandidateResult, Feed, Identifiers};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use uuid::Uuid;

/// Install a subscriber once so `RUST_LOG=debug` surfaces pipeline logs.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();
}

/// Source backed by a query-to-results map; unknown queries fail.
#[derive(Default)]
pub struct MapSource {
    results: Mutex<HashMap<String, Vec<CandidateResult>>>,
    delay: Option<Duration>,
    in_flight: Mutex<u32>,
    max_in_flight: Mutex<u32>,
}

impl MapSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add artificial latency per call, for overlap tests.
    #[allow(dead_code)]
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    #[allow(dead_code)]
    pub fn set(&self, query: &str, results: Vec<CandidateResult>) {
        self.results
            .lock()
            .unwrap()
            .insert(query.to_string(), results);
    }

    /// Highest number of concurrently running `search` calls observed.
    #[allow(dead_code)]
    pub fn max_in_flight(&self) -> u32 {
        *self.max_in_flight.lock().unwrap()
    }
}

#[async_trait]
impl SourceClient for MapSource {
    async fn search(&self, query: &str) -> Result<Vec<CandidateResult>, SourceError> {
        {
            let mut in_flight = self.in_flight.lock().unwrap();
            *in_flight += 1;
            let mut max = self.max_in_flight.lock().unwrap();
            *max = (*max).max(*in_flight);
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let result = self
            .results
            .lock()
            .unwrap()
            .get(query)
            .cloned()
            .ok_or_else(|| SourceError::RequestFailed(format!("no fixture for {query}")));
        *self.in_flight.lock().unwrap() -= 1;
        result
    }
}

/// Everything wired together over a `MemoryStore` and a `MapSource`.
pub struct World {
    pub store: Arc<dyn Store>,
    pub cache: Arc<IdentifierCache>,
    pub inbox: Arc<InboxManager>,
    pub fetcher: Arc<FetchService>,
    pub scheduler: Arc<InboxScheduler>,
    pub source: Arc<MapSource>,
}

impl World {
    pub fn new() -> Self {
        Self::with_source(MapSource::new())
    }

    pub fn with_source(source: MapSource) -> Self {
        init_tracing();
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let cache = Arc::new(IdentifierCache::new());
        let inbox = Arc::new(InboxManager::new(Arc::clone(&store)));
        let source = Arc::new(source);
        let fetcher = Arc::new(FetchService::new(
            Arc::clone(&store),
            Arc::clone(&cache),
            Arc::clone(&inbox),
            Arc::clone(&source) as Arc<dyn SourceClient>,
        ));
        let scheduler = Arc::new(InboxScheduler::with_defaults(
            Arc::clone(&fetcher),
            Arc::clone(&store),
        ));
        Self {
            store,
            cache,
            inbox,
            fetcher,
            scheduler,
            source,
        }
    }

    /// Rewire the scheduler with explicit timing; everything else shared.
    #[allow(dead_code)]
    pub fn with_config(config: SchedulerConfig) -> Self {
        let world = Self::new();
        let scheduler = Arc::new(InboxScheduler::new(
            Arc::clone(&world.fetcher),
            Arc::clone(&world.store),
            Arc::new(AlwaysOn),
            Arc::new(AlwaysOn),
            config,
        ));
        Self { scheduler, ..world }
    }

    /// Insert a feed whose query is its name.
    #[allow(dead_code)]
    pub fn add_feed(&self, name: &str) -> Uuid {
        let feed = Feed::new(name, name, Uuid::new_v4());
        let id = feed.id;
        self.store.insert_feed(feed).unwrap();
        id
    }
}

#[allow(dead_code)]
pub fn arxiv_candidate(title: &str, arxiv_id: &str) -> CandidateResult {
    CandidateResult::new("arxiv", title).with_identifiers(Identifiers {
        arxiv_id: Some(arxiv_id.to_string()),
        ..Default::default()
    })
}

pub fn doi_candidate(title: &str, doi: &str) -> CandidateResult {
    CandidateResult::new("crossref", title).with_identifiers(Identifiers {
        doi: Some(doi.to_string()),
        ..Default::default()
    })
}
