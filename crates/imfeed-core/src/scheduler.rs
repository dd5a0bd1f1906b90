//! Inbox refresh scheduler
//!
//! Owns feed due-checking, cycle mutual exclusion, power/network gating,
//! and refresh statistics. A background task ticks on a fixed interval;
//! manual triggers share a cycle lock with the tick so two cycles never
//! run against the same feed set concurrently. Within a cycle, per-feed
//! fetches are strictly sequential: due feeds share rate-limited sources,
//! and concurrent fetches could also race on identifier-cache inserts for
//! the same paper surfaced by two feeds.

use crate::error::{CoreError, Result};
use crate::fetch::FetchService;
use crate::store::Store;
use chrono::{DateTime, Duration, Utc};
use imfeed_domain::Feed;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Interval between due-feed checks (seconds).
pub const CHECK_INTERVAL_SECS: u64 = 60;

/// Floor applied to per-feed refresh intervals (seconds).
pub const MINIMUM_REFRESH_INTERVAL_SECS: u64 = 300;

/// Scheduler timing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Seconds between due-feed checks
    pub check_interval_secs: u64,
    /// Floor applied to per-feed refresh intervals
    pub minimum_refresh_interval_secs: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            check_interval_secs: CHECK_INTERVAL_SECS,
            minimum_refresh_interval_secs: MINIMUM_REFRESH_INTERVAL_SECS,
        }
    }
}

/// Battery/thermal status collaborator. Side-effect free.
pub trait PowerStateProvider: Send + Sync {
    /// Whether refresh work should be deferred to save power
    fn is_power_constrained(&self) -> bool;
}

/// Network status collaborator. Side-effect free.
pub trait NetworkReachabilityProvider: Send + Sync {
    fn is_network_available(&self) -> bool;
}

/// Always-on providers for embedders without platform integrations.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysOn;

impl PowerStateProvider for AlwaysOn {
    fn is_power_constrained(&self) -> bool {
        false
    }
}

impl NetworkReachabilityProvider for AlwaysOn {
    fn is_network_available(&self) -> bool {
        true
    }
}

/// Read-only snapshot of scheduler statistics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchedulerStatistics {
    pub is_running: bool,
    pub last_check_date: Option<DateTime<Utc>>,
    pub total_papers_fetched: u64,
    pub total_refresh_cycles: u64,
    pub skipped_cycles_for_power: u64,
    pub skipped_cycles_for_network: u64,
    /// Feeds currently eligible for auto-refresh into the Inbox
    pub feed_count: u64,
    pub is_network_available: bool,
}

#[derive(Debug, Default)]
struct StatsInner {
    last_check_date: Option<DateTime<Utc>>,
    total_papers_fetched: u64,
    total_refresh_cycles: u64,
    skipped_cycles_for_power: u64,
    skipped_cycles_for_network: u64,
    is_network_available: bool,
}

/// Background scheduler driving periodic inbox refreshes.
pub struct InboxScheduler {
    fetcher: Arc<FetchService>,
    store: Arc<dyn Store>,
    power: Arc<dyn PowerStateProvider>,
    network: Arc<dyn NetworkReachabilityProvider>,
    config: SchedulerConfig,
    running: AtomicBool,
    cancel: Mutex<Option<CancellationToken>>,
    // Held for the whole of one cycle; taken by both the periodic tick and
    // manual triggers, so cycles never overlap.
    cycle_lock: tokio::sync::Mutex<()>,
    stats: Mutex<StatsInner>,
}

impl InboxScheduler {
    pub fn new(
        fetcher: Arc<FetchService>,
        store: Arc<dyn Store>,
        power: Arc<dyn PowerStateProvider>,
        network: Arc<dyn NetworkReachabilityProvider>,
        config: SchedulerConfig,
    ) -> Self {
        let stats = StatsInner {
            is_network_available: network.is_network_available(),
            ..Default::default()
        };
        Self {
            fetcher,
            store,
            power,
            network,
            config,
            running: AtomicBool::new(false),
            cancel: Mutex::new(None),
            cycle_lock: tokio::sync::Mutex::new(()),
            stats: Mutex::new(stats),
        }
    }

    /// Construct with always-on providers and default timing.
    pub fn with_defaults(fetcher: Arc<FetchService>, store: Arc<dyn Store>) -> Self {
        Self::new(
            fetcher,
            store,
            Arc::new(AlwaysOn),
            Arc::new(AlwaysOn),
            SchedulerConfig::default(),
        )
    }

    fn stats_guard(&self) -> MutexGuard<'_, StatsInner> {
        self.stats.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Start the periodic refresh loop.
    ///
    /// The first tick fires immediately, so starting performs one check up
    /// front. A no-op returning `None` while already running: there is only
    /// ever one active loop.
    pub fn start(self: &Arc<Self>) -> Option<JoinHandle<()>> {
        if self.running.swap(true, Ordering::SeqCst) {
            debug!("scheduler already running");
            return None;
        }

        let token = CancellationToken::new();
        *self
            .cancel
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(token.clone());

        let scheduler = Arc::clone(self);
        info!(
            check_interval_secs = self.config.check_interval_secs,
            "scheduler started"
        );
        Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(std::time::Duration::from_secs(
                scheduler.config.check_interval_secs,
            ));
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {}
                }
                // Cancellation interrupts only the wait above; a cycle in
                // flight always runs to completion.
                scheduler.trigger_immediate_check().await;
            }
            debug!("scheduler loop exited");
        }))
    }

    /// Stop the periodic loop.
    ///
    /// Cancels the pending wait for the next tick; an in-flight cycle
    /// finishes so feed, cache, and inbox state is never left half-updated.
    /// A no-op when already stopped.
    pub fn stop(&self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            return;
        }
        if let Some(token) = self
            .cancel
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take()
        {
            token.cancel();
        }
        info!("scheduler stopped");
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    fn effective_interval_secs(&self, feed: &Feed) -> u64 {
        feed.refresh_interval_seconds
            .max(self.config.minimum_refresh_interval_secs)
    }

    fn is_due(&self, feed: &Feed, now: DateTime<Utc>) -> bool {
        if !feed.feeds_to_inbox || !feed.auto_refresh_enabled {
            return false;
        }
        match feed.date_last_executed {
            None => true,
            Some(last) => now >= last + Duration::seconds(self.effective_interval_secs(feed) as i64),
        }
    }

    /// Feeds eligible for a refresh right now, in stable store order.
    pub fn due_feeds(&self) -> Result<Vec<Feed>> {
        let now = Utc::now();
        let feeds = self.store.feeds()?;
        Ok(feeds.into_iter().filter(|f| self.is_due(f, now)).collect())
    }

    /// When the feed will next be due; `None` means due now (never executed).
    pub fn next_refresh_time(&self, feed_id: Uuid) -> Result<Option<DateTime<Utc>>> {
        let feed = self
            .store
            .feed(feed_id)?
            .ok_or(CoreError::FeedNotFound(feed_id))?;
        Ok(feed
            .date_last_executed
            .map(|last| last + Duration::seconds(self.effective_interval_secs(&feed) as i64)))
    }

    /// Run exactly one refresh cycle; returns the number of papers fetched.
    ///
    /// A call arriving while another cycle is in flight waits for it, then
    /// runs its own full cycle. Power or network constraints skip the cycle
    /// body: the skip is counted, `last_check_date` still advances, and no
    /// source is contacted.
    pub async fn trigger_immediate_check(&self) -> u64 {
        let _cycle = self.cycle_lock.lock().await;

        let network_available = self.network.is_network_available();
        {
            let mut stats = self.stats_guard();
            stats.last_check_date = Some(Utc::now());
            stats.is_network_available = network_available;
            if self.power.is_power_constrained() {
                stats.skipped_cycles_for_power += 1;
                debug!("cycle skipped: power constrained");
                return 0;
            }
            if !network_available {
                stats.skipped_cycles_for_network += 1;
                debug!("cycle skipped: network unreachable");
                return 0;
            }
            stats.total_refresh_cycles += 1;
        }

        let due = match self.due_feeds() {
            Ok(due) => due,
            Err(error) => {
                warn!(error = %error, "cannot list due feeds, nothing to fetch");
                Vec::new()
            }
        };

        let mut fetched: u64 = 0;
        for feed in &due {
            // Sequential on purpose; see the module docs.
            match self.fetcher.fetch_for_inbox(feed.id).await {
                Ok(count) => fetched += count,
                Err(error) => {
                    warn!(feed = %feed.name, error = %error, "feed fetch failed, continuing cycle");
                }
            }
        }

        self.stats_guard().total_papers_fetched += fetched;
        if !due.is_empty() {
            info!(feeds = due.len(), fetched, "refresh cycle complete");
        }
        fetched
    }

    /// Read-only statistics snapshot.
    pub fn statistics(&self) -> SchedulerStatistics {
        let feed_count = self
            .store
            .feeds()
            .map(|feeds| {
                feeds
                    .iter()
                    .filter(|f| f.feeds_to_inbox && f.auto_refresh_enabled)
                    .count() as u64
            })
            .unwrap_or(0);

        let stats = self.stats_guard();
        SchedulerStatistics {
            is_running: self.is_running(),
            last_check_date: stats.last_check_date,
            total_papers_fetched: stats.total_papers_fetched,
            total_refresh_cycles: stats.total_refresh_cycles,
            skipped_cycles_for_power: stats.skipped_cycles_for_power,
            skipped_cycles_for_network: stats.skipped_cycles_for_network,
            feed_count,
            is_network_available: stats.is_network_available,
        }
    }
}
