//! Saved-search feed

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A saved search that periodically imports newly matching candidates.
///
/// `date_last_executed` and `last_fetch_count` are mutated only by the
/// fetch pipeline after a cycle; everything else is user-edited.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Feed {
    pub id: Uuid,
    pub name: String,
    /// Query string passed verbatim to the search source
    pub query: String,
    /// Library that owns this feed
    pub library_id: Uuid,
    /// Whether results are routed into the Inbox
    pub feeds_to_inbox: bool,
    pub auto_refresh_enabled: bool,
    pub refresh_interval_seconds: u64,
    pub date_last_executed: Option<DateTime<Utc>>,
    pub last_fetch_count: u64,
}

impl Feed {
    /// Create a feed with refresh defaults: feeding the inbox, auto-refresh
    /// on, hourly interval, never executed.
    pub fn new(name: impl Into<String>, query: impl Into<String>, library_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            query: query.into(),
            library_id,
            feeds_to_inbox: true,
            auto_refresh_enabled: true,
            refresh_interval_seconds: 3600,
            date_last_executed: None,
            last_fetch_count: 0,
        }
    }

    /// Record the outcome of a fetch
    pub fn mark_executed(&mut self, at: DateTime<Utc>, fetched: u64) {
        self.date_last_executed = Some(at);
        self.last_fetch_count = fetched;
    }
}
