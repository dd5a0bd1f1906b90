//! Mute rules for suppressing candidate records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What a mute rule matches against.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum MuteRuleKind {
    /// Case-insensitive substring of any author string
    Author,
    /// Case-insensitive substring of the venue
    Venue,
    /// Case-insensitive exact DOI match
    Doi,
    /// Case-insensitive exact bibcode match
    Bibcode,
    /// Case-insensitive prefix of the arXiv ID's category segment
    ArxivCategory,
}

impl MuteRuleKind {
    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            MuteRuleKind::Author => "author",
            MuteRuleKind::Venue => "venue",
            MuteRuleKind::Doi => "doi",
            MuteRuleKind::Bibcode => "bibcode",
            MuteRuleKind::ArxivCategory => "arxiv_category",
        }
    }
}

/// A user-defined suppression rule, applied before a candidate is persisted.
///
/// `(kind, value)` pairs are unique; re-muting an existing pair yields the
/// existing record.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MuteRule {
    pub id: Uuid,
    pub kind: MuteRuleKind,
    pub value: String,
    pub date_added: DateTime<Utc>,
}

impl MuteRule {
    pub fn new(kind: MuteRuleKind, value: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            value: value.into(),
            date_added: Utc::now(),
        }
    }
}
