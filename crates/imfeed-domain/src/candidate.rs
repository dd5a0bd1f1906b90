//! Candidate record from an online search source

use super::Identifiers;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A candidate record returned by a search source.
///
/// Ephemeral: produced by a source query, consumed once by the import
/// pipeline, never persisted as-is.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CandidateResult {
    pub id: Uuid,
    /// Identifier of the source that produced this record (e.g. "arxiv", "ads")
    pub source_id: String,
    pub title: String,
    /// Ordered author display strings, as given by the source
    pub authors: Vec<String>,
    pub year: Option<i32>,
    pub venue: Option<String>,
    pub abstract_text: Option<String>,
    pub identifiers: Identifiers,
}

impl CandidateResult {
    /// Create a candidate with the required fields; the rest default to empty.
    pub fn new(source_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            source_id: source_id.into(),
            title: title.into(),
            authors: Vec::new(),
            year: None,
            venue: None,
            abstract_text: None,
            identifiers: Identifiers::default(),
        }
    }

    pub fn with_authors(mut self, authors: Vec<String>) -> Self {
        self.authors = authors;
        self
    }

    pub fn with_identifiers(mut self, identifiers: Identifiers) -> Self {
        self.identifiers = identifiers;
        self
    }

    pub fn with_venue(mut self, venue: impl Into<String>) -> Self {
        self.venue = Some(venue.into());
        self
    }
}
