//! Publication domain model

use super::{CandidateResult, Identifiers};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

/// A persisted publication.
///
/// Library membership is an explicit set of library ids; a publication may
/// belong to the Inbox and any number of user libraries at once. A
/// publication with no memberships left is eligible for deletion.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Publication {
    pub id: Uuid,
    pub title: String,
    pub authors: Vec<String>,
    pub year: Option<i32>,
    pub venue: Option<String>,
    pub abstract_text: Option<String>,
    pub identifiers: Identifiers,
    pub library_ids: BTreeSet<Uuid>,
    pub is_read: bool,
    pub date_added: DateTime<Utc>,
    /// Identifier of the source that produced the original candidate
    pub source_id: Option<String>,
}

impl Publication {
    /// Create a publication from an accepted candidate result.
    ///
    /// Starts with no library memberships and unread state; the inbox
    /// manager adds memberships afterwards.
    pub fn from_candidate(candidate: &CandidateResult) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: candidate.title.clone(),
            authors: candidate.authors.clone(),
            year: candidate.year,
            venue: candidate.venue.clone(),
            abstract_text: candidate.abstract_text.clone(),
            identifiers: candidate.identifiers.clone(),
            library_ids: BTreeSet::new(),
            is_read: false,
            date_added: Utc::now(),
            source_id: Some(candidate.source_id.clone()),
        }
    }

    /// Whether this publication belongs to the given library
    pub fn is_in_library(&self, library_id: Uuid) -> bool {
        self.library_ids.contains(&library_id)
    }

    /// Add a library membership. Returns `true` if it was newly added.
    pub fn add_to_library(&mut self, library_id: Uuid) -> bool {
        self.library_ids.insert(library_id)
    }

    /// Remove a library membership. Returns `true` if it was present.
    pub fn remove_from_library(&mut self, library_id: Uuid) -> bool {
        self.library_ids.remove(&library_id)
    }
}
