//! Publication identifiers

use serde::{Deserialize, Serialize};

/// Collection of publication identifiers.
///
/// These are the five namespaces the import pipeline deduplicates on.
/// Values are stored as received from the source; normalization happens
/// at comparison time, not here.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Identifiers {
    pub doi: Option<String>,
    pub arxiv_id: Option<String>,
    pub bibcode: Option<String>,
    pub pmid: Option<String>,
    pub openalex_id: Option<String>,
}

impl Identifiers {
    /// Check if all identifiers are empty
    pub fn is_empty(&self) -> bool {
        self.doi.is_none()
            && self.arxiv_id.is_none()
            && self.bibcode.is_none()
            && self.pmid.is_none()
            && self.openalex_id.is_none()
    }

    /// Returns the best identifier for display/logging (priority order)
    pub fn primary(&self) -> Option<(&'static str, &str)> {
        if let Some(ref doi) = self.doi {
            return Some(("doi", doi));
        }
        if let Some(ref arxiv) = self.arxiv_id {
            return Some(("arxiv", arxiv));
        }
        if let Some(ref bibcode) = self.bibcode {
            return Some(("bibcode", bibcode));
        }
        if let Some(ref pmid) = self.pmid {
            return Some(("pmid", pmid));
        }
        if let Some(ref openalex) = self.openalex_id {
            return Some(("openalex", openalex));
        }
        None
    }
}
