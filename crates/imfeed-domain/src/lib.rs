//! Domain models for the imfeed triage inbox.
//!
//! Pure data types shared by the import pipeline and its embedders:
//! feeds, candidate search results, publications, libraries, identifiers,
//! and mute rules. No I/O and no business logic beyond constructors and
//! membership helpers.

pub mod candidate;
pub mod feed;
pub mod identifiers;
pub mod library;
pub mod mute;
pub mod publication;

pub use candidate::CandidateResult;
pub use feed::Feed;
pub use identifiers::Identifiers;
pub use library::{Library, INBOX_SORT_ORDER};
pub use mute::{MuteRule, MuteRuleKind};
pub use publication::Publication;
