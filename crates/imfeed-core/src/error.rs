//! Error types for imfeed-core

use thiserror::Error;
use uuid::Uuid;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, CoreError>;

/// Main error type for pipeline operations
#[derive(Error, Debug)]
pub enum CoreError {
    /// Persistence-related errors
    #[error("Store error: {0}")]
    Store(#[from] crate::store::StoreError),

    /// Search-source errors
    #[error("Source error: {0}")]
    Source(#[from] crate::fetch::SourceError),

    /// Feed not found
    #[error("Feed not found: {0}")]
    FeedNotFound(Uuid),

    /// Library not found
    #[error("Library not found: {0}")]
    LibraryNotFound(Uuid),

    /// Publication not found
    #[error("Publication not found: {0}")]
    PublicationNotFound(Uuid),
}
