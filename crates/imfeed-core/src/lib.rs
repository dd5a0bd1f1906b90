//! Feed scheduling, deduplication, and mute filtering for the imfeed
//! triage inbox.
//!
//! The pipeline, leaves first:
//!
//! - [`IdentifierCache`]: in-memory index over five identifier namespaces,
//!   deciding "have we already imported this paper?"
//! - [`InboxManager`]: the fixed Inbox library, mute rules, membership
//!   moves, and unread bookkeeping.
//! - [`FetchService`]: the per-batch filter, dedup, persist, and inbox
//!   pipeline over a [`SourceClient`] collaborator.
//! - [`InboxScheduler`]: due-feed checking, cycle mutual exclusion,
//!   power/network gating, and statistics.
//!
//! Components are constructed explicitly and wired by `Arc` handles; there
//! are no global singletons. Persistence is behind the [`Store`] trait,
//! with [`MemoryStore`] as the reference backend.

pub mod cache;
pub mod error;
pub mod fetch;
pub mod inbox;
pub mod normalize;
pub mod scheduler;
pub mod store;

pub use cache::IdentifierCache;
pub use error::{CoreError, Result};
pub use fetch::{FetchService, SourceClient, SourceError};
pub use inbox::InboxManager;
pub use scheduler::{
    AlwaysOn, InboxScheduler, NetworkReachabilityProvider, PowerStateProvider, SchedulerConfig,
    SchedulerStatistics,
};
pub use store::{MemoryStore, Store, StoreError};
