//! Library representation

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Sort order reserved for the Inbox library.
pub const INBOX_SORT_ORDER: i32 = -1;

/// A library (named collection of publications).
///
/// Exactly one library per store has `is_inbox = true`; it holds unread
/// candidate papers pending a keep/dismiss decision.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Library {
    pub id: Uuid,
    pub name: String,
    pub is_inbox: bool,
    pub sort_order: i32,
}

impl Library {
    /// Create a new ordinary library
    pub fn new(name: impl Into<String>, sort_order: i32) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            is_inbox: false,
            sort_order,
        }
    }

    /// Create the Inbox library
    pub fn inbox() -> Self {
        Self {
            id: Uuid::new_v4(),
            name: "Inbox".to_string(),
            is_inbox: true,
            sort_order: INBOX_SORT_ORDER,
        }
    }
}
