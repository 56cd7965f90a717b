//! Todo data model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single to-do item.
///
/// `id` is assigned by the store and immutable afterwards; `completed` is the
/// only field that ever changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TodoItem {
    /// Unique, monotonically assigned ID.
    pub id: i64,
    /// The task label. Never empty.
    pub text: String,
    /// Whether the task is done.
    pub completed: bool,
    /// When the todo was created.
    pub created_at: DateTime<Utc>,
}

impl TodoItem {
    /// Create an item with the given id and text, not yet completed.
    pub fn new(id: i64, text: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            text: text.into(),
            completed: false,
            created_at,
        }
    }
}
