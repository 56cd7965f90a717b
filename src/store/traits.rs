//! The `TodoStore` trait — async interface for todo persistence.

use async_trait::async_trait;

use crate::error::StoreError;
use crate::todos::TodoItem;

/// Backend-agnostic store for todo items.
///
/// Implementations scope every operation to a single deployment; callers
/// never see rows belonging to another deployed copy of the app.
#[async_trait]
pub trait TodoStore: Send + Sync {
    /// All items for this deployment, newest first.
    ///
    /// Ordering is by `id` descending. Ids are assigned monotonically, so
    /// this is insertion order reversed.
    async fn list_todos(&self) -> Result<Vec<TodoItem>, StoreError>;

    /// Get a single item by id.
    async fn get_todo(&self, id: i64) -> Result<Option<TodoItem>, StoreError>;

    /// Insert a new item with `completed = false`.
    ///
    /// Fails with [`StoreError::EmptyText`] when `text` is empty after
    /// trimming; nothing is persisted in that case.
    async fn create_todo(&self, text: &str) -> Result<TodoItem, StoreError>;

    /// Update exactly one item's `completed` field, returning the updated
    /// item. Fails with [`StoreError::NotFound`] when no row matches.
    async fn set_completion(&self, id: i64, completed: bool) -> Result<TodoItem, StoreError>;

    /// Remove an item. Deleting an absent id is a no-op success; the return
    /// value reports whether a row was actually removed.
    async fn delete_todo(&self, id: i64) -> Result<bool, StoreError>;
}
