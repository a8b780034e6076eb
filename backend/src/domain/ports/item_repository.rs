//! Port for item persistence.

use async_trait::async_trait;

use crate::domain::{Item, ItemId, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by item repository adapters.
    pub enum ItemRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "item repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "item repository query failed: {message}",
        /// The item participates in a pending swap and cannot be removed.
        InPendingSwap => "item is tied up in a pending swap",
    }
}

/// Driven port for listed items.
///
/// Writes are guarded by the expected owner so that an edit racing a swap
/// approval cannot touch an item that has just changed hands.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ItemRepository: Send + Sync {
    /// Persist a newly listed item.
    async fn insert(&self, item: &Item) -> Result<(), ItemRepositoryError>;

    /// Find an item by id.
    async fn find_by_id(&self, id: &ItemId) -> Result<Option<Item>, ItemRepositoryError>;

    /// All items, newest first.
    async fn list_all(&self) -> Result<Vec<Item>, ItemRepositoryError>;

    /// Items currently owned by `owner`, newest first.
    async fn list_for_owner(&self, owner: &UserId) -> Result<Vec<Item>, ItemRepositoryError>;

    /// Overwrite name, description and category while `item.owner_id()`
    /// still owns the stored record.
    ///
    /// Returns `false` when no matching record exists.
    async fn update_details(&self, item: &Item) -> Result<bool, ItemRepositoryError>;

    /// Delete the item while `owner` still owns it, together with any
    /// resolved swaps that reference it.
    ///
    /// Fails with `InPendingSwap` when the item is part of a pending swap and
    /// returns `false` when no matching record exists.
    async fn delete(&self, id: &ItemId, owner: &UserId) -> Result<bool, ItemRepositoryError>;
}
