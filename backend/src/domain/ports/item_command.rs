//! Driving ports for listing and browsing items.

use async_trait::async_trait;

use crate::domain::{Error, Item, ItemId, ItemUpdate, NewItem, UserId};

/// Owner-side item mutations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ItemCommand: Send + Sync {
    /// List a new item owned by `owner`.
    async fn create_item(&self, owner: &UserId, new_item: NewItem) -> Result<Item, Error>;

    /// Apply a whitelisted edit; only the owner may edit.
    async fn update_item(
        &self,
        caller: &UserId,
        id: &ItemId,
        update: ItemUpdate,
    ) -> Result<Item, Error>;

    /// Remove an item; only the owner may delete and never while it is in a
    /// pending swap.
    async fn delete_item(&self, caller: &UserId, id: &ItemId) -> Result<(), Error>;
}

/// Read-only item queries.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ItemQuery: Send + Sync {
    async fn get_item(&self, id: &ItemId) -> Result<Item, Error>;

    /// All items, newest first.
    async fn list_items(&self) -> Result<Vec<Item>, Error>;

    /// Items owned by `owner`, newest first.
    async fn list_items_for_owner(&self, owner: &UserId) -> Result<Vec<Item>, Error>;
}
