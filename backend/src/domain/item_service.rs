//! Item store services.
//!
//! Listing snapshots the owner's profile; edits and deletions are limited to
//! the current owner.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{error, info};

use crate::domain::access::ensure_item_owner;
use crate::domain::ports::{
    ItemCommand, ItemQuery, ItemRepository, ItemRepositoryError, UserRepository,
};
use crate::domain::user_account_service::map_user_repository_error;
use crate::domain::{Error, Item, ItemId, ItemUpdate, NewItem, UserId};

pub(crate) fn map_item_repository_error(error: ItemRepositoryError) -> Error {
    match error {
        ItemRepositoryError::InPendingSwap => {
            Error::conflict("item is tied up in a pending swap")
        }
        ItemRepositoryError::Connection { message } => {
            error!(%message, "item repository unavailable");
            Error::internal(format!("item repository unavailable: {message}"))
        }
        ItemRepositoryError::Query { message } => {
            error!(%message, "item repository query failed");
            Error::internal(format!("item repository error: {message}"))
        }
    }
}

fn item_not_found(id: &ItemId) -> Error {
    Error::not_found(format!("item {id} not found"))
}

/// Item service over item and user repositories.
#[derive(Clone)]
pub struct ItemService<I, U> {
    items: Arc<I>,
    users: Arc<U>,
    clock: Arc<dyn Clock>,
}

impl<I, U> ItemService<I, U> {
    /// Create a new item service.
    pub fn new(items: Arc<I>, users: Arc<U>, clock: Arc<dyn Clock>) -> Self {
        Self {
            items,
            users,
            clock,
        }
    }
}

impl<I, U> ItemService<I, U>
where
    I: ItemRepository,
{
    async fn load(&self, id: &ItemId) -> Result<Item, Error> {
        self.items
            .find_by_id(id)
            .await
            .map_err(map_item_repository_error)?
            .ok_or_else(|| item_not_found(id))
    }
}

#[async_trait]
impl<I, U> ItemCommand for ItemService<I, U>
where
    I: ItemRepository,
    U: UserRepository,
{
    async fn create_item(&self, owner: &UserId, new_item: NewItem) -> Result<Item, Error> {
        let owner = self
            .users
            .find_by_id(owner)
            .await
            .map_err(map_user_repository_error)?
            .ok_or_else(|| Error::not_found(format!("user {owner} not found")))?;

        let item = Item::listed_by(&owner, new_item, ItemId::random(), self.clock.utc());
        self.items
            .insert(&item)
            .await
            .map_err(map_item_repository_error)?;

        info!(item_id = %item.id(), owner_id = %owner.id(), "item listed");
        Ok(item)
    }

    async fn update_item(
        &self,
        caller: &UserId,
        id: &ItemId,
        update: ItemUpdate,
    ) -> Result<Item, Error> {
        if update.is_empty() {
            return Err(Error::invalid_request("nothing to update"));
        }
        let item = self.load(id).await?;
        ensure_item_owner(&item, caller)?;

        let updated = item.with_update(update);
        let written = self
            .items
            .update_details(&updated)
            .await
            .map_err(map_item_repository_error)?;
        if !written {
            // Changed hands or vanished after the ownership check.
            return Err(Error::forbidden("item does not belong to current user"));
        }
        Ok(updated)
    }

    async fn delete_item(&self, caller: &UserId, id: &ItemId) -> Result<(), Error> {
        let item = self.load(id).await?;
        ensure_item_owner(&item, caller)?;

        let deleted = self
            .items
            .delete(id, caller)
            .await
            .map_err(map_item_repository_error)?;
        if !deleted {
            return Err(Error::forbidden("item does not belong to current user"));
        }
        info!(item_id = %id, owner_id = %caller, "item removed");
        Ok(())
    }
}

#[async_trait]
impl<I, U> ItemQuery for ItemService<I, U>
where
    I: ItemRepository,
    U: Send + Sync,
{
    async fn get_item(&self, id: &ItemId) -> Result<Item, Error> {
        self.load(id).await
    }

    async fn list_items(&self) -> Result<Vec<Item>, Error> {
        self.items
            .list_all()
            .await
            .map_err(map_item_repository_error)
    }

    async fn list_items_for_owner(&self, owner: &UserId) -> Result<Vec<Item>, Error> {
        self.items
            .list_for_owner(owner)
            .await
            .map_err(map_item_repository_error)
    }
}

#[cfg(test)]
#[path = "item_service_tests.rs"]
mod tests;
