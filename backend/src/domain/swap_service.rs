//! Swap negotiation services.
//!
//! The service validates proposals and lifecycle transitions against the
//! access rules, then hands the write to the swap repository, which owns the
//! atomic conflict check. A pre-scan of pending swaps rejects the common
//! conflicting case early; the repository re-checks inside its unit of work
//! so concurrent proposals cannot both succeed.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{debug, error, info};

use crate::domain::access::{ensure_can_propose, ensure_can_resolve, ensure_can_withdraw};
use crate::domain::item_service::map_item_repository_error;
use crate::domain::ports::{
    ItemRepository, ProposeSwapRequest, SwapCommand, SwapQuery, SwapRepository,
    SwapRepositoryError, UserRepository,
};
use crate::domain::user_account_service::map_user_repository_error;
use crate::domain::{
    Error, Item, ItemId, Swap, SwapDecision, SwapId, UserId, find_conflict,
};

const CONFLICT_MESSAGE: &str = "item already tied up in a pending swap";
const ALREADY_CLOSED: &str = "swap already closed";
const CANNOT_CANCEL: &str = "cannot cancel a completed swap";

fn map_swap_repository_error(error: SwapRepositoryError) -> Error {
    match error {
        SwapRepositoryError::Conflict => Error::conflict(CONFLICT_MESSAGE),
        SwapRepositoryError::ItemMissing => {
            Error::not_found("swap references an item that no longer exists")
        }
        SwapRepositoryError::OwnerChanged => {
            Error::conflict("item ownership changed while the swap was proposed")
        }
        SwapRepositoryError::NotPending => Error::invalid_state(ALREADY_CLOSED),
        SwapRepositoryError::Connection { message } => {
            error!(%message, "swap repository unavailable");
            Error::internal(format!("swap repository unavailable: {message}"))
        }
        SwapRepositoryError::Query { message } => {
            error!(%message, "swap repository query failed");
            Error::internal(format!("swap repository error: {message}"))
        }
    }
}

/// Swap service over the swap, item and user repositories.
#[derive(Clone)]
pub struct SwapService<S, I, U> {
    swaps: Arc<S>,
    items: Arc<I>,
    users: Arc<U>,
    clock: Arc<dyn Clock>,
}

impl<S, I, U> SwapService<S, I, U> {
    /// Create a new swap service.
    pub fn new(swaps: Arc<S>, items: Arc<I>, users: Arc<U>, clock: Arc<dyn Clock>) -> Self {
        Self {
            swaps,
            items,
            users,
            clock,
        }
    }
}

impl<S, I, U> SwapService<S, I, U>
where
    S: SwapRepository,
    I: ItemRepository,
    U: UserRepository,
{
    async fn load_swap(&self, id: &SwapId) -> Result<Swap, Error> {
        self.swaps
            .find_by_id(id)
            .await
            .map_err(map_swap_repository_error)?
            .ok_or_else(|| Error::not_found(format!("swap {id} not found")))
    }

    async fn load_item(&self, id: &ItemId) -> Result<Item, Error> {
        self.items
            .find_by_id(id)
            .await
            .map_err(map_item_repository_error)?
            .ok_or_else(|| Error::not_found(format!("item {id} not found")))
    }

    /// Items with their new owners once `approved` takes effect.
    async fn transfers_for(&self, approved: &Swap) -> Result<Vec<Item>, Error> {
        let mut transferred = Vec::with_capacity(2);
        for (item_id, new_owner_id) in [
            (approved.item1(), approved.item1_user()),
            (approved.item2(), approved.item2_user()),
        ] {
            let item = self.load_item(item_id).await?;
            let new_owner = self
                .users
                .find_by_id(new_owner_id)
                .await
                .map_err(map_user_repository_error)?
                .ok_or_else(|| Error::not_found(format!("user {new_owner_id} not found")))?;
            transferred.push(item.transferred_to(&new_owner));
        }
        Ok(transferred)
    }
}

#[async_trait]
impl<S, I, U> SwapCommand for SwapService<S, I, U>
where
    S: SwapRepository,
    I: ItemRepository,
    U: UserRepository,
{
    async fn propose(&self, request: ProposeSwapRequest) -> Result<Swap, Error> {
        let ProposeSwapRequest {
            proposer,
            item1,
            item2,
        } = request;
        if item1 == item2 {
            return Err(Error::invalid_request("cannot swap an item for itself"));
        }

        let wanted = self.load_item(&item1).await?;
        let offered = self.load_item(&item2).await?;
        ensure_can_propose(&proposer, &wanted, &offered)?;

        let pending = self
            .swaps
            .list_pending()
            .await
            .map_err(map_swap_repository_error)?;
        if let Some(existing) = find_conflict(&pending, &item1, &item2) {
            debug!(
                existing_swap_id = %existing.id(),
                item1 = %item1,
                item2 = %item2,
                proposer = %proposer,
                "swap proposal rejected: conflicting pending swap"
            );
            return Err(Error::conflict(CONFLICT_MESSAGE));
        }

        let swap = Swap::propose(SwapId::random(), &wanted, &offered, self.clock.utc());
        self.swaps.create_pending(&swap).await.map_err(|err| {
            debug!(item1 = %item1, item2 = %item2, error = %err, "swap proposal rejected");
            map_swap_repository_error(err)
        })?;

        info!(
            swap_id = %swap.id(),
            item1 = %item1,
            item2 = %item2,
            proposer = %proposer,
            "swap proposed"
        );
        Ok(swap)
    }

    async fn resolve(
        &self,
        caller: &UserId,
        id: &SwapId,
        decision: SwapDecision,
    ) -> Result<Swap, Error> {
        let swap = self.load_swap(id).await?;
        if !swap.is_pending() {
            return Err(Error::invalid_state(ALREADY_CLOSED));
        }
        ensure_can_resolve(&swap, caller)?;

        let resolved = swap
            .resolve(decision)
            .map_err(|_| Error::invalid_state(ALREADY_CLOSED))?;
        let transferred = match decision {
            SwapDecision::Approved => self.transfers_for(&resolved).await?,
            SwapDecision::Rejected => Vec::new(),
        };

        self.swaps
            .close(&resolved, &transferred)
            .await
            .map_err(map_swap_repository_error)?;

        info!(
            swap_id = %resolved.id(),
            item1 = %resolved.item1(),
            item2 = %resolved.item2(),
            caller = %caller,
            status = %resolved.status(),
            "swap resolved"
        );
        Ok(resolved)
    }

    async fn withdraw(&self, caller: &UserId, id: &SwapId) -> Result<(), Error> {
        let swap = self.load_swap(id).await?;
        if !swap.is_pending() {
            return Err(Error::invalid_state(CANNOT_CANCEL));
        }
        ensure_can_withdraw(&swap, caller)?;

        self.swaps.withdraw(id).await.map_err(|err| match err {
            SwapRepositoryError::NotPending => Error::invalid_state(CANNOT_CANCEL),
            other => map_swap_repository_error(other),
        })?;

        info!(
            swap_id = %id,
            item1 = %swap.item1(),
            item2 = %swap.item2(),
            caller = %caller,
            "swap withdrawn"
        );
        Ok(())
    }
}

#[async_trait]
impl<S, I, U> SwapQuery for SwapService<S, I, U>
where
    S: SwapRepository,
    I: Send + Sync,
    U: Send + Sync,
{
    async fn list_for_user(&self, user: &UserId) -> Result<Vec<Swap>, Error> {
        self.swaps
            .list_for_user(user)
            .await
            .map_err(map_swap_repository_error)
    }
}

#[cfg(test)]
#[path = "swap_service_tests.rs"]
mod tests;
