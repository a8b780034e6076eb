//! Driving ports for the swap negotiation workflow.

use async_trait::async_trait;

use crate::domain::{Error, ItemId, Swap, SwapDecision, SwapId, UserId};

/// Proposal request: offer `item2` (owned by `proposer`) for `item1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProposeSwapRequest {
    /// Member making the offer.
    pub proposer: UserId,
    /// Wanted item.
    pub item1: ItemId,
    /// Offered item.
    pub item2: ItemId,
}

/// Swap lifecycle mutations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SwapCommand: Send + Sync {
    /// Open a pending swap.
    async fn propose(&self, request: ProposeSwapRequest) -> Result<Swap, Error>;

    /// Approve or reject a pending swap as the owner of `item1`.
    async fn resolve(
        &self,
        caller: &UserId,
        id: &SwapId,
        decision: SwapDecision,
    ) -> Result<Swap, Error>;

    /// Withdraw a pending swap as the owner of `item2`.
    async fn withdraw(&self, caller: &UserId, id: &SwapId) -> Result<(), Error>;
}

/// Swap read model.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SwapQuery: Send + Sync {
    /// Swaps where `user` is a party, newest first.
    async fn list_for_user(&self, user: &UserId) -> Result<Vec<Swap>, Error>;
}
