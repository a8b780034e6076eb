//! Port for the swap ledger.
//!
//! Adapters own the atomicity of the proposal path: the conflict scan and
//! the insert must behave as a single step even under concurrent callers.

use async_trait::async_trait;

use crate::domain::{Item, Swap, SwapId, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by swap repository adapters.
    pub enum SwapRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "swap repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "swap repository query failed: {message}",
        /// One of the items already participates in a pending swap.
        Conflict => "item already tied up in a pending swap",
        /// One of the items no longer exists.
        ItemMissing => "swap references an item that no longer exists",
        /// An item changed hands after the proposal was validated.
        OwnerChanged => "item ownership changed while the swap was proposed",
        /// The swap left the pending state, or vanished, before the write.
        NotPending => "swap is no longer pending",
    }
}

/// Driven port for swap records.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SwapRepository: Send + Sync {
    /// Atomically insert a pending swap.
    ///
    /// Adapters must re-check that both items exist and are still owned by
    /// `item1_user`/`item2_user`, and that neither item is in another
    /// pending swap, in the same unit of work as the insert.
    async fn create_pending(&self, swap: &Swap) -> Result<(), SwapRepositoryError>;

    /// Find a swap by id.
    async fn find_by_id(&self, id: &SwapId) -> Result<Option<Swap>, SwapRepositoryError>;

    /// Every pending swap.
    async fn list_pending(&self) -> Result<Vec<Swap>, SwapRepositoryError>;

    /// Swaps in any status where `user` is a party, newest first.
    async fn list_for_user(&self, user: &UserId) -> Result<Vec<Swap>, SwapRepositoryError>;

    /// Store the closed `swap` if the stored record is still pending.
    ///
    /// `transferred` carries the items whose owner changed on approval;
    /// adapters write their owner and owner snapshot in the same unit of
    /// work. Fails with `NotPending` when another caller closed or withdrew
    /// the swap first.
    async fn close(&self, swap: &Swap, transferred: &[Item]) -> Result<(), SwapRepositoryError>;

    /// Delete the swap if it is still pending; fails with `NotPending`
    /// otherwise.
    async fn withdraw(&self, id: &SwapId) -> Result<(), SwapRepositoryError>;
}
