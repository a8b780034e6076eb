//! Shared HTTP adapter state.
//!
//! Handlers receive this through `web::Data` and only see driving ports, so
//! they can be exercised against in-memory adapters or mocks.

use std::sync::Arc;

use mockable::Clock;

use crate::domain::ports::{
    ItemCommand, ItemQuery, ItemRepository, LoginService, PasswordHasher, SwapCommand, SwapQuery,
    SwapRepository, UserAccountCommand, UserProfileQuery, UserRepository,
};
use crate::domain::{ItemService, SwapService, UserAccountService};

/// Driving ports used by the HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Credential checks.
    pub login: Arc<dyn LoginService>,
    /// Registration and profile edits.
    pub accounts: Arc<dyn UserAccountCommand>,
    /// Profile lookups.
    pub profiles: Arc<dyn UserProfileQuery>,
    /// Listing, editing and deleting items.
    pub items: Arc<dyn ItemCommand>,
    /// Item lookups.
    pub items_query: Arc<dyn ItemQuery>,
    /// Swap transitions.
    pub swaps: Arc<dyn SwapCommand>,
    /// Swap listings.
    pub swaps_query: Arc<dyn SwapQuery>,
}

/// Driven adapters the marketplace services are built from.
pub struct Repositories<U, I, S> {
    /// Member accounts.
    pub users: Arc<U>,
    /// Listed items.
    pub items: Arc<I>,
    /// Swap ledger.
    pub swaps: Arc<S>,
    /// Password hashing.
    pub hasher: Arc<dyn PasswordHasher>,
    /// Timestamp source.
    pub clock: Arc<dyn Clock>,
}

impl HttpState {
    /// Wire the domain services over the given repositories.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use barter::inbound::http::state::{HttpState, Repositories};
    /// use barter::outbound::memory::MemoryStore;
    /// use barter::outbound::security::Sha256PasswordHasher;
    /// use mockable::DefaultClock;
    ///
    /// let store = Arc::new(MemoryStore::new());
    /// let state = HttpState::from_repositories(Repositories {
    ///     users: store.clone(),
    ///     items: store.clone(),
    ///     swaps: store,
    ///     hasher: Arc::new(Sha256PasswordHasher),
    ///     clock: Arc::new(DefaultClock),
    /// });
    /// let _swaps = state.swaps.clone();
    /// ```
    pub fn from_repositories<U, I, S>(repositories: Repositories<U, I, S>) -> Self
    where
        U: UserRepository + 'static,
        I: ItemRepository + 'static,
        S: SwapRepository + 'static,
    {
        let Repositories {
            users,
            items,
            swaps,
            hasher,
            clock,
        } = repositories;

        let accounts = Arc::new(UserAccountService::new(
            users.clone(),
            hasher,
            clock.clone(),
        ));
        let catalogue = Arc::new(ItemService::new(items.clone(), users.clone(), clock.clone()));
        let ledger = Arc::new(SwapService::new(swaps, items, users, clock));

        Self {
            login: accounts.clone(),
            accounts: accounts.clone(),
            profiles: accounts,
            items: catalogue.clone(),
            items_query: catalogue,
            swaps: ledger.clone(),
            swaps_query: ledger,
        }
    }
}
