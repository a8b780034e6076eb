//! In-process marketplace store.
//!
//! Implements the user, item and swap repository ports over one shared
//! mutex-guarded state. Each port call takes the lock once, so the swap
//! proposal path (owner re-check, conflict scan, insert) runs as a single
//! critical section. Used when no database URL is configured and by tests.

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::ports::{
    ItemRepository, ItemRepositoryError, SwapRepository, SwapRepositoryError,
    UserPersistenceError, UserRepository,
};
use crate::domain::{
    EmailAddress, Item, ItemId, Swap, SwapId, User, UserAccount, UserId, find_conflict,
};

#[derive(Debug, Default)]
struct State {
    accounts: Vec<UserAccount>,
    items: Vec<Item>,
    swaps: Vec<Swap>,
}

impl State {
    fn item(&self, id: &ItemId) -> Option<&Item> {
        self.items.iter().find(|item| item.id() == id)
    }

    fn swap(&self, id: &SwapId) -> Option<&Swap> {
        self.swaps.iter().find(|swap| swap.id() == id)
    }

    fn pending_swap_mut(&mut self, id: &SwapId) -> Option<&mut Swap> {
        self.swaps
            .iter_mut()
            .find(|swap| swap.id() == id && swap.is_pending())
    }
}

/// Newest first; later insertions win ties.
fn newest_first<T: Clone>(records: &[T], created_at: impl Fn(&T) -> DateTime<Utc>) -> Vec<T> {
    let mut out: Vec<T> = records.iter().rev().cloned().collect();
    out.sort_by_key(|record| std::cmp::Reverse(created_at(record)));
    out
}

/// Shared in-memory store. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
}

const POISONED: &str = "memory store lock poisoned";

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock<E>(
        &self,
        poisoned: impl FnOnce(&'static str) -> E,
    ) -> Result<MutexGuard<'_, State>, E> {
        self.state.lock().map_err(|_| poisoned(POISONED))
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn insert(&self, account: &UserAccount) -> Result<(), UserPersistenceError> {
        let mut state = self.lock(UserPersistenceError::query)?;
        let email = account.user.email();
        if state
            .accounts
            .iter()
            .any(|existing| existing.user.email() == email)
        {
            return Err(UserPersistenceError::duplicate_email());
        }
        state.accounts.push(account.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let state = self.lock(UserPersistenceError::query)?;
        Ok(state
            .accounts
            .iter()
            .find(|account| account.user.id() == id)
            .map(|account| account.user.clone()))
    }

    async fn find_account_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<UserAccount>, UserPersistenceError> {
        let state = self.lock(UserPersistenceError::query)?;
        Ok(state
            .accounts
            .iter()
            .find(|account| account.user.email() == email)
            .cloned())
    }

    async fn update_profile(&self, user: &User) -> Result<bool, UserPersistenceError> {
        let mut state = self.lock(UserPersistenceError::query)?;
        let Some(account) = state
            .accounts
            .iter_mut()
            .find(|account| account.user.id() == user.id())
        else {
            return Ok(false);
        };
        account.user = user.clone();
        Ok(true)
    }
}

#[async_trait]
impl ItemRepository for MemoryStore {
    async fn insert(&self, item: &Item) -> Result<(), ItemRepositoryError> {
        let mut state = self.lock(ItemRepositoryError::query)?;
        state.items.push(item.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &ItemId) -> Result<Option<Item>, ItemRepositoryError> {
        let state = self.lock(ItemRepositoryError::query)?;
        Ok(state.item(id).cloned())
    }

    async fn list_all(&self) -> Result<Vec<Item>, ItemRepositoryError> {
        let state = self.lock(ItemRepositoryError::query)?;
        Ok(newest_first(&state.items, Item::created_at))
    }

    async fn list_for_owner(&self, owner: &UserId) -> Result<Vec<Item>, ItemRepositoryError> {
        let state = self.lock(ItemRepositoryError::query)?;
        let owned: Vec<Item> = state
            .items
            .iter()
            .filter(|item| item.is_owned_by(owner))
            .cloned()
            .collect();
        Ok(newest_first(&owned, Item::created_at))
    }

    async fn update_details(&self, item: &Item) -> Result<bool, ItemRepositoryError> {
        let mut state = self.lock(ItemRepositoryError::query)?;
        let Some(stored) = state
            .items
            .iter_mut()
            .find(|stored| stored.id() == item.id() && stored.is_owned_by(item.owner_id()))
        else {
            return Ok(false);
        };
        *stored = stored.clone().with_details_of(item);
        Ok(true)
    }

    async fn delete(&self, id: &ItemId, owner: &UserId) -> Result<bool, ItemRepositoryError> {
        let mut state = self.lock(ItemRepositoryError::query)?;
        if !state
            .item(id)
            .is_some_and(|item| item.is_owned_by(owner))
        {
            return Ok(false);
        }
        if state
            .swaps
            .iter()
            .any(|swap| swap.is_pending() && swap.involves_item(id))
        {
            return Err(ItemRepositoryError::in_pending_swap());
        }
        state.swaps.retain(|swap| !swap.involves_item(id));
        state.items.retain(|item| item.id() != id);
        Ok(true)
    }
}

#[async_trait]
impl SwapRepository for MemoryStore {
    async fn create_pending(&self, swap: &Swap) -> Result<(), SwapRepositoryError> {
        let mut state = self.lock(SwapRepositoryError::query)?;
        for (item_id, expected_owner) in [
            (swap.item1(), swap.item1_user()),
            (swap.item2(), swap.item2_user()),
        ] {
            let item = state
                .item(item_id)
                .ok_or_else(SwapRepositoryError::item_missing)?;
            if !item.is_owned_by(expected_owner) {
                return Err(SwapRepositoryError::owner_changed());
            }
        }
        if find_conflict(&state.swaps, swap.item1(), swap.item2()).is_some() {
            return Err(SwapRepositoryError::conflict());
        }
        state.swaps.push(swap.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &SwapId) -> Result<Option<Swap>, SwapRepositoryError> {
        let state = self.lock(SwapRepositoryError::query)?;
        Ok(state.swap(id).cloned())
    }

    async fn list_pending(&self) -> Result<Vec<Swap>, SwapRepositoryError> {
        let state = self.lock(SwapRepositoryError::query)?;
        Ok(state
            .swaps
            .iter()
            .filter(|swap| swap.is_pending())
            .cloned()
            .collect())
    }

    async fn list_for_user(&self, user: &UserId) -> Result<Vec<Swap>, SwapRepositoryError> {
        let state = self.lock(SwapRepositoryError::query)?;
        let mine: Vec<Swap> = state
            .swaps
            .iter()
            .filter(|swap| swap.involves_user(user))
            .cloned()
            .collect();
        Ok(newest_first(&mine, Swap::created_at))
    }

    async fn close(&self, swap: &Swap, transferred: &[Item]) -> Result<(), SwapRepositoryError> {
        let mut state = self.lock(SwapRepositoryError::query)?;
        if state.pending_swap_mut(swap.id()).is_none() {
            return Err(SwapRepositoryError::not_pending());
        }
        if transferred
            .iter()
            .any(|item| state.item(item.id()).is_none())
        {
            return Err(SwapRepositoryError::item_missing());
        }

        if let Some(stored) = state.pending_swap_mut(swap.id()) {
            *stored = swap.clone();
        }
        for moved in transferred {
            if let Some(stored) = state.items.iter_mut().find(|item| item.id() == moved.id()) {
                *stored = stored.clone().with_owner_of(moved);
            }
        }
        Ok(())
    }

    async fn withdraw(&self, id: &SwapId) -> Result<(), SwapRepositoryError> {
        let mut state = self.lock(SwapRepositoryError::query)?;
        if state.pending_swap_mut(id).is_none() {
            return Err(SwapRepositoryError::not_pending());
        }
        state
            .swaps
            .retain(|stored| stored.id() != id || !stored.is_pending());
        Ok(())
    }
}
