//! Test utilities for the backend crate.
//!
//! Shared by unit tests in `src/` and integration tests in `tests/`; only
//! compiled for tests or with the `test-support` feature.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Local, TimeDelta, TimeZone, Utc};
use mockable::Clock;

use crate::inbound::http::state::{HttpState, Repositories};
use crate::outbound::memory::MemoryStore;
use crate::outbound::security::Sha256PasswordHasher;

/// Clock that advances one second every time it is read.
///
/// Keeps "newest first" orderings deterministic without sleeping.
pub struct SteppingClock(Mutex<DateTime<Utc>>);

impl SteppingClock {
    /// Start the clock at `start`.
    pub fn new(start: DateTime<Utc>) -> Self {
        Self(Mutex::new(start))
    }

    fn lock_clock(&self) -> MutexGuard<'_, DateTime<Utc>> {
        match self.0.lock() {
            Ok(guard) => guard,
            Err(_) => panic!("clock mutex"),
        }
    }
}

impl Default for SteppingClock {
    fn default() -> Self {
        match Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0) {
            chrono::LocalResult::Single(start) => Self::new(start),
            _ => panic!("valid fixture timestamp"),
        }
    }
}

impl Clock for SteppingClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        let mut now = self.lock_clock();
        let current = *now;
        *now += TimeDelta::seconds(1);
        current
    }
}

/// HTTP state backed by a fresh in-memory store.
///
/// # Examples
/// ```
/// let state = barter::test_support::memory_state();
/// let _login = state.login.clone();
/// ```
pub fn memory_state() -> HttpState {
    memory_state_with(Arc::new(MemoryStore::new()))
}

/// HTTP state over an existing in-memory store, for tests that inspect it.
pub fn memory_state_with(store: Arc<MemoryStore>) -> HttpState {
    HttpState::from_repositories(Repositories {
        users: store.clone(),
        items: store.clone(),
        swaps: store,
        hasher: Arc::new(Sha256PasswordHasher),
        clock: Arc::new(SteppingClock::default()),
    })
}
