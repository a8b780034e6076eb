//! Builders wiring the driven adapters into HTTP state.

use std::sync::Arc;

use actix_web::web;
use mockable::DefaultClock;
use tracing::{info, warn};

use barter::inbound::http::state::{HttpState, Repositories};
use barter::outbound::memory::MemoryStore;
use barter::outbound::persistence::{
    DbPool, DieselItemRepository, DieselSwapRepository, DieselUserRepository,
};
use barter::outbound::security::Sha256PasswordHasher;

use super::ServerConfig;

/// Build the HTTP state over PostgreSQL when a pool is configured, otherwise
/// over a process-local in-memory store.
pub(crate) fn build_http_state(config: &ServerConfig) -> web::Data<HttpState> {
    let state = match &config.db_pool {
        Some(pool) => {
            info!("using PostgreSQL repositories");
            diesel_state(pool)
        }
        None => {
            warn!("no database configured; data lives in memory and is lost on restart");
            memory_state()
        }
    };
    web::Data::new(state)
}

fn diesel_state(pool: &DbPool) -> HttpState {
    HttpState::from_repositories(Repositories {
        users: Arc::new(DieselUserRepository::new(pool.clone())),
        items: Arc::new(DieselItemRepository::new(pool.clone())),
        swaps: Arc::new(DieselSwapRepository::new(pool.clone())),
        hasher: Arc::new(Sha256PasswordHasher),
        clock: Arc::new(DefaultClock),
    })
}

fn memory_state() -> HttpState {
    let store = Arc::new(MemoryStore::new());
    HttpState::from_repositories(Repositories {
        users: store.clone(),
        items: store.clone(),
        swaps: store,
        hasher: Arc::new(Sha256PasswordHasher),
        clock: Arc::new(DefaultClock),
    })
}
