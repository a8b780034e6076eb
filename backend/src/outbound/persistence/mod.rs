//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Concrete implementations of the user, item and swap repository ports,
//! backed by PostgreSQL through `diesel-async` and a `bb8` pool.
//!
//! - Repositories only translate between row structs and domain values;
//!   marketplace rules stay in the domain services.
//! - Row structs (`models.rs`) and table definitions (`schema.rs`) are
//!   private to this module.
//! - Swap proposals, closures and withdrawals each run in one transaction.
//!
//! ```ignore
//! use barter::outbound::persistence::{DbPool, DieselSwapRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/barter")).await?;
//! let swaps = DieselSwapRepository::new(pool);
//! ```

mod diesel_basic_error_mapping;
mod diesel_item_repository;
mod diesel_swap_repository;
mod diesel_user_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_item_repository::DieselItemRepository;
pub use diesel_swap_repository::DieselSwapRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MIGRATIONS, MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
