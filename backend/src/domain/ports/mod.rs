//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driving ports (`*Command`, `*Query`, [`LoginService`]) are called by
//! inbound adapters. Driven ports (`*Repository`, [`PasswordHasher`]) are
//! implemented by outbound adapters and return typed errors generated by
//! `define_port_error!`.

mod macros;
pub(crate) use macros::define_port_error;

mod item_command;
mod item_repository;
mod login_service;
mod password_hasher;
mod swap_command;
mod swap_repository;
mod user_profile_query;
mod user_repository;

#[cfg(test)]
pub use item_command::{MockItemCommand, MockItemQuery};
pub use item_command::{ItemCommand, ItemQuery};
#[cfg(test)]
pub use item_repository::MockItemRepository;
pub use item_repository::{ItemRepository, ItemRepositoryError};
#[cfg(test)]
pub use login_service::MockLoginService;
pub use login_service::LoginService;
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{PasswordHashError, PasswordHasher};
#[cfg(test)]
pub use swap_command::{MockSwapCommand, MockSwapQuery};
pub use swap_command::{ProposeSwapRequest, SwapCommand, SwapQuery};
#[cfg(test)]
pub use swap_repository::MockSwapRepository;
pub use swap_repository::{SwapRepository, SwapRepositoryError};
#[cfg(test)]
pub use user_profile_query::{MockUserAccountCommand, MockUserProfileQuery};
pub use user_profile_query::{UserAccountCommand, UserProfileQuery};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserPersistenceError, UserRepository};
