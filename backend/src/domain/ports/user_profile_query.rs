//! Driving ports for member registration and profile access.

use async_trait::async_trait;

use crate::domain::{Error, ProfileUpdate, RegistrationDraft, User, UserId};

/// Domain use-case port for account mutations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserAccountCommand: Send + Sync {
    /// Create a new account; a taken e-mail yields `Conflict`.
    async fn register(&self, draft: RegistrationDraft) -> Result<User, Error>;

    /// Edit the caller's display name and/or location.
    async fn update_profile(&self, user_id: &UserId, update: ProfileUpdate)
    -> Result<User, Error>;
}

/// Domain use-case port for reading profiles.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserProfileQuery: Send + Sync {
    /// Return the profile for `user_id`.
    async fn fetch_profile(&self, user_id: &UserId) -> Result<User, Error>;
}
