//! Member registration, login and profile services.
//!
//! One service backs the [`LoginService`], [`UserAccountCommand`] and
//! [`UserProfileQuery`] driving ports because all three share the user
//! repository and password hasher.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{debug, error, info};

use crate::domain::ports::{
    LoginService, PasswordHasher, UserAccountCommand, UserPersistenceError, UserProfileQuery,
    UserRepository,
};
use crate::domain::{
    Error, LoginCredentials, ProfileUpdate, RegistrationDraft, User, UserAccount, UserId,
};

const INVALID_CREDENTIALS: &str = "invalid credentials";

pub(crate) fn map_user_repository_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::DuplicateEmail => Error::conflict("user already exists"),
        UserPersistenceError::Connection { message } => {
            error!(%message, "user repository unavailable");
            Error::internal(format!("user repository unavailable: {message}"))
        }
        UserPersistenceError::Query { message } => {
            error!(%message, "user repository query failed");
            Error::internal(format!("user repository error: {message}"))
        }
    }
}

/// Account service over a user repository.
#[derive(Clone)]
pub struct UserAccountService<R> {
    users: Arc<R>,
    hasher: Arc<dyn PasswordHasher>,
    clock: Arc<dyn Clock>,
}

impl<R> UserAccountService<R> {
    /// Create a new account service.
    pub fn new(users: Arc<R>, hasher: Arc<dyn PasswordHasher>, clock: Arc<dyn Clock>) -> Self {
        Self {
            users,
            hasher,
            clock,
        }
    }
}

impl<R> UserAccountService<R>
where
    R: UserRepository,
{
    async fn load(&self, user_id: &UserId) -> Result<User, Error> {
        self.users
            .find_by_id(user_id)
            .await
            .map_err(map_user_repository_error)?
            .ok_or_else(|| Error::not_found(format!("user {user_id} not found")))
    }
}

#[async_trait]
impl<R> LoginService for UserAccountService<R>
where
    R: UserRepository,
{
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<UserId, Error> {
        let account = self
            .users
            .find_account_by_email(credentials.email())
            .await
            .map_err(map_user_repository_error)?;

        match account {
            Some(account)
                if self
                    .hasher
                    .verify(credentials.password(), &account.password_hash) =>
            {
                Ok(*account.user.id())
            }
            _ => {
                debug!("login rejected");
                Err(Error::unauthorized(INVALID_CREDENTIALS))
            }
        }
    }
}

#[async_trait]
impl<R> UserAccountCommand for UserAccountService<R>
where
    R: UserRepository,
{
    async fn register(&self, draft: RegistrationDraft) -> Result<User, Error> {
        let RegistrationDraft {
            display_name,
            email,
            password,
            location,
        } = draft;

        let password_hash = self.hasher.hash(password.expose()).map_err(|err| {
            error!(error = %err, "password hashing failed");
            Error::internal(err.to_string())
        })?;
        let user = User::new(
            UserId::random(),
            display_name,
            email,
            location,
            self.clock.utc(),
        );
        let account = UserAccount {
            user,
            password_hash,
        };

        self.users
            .insert(&account)
            .await
            .map_err(map_user_repository_error)?;

        info!(user_id = %account.user.id(), "user registered");
        Ok(account.user)
    }

    async fn update_profile(
        &self,
        user_id: &UserId,
        update: ProfileUpdate,
    ) -> Result<User, Error> {
        if update.is_empty() {
            return Err(Error::invalid_request("nothing to update"));
        }
        let updated = self.load(user_id).await?.with_profile(update);
        let found = self
            .users
            .update_profile(&updated)
            .await
            .map_err(map_user_repository_error)?;
        if !found {
            return Err(Error::not_found(format!("user {user_id} not found")));
        }
        Ok(updated)
    }
}

#[async_trait]
impl<R> UserProfileQuery for UserAccountService<R>
where
    R: UserRepository,
{
    async fn fetch_profile(&self, user_id: &UserId) -> Result<User, Error> {
        self.load(user_id).await
    }
}

#[cfg(test)]
#[path = "user_account_service_tests.rs"]
mod tests;
