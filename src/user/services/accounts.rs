//! Service layer for sign-in provisioning and profile maintenance.

use crate::user::{
    domain::{
        AuthUser, EmailAddress, PasswordHash, ProfileUpdate, UserAccount, UserDomainError, UserId,
        UserProfile,
    },
    ports::{UserRepository, UserRepositoryError},
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// Service-level errors for user operations.
#[derive(Debug, Error)]
pub enum UserServiceError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] UserDomainError),
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] UserRepositoryError),
}

/// Result type for user service operations.
pub type UserServiceResult<T> = Result<T, UserServiceError>;

/// User account orchestration service.
pub struct UserService<R, C>
where
    R: UserRepository,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    clock: Arc<C>,
}

impl<R, C> Clone for UserService<R, C>
where
    R: UserRepository,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<R, C> UserService<R, C>
where
    R: UserRepository,
    C: Clock + Send + Sync,
{
    /// Creates a new user service.
    #[must_use]
    pub const fn new(repository: Arc<R>, clock: Arc<C>) -> Self {
        Self { repository, clock }
    }

    /// Returns the account for an authenticated identity, creating it on
    /// first sign-in.
    ///
    /// A concurrent first sign-in with the same identifier resolves to the
    /// account stored by the winner.
    ///
    /// # Errors
    ///
    /// Returns [`UserRepositoryError::DuplicateEmail`] when another account
    /// already uses the identity's e-mail address.
    pub async fn get_or_create_user(&self, identity: AuthUser) -> UserServiceResult<UserAccount> {
        if let Some(existing) = self.repository.find_user(&identity.id).await? {
            return Ok(existing);
        }

        let account = UserAccount::register(identity, &*self.clock);
        match self.repository.insert_user(&account).await {
            Ok(()) => {
                info!(user_id = %account.id, "registered user");
                Ok(account)
            }
            Err(UserRepositoryError::DuplicateUser(id)) => {
                debug!(user_id = %id, "user registered concurrently");
                self.repository
                    .find_user(&id)
                    .await?
                    .ok_or(UserServiceError::Repository(UserRepositoryError::UserNotFound(id)))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Finds an account by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`UserServiceError::Repository`] when the store fails.
    pub async fn find_user(&self, id: &UserId) -> UserServiceResult<Option<UserAccount>> {
        Ok(self.repository.find_user(id).await?)
    }

    /// Finds an account by e-mail address.
    ///
    /// # Errors
    ///
    /// Returns [`UserServiceError::Domain`] when the address is malformed.
    pub async fn find_user_by_email(&self, email: &str) -> UserServiceResult<Option<UserAccount>> {
        let address = EmailAddress::new(email)?;
        Ok(self.repository.find_user_by_email(&address).await?)
    }

    /// Returns the stored credential hash for an account.
    ///
    /// # Errors
    ///
    /// Returns [`UserServiceError::Repository`] when the store fails.
    pub async fn password_hash(&self, id: &UserId) -> UserServiceResult<Option<PasswordHash>> {
        Ok(self.repository.password_hash(id).await?)
    }

    /// Creates or partially updates the profile of an account.
    ///
    /// # Errors
    ///
    /// Returns [`UserRepositoryError::UserNotFound`] when the account does
    /// not exist.
    pub async fn upsert_profile(
        &self,
        id: &UserId,
        update: ProfileUpdate,
    ) -> UserServiceResult<UserProfile> {
        let profile = self.repository.upsert_profile(id, &update).await?;
        debug!(
            user_id = %id,
            credential_replaced = update.password.is_some(),
            "profile updated"
        );
        Ok(profile)
    }

    /// Finds the profile of an account.
    ///
    /// # Errors
    ///
    /// Returns [`UserServiceError::Repository`] when the store fails.
    pub async fn find_profile(&self, id: &UserId) -> UserServiceResult<Option<UserProfile>> {
        Ok(self.repository.find_profile(id).await?)
    }
}
