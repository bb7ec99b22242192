//! Repository port for accounts, credentials, and profiles.

use crate::user::domain::{
    EmailAddress, PasswordHash, ProfileUpdate, UserAccount, UserId, UserProfile,
};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for user repository operations.
pub type UserRepositoryResult<T> = Result<T, UserRepositoryError>;

/// User account persistence contract.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Stores a new account.
    ///
    /// # Errors
    ///
    /// Returns [`UserRepositoryError::DuplicateUser`] when the identifier is
    /// taken and [`UserRepositoryError::DuplicateEmail`] when the e-mail
    /// address is taken.
    async fn insert_user(&self, account: &UserAccount) -> UserRepositoryResult<()>;

    /// Finds an account by identifier.
    async fn find_user(&self, id: &UserId) -> UserRepositoryResult<Option<UserAccount>>;

    /// Finds an account by e-mail address.
    async fn find_user_by_email(
        &self,
        email: &EmailAddress,
    ) -> UserRepositoryResult<Option<UserAccount>>;

    /// Returns the stored credential hash of an account, if any.
    async fn password_hash(&self, id: &UserId) -> UserRepositoryResult<Option<PasswordHash>>;

    /// Inserts or merges a profile and optionally replaces the credential,
    /// both in one atomic unit.
    ///
    /// # Errors
    ///
    /// Returns [`UserRepositoryError::UserNotFound`] when the account does
    /// not exist.
    async fn upsert_profile(
        &self,
        id: &UserId,
        update: &ProfileUpdate,
    ) -> UserRepositoryResult<UserProfile>;

    /// Finds the profile of an account.
    async fn find_profile(&self, id: &UserId) -> UserRepositoryResult<Option<UserProfile>>;
}

/// Errors returned by user repository implementations.
#[derive(Debug, Clone, Error)]
pub enum UserRepositoryError {
    /// The account does not exist.
    #[error("user not found: {0}")]
    UserNotFound(UserId),

    /// An account with the same identifier already exists.
    #[error("duplicate user: {0}")]
    DuplicateUser(UserId),

    /// An account with the same e-mail address already exists.
    #[error("e-mail address already registered: {0}")]
    DuplicateEmail(EmailAddress),

    /// Persistence failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl UserRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
