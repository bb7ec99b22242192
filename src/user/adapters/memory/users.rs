//! In-memory account store for tests and tooling.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::user::{
    domain::{EmailAddress, PasswordHash, ProfileUpdate, UserAccount, UserId, UserProfile},
    ports::{UserRepository, UserRepositoryError, UserRepositoryResult},
};

/// Thread-safe in-memory user repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryUserRepository {
    state: Arc<RwLock<InMemoryUserState>>,
}

#[derive(Debug, Default)]
struct InMemoryUserState {
    accounts: HashMap<UserId, UserAccount>,
    email_index: HashMap<EmailAddress, UserId>,
    credentials: HashMap<UserId, PasswordHash>,
    profiles: HashMap<UserId, UserProfile>,
}

impl InMemoryUserRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> UserRepositoryResult<RwLockReadGuard<'_, InMemoryUserState>> {
        self.state.read().map_err(|err| {
            UserRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }

    fn write(&self) -> UserRepositoryResult<RwLockWriteGuard<'_, InMemoryUserState>> {
        self.state.write().map_err(|err| {
            UserRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn insert_user(&self, account: &UserAccount) -> UserRepositoryResult<()> {
        let mut state = self.write()?;
        if state.accounts.contains_key(&account.id) {
            return Err(UserRepositoryError::DuplicateUser(account.id.clone()));
        }
        if state.email_index.contains_key(&account.email_address) {
            return Err(UserRepositoryError::DuplicateEmail(
                account.email_address.clone(),
            ));
        }
        state
            .email_index
            .insert(account.email_address.clone(), account.id.clone());
        state.accounts.insert(account.id.clone(), account.clone());
        Ok(())
    }

    async fn find_user(&self, id: &UserId) -> UserRepositoryResult<Option<UserAccount>> {
        let state = self.read()?;
        Ok(state.accounts.get(id).cloned())
    }

    async fn find_user_by_email(
        &self,
        email: &EmailAddress,
    ) -> UserRepositoryResult<Option<UserAccount>> {
        let state = self.read()?;
        Ok(state
            .email_index
            .get(email)
            .and_then(|id| state.accounts.get(id))
            .cloned())
    }

    async fn password_hash(&self, id: &UserId) -> UserRepositoryResult<Option<PasswordHash>> {
        let state = self.read()?;
        Ok(state.credentials.get(id).cloned())
    }

    async fn upsert_profile(
        &self,
        id: &UserId,
        update: &ProfileUpdate,
    ) -> UserRepositoryResult<UserProfile> {
        let mut state = self.write()?;
        if !state.accounts.contains_key(id) {
            return Err(UserRepositoryError::UserNotFound(id.clone()));
        }
        if let Some(password) = &update.password {
            state.credentials.insert(id.clone(), password.clone());
        }
        let profile = state
            .profiles
            .entry(id.clone())
            .or_insert_with(|| UserProfile::empty(id.clone()));
        update.apply_to(profile);
        Ok(profile.clone())
    }

    async fn find_profile(&self, id: &UserId) -> UserRepositoryResult<Option<UserProfile>> {
        let state = self.read()?;
        Ok(state.profiles.get(id).cloned())
    }
}
