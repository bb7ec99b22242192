//! Accounts and the identities they are created from.

use super::UserDomainError;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a user account, taken from the OAuth subject.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Creates a validated user identifier.
    ///
    /// # Errors
    ///
    /// Returns [`UserDomainError::EmptyUserId`] when the value is empty after
    /// trimming.
    pub fn new(value: impl Into<String>) -> Result<Self, UserDomainError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(UserDomainError::EmptyUserId);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the identifier as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A normalized e-mail address.
///
/// Addresses are trimmed and lower-cased so uniqueness checks are
/// case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Creates a validated e-mail address.
    ///
    /// # Errors
    ///
    /// Returns [`UserDomainError::InvalidEmail`] unless the value has a
    /// non-empty local part and domain separated by a single `@`.
    pub fn new(value: impl Into<String>) -> Result<Self, UserDomainError> {
        let raw = value.into();
        let normalized = raw.trim().to_ascii_lowercase();
        let valid = normalized
            .split_once('@')
            .is_some_and(|(local, domain)| {
                !local.is_empty() && !domain.is_empty() && !domain.contains('@')
            });
        if !valid {
            return Err(UserDomainError::InvalidEmail(raw));
        }
        Ok(Self(normalized))
    }

    /// Returns the address as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An already-hashed password credential.
///
/// The hash is never printed by `Debug`.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Wraps a password hash produced by the caller.
    ///
    /// # Errors
    ///
    /// Returns [`UserDomainError::EmptyPasswordHash`] when the value is empty.
    pub fn new(value: impl Into<String>) -> Result<Self, UserDomainError> {
        let hash = value.into();
        if hash.is_empty() {
            return Err(UserDomainError::EmptyPasswordHash);
        }
        Ok(Self(hash))
    }

    /// Returns the stored hash.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(..)")
    }
}

/// Identity returned by the OAuth provider after sign-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    /// Provider subject identifier.
    pub id: UserId,
    /// Verified e-mail address.
    pub email: EmailAddress,
    /// Display name.
    pub name: String,
    /// Avatar URL.
    pub img_url: Option<String>,
}

impl AuthUser {
    /// Validates the raw identity fields.
    ///
    /// # Errors
    ///
    /// Returns [`UserDomainError`] when the identifier, e-mail, or name is
    /// invalid.
    pub fn new(
        id: impl Into<String>,
        email: impl Into<String>,
        name: impl Into<String>,
    ) -> Result<Self, UserDomainError> {
        let raw_name = name.into();
        let trimmed = raw_name.trim();
        if trimmed.is_empty() {
            return Err(UserDomainError::EmptyName);
        }
        Ok(Self {
            id: UserId::new(id)?,
            email: EmailAddress::new(email)?,
            name: trimmed.to_owned(),
            img_url: None,
        })
    }

    /// Sets the avatar URL.
    #[must_use]
    pub fn with_img_url(mut self, img_url: impl Into<String>) -> Self {
        self.img_url = Some(img_url.into());
        self
    }
}

/// A stored user account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAccount {
    /// Account identifier.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Unique e-mail address.
    pub email_address: EmailAddress,
    /// Avatar URL.
    pub profile_img: Option<String>,
    /// Whether the account may sign in.
    pub is_active: bool,
    /// Whether the account has administrative rights.
    pub is_superuser: bool,
    /// Registration timestamp.
    pub date_registered: DateTime<Utc>,
}

impl UserAccount {
    /// Creates an active, non-privileged account for a first sign-in.
    #[must_use]
    pub fn register(identity: AuthUser, clock: &impl Clock) -> Self {
        Self {
            id: identity.id,
            name: identity.name,
            email_address: identity.email,
            profile_img: identity.img_url,
            is_active: true,
            is_superuser: false,
            date_registered: clock.utc(),
        }
    }
}
