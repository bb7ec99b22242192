//! Error types for user domain validation.

use thiserror::Error;

/// Errors returned while constructing user values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UserDomainError {
    /// The user identifier is empty after trimming.
    #[error("user identifier must not be empty")]
    EmptyUserId,

    /// The display name is empty after trimming.
    #[error("user name must not be empty")]
    EmptyName,

    /// The e-mail address is not of the form `local@domain`.
    #[error("invalid e-mail address: {0}")]
    InvalidEmail(String),

    /// The password hash is empty.
    #[error("password hash must not be empty")]
    EmptyPasswordHash,
}

/// Error returned while parsing a user role.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown user role: {0}")]
pub struct ParseUserRoleError(pub String);
