//! Domain model for user accounts and profiles.

mod account;
mod error;
mod profile;

pub use account::{AuthUser, EmailAddress, PasswordHash, UserAccount, UserId};
pub use error::{ParseUserRoleError, UserDomainError};
pub use profile::{ProfileUpdate, UserProfile, UserRole};
