//! Application services for user accounts.

mod accounts;

pub use accounts::{UserService, UserServiceError, UserServiceResult};
