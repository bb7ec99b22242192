//! Port contracts for user account persistence.

mod repository;

pub use repository::{UserRepository, UserRepositoryError, UserRepositoryResult};
