//! In-memory user repository.

mod users;

pub use users::InMemoryUserRepository;
