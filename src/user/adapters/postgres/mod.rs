//! `PostgreSQL` adapter for user accounts and profiles.

mod models;
mod repository;
mod schema;

pub use repository::{PostgresUserRepository, UserPgPool};
