//! `PostgreSQL` adapters for the task event store.

mod models;
mod repository;
mod schema;
mod statements;

pub use repository::{PostgresTaskRepository, TaskPgPool};
