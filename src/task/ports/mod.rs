//! Port contracts for the task state-transition engine.
//!
//! Ports define infrastructure-agnostic interfaces used by task services.

pub mod repository;

pub use repository::{
    ProjectRepository, TaskEventRepository, TaskRepositoryError, TaskRepositoryResult,
};
