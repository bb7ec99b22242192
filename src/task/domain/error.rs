//! Error types for task domain validation and parsing.

use thiserror::Error;

/// Errors returned while constructing domain task values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDomainError {
    /// The actor identifier is empty after trimming.
    #[error("actor identifier must not be empty")]
    EmptyActorId,

    /// The project task index cannot be persisted.
    #[error("invalid task index {0}, expected a value no greater than i32::MAX")]
    InvalidTaskIndex(u32),

    /// The project name is empty after trimming.
    #[error("project name must not be empty")]
    EmptyProjectName,
}

/// Error returned while parsing task states from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task state: {0}")]
pub struct ParseTaskStateError(pub String);

/// Error returned while parsing a continuation policy name.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown continuation policy: {0}")]
pub struct ParseContinuationPolicyError(pub String);
