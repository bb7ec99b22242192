//! Projects and the tasks they own.

use super::{ActorId, ProjectId, TaskDomainError, TaskId, TaskIndex};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// A project authored by one actor and split into indexed tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    id: ProjectId,
    name: String,
    author_id: ActorId,
    created_at: DateTime<Utc>,
}

impl Project {
    /// Creates a new project authored by `author_id`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyProjectName`] when the name is blank.
    pub fn new(
        name: impl Into<String>,
        author_id: ActorId,
        clock: &impl Clock,
    ) -> Result<Self, TaskDomainError> {
        let raw = name.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(TaskDomainError::EmptyProjectName);
        }
        Ok(Self {
            id: ProjectId::new(),
            name: trimmed.to_owned(),
            author_id,
            created_at: clock.utc(),
        })
    }

    /// Reconstructs a project from persisted storage.
    #[must_use]
    pub const fn from_persisted(
        id: ProjectId,
        name: String,
        author_id: ActorId,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            author_id,
            created_at,
        }
    }

    /// Returns the project identifier.
    #[must_use]
    pub const fn id(&self) -> ProjectId {
        self.id
    }

    /// Returns the project name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the authoring actor.
    #[must_use]
    pub const fn author_id(&self) -> &ActorId {
        &self.author_id
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// A task registered inside a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProjectTask {
    /// Task identifier.
    pub id: TaskId,
    /// Owning project.
    pub project_id: ProjectId,
    /// Stable position of the task inside the project.
    pub project_task_index: TaskIndex,
}

impl ProjectTask {
    /// Creates a new task at `project_task_index` inside `project_id`.
    #[must_use]
    pub fn new(project_id: ProjectId, project_task_index: TaskIndex) -> Self {
        Self {
            id: TaskId::new(),
            project_id,
            project_task_index,
        }
    }
}
