//! Repository ports for the task event store and project catalogue.

use crate::task::domain::{
    ActorId, MappingRequest, MappingRequestOutcome, PendingTask, Project, ProjectId, ProjectTask,
    StateTransition, TaskEvent, TaskId, TaskState, TaskStateView, TransitionReceipt,
};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for task repository operations.
pub type TaskRepositoryResult<T> = Result<T, TaskRepositoryError>;

/// Event store contract for task transitions and state queries.
///
/// Implementations must evaluate every transition guard and the write it
/// controls as one atomic unit: concurrent callers racing on the same task
/// are serialized by the store, never by the caller.
#[async_trait]
pub trait TaskEventRepository: Send + Sync {
    /// Applies a guarded update-or-append transition.
    ///
    /// Exactly one of {rewrite latest event, append new event} happens per
    /// call, as decided by [`StateTransition::decide`] against the latest
    /// event read inside the same atomic unit.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::TaskNotFound`] when the task is not
    /// registered in the project and [`TaskRepositoryError::Consistency`]
    /// when the store produced no resulting row.
    async fn apply_transition(
        &self,
        transition: &StateTransition,
    ) -> TaskRepositoryResult<TransitionReceipt>;

    /// Records a mapping request when the task is free.
    ///
    /// A rejected guard is reported through the returned outcome, not as an
    /// error.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::TaskNotFound`] when the task is not
    /// registered in the project.
    async fn request_mapping(
        &self,
        request: &MappingRequest,
    ) -> TaskRepositoryResult<MappingRequestOutcome>;

    /// Returns the latest event of a task, if any.
    async fn latest_event(
        &self,
        project_id: ProjectId,
        task_id: TaskId,
    ) -> TaskRepositoryResult<Option<TaskEvent>>;

    /// Returns every event of a task, oldest first.
    async fn task_history(
        &self,
        project_id: ProjectId,
        task_id: TaskId,
    ) -> TaskRepositoryResult<Vec<TaskEvent>>;

    /// Returns one resolved state per task registered in the project,
    /// ordered by project task index.
    async fn all_task_states(&self, project_id: ProjectId)
    -> TaskRepositoryResult<Vec<TaskStateView>>;

    /// Returns tasks in projects authored by `author_id` whose latest event
    /// is in `state`, ordered by project task index.
    async fn pending_tasks_for_author(
        &self,
        author_id: &ActorId,
        state: TaskState,
    ) -> TaskRepositoryResult<Vec<PendingTask>>;

    /// Returns the actor of the most recent event in `state` for a task.
    ///
    /// Returns `None` when no such event exists, regardless of the events
    /// recorded in other states.
    async fn latest_actor_in_state(
        &self,
        project_id: ProjectId,
        task_id: TaskId,
        state: TaskState,
    ) -> TaskRepositoryResult<Option<ActorId>>;
}

/// Catalogue contract for projects and their tasks.
#[async_trait]
pub trait ProjectRepository: Send + Sync {
    /// Stores a new project together with its tasks.
    ///
    /// Either the project and every task are stored, or nothing is.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::DuplicateProject`] when the project
    /// identifier already exists, [`TaskRepositoryError::ProjectNotFound`]
    /// when a task names another project, and
    /// [`TaskRepositoryError::DuplicateTask`] when a task identifier or
    /// project index is already taken.
    async fn store_project_with_tasks(
        &self,
        project: &Project,
        tasks: &[ProjectTask],
    ) -> TaskRepositoryResult<()>;

    /// Finds a project by identifier.
    async fn find_project(&self, id: ProjectId) -> TaskRepositoryResult<Option<Project>>;

    /// Returns the projects authored by `author_id`.
    async fn projects_by_author(&self, author_id: &ActorId) -> TaskRepositoryResult<Vec<Project>>;
}

/// Errors returned by task repository implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskRepositoryError {
    /// The task is not registered in the project.
    #[error("task {task_id} not found in project {project_id}")]
    TaskNotFound {
        /// Project that was searched.
        project_id: ProjectId,
        /// Missing task.
        task_id: TaskId,
    },

    /// The project does not exist.
    #[error("project not found: {0}")]
    ProjectNotFound(ProjectId),

    /// A project with the same identifier already exists.
    #[error("duplicate project identifier: {0}")]
    DuplicateProject(ProjectId),

    /// A task with the same identifier or project index already exists.
    #[error("duplicate task: {0}")]
    DuplicateTask(TaskId),

    /// The store returned a result that breaks a transition invariant.
    #[error("consistency violation: {0}")]
    Consistency(String),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }

    /// Builds a consistency violation with the given detail.
    pub fn consistency(detail: impl Into<String>) -> Self {
        Self::Consistency(detail.into())
    }
}
