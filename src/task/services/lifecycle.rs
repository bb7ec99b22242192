//! Service layer for task transitions and state queries.

use crate::task::{
    domain::{
        ActorId, MappingRequest, MappingRequestOutcome, PendingTask, Project, ProjectId,
        ProjectTask, StateTransition, TaskDomainError, TaskEvent, TaskId, TaskIndex, TaskState,
        TaskStateView, TransitionReceipt, resolve_state,
    },
    ports::{ProjectRepository, TaskEventRepository, TaskRepositoryError},
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// Request payload for creating a project with indexed tasks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateProjectRequest {
    name: String,
    author_id: String,
    task_count: u32,
}

impl CreateProjectRequest {
    /// Creates a request for a project without tasks.
    #[must_use]
    pub fn new(name: impl Into<String>, author_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            author_id: author_id.into(),
            task_count: 0,
        }
    }

    /// Sets the number of tasks to create, indexed from 1.
    #[must_use]
    pub const fn with_task_count(mut self, task_count: u32) -> Self {
        self.task_count = task_count;
        self
    }
}

/// A newly created project and its tasks in index order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedProject {
    /// The stored project.
    pub project: Project,
    /// The stored tasks.
    pub tasks: Vec<ProjectTask>,
}

/// Service-level errors for task lifecycle operations.
#[derive(Debug, Error)]
pub enum TaskLifecycleError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] TaskRepositoryError),
    /// No actor has requested the task for mapping.
    #[error("no user requested task {task_id} of project {project_id} for mapping")]
    RequesterNotFound {
        /// Project that was searched.
        project_id: ProjectId,
        /// Task without a mapping request.
        task_id: TaskId,
    },
}

/// Result type for task lifecycle service operations.
pub type TaskLifecycleResult<T> = Result<T, TaskLifecycleError>;

/// Task lifecycle orchestration service.
///
/// Exposes the transition primitives and state queries to request handlers.
/// Guards run inside the repository; the service never reads state and then
/// writes in a separate step.
pub struct TaskLifecycleService<R, C>
where
    R: TaskEventRepository + ProjectRepository,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    clock: Arc<C>,
}

impl<R, C> Clone for TaskLifecycleService<R, C>
where
    R: TaskEventRepository + ProjectRepository,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<R, C> TaskLifecycleService<R, C>
where
    R: TaskEventRepository + ProjectRepository,
    C: Clock + Send + Sync,
{
    /// Creates a new task lifecycle service.
    #[must_use]
    pub const fn new(repository: Arc<R>, clock: Arc<C>) -> Self {
        Self { repository, clock }
    }

    /// Creates a project and its indexed tasks.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError`] when input validation fails or the
    /// repository rejects persistence.
    pub async fn create_project(
        &self,
        request: CreateProjectRequest,
    ) -> TaskLifecycleResult<CreatedProject> {
        let author_id = ActorId::new(request.author_id)?;
        let project = Project::new(request.name, author_id, &*self.clock)?;
        let tasks = (1..=request.task_count)
            .map(|index| Ok(ProjectTask::new(project.id(), TaskIndex::new(index)?)))
            .collect::<Result<Vec<_>, TaskDomainError>>()?;
        self.repository
            .store_project_with_tasks(&project, &tasks)
            .await?;

        info!(
            project_id = %project.id(),
            task_count = tasks.len(),
            "created project"
        );
        Ok(CreatedProject { project, tasks })
    }

    /// Finds a project by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Repository`] when the store fails.
    pub async fn find_project(&self, project_id: ProjectId) -> TaskLifecycleResult<Option<Project>> {
        Ok(self.repository.find_project(project_id).await?)
    }

    /// Returns the projects authored by `author_id`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Repository`] when the store fails.
    pub async fn projects_by_author(&self, author_id: &ActorId) -> TaskLifecycleResult<Vec<Project>> {
        Ok(self.repository.projects_by_author(author_id).await?)
    }

    /// Applies a guarded update-or-append transition.
    ///
    /// When the latest event belongs to the caller and is in the expected
    /// initial state, the event is rewritten in place (subject to the
    /// transition's continuation policy); otherwise a new event is appended.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Repository`] when the task is unknown,
    /// the store fails, or the store returns no resulting event.
    pub async fn update_transition(
        &self,
        transition: StateTransition,
    ) -> TaskLifecycleResult<TransitionReceipt> {
        let receipt = self.repository.apply_transition(&transition).await?;
        debug!(
            project_id = %transition.project_id,
            task_id = %transition.task_id,
            user_id = %transition.user_id,
            from = %transition.initial_state,
            to = %transition.final_state,
            outcome = receipt.outcome.as_str(),
            "task transition recorded"
        );
        Ok(receipt)
    }

    /// Requests a task for mapping.
    ///
    /// A rejected guard is not an error: the outcome states who holds the
    /// task instead.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Repository`] when the task is unknown
    /// or the store fails.
    pub async fn request_mapping(
        &self,
        request: MappingRequest,
    ) -> TaskLifecycleResult<MappingRequestOutcome> {
        let outcome = self.repository.request_mapping(&request).await?;
        match &outcome {
            MappingRequestOutcome::Applied(_) => debug!(
                project_id = %request.project_id,
                task_id = %request.task_id,
                user_id = %request.user_id,
                "mapping requested"
            ),
            MappingRequestOutcome::HeldBySelf { state } => info!(
                task_id = %request.task_id,
                user_id = %request.user_id,
                %state,
                locked = state.is_locked(),
                "mapping request ignored; task already held by requester"
            ),
            MappingRequestOutcome::HeldByOther { user_id, state } => info!(
                task_id = %request.task_id,
                requester = %request.user_id,
                holder = %user_id,
                %state,
                locked = state.is_locked(),
                "mapping request rejected; task held by another user"
            ),
        }
        Ok(outcome)
    }

    /// Lists tasks awaiting the author's approval of a mapping request.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Repository`] when the store fails.
    pub async fn list_pending_tasks_for_author(
        &self,
        author_id: &ActorId,
    ) -> TaskLifecycleResult<Vec<PendingTask>> {
        Ok(self
            .repository
            .pending_tasks_for_author(author_id, TaskState::RequestForMapping)
            .await?)
    }

    /// Returns the resolved state of every task in a project.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Repository`] when the store fails.
    pub async fn all_task_states(
        &self,
        project_id: ProjectId,
    ) -> TaskLifecycleResult<Vec<TaskStateView>> {
        Ok(self.repository.all_task_states(project_id).await?)
    }

    /// Returns the actor who most recently requested the task for mapping.
    ///
    /// Later events in other states do not affect the answer.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::RequesterNotFound`] when no mapping
    /// request was ever recorded for the task.
    pub async fn requested_user_for_task(
        &self,
        project_id: ProjectId,
        task_id: TaskId,
    ) -> TaskLifecycleResult<ActorId> {
        self.repository
            .latest_actor_in_state(project_id, task_id, TaskState::RequestForMapping)
            .await?
            .ok_or(TaskLifecycleError::RequesterNotFound {
                project_id,
                task_id,
            })
    }

    /// Returns the current state of a task, or the sentinel state when the
    /// task has no events.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Repository`] when the store fails.
    pub async fn current_state(
        &self,
        project_id: ProjectId,
        task_id: TaskId,
    ) -> TaskLifecycleResult<TaskState> {
        let latest = self.repository.latest_event(project_id, task_id).await?;
        Ok(resolve_state(latest.as_ref()))
    }

    /// Returns the event log of a task, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Repository`] when the store fails.
    pub async fn task_history(
        &self,
        project_id: ProjectId,
        task_id: TaskId,
    ) -> TaskLifecycleResult<Vec<TaskEvent>> {
        Ok(self.repository.task_history(project_id, task_id).await?)
    }
}
