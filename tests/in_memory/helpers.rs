//! Shared test helpers for in-memory integration tests.

use eyre::{Result, eyre};
use fieldtask::{
    task::{
        adapters::memory::InMemoryTaskRepository,
        domain::{ActorId, MappingRequest, MappingRequestOutcome, ProjectTask, StateTransition, TaskState},
        services::{CreateProjectRequest, CreatedProject, TaskLifecycleService},
    },
    user::{adapters::memory::InMemoryUserRepository, services::UserService},
};
use mockable::DefaultClock;
use rstest::fixture;
use std::sync::Arc;

/// Task service over the in-memory store.
pub type MemoryTaskService = TaskLifecycleService<InMemoryTaskRepository, DefaultClock>;

/// User service over the in-memory store.
pub type MemoryUserService = UserService<InMemoryUserRepository, DefaultClock>;

/// Provides a fresh task service for each test.
#[fixture]
pub fn tasks() -> MemoryTaskService {
    TaskLifecycleService::new(
        Arc::new(InMemoryTaskRepository::new()),
        Arc::new(DefaultClock),
    )
}

/// Provides a fresh user service for each test.
#[fixture]
pub fn users() -> MemoryUserService {
    UserService::new(
        Arc::new(InMemoryUserRepository::new()),
        Arc::new(DefaultClock),
    )
}

/// Builds a validated actor identifier.
///
/// # Errors
///
/// Returns an error when `raw` is blank.
pub fn actor(raw: &str) -> Result<ActorId> {
    Ok(ActorId::new(raw)?)
}

/// Creates a project with `task_count` tasks.
///
/// # Errors
///
/// Returns an error if the project cannot be stored.
pub async fn project(
    service: &MemoryTaskService,
    author: &str,
    task_count: u32,
) -> Result<CreatedProject> {
    Ok(service
        .create_project(CreateProjectRequest::new("Flood survey", author).with_task_count(task_count))
        .await?)
}

/// Returns the task at `position` in a created project.
///
/// # Errors
///
/// Returns an error when the project has fewer tasks.
pub fn task_at(created: &CreatedProject, position: usize) -> Result<ProjectTask> {
    created
        .tasks
        .get(position)
        .copied()
        .ok_or_else(|| eyre!("project has no task at position {position}"))
}

/// Requests a task for mapping.
///
/// # Errors
///
/// Returns an error if the service call fails.
pub async fn request(
    service: &MemoryTaskService,
    task: ProjectTask,
    user: &str,
) -> Result<MappingRequestOutcome> {
    Ok(service
        .request_mapping(MappingRequest::new(task.project_id, task.id, actor(user)?))
        .await?)
}

/// Applies a default-policy transition.
///
/// # Errors
///
/// Returns an error if the service call fails.
pub async fn transition(
    service: &MemoryTaskService,
    task: ProjectTask,
    user: &str,
    from: TaskState,
    to: TaskState,
) -> Result<()> {
    service
        .update_transition(StateTransition::new(
            task.project_id,
            task.id,
            actor(user)?,
            from,
            to,
        ))
        .await?;
    Ok(())
}
