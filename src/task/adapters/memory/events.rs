//! In-memory task event store for tests and tooling.
//!
//! A single write lock guards the whole store, so each transition reads the
//! latest event, evaluates its guard, and writes under one critical section.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockable::{Clock, DefaultClock};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::task::{
    domain::{
        ActorId, EventId, MappingGuard, MappingRequest, MappingRequestOutcome, PendingTask,
        Project, ProjectId, ProjectTask, StateTransition, TaskEvent, TaskId, TaskIndex, TaskState,
        TaskStateView, TransitionOutcome, TransitionReceipt, TransitionRecord, latest_event,
        resolve_state,
    },
    ports::{ProjectRepository, TaskEventRepository, TaskRepositoryError, TaskRepositoryResult},
};

/// Thread-safe in-memory task event store and project catalogue.
///
/// Event timestamps come from the injected clock.
pub struct InMemoryTaskRepository<C = DefaultClock> {
    state: Arc<RwLock<InMemoryTaskState>>,
    clock: Arc<C>,
}

impl<C> Clone for InMemoryTaskRepository<C> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<C> fmt::Debug for InMemoryTaskRepository<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryTaskRepository")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Default)]
struct InMemoryTaskState {
    projects: HashMap<ProjectId, Project>,
    tasks: HashMap<TaskId, ProjectTask>,
    task_indexes: HashSet<(ProjectId, TaskIndex)>,
    events: Vec<TaskEvent>,
    next_sequence: u64,
}

impl InMemoryTaskState {
    fn require_task(&self, project_id: ProjectId, task_id: TaskId) -> TaskRepositoryResult<()> {
        let registered = self
            .tasks
            .get(&task_id)
            .is_some_and(|task| task.project_id == project_id);
        if registered {
            Ok(())
        } else {
            Err(TaskRepositoryError::TaskNotFound {
                project_id,
                task_id,
            })
        }
    }

    fn events_for(
        &self,
        project_id: ProjectId,
        task_id: TaskId,
    ) -> impl Iterator<Item = &TaskEvent> {
        self.events
            .iter()
            .filter(move |event| event.project_id == project_id && event.task_id == task_id)
    }

    fn latest(&self, project_id: ProjectId, task_id: TaskId) -> Option<&TaskEvent> {
        latest_event(self.events_for(project_id, task_id))
    }

    fn latest_position(&self, project_id: ProjectId, task_id: TaskId) -> Option<usize> {
        self.events
            .iter()
            .enumerate()
            .filter(|(_, event)| event.project_id == project_id && event.task_id == task_id)
            .max_by(|(_, left), (_, right)| left.cmp_recency(right))
            .map(|(position, _)| position)
    }

    fn append(&mut self, event: TaskEvent) -> TaskEvent {
        self.events.push(event.clone());
        event
    }

    fn next_event(
        &mut self,
        project_id: ProjectId,
        task_id: TaskId,
        user_id: ActorId,
        state: TaskState,
        comment: Option<String>,
        created_at: DateTime<Utc>,
    ) -> TaskEvent {
        self.next_sequence += 1;
        TaskEvent {
            event_id: EventId::new(),
            project_id,
            task_id,
            user_id,
            state,
            comment,
            created_at,
            sequence: self.next_sequence,
        }
    }
}

impl InMemoryTaskRepository {
    /// Creates an empty in-memory repository stamped by the system clock.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(Arc::new(DefaultClock))
    }
}

impl Default for InMemoryTaskRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> InMemoryTaskRepository<C> {
    /// Creates an empty in-memory repository stamped by `clock`.
    #[must_use]
    pub fn with_clock(clock: Arc<C>) -> Self {
        Self {
            state: Arc::new(RwLock::new(InMemoryTaskState::default())),
            clock,
        }
    }

    fn read(&self) -> TaskRepositoryResult<RwLockReadGuard<'_, InMemoryTaskState>> {
        self.state.read().map_err(|err| {
            TaskRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }

    fn write(&self) -> TaskRepositoryResult<RwLockWriteGuard<'_, InMemoryTaskState>> {
        self.state.write().map_err(|err| {
            TaskRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }
}

#[async_trait]
impl<C: Clock> TaskEventRepository for InMemoryTaskRepository<C> {
    async fn apply_transition(
        &self,
        transition: &StateTransition,
    ) -> TaskRepositoryResult<TransitionReceipt> {
        let mut state = self.write()?;
        state.require_task(transition.project_id, transition.task_id)?;

        let outcome = transition.decide(state.latest(transition.project_id, transition.task_id));
        let event = match outcome {
            TransitionOutcome::Updated => {
                let position = state
                    .latest_position(transition.project_id, transition.task_id)
                    .ok_or_else(|| {
                        TaskRepositoryError::consistency(format!(
                            "continuation of task {} found no latest event",
                            transition.task_id
                        ))
                    })?;
                let latest = state.events.get_mut(position).ok_or_else(|| {
                    TaskRepositoryError::consistency("latest event position out of range")
                })?;
                latest.state = transition.final_state;
                latest.comment.clone_from(&transition.comment);
                latest.created_at = self.clock.utc();
                latest.clone()
            }
            TransitionOutcome::Appended => {
                let event = state.next_event(
                    transition.project_id,
                    transition.task_id,
                    transition.user_id.clone(),
                    transition.final_state,
                    transition.comment.clone(),
                    self.clock.utc(),
                );
                state.append(event)
            }
        };

        Ok(TransitionReceipt { event, outcome })
    }

    async fn request_mapping(
        &self,
        request: &MappingRequest,
    ) -> TaskRepositoryResult<MappingRequestOutcome> {
        let mut state = self.write()?;
        state.require_task(request.project_id, request.task_id)?;

        let guard = request.evaluate(state.latest(request.project_id, request.task_id));
        match guard {
            MappingGuard::Permitted => {
                let event = state.next_event(
                    request.project_id,
                    request.task_id,
                    request.user_id.clone(),
                    TaskState::RequestForMapping,
                    request.comment.clone(),
                    self.clock.utc(),
                );
                let stored = state.append(event);
                Ok(MappingRequestOutcome::Applied(TransitionRecord::from(&stored)))
            }
            MappingGuard::HeldBySelf { state: held } => {
                Ok(MappingRequestOutcome::HeldBySelf { state: held })
            }
            MappingGuard::HeldByOther {
                user_id,
                state: held,
            } => Ok(MappingRequestOutcome::HeldByOther {
                user_id,
                state: held,
            }),
        }
    }

    async fn latest_event(
        &self,
        project_id: ProjectId,
        task_id: TaskId,
    ) -> TaskRepositoryResult<Option<TaskEvent>> {
        let state = self.read()?;
        Ok(state.latest(project_id, task_id).cloned())
    }

    async fn task_history(
        &self,
        project_id: ProjectId,
        task_id: TaskId,
    ) -> TaskRepositoryResult<Vec<TaskEvent>> {
        let state = self.read()?;
        let mut history: Vec<TaskEvent> = state.events_for(project_id, task_id).cloned().collect();
        history.sort_by(TaskEvent::cmp_recency);
        Ok(history)
    }

    async fn all_task_states(
        &self,
        project_id: ProjectId,
    ) -> TaskRepositoryResult<Vec<TaskStateView>> {
        let state = self.read()?;
        let mut views: Vec<TaskStateView> = state
            .tasks
            .values()
            .filter(|task| task.project_id == project_id)
            .map(|task| TaskStateView {
                project_id,
                task_id: task.id,
                project_task_index: task.project_task_index,
                state: resolve_state(state.latest(project_id, task.id)),
            })
            .collect();
        views.sort_by_key(|view| view.project_task_index);
        Ok(views)
    }

    async fn pending_tasks_for_author(
        &self,
        author_id: &ActorId,
        target: TaskState,
    ) -> TaskRepositoryResult<Vec<PendingTask>> {
        let state = self.read()?;
        let authored: HashSet<ProjectId> = state
            .projects
            .values()
            .filter(|project| project.author_id() == author_id)
            .map(Project::id)
            .collect();

        let mut pending: Vec<PendingTask> = state
            .tasks
            .values()
            .filter(|task| authored.contains(&task.project_id))
            .filter_map(|task| {
                state
                    .latest(task.project_id, task.id)
                    .filter(|event| event.state == target)
                    .map(|event| PendingTask {
                        project_task_index: task.project_task_index,
                        event: event.clone(),
                    })
            })
            .collect();
        pending.sort_by_key(|task| (task.project_task_index, task.event.project_id));
        Ok(pending)
    }

    async fn latest_actor_in_state(
        &self,
        project_id: ProjectId,
        task_id: TaskId,
        target: TaskState,
    ) -> TaskRepositoryResult<Option<ActorId>> {
        let state = self.read()?;
        let actor = latest_event(
            state
                .events_for(project_id, task_id)
                .filter(|event| event.state == target),
        )
        .map(|event| event.user_id.clone());
        Ok(actor)
    }
}

#[async_trait]
impl<C: Clock> ProjectRepository for InMemoryTaskRepository<C> {
    async fn store_project_with_tasks(
        &self,
        project: &Project,
        tasks: &[ProjectTask],
    ) -> TaskRepositoryResult<()> {
        let mut state = self.write()?;
        if state.projects.contains_key(&project.id()) {
            return Err(TaskRepositoryError::DuplicateProject(project.id()));
        }

        let mut batch_ids = HashSet::new();
        let mut batch_indexes = HashSet::new();
        for task in tasks {
            if task.project_id != project.id() {
                return Err(TaskRepositoryError::ProjectNotFound(task.project_id));
            }
            let index_key = (task.project_id, task.project_task_index);
            let taken = state.tasks.contains_key(&task.id)
                || state.task_indexes.contains(&index_key)
                || !batch_ids.insert(task.id)
                || !batch_indexes.insert(index_key);
            if taken {
                return Err(TaskRepositoryError::DuplicateTask(task.id));
            }
        }

        state.projects.insert(project.id(), project.clone());
        for task in tasks {
            state
                .task_indexes
                .insert((task.project_id, task.project_task_index));
            state.tasks.insert(task.id, *task);
        }
        Ok(())
    }

    async fn find_project(&self, id: ProjectId) -> TaskRepositoryResult<Option<Project>> {
        let state = self.read()?;
        Ok(state.projects.get(&id).cloned())
    }

    async fn projects_by_author(&self, author_id: &ActorId) -> TaskRepositoryResult<Vec<Project>> {
        let state = self.read()?;
        let mut projects: Vec<Project> = state
            .projects
            .values()
            .filter(|project| project.author_id() == author_id)
            .cloned()
            .collect();
        projects.sort_by_key(Project::created_at);
        Ok(projects)
    }
}
