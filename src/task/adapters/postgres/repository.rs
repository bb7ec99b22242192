//! `PostgreSQL` repository implementation for the task event store.

use super::{
    models::{
        MappingRequestRow, NewProjectRow, NewTaskRow, PendingTaskRow, ProjectRow, TaskEventRow,
        TaskStateRow, TransitionRow,
    },
    schema::{projects, task_events},
    statements,
};
use crate::task::{
    domain::{
        ActorId, EventId, MappingRequest, MappingRequestOutcome, PendingTask, Project, ProjectId,
        ProjectTask, StateTransition, TaskEvent, TaskId, TaskIndex, TaskState, TaskStateView,
        TransitionOutcome, TransitionReceipt, TransitionRecord,
    },
    ports::{ProjectRepository, TaskEventRepository, TaskRepositoryError, TaskRepositoryResult},
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::warn;

/// `PostgreSQL` connection pool type used by task adapters.
pub type TaskPgPool = Pool<ConnectionManager<PgConnection>>;

/// `PostgreSQL`-backed task event store and project catalogue.
#[derive(Debug, Clone)]
pub struct PostgresTaskRepository {
    pool: TaskPgPool,
}

impl PostgresTaskRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: TaskPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> TaskRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> TaskRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        let result = tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(TaskRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(TaskRepositoryError::persistence)?;
        if let Err(TaskRepositoryError::Persistence(ref cause)) = result {
            warn!(error = %cause, "task store operation failed");
        }
        result
    }
}

#[async_trait]
impl TaskEventRepository for PostgresTaskRepository {
    async fn apply_transition(
        &self,
        transition: &StateTransition,
    ) -> TaskRepositoryResult<TransitionReceipt> {
        let owned = transition.clone();
        let row = self
            .run_blocking(move |connection| statements::update_or_append(connection, &owned))
            .await?;
        row_to_receipt(row)
    }

    async fn request_mapping(
        &self,
        request: &MappingRequest,
    ) -> TaskRepositoryResult<MappingRequestOutcome> {
        let owned = request.clone();
        let row = self
            .run_blocking(move |connection| statements::request_mapping(connection, &owned))
            .await?;
        row_to_mapping_outcome(request, row)
    }

    async fn latest_event(
        &self,
        project_id: ProjectId,
        task_id: TaskId,
    ) -> TaskRepositoryResult<Option<TaskEvent>> {
        self.run_blocking(move |connection| {
            let row = task_events::table
                .filter(task_events::project_id.eq(project_id.into_inner()))
                .filter(task_events::task_id.eq(task_id.into_inner()))
                .order((task_events::created_at.desc(), task_events::sequence.desc()))
                .select(TaskEventRow::as_select())
                .first::<TaskEventRow>(connection)
                .optional()?;
            row.map(row_to_event).transpose()
        })
        .await
    }

    async fn task_history(
        &self,
        project_id: ProjectId,
        task_id: TaskId,
    ) -> TaskRepositoryResult<Vec<TaskEvent>> {
        self.run_blocking(move |connection| {
            task_events::table
                .filter(task_events::project_id.eq(project_id.into_inner()))
                .filter(task_events::task_id.eq(task_id.into_inner()))
                .order((task_events::created_at.asc(), task_events::sequence.asc()))
                .select(TaskEventRow::as_select())
                .load::<TaskEventRow>(connection)?
                .into_iter()
                .map(row_to_event)
                .collect()
        })
        .await
    }

    async fn all_task_states(
        &self,
        project_id: ProjectId,
    ) -> TaskRepositoryResult<Vec<TaskStateView>> {
        self.run_blocking(move |connection| {
            statements::all_task_states(connection, project_id)?
                .into_iter()
                .map(|row| row_to_state_view(project_id, row))
                .collect()
        })
        .await
    }

    async fn pending_tasks_for_author(
        &self,
        author_id: &ActorId,
        state: TaskState,
    ) -> TaskRepositoryResult<Vec<PendingTask>> {
        let author = author_id.clone();
        self.run_blocking(move |connection| {
            statements::pending_tasks(connection, &author, state)?
                .into_iter()
                .map(row_to_pending_task)
                .collect()
        })
        .await
    }

    async fn latest_actor_in_state(
        &self,
        project_id: ProjectId,
        task_id: TaskId,
        state: TaskState,
    ) -> TaskRepositoryResult<Option<ActorId>> {
        self.run_blocking(move |connection| {
            let user_id = task_events::table
                .filter(task_events::project_id.eq(project_id.into_inner()))
                .filter(task_events::task_id.eq(task_id.into_inner()))
                .filter(task_events::state.eq(state.as_str()))
                .order((task_events::created_at.desc(), task_events::sequence.desc()))
                .select(task_events::user_id)
                .first::<String>(connection)
                .optional()?;
            user_id
                .map(|value| ActorId::new(value).map_err(TaskRepositoryError::persistence))
                .transpose()
        })
        .await
    }
}

#[async_trait]
impl ProjectRepository for PostgresTaskRepository {
    async fn store_project_with_tasks(
        &self,
        project: &Project,
        tasks: &[ProjectTask],
    ) -> TaskRepositoryResult<()> {
        let project_id = project.id();
        let new_project = NewProjectRow {
            id: project_id.into_inner(),
            name: project.name().to_owned(),
            author_id: project.author_id().as_str().to_owned(),
            created_at: project.created_at(),
        };
        let new_tasks = tasks
            .iter()
            .map(|task| {
                let project_task_index = i32::try_from(task.project_task_index.value())
                    .map_err(TaskRepositoryError::persistence)?;
                Ok(NewTaskRow {
                    id: task.id.into_inner(),
                    project_id: task.project_id.into_inner(),
                    project_task_index,
                })
            })
            .collect::<TaskRepositoryResult<Vec<_>>>()?;

        self.run_blocking(move |connection| {
            connection.transaction::<_, TaskRepositoryError, _>(|tx| {
                diesel::insert_into(projects::table)
                    .values(&new_project)
                    .execute(tx)
                    .map_err(|err| match err {
                        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                            TaskRepositoryError::DuplicateProject(project_id)
                        }
                        _ => TaskRepositoryError::persistence(err),
                    })?;
                for row in &new_tasks {
                    diesel::insert_into(super::schema::tasks::table)
                        .values(row)
                        .execute(tx)
                        .map_err(|err| match err {
                            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                                TaskRepositoryError::DuplicateTask(TaskId::from_uuid(row.id))
                            }
                            DieselError::DatabaseError(
                                DatabaseErrorKind::ForeignKeyViolation,
                                _,
                            ) => TaskRepositoryError::ProjectNotFound(ProjectId::from_uuid(
                                row.project_id,
                            )),
                            _ => TaskRepositoryError::persistence(err),
                        })?;
                }
                Ok(())
            })
        })
        .await
    }

    async fn find_project(&self, id: ProjectId) -> TaskRepositoryResult<Option<Project>> {
        self.run_blocking(move |connection| {
            let row = projects::table
                .filter(projects::id.eq(id.into_inner()))
                .select(ProjectRow::as_select())
                .first::<ProjectRow>(connection)
                .optional()?;
            row.map(row_to_project).transpose()
        })
        .await
    }

    async fn projects_by_author(&self, author_id: &ActorId) -> TaskRepositoryResult<Vec<Project>> {
        let author = author_id.as_str().to_owned();
        self.run_blocking(move |connection| {
            projects::table
                .filter(projects::author_id.eq(author))
                .order(projects::created_at.asc())
                .select(ProjectRow::as_select())
                .load::<ProjectRow>(connection)?
                .into_iter()
                .map(row_to_project)
                .collect()
        })
        .await
    }
}

fn row_to_event(row: TaskEventRow) -> TaskRepositoryResult<TaskEvent> {
    let TaskEventRow {
        event_id,
        project_id,
        task_id,
        user_id: persisted_user_id,
        state: persisted_state,
        comment,
        created_at,
        sequence: persisted_sequence,
    } = row;

    let user_id = ActorId::new(persisted_user_id).map_err(TaskRepositoryError::persistence)?;
    let state =
        TaskState::try_from(persisted_state.as_str()).map_err(TaskRepositoryError::persistence)?;
    let sequence = u64::try_from(persisted_sequence).map_err(TaskRepositoryError::persistence)?;

    Ok(TaskEvent {
        event_id: EventId::from_uuid(event_id),
        project_id: ProjectId::from_uuid(project_id),
        task_id: TaskId::from_uuid(task_id),
        user_id,
        state,
        comment,
        created_at,
        sequence,
    })
}

fn row_to_receipt(row: TransitionRow) -> TaskRepositoryResult<TransitionReceipt> {
    let outcome = if row.collapsed {
        TransitionOutcome::Updated
    } else {
        TransitionOutcome::Appended
    };
    Ok(TransitionReceipt {
        event: row_to_event(row.event)?,
        outcome,
    })
}

fn row_to_mapping_outcome(
    request: &MappingRequest,
    row: MappingRequestRow,
) -> TaskRepositoryResult<MappingRequestOutcome> {
    if row.inserted_event_id.is_some() {
        return Ok(MappingRequestOutcome::Applied(TransitionRecord {
            project_id: request.project_id,
            task_id: request.task_id,
            comment: row.inserted_comment,
        }));
    }

    let (Some(holder), Some(held_state)) = (row.holder_user_id, row.holder_state) else {
        return Err(TaskRepositoryError::consistency(format!(
            "mapping request for task {} was rejected without a latest event",
            request.task_id
        )));
    };
    let holder_id = ActorId::new(holder).map_err(TaskRepositoryError::persistence)?;
    let state =
        TaskState::try_from(held_state.as_str()).map_err(TaskRepositoryError::persistence)?;

    if holder_id == request.user_id {
        Ok(MappingRequestOutcome::HeldBySelf { state })
    } else {
        Ok(MappingRequestOutcome::HeldByOther {
            user_id: holder_id,
            state,
        })
    }
}

fn row_to_task_index(value: i32) -> TaskRepositoryResult<TaskIndex> {
    let unsigned = u32::try_from(value).map_err(TaskRepositoryError::persistence)?;
    TaskIndex::new(unsigned).map_err(TaskRepositoryError::persistence)
}

fn row_to_state_view(
    project_id: ProjectId,
    row: TaskStateRow,
) -> TaskRepositoryResult<TaskStateView> {
    let state =
        TaskState::try_from(row.state.as_str()).map_err(TaskRepositoryError::persistence)?;
    Ok(TaskStateView {
        project_id,
        task_id: TaskId::from_uuid(row.task_id),
        project_task_index: row_to_task_index(row.project_task_index)?,
        state,
    })
}

fn row_to_pending_task(row: PendingTaskRow) -> TaskRepositoryResult<PendingTask> {
    Ok(PendingTask {
        project_task_index: row_to_task_index(row.project_task_index)?,
        event: row_to_event(row.event)?,
    })
}

fn row_to_project(row: ProjectRow) -> TaskRepositoryResult<Project> {
    let author_id = ActorId::new(row.author_id).map_err(TaskRepositoryError::persistence)?;
    Ok(Project::from_persisted(
        ProjectId::from_uuid(row.id),
        row.name,
        author_id,
        row.created_at,
    ))
}
