//! SQL statements for the task event store.
//!
//! Transitions run inside one transaction that first locks the owning
//! `tasks` row, then reads the latest event, decides, and writes in a single
//! statement. The row lock serializes concurrent transitions of one task,
//! including the first transition of a task without events, where there is
//! no event row to lock.

use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::sql_types::{Bool, Nullable, Text, Uuid as SqlUuid, Varchar};

use super::models::{MappingRequestRow, PendingTaskRow, TaskStateRow, TransitionRow};
use super::schema::tasks;
use crate::task::{
    domain::{ActorId, MappingRequest, ProjectId, StateTransition, TaskId, TaskState},
    ports::{TaskRepositoryError, TaskRepositoryResult},
};

const UPDATE_OR_APPEND_SQL: &str = concat!(
    "WITH last AS (",
    "SELECT event_id, user_id, state FROM task_events ",
    "WHERE project_id = $1 AND task_id = $2 ",
    "ORDER BY created_at DESC, sequence DESC LIMIT 1",
    "), updated AS (",
    "UPDATE task_events SET state = $5, comment = $4, created_at = clock_timestamp() ",
    "FROM last ",
    "WHERE task_events.event_id = last.event_id ",
    "AND $7 AND last.user_id = $3 AND last.state = $6 ",
    "RETURNING task_events.event_id, task_events.project_id, task_events.task_id, ",
    "task_events.user_id, task_events.state, task_events.comment, ",
    "task_events.created_at, task_events.sequence",
    "), inserted AS (",
    "INSERT INTO task_events (project_id, task_id, user_id, state, comment, created_at) ",
    "SELECT $1, $2, $3, $5, $4, clock_timestamp() ",
    "WHERE NOT EXISTS (SELECT 1 FROM updated) ",
    "RETURNING event_id, project_id, task_id, user_id, state, comment, created_at, sequence",
    ") ",
    "SELECT updated.*, TRUE AS collapsed FROM updated ",
    "UNION ALL ",
    "SELECT inserted.*, FALSE AS collapsed FROM inserted",
);

const REQUEST_MAPPING_SQL: &str = concat!(
    "WITH last AS (",
    "SELECT user_id, state FROM task_events ",
    "WHERE project_id = $1 AND task_id = $2 ",
    "ORDER BY created_at DESC, sequence DESC LIMIT 1",
    "), inserted AS (",
    "INSERT INTO task_events (project_id, task_id, user_id, state, comment, created_at) ",
    "SELECT $1, $2, $3, $5, $4, clock_timestamp() ",
    "WHERE NOT EXISTS (SELECT 1 FROM last) ",
    "OR EXISTS (SELECT 1 FROM last WHERE state = $6) ",
    "RETURNING event_id, comment",
    ") ",
    "SELECT inserted.event_id AS inserted_event_id, inserted.comment AS inserted_comment, ",
    "last.user_id AS holder_user_id, last.state AS holder_state ",
    "FROM (SELECT 1) AS anchor ",
    "LEFT JOIN inserted ON TRUE ",
    "LEFT JOIN last ON TRUE",
);

const ALL_TASK_STATES_SQL: &str = concat!(
    "WITH latest_task_events AS (",
    "SELECT DISTINCT ON (task_id) task_id, state FROM task_events ",
    "WHERE project_id = $1 ",
    "ORDER BY task_id, created_at DESC, sequence DESC",
    ") ",
    "SELECT tasks.id AS task_id, tasks.project_task_index, ",
    "COALESCE(latest_task_events.state, $2) AS state ",
    "FROM tasks ",
    "LEFT JOIN latest_task_events ON latest_task_events.task_id = tasks.id ",
    "WHERE tasks.project_id = $1 ",
    "ORDER BY tasks.project_task_index",
);

const PENDING_TASKS_SQL: &str = concat!(
    "WITH authored_tasks AS (",
    "SELECT tasks.id, tasks.project_id, tasks.project_task_index FROM tasks ",
    "JOIN projects ON projects.id = tasks.project_id ",
    "WHERE projects.author_id = $1",
    "), latest_task_events AS (",
    "SELECT DISTINCT ON (task_events.task_id) task_events.* FROM task_events ",
    "JOIN authored_tasks ON authored_tasks.id = task_events.task_id ",
    "AND authored_tasks.project_id = task_events.project_id ",
    "ORDER BY task_events.task_id, task_events.created_at DESC, task_events.sequence DESC",
    ") ",
    "SELECT authored_tasks.project_task_index, latest_task_events.event_id, ",
    "latest_task_events.project_id, latest_task_events.task_id, latest_task_events.user_id, ",
    "latest_task_events.state, latest_task_events.comment, latest_task_events.created_at, ",
    "latest_task_events.sequence ",
    "FROM authored_tasks ",
    "JOIN latest_task_events ON latest_task_events.task_id = authored_tasks.id ",
    "WHERE latest_task_events.state = $2 ",
    "ORDER BY authored_tasks.project_task_index, authored_tasks.project_id",
);

impl From<diesel::result::Error> for TaskRepositoryError {
    fn from(err: diesel::result::Error) -> Self {
        Self::persistence(err)
    }
}

/// Takes a row lock on the task for the rest of the transaction.
fn lock_task(
    connection: &mut PgConnection,
    project_id: ProjectId,
    task_id: TaskId,
) -> TaskRepositoryResult<()> {
    let locked = tasks::table
        .filter(tasks::id.eq(task_id.into_inner()))
        .filter(tasks::project_id.eq(project_id.into_inner()))
        .select(tasks::id)
        .for_update()
        .first::<uuid::Uuid>(connection)
        .optional()?;
    locked.map(|_| ()).ok_or(TaskRepositoryError::TaskNotFound {
        project_id,
        task_id,
    })
}

/// Runs the guarded update-or-append statement for `transition`.
pub(super) fn update_or_append(
    connection: &mut PgConnection,
    transition: &StateTransition,
) -> TaskRepositoryResult<TransitionRow> {
    connection.transaction::<_, TaskRepositoryError, _>(|tx| {
        lock_task(tx, transition.project_id, transition.task_id)?;
        let row = diesel::sql_query(UPDATE_OR_APPEND_SQL)
            .bind::<SqlUuid, _>(transition.project_id.into_inner())
            .bind::<SqlUuid, _>(transition.task_id.into_inner())
            .bind::<Varchar, _>(transition.user_id.as_str())
            .bind::<Nullable<Text>, _>(transition.comment.as_deref())
            .bind::<Varchar, _>(transition.final_state.as_str())
            .bind::<Varchar, _>(transition.initial_state.as_str())
            .bind::<Bool, _>(transition.policy.collapses())
            .get_result::<TransitionRow>(tx)
            .optional()?;
        row.ok_or_else(|| {
            TaskRepositoryError::consistency(format!(
                "transition of task {} produced no event row",
                transition.task_id
            ))
        })
    })
}

/// Runs the request-to-lock statement for `request`.
pub(super) fn request_mapping(
    connection: &mut PgConnection,
    request: &MappingRequest,
) -> TaskRepositoryResult<MappingRequestRow> {
    connection.transaction::<_, TaskRepositoryError, _>(|tx| {
        lock_task(tx, request.project_id, request.task_id)?;
        let row = diesel::sql_query(REQUEST_MAPPING_SQL)
            .bind::<SqlUuid, _>(request.project_id.into_inner())
            .bind::<SqlUuid, _>(request.task_id.into_inner())
            .bind::<Varchar, _>(request.user_id.as_str())
            .bind::<Nullable<Text>, _>(request.comment.as_deref())
            .bind::<Varchar, _>(TaskState::RequestForMapping.as_str())
            .bind::<Varchar, _>(TaskState::UnlockedToMap.as_str())
            .get_result::<MappingRequestRow>(tx)?;
        Ok(row)
    })
}

/// Resolves the state of every task in a project.
pub(super) fn all_task_states(
    connection: &mut PgConnection,
    project_id: ProjectId,
) -> TaskRepositoryResult<Vec<TaskStateRow>> {
    let rows = diesel::sql_query(ALL_TASK_STATES_SQL)
        .bind::<SqlUuid, _>(project_id.into_inner())
        .bind::<Varchar, _>(TaskState::SENTINEL.as_str())
        .load::<TaskStateRow>(connection)?;
    Ok(rows)
}

/// Lists tasks of `author_id`'s projects whose latest event is in `state`.
pub(super) fn pending_tasks(
    connection: &mut PgConnection,
    author_id: &ActorId,
    state: TaskState,
) -> TaskRepositoryResult<Vec<PendingTaskRow>> {
    let rows = diesel::sql_query(PENDING_TASKS_SQL)
        .bind::<Varchar, _>(author_id.as_str())
        .bind::<Varchar, _>(state.as_str())
        .load::<PendingTaskRow>(connection)?;
    Ok(rows)
}
