//! Diesel row models for the task event store.

use super::schema::{projects, task_events, tasks};
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Query result row for task events.
#[derive(Debug, Clone, Queryable, QueryableByName, Selectable)]
#[diesel(table_name = task_events)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskEventRow {
    /// Event identifier.
    #[diesel(sql_type = diesel::sql_types::Uuid)]
    pub event_id: uuid::Uuid,
    /// Owning project.
    #[diesel(sql_type = diesel::sql_types::Uuid)]
    pub project_id: uuid::Uuid,
    /// Task the event applies to.
    #[diesel(sql_type = diesel::sql_types::Uuid)]
    pub task_id: uuid::Uuid,
    /// Actor who caused the transition.
    #[diesel(sql_type = diesel::sql_types::Varchar)]
    pub user_id: String,
    /// Lifecycle state name.
    #[diesel(sql_type = diesel::sql_types::Varchar)]
    pub state: String,
    /// Optional comment.
    #[diesel(sql_type = diesel::sql_types::Nullable<diesel::sql_types::Text>)]
    pub comment: Option<String>,
    /// Ordering timestamp.
    #[diesel(sql_type = diesel::sql_types::Timestamptz)]
    pub created_at: DateTime<Utc>,
    /// Insertion sequence.
    #[diesel(sql_type = diesel::sql_types::BigInt)]
    pub sequence: i64,
}

/// Result row of the guarded update-or-append statement.
#[derive(Debug, Clone, QueryableByName)]
pub struct TransitionRow {
    /// The event as stored after the statement.
    #[diesel(embed)]
    pub event: TaskEventRow,
    /// `true` when the latest event was rewritten in place.
    #[diesel(sql_type = diesel::sql_types::Bool)]
    pub collapsed: bool,
}

/// Result row of the request-to-lock statement.
///
/// Always exactly one row: the inserted event, or the holder of the latest
/// event when the guard rejected the request.
#[derive(Debug, Clone, QueryableByName)]
pub struct MappingRequestRow {
    /// Event inserted by the request, if the guard passed.
    #[diesel(sql_type = diesel::sql_types::Nullable<diesel::sql_types::Uuid>)]
    pub inserted_event_id: Option<uuid::Uuid>,
    /// Comment stored with the inserted event.
    #[diesel(sql_type = diesel::sql_types::Nullable<diesel::sql_types::Text>)]
    pub inserted_comment: Option<String>,
    /// Actor of the latest event read by the guard.
    #[diesel(sql_type = diesel::sql_types::Nullable<diesel::sql_types::Varchar>)]
    pub holder_user_id: Option<String>,
    /// State of the latest event read by the guard.
    #[diesel(sql_type = diesel::sql_types::Nullable<diesel::sql_types::Varchar>)]
    pub holder_state: Option<String>,
}

/// Resolved state of one task.
#[derive(Debug, Clone, QueryableByName)]
pub struct TaskStateRow {
    /// Task identifier.
    #[diesel(sql_type = diesel::sql_types::Uuid)]
    pub task_id: uuid::Uuid,
    /// Position of the task inside the project.
    #[diesel(sql_type = diesel::sql_types::Integer)]
    pub project_task_index: i32,
    /// Latest state name, or the sentinel.
    #[diesel(sql_type = diesel::sql_types::Varchar)]
    pub state: String,
}

/// Latest event of a task awaiting its author's action.
#[derive(Debug, Clone, QueryableByName)]
pub struct PendingTaskRow {
    /// Position of the task inside its project.
    #[diesel(sql_type = diesel::sql_types::Integer)]
    pub project_task_index: i32,
    /// Latest event of the task.
    #[diesel(embed)]
    pub event: TaskEventRow,
}

/// Query result row for projects.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = projects)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ProjectRow {
    /// Project identifier.
    pub id: uuid::Uuid,
    /// Project name.
    pub name: String,
    /// Authoring actor.
    pub author_id: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Insert model for projects.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = projects)]
pub struct NewProjectRow {
    /// Project identifier.
    pub id: uuid::Uuid,
    /// Project name.
    pub name: String,
    /// Authoring actor.
    pub author_id: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Insert model for tasks.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = tasks)]
pub struct NewTaskRow {
    /// Task identifier.
    pub id: uuid::Uuid,
    /// Owning project.
    pub project_id: uuid::Uuid,
    /// Position inside the project.
    pub project_task_index: i32,
}
