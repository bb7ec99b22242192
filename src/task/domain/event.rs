//! Task events and the latest-state resolution rules over them.

use super::{ActorId, EventId, ProjectId, TaskId, TaskIndex, TaskState};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// A recorded task state change.
///
/// Events are append-only with one exception: a same-actor continuation may
/// rewrite the latest event in place (see
/// [`ContinuationPolicy`](super::ContinuationPolicy)).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskEvent {
    /// Store-generated event identifier.
    pub event_id: EventId,
    /// Project owning the task.
    pub project_id: ProjectId,
    /// Task the event applies to.
    pub task_id: TaskId,
    /// Actor who caused the transition.
    pub user_id: ActorId,
    /// State the task entered.
    pub state: TaskState,
    /// Optional free-text comment.
    pub comment: Option<String>,
    /// Authoritative ordering timestamp.
    pub created_at: DateTime<Utc>,
    /// Store-assigned insertion sequence, used to break timestamp ties.
    pub sequence: u64,
}

impl TaskEvent {
    /// Compares two events by recency: timestamp first, then sequence.
    #[must_use]
    pub fn cmp_recency(&self, other: &Self) -> Ordering {
        self.created_at
            .cmp(&other.created_at)
            .then(self.sequence.cmp(&other.sequence))
    }
}

/// Returns the most recent event among `events`.
///
/// Recency follows [`TaskEvent::cmp_recency`], so two events sharing a
/// timestamp resolve to the later insertion.
pub fn latest_event<'a, I>(events: I) -> Option<&'a TaskEvent>
where
    I: IntoIterator<Item = &'a TaskEvent>,
{
    events.into_iter().max_by(|left, right| left.cmp_recency(right))
}

/// Resolves a task's current state from its latest event.
#[must_use]
pub fn resolve_state(latest: Option<&TaskEvent>) -> TaskState {
    latest.map_or(TaskState::SENTINEL, |event| event.state)
}

/// Resolved current state of one task in a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskStateView {
    /// Project owning the task.
    pub project_id: ProjectId,
    /// Task identifier.
    pub task_id: TaskId,
    /// Position of the task inside the project.
    pub project_task_index: TaskIndex,
    /// State of the latest event, or the sentinel.
    pub state: TaskState,
}

/// A task whose latest event is in the state awaiting the author's action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingTask {
    /// Position of the task inside its project.
    pub project_task_index: TaskIndex,
    /// The latest event of the task.
    pub event: TaskEvent,
}
