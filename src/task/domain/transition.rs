//! Transition requests, guards, and outcomes.
//!
//! Two primitives move a task through its lifecycle:
//!
//! - the guarded update-or-append, which either rewrites the latest event
//!   (a same-actor continuation) or appends a new one;
//! - the request-to-lock, which appends a [`TaskState::RequestForMapping`]
//!   event only while the task is free.
//!
//! The decision functions here are pure; adapters evaluate them inside the
//! same atomic unit as the write.

use super::{
    ActorId, ParseContinuationPolicyError, ProjectId, TaskEvent, TaskId, TaskState,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How a transition treats a latest event already owned by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContinuationPolicy {
    /// Rewrite the latest event in place when the caller owns it and it is
    /// in the expected initial state; append otherwise.
    #[default]
    CollapseSameActor,
    /// Always append a new event.
    AlwaysAppend,
}

impl ContinuationPolicy {
    /// Returns the canonical name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CollapseSameActor => "collapse_same_actor",
            Self::AlwaysAppend => "always_append",
        }
    }

    /// Returns `true` when same-actor continuations may be collapsed.
    #[must_use]
    pub const fn collapses(self) -> bool {
        matches!(self, Self::CollapseSameActor)
    }
}

impl TryFrom<&str> for ContinuationPolicy {
    type Error = ParseContinuationPolicyError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "collapse_same_actor" => Ok(Self::CollapseSameActor),
            "always_append" => Ok(Self::AlwaysAppend),
            _ => Err(ParseContinuationPolicyError(value.to_owned())),
        }
    }
}

impl fmt::Display for ContinuationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameters of a guarded update-or-append transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateTransition {
    /// Project owning the task.
    pub project_id: ProjectId,
    /// Task to transition.
    pub task_id: TaskId,
    /// Actor requesting the transition.
    pub user_id: ActorId,
    /// Comment recorded with the resulting event.
    pub comment: Option<String>,
    /// State the caller expects its own latest event to be in.
    pub initial_state: TaskState,
    /// State the task enters.
    pub final_state: TaskState,
    /// Continuation handling.
    pub policy: ContinuationPolicy,
}

impl StateTransition {
    /// Creates a transition using the default continuation policy.
    #[must_use]
    pub fn new(
        project_id: ProjectId,
        task_id: TaskId,
        user_id: ActorId,
        initial_state: TaskState,
        final_state: TaskState,
    ) -> Self {
        Self {
            project_id,
            task_id,
            user_id,
            comment: None,
            initial_state,
            final_state,
            policy: ContinuationPolicy::default(),
        }
    }

    /// Sets the event comment.
    #[must_use]
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Sets the continuation policy.
    #[must_use]
    pub const fn with_policy(mut self, policy: ContinuationPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Decides whether the transition rewrites `latest` or appends.
    #[must_use]
    pub fn decide(&self, latest: Option<&TaskEvent>) -> TransitionOutcome {
        let is_continuation = latest.is_some_and(|event| {
            event.user_id == self.user_id && event.state == self.initial_state
        });
        if self.policy.collapses() && is_continuation {
            TransitionOutcome::Updated
        } else {
            TransitionOutcome::Appended
        }
    }
}

/// Parameters of a request-to-lock transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingRequest {
    /// Project owning the task.
    pub project_id: ProjectId,
    /// Task being requested.
    pub task_id: TaskId,
    /// Actor requesting the task.
    pub user_id: ActorId,
    /// Comment recorded with the request event.
    pub comment: Option<String>,
}

impl MappingRequest {
    /// Creates a mapping request without a comment.
    #[must_use]
    pub const fn new(project_id: ProjectId, task_id: TaskId, user_id: ActorId) -> Self {
        Self {
            project_id,
            task_id,
            user_id,
            comment: None,
        }
    }

    /// Sets the request comment.
    #[must_use]
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Evaluates the request-to-lock guard against the latest event.
    ///
    /// The request is permitted when the task has no history or its latest
    /// event is [`TaskState::UnlockedToMap`].
    #[must_use]
    pub fn evaluate(&self, latest: Option<&TaskEvent>) -> MappingGuard {
        match latest {
            None => MappingGuard::Permitted,
            Some(event) if event.state == TaskState::UnlockedToMap => MappingGuard::Permitted,
            Some(event) if event.user_id == self.user_id => MappingGuard::HeldBySelf {
                state: event.state,
            },
            Some(event) => MappingGuard::HeldByOther {
                user_id: event.user_id.clone(),
                state: event.state,
            },
        }
    }
}

/// Result of evaluating the request-to-lock guard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MappingGuard {
    /// The request may be recorded.
    Permitted,
    /// The caller already holds the task.
    HeldBySelf {
        /// Latest state of the task.
        state: TaskState,
    },
    /// Another actor holds the task.
    HeldByOther {
        /// Actor owning the latest event.
        user_id: ActorId,
        /// Latest state of the task.
        state: TaskState,
    },
}

/// Which branch of the update-or-append primitive was taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionOutcome {
    /// The latest event was rewritten in place.
    Updated,
    /// A new event was appended.
    Appended,
}

impl TransitionOutcome {
    /// Returns the canonical name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Updated => "updated",
            Self::Appended => "appended",
        }
    }
}

/// Summary returned to callers after a transition is recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionRecord {
    /// Project owning the task.
    pub project_id: ProjectId,
    /// Transitioned task.
    pub task_id: TaskId,
    /// Comment recorded with the event.
    pub comment: Option<String>,
}

impl From<&TaskEvent> for TransitionRecord {
    fn from(event: &TaskEvent) -> Self {
        Self {
            project_id: event.project_id,
            task_id: event.task_id,
            comment: event.comment.clone(),
        }
    }
}

/// Full result of a guarded update-or-append transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionReceipt {
    /// The event as stored after the transition.
    pub event: TaskEvent,
    /// Which branch was taken.
    pub outcome: TransitionOutcome,
}

impl TransitionReceipt {
    /// Returns the caller-facing summary.
    #[must_use]
    pub fn record(&self) -> TransitionRecord {
        TransitionRecord::from(&self.event)
    }
}

/// Result of a request-to-lock transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MappingRequestOutcome {
    /// The request event was recorded.
    Applied(TransitionRecord),
    /// Nothing was recorded; the caller already holds the task.
    HeldBySelf {
        /// Latest state of the task.
        state: TaskState,
    },
    /// Nothing was recorded; another actor holds the task.
    HeldByOther {
        /// Actor owning the latest event.
        user_id: ActorId,
        /// Latest state of the task.
        state: TaskState,
    },
}

impl MappingRequestOutcome {
    /// Returns `true` when a request event was recorded.
    #[must_use]
    pub const fn is_applied(&self) -> bool {
        matches!(self, Self::Applied(_))
    }
}
