//! Task lifecycle states.

use super::ParseTaskStateError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Task lifecycle state recorded by each task event.
///
/// A task's current state is never stored directly; it is the state of the
/// latest event recorded for the task, or [`TaskState::SENTINEL`] when the
/// task has no events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskState {
    /// A pilot has asked the project author for permission to map the task.
    RequestForMapping,
    /// The task is free to be mapped.
    UnlockedToMap,
    /// The task is locked by the actor mapping it.
    LockedForMapping,
    /// Mapping is complete and the task awaits validation.
    UnlockedToValidate,
    /// The task is locked by the actor validating it.
    LockedForValidation,
    /// The task has been mapped and validated.
    UnlockedDone,
    /// The task cannot be flown.
    UnflyableTask,
}

impl TaskState {
    /// State assumed for a task with no recorded events.
    pub const SENTINEL: Self = Self::UnlockedToMap;

    /// Every state in declaration order.
    pub const ALL: [Self; 7] = [
        Self::RequestForMapping,
        Self::UnlockedToMap,
        Self::LockedForMapping,
        Self::UnlockedToValidate,
        Self::LockedForValidation,
        Self::UnlockedDone,
        Self::UnflyableTask,
    ];

    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RequestForMapping => "REQUEST_FOR_MAPPING",
            Self::UnlockedToMap => "UNLOCKED_TO_MAP",
            Self::LockedForMapping => "LOCKED_FOR_MAPPING",
            Self::UnlockedToValidate => "UNLOCKED_TO_VALIDATE",
            Self::LockedForValidation => "LOCKED_FOR_VALIDATION",
            Self::UnlockedDone => "UNLOCKED_DONE",
            Self::UnflyableTask => "UNFLYABLE_TASK",
        }
    }

    /// Returns `true` when an actor currently holds the task.
    #[must_use]
    pub const fn is_locked(self) -> bool {
        matches!(self, Self::LockedForMapping | Self::LockedForValidation)
    }
}

impl Default for TaskState {
    fn default() -> Self {
        Self::SENTINEL
    }
}

impl TryFrom<&str> for TaskState {
    type Error = ParseTaskStateError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|state| state.as_str() == normalized)
            .ok_or_else(|| ParseTaskStateError(value.to_owned()))
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
