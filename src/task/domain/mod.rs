//! Domain model for the task state-transition engine.
//!
//! A task's current state is derived from its event log: the latest event by
//! `created_at` (ties broken by insertion sequence) wins, and tasks without
//! events sit in [`TaskState::SENTINEL`]. All infrastructure concerns stay
//! outside of the domain boundary.

mod error;
mod event;
mod ids;
mod project;
mod state;
mod transition;

pub use error::{ParseContinuationPolicyError, ParseTaskStateError, TaskDomainError};
pub use event::{PendingTask, TaskEvent, TaskStateView, latest_event, resolve_state};
pub use ids::{ActorId, EventId, ProjectId, TaskId, TaskIndex};
pub use project::{Project, ProjectTask};
pub use state::TaskState;
pub use transition::{
    ContinuationPolicy, MappingGuard, MappingRequest, MappingRequestOutcome, StateTransition,
    TransitionOutcome, TransitionReceipt, TransitionRecord,
};
