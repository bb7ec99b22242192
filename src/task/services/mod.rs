//! Application services for the task state-transition engine.

mod lifecycle;

pub use lifecycle::{
    CreateProjectRequest, CreatedProject, TaskLifecycleError, TaskLifecycleResult,
    TaskLifecycleService,
};
