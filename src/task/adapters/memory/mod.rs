//! In-memory adapters for the task state-transition engine.

mod events;

pub use events::InMemoryTaskRepository;
