//! Task state-transition engine.
//!
//! Tasks move through a fixed lifecycle (requested, locked, mapped,
//! validated, ...) by appending events to a per-task log. The current state
//! of a task is its latest event. Transitions decide and write atomically
//! inside the store. The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
