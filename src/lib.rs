//! Fieldtask: task coordination for drone mapping projects.
//!
//! Projects are split into indexed tasks which pilots request, map, and hand
//! over for validation. Every state change is an event; a task's current
//! state is its latest event. The transition primitives decide and write in
//! one atomic unit so that concurrent pilots cannot both lock a task.
//!
//! # Architecture
//!
//! Each bounded context follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for persistence
//! - **Adapters**: In-memory and `PostgreSQL` implementations of the ports
//! - **Services**: Orchestration used by request handlers
//!
//! # Modules
//!
//! - [`task`]: Task lifecycle events, transitions, and state queries
//! - [`user`]: Accounts created on sign-in and their profiles
//! - [`config`]: Store configuration and connection pooling
//! - [`migrations`]: Embedded SQL schema

pub mod config;
pub mod migrations;
pub mod task;
pub mod user;
