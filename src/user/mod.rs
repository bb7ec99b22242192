//! User accounts and pilot profiles.
//!
//! Accounts are created on first sign-in from an OAuth identity and carry a
//! separately editable profile. The actor identifiers recorded on task events
//! are the account identifiers managed here.
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
