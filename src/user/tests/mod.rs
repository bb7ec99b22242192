//! Unit tests for user accounts and profiles.
