//! Unit tests for the task state-transition engine.
