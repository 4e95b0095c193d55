//! Unit tests for boardcheck configuration types.
//!
//! This module contains tests organised into:
//! - [`helpers`] - Shared fixtures and helper functions
//! - [`types_tests`] - Defaults and TOML parsing
//! - [`layer_precedence_tests`] - `MergeComposer` layer precedence tests

mod helpers;
mod types_tests;
