//! Behaviour behind each step phrase.
//!
//! Every function takes the scenario's [`ScenarioContext`](crate::context::ScenarioContext),
//! checks its preconditions, then either issues a request, stores an
//! extracted value or asserts against the last response. The behavioural
//! suite under `tests/` binds the phrases to these functions; the smoke
//! runner calls them directly.

pub mod board;
pub mod card;
pub mod common;
