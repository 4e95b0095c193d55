//! Behavioural step helpers for board service scenarios.

mod assertions;
mod state;
mod steps;

pub use state::ScenarioWorld;

/// Step result type for board service BDD tests.
pub(crate) type StepResult<T> = Result<T, String>;
