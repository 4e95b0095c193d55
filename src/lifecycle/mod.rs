//! Fixture lifecycle management.
//!
//! Scenario tags are classified once into a [`ScenarioCategory`]; the
//! category selects setup and teardown from a lookup table. Run-level state
//! (the shared board and list) lives in a [`RunContext`] that hooks receive
//! explicitly, together with the [`RunDeadline`] that bounds setup and
//! scenario bodies.
//!
//! | Tags                                   | Category       |
//! |----------------------------------------|----------------|
//! | `@skip`                                | `Skipped`      |
//! | none of the fixture tags               | `Untagged`     |
//! | `@board`                               | `BoardShared`  |
//! | `@board-create`, `@board-destructive`  | `BoardPrivate` |
//! | `@card`                                | `CardShared`   |
//! | `@card-create`, `@card-destructive`    | `CardPrivate`  |

mod category;
mod hooks;
mod shared;

pub use category::{ScenarioCategory, Tag, UnknownTag};
pub use hooks::{
    FIXTURE_CARD_NAME, HOOKS, HookEntry, Lifecycle, ResourceKind, ScenarioOutcome,
    ScenarioResult, SetupStage, TeardownFailure, TeardownReport, TeardownStage, hooks_for,
};
pub use shared::{RunContext, RunDeadline, SharedFixture};
