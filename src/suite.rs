//! Built-in smoke scenarios and the command entry points.
//!
//! The smoke suite runs a fixed set of scenarios through the lifecycle
//! manager against the configured service, so a deployment can be checked
//! without the behavioural test harness. Like the rest of the library these
//! functions never print; the binary renders their reports.

use std::panic::AssertUnwindSafe;
use std::time::Duration;

use futures_util::FutureExt;
use tracing::{info, warn};

use crate::api::{BoxFuture, CardResource, PurgeReport, Session, delete_all_boards};
use crate::config::{AppConfig, CredentialCache, Credentials};
use crate::context::ScenarioContext;
use crate::error::{AssertionError, BoardcheckError, Result};
use crate::lifecycle::{Lifecycle, RunContext, RunDeadline, ScenarioOutcome, ScenarioResult};
use crate::steps::{board, card, common};

/// The body of a smoke scenario, run between its category's setup and
/// teardown.
pub type ScenarioBody = for<'c> fn(&'c mut ScenarioContext) -> BoxFuture<'c, Result<()>>;

/// A scenario the smoke suite runs.
#[derive(Debug, Clone, Copy)]
pub struct SmokeScenario {
    /// Human-readable title.
    pub name: &'static str,
    /// Fixture tags.
    pub tags: &'static [&'static str],
    body: ScenarioBody,
}

impl SmokeScenario {
    /// Describe a scenario.
    #[must_use]
    pub const fn new(
        name: &'static str,
        tags: &'static [&'static str],
        body: ScenarioBody,
    ) -> Self {
        Self { name, tags, body }
    }
}

/// The smoke scenarios, in run order.
pub static SMOKE_SCENARIOS: [SmokeScenario; 8] = [
    SmokeScenario::new("Board lifecycle", &["@board-create"], board_lifecycle),
    SmokeScenario::new("Retrieve the shared board", &["@board"], retrieve_shared_board),
    SmokeScenario::new(
        "Reject board creation with an invalid key",
        &["@board"],
        reject_invalid_key,
    ),
    SmokeScenario::new("Rename a board", &["@board-destructive"], rename_board),
    SmokeScenario::new(
        "Rename a deleted board",
        &["@board-destructive"],
        rename_deleted_board,
    ),
    SmokeScenario::new("Card lifecycle", &["@card-create"], card_lifecycle),
    SmokeScenario::new("Rename a card", &["@card"], rename_card),
    SmokeScenario::new("Delete a card", &["@card-destructive"], delete_card),
];

/// Title of the synthetic check that the shared board survived the run.
pub const SHARED_FIXTURE_CHECK: &str = "Shared board is untouched by destructive scenarios";

/// One scenario's name and outcome.
#[derive(Debug)]
pub struct NamedOutcome {
    /// The scenario title.
    pub name: &'static str,
    /// What happened.
    pub outcome: ScenarioOutcome,
}

/// Everything a smoke run did.
#[derive(Debug, Default)]
pub struct SmokeReport {
    /// Outcomes in run order.
    pub outcomes: Vec<NamedOutcome>,
}

impl SmokeReport {
    /// Scenarios that failed.
    pub fn failures(&self) -> impl Iterator<Item = &NamedOutcome> {
        self.outcomes.iter().filter(|o| !o.outcome.succeeded())
    }

    /// Whether every scenario passed or was skipped.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failures().next().is_none()
    }

    /// Whether any scenario was cut short by the run deadline.
    #[must_use]
    pub fn timed_out(&self) -> bool {
        self.outcomes.iter().any(|o| {
            matches!(
                o.outcome.result,
                ScenarioResult::Failed(BoardcheckError::Timeout { .. })
            )
        })
    }

    /// Number of teardown deletes that failed across the run.
    #[must_use]
    pub fn teardown_failures(&self) -> usize {
        self.outcomes
            .iter()
            .map(|o| o.outcome.teardown.failures.len())
            .sum()
    }
}

/// Validate configuration and credentials without calling the service.
///
/// The result is kept in `credentials` for later commands.
///
/// # Errors
///
/// Returns the configuration error naming every missing value.
pub fn check(config: &AppConfig, credentials: &CredentialCache) -> Result<Credentials> {
    credentials.get_or_resolve(config).cloned()
}

/// Run the smoke suite against the configured service.
///
/// # Errors
///
/// See [`run_scenarios`].
pub async fn smoke(config: &AppConfig, credentials: &CredentialCache) -> Result<SmokeReport> {
    run_scenarios(config, credentials, &SMOKE_SCENARIOS).await
}

/// Run `scenarios` against the configured service, then confirm the shared
/// board survived.
///
/// The shared fixture is created first and deleted last, even when
/// scenarios fail or panic. Setup and scenario bodies are bounded by
/// `run_timeout_secs`; a scenario cut short still has its teardown run.
///
/// # Errors
///
/// Fails on configuration errors, when the shared fixture cannot be
/// created, or when the run reaches its deadline. Scenario failures are
/// reported, not returned.
///
/// # Panics
///
/// Resumes a panic raised by a scenario body once the shared fixture has
/// been removed.
pub async fn run_scenarios(
    config: &AppConfig,
    credentials: &CredentialCache,
    scenarios: &[SmokeScenario],
) -> Result<SmokeReport> {
    let deadline = RunDeadline::after(Duration::from_secs(config.run_timeout_secs));
    let mut run = RunContext::start(config, credentials, deadline).await?;

    let attempt = AssertUnwindSafe(run_smoke(&run, scenarios))
        .catch_unwind()
        .await;

    if let Err(e) = run.after_all().await {
        warn!(error = %e, "failed to remove shared fixture");
    }
    let report = match attempt {
        Ok(report) => report,
        Err(panic) => std::panic::resume_unwind(panic),
    };
    if report.timed_out() {
        return Err(deadline.expired("smoke run"));
    }
    Ok(report)
}

async fn run_smoke(run: &RunContext, scenarios: &[SmokeScenario]) -> SmokeReport {
    let lifecycle = Lifecycle::new(run);
    let shared_before = run.shared().ok().map(|s| s.board_id().to_owned());
    let mut report = SmokeReport::default();

    for scenario in scenarios {
        info!(scenario = scenario.name, "running smoke scenario");
        let outcome = lifecycle
            .run_scenario(scenario.tags.iter().copied(), scenario.body)
            .await;
        if let ScenarioResult::Failed(ref e) = outcome.result {
            warn!(scenario = scenario.name, error = %e, "smoke scenario failed");
        }
        report.outcomes.push(NamedOutcome {
            name: scenario.name,
            outcome,
        });
    }

    let check = lifecycle
        .run_scenario(["@board"], |ctx| {
            Box::pin(verify_shared_board(ctx, shared_before))
        })
        .await;
    report.outcomes.push(NamedOutcome {
        name: SHARED_FIXTURE_CHECK,
        outcome: check,
    });
    report
}

/// Delete every board of the authenticated member.
///
/// # Errors
///
/// Fails on configuration errors or when the boards cannot be listed.
pub async fn purge(config: &AppConfig, credentials: &CredentialCache) -> Result<PurgeReport> {
    let session = Session::open(credentials.get_or_resolve(config)?)?;
    let report = delete_all_boards(&session).await;
    session.close();
    report
}

async fn verify_shared_board(ctx: &mut ScenarioContext, expected: Option<String>) -> Result<()> {
    let actual = ctx.require_board_id()?.to_owned();
    let expected_id = expected.unwrap_or_default();
    if actual != expected_id {
        return Err(AssertionError::Mismatch {
            field: String::from("shared board id"),
            expected: expected_id,
            actual,
        }
        .into());
    }
    board::get_board(ctx).await?;
    common::assert_success(ctx)?;
    board::assert_board_information(ctx)
}

fn board_lifecycle(ctx: &mut ScenarioContext) -> BoxFuture<'_, Result<()>> {
    Box::pin(async move {
        board::authenticate(ctx)?;
        board::create_board(ctx).await?;
        common::assert_success(ctx)?;
        board::store_board_id(ctx)?;
        board::get_board(ctx).await?;
        common::assert_success(ctx)?;
        board::assert_board_information(ctx)?;
        board::delete_board(ctx).await?;
        common::assert_success(ctx)?;
        board::assert_board_deleted(ctx).await
    })
}

fn retrieve_shared_board(ctx: &mut ScenarioContext) -> BoxFuture<'_, Result<()>> {
    Box::pin(async move {
        board::require_board(ctx)?;
        board::get_board(ctx).await?;
        common::assert_success(ctx)?;
        board::assert_board_information(ctx)
    })
}

fn reject_invalid_key(ctx: &mut ScenarioContext) -> BoxFuture<'_, Result<()>> {
    Box::pin(async move {
        board::use_invalid_api_key(ctx)?;
        board::create_board_unauthorized(ctx).await?;
        common::assert_unauthorized(ctx)?;
        common::assert_body_contains(ctx, common::INVALID_KEY_MESSAGE)
    })
}

fn rename_board(ctx: &mut ScenarioContext) -> BoxFuture<'_, Result<()>> {
    Box::pin(async move {
        board::require_board(ctx)?;
        board::update_board_name(ctx).await?;
        common::assert_success(ctx)?;
        board::get_board(ctx).await?;
        board::assert_updated_board_name(ctx)
    })
}

fn rename_deleted_board(ctx: &mut ScenarioContext) -> BoxFuture<'_, Result<()>> {
    Box::pin(async move {
        board::delete_board(ctx).await?;
        board::update_deleted_board_name(ctx).await?;
        common::assert_status(ctx, 404)
    })
}

fn card_lifecycle(ctx: &mut ScenarioContext) -> BoxFuture<'_, Result<()>> {
    Box::pin(async move {
        card::require_board_and_list(ctx).await?;
        let board_id = ctx.require_board_id()?.to_owned();
        let lists = ctx.boards()?.clone().lists_on_board(&board_id).await?;
        if lists.is_empty() {
            return Err(AssertionError::InvalidIdentifier {
                what: String::from("List ID"),
            }
            .into());
        }
        card::create_card(ctx).await?;
        common::assert_success(ctx)?;
        card::store_card_id(ctx)?;
        let created_name = ctx
            .require_response()?
            .string_field("name")?
            .unwrap_or_default();
        card::get_card(ctx).await?;
        common::assert_success(ctx)?;
        card::assert_card_information(ctx)?;
        CardResource::assert_card_name(ctx.require_response()?, &created_name)?;
        card::delete_card(ctx).await?;
        common::assert_success(ctx)?;
        card::assert_card_deleted(ctx).await
    })
}

fn rename_card(ctx: &mut ScenarioContext) -> BoxFuture<'_, Result<()>> {
    Box::pin(async move {
        card::require_card(ctx)?;
        card::update_card_name(ctx).await?;
        common::assert_success(ctx)?;
        card::assert_updated_card_name(ctx)
    })
}

fn delete_card(ctx: &mut ScenarioContext) -> BoxFuture<'_, Result<()>> {
    Box::pin(async move {
        card::require_card(ctx)?;
        card::delete_card(ctx).await?;
        common::assert_success(ctx)?;
        card::assert_card_deleted(ctx).await
    })
}
