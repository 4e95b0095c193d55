//! Scenario-level setup and teardown.
//!
//! Each [`ScenarioCategory`] maps to exactly one [`HookEntry`] in a static
//! table. An entry lists its setup stages in dependency order (session, then
//! board, then list, then card) and the teardown stages that undo them.
//! Teardown is best-effort: every owned resource is attempted independently
//! and failures are collected into a [`TeardownReport`].

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::time::Duration;

use futures_util::FutureExt;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::api::{BoardResource, BoxFuture, CardResource};
use crate::context::ScenarioContext;
use crate::error::{BoardcheckError, Result};
use crate::lifecycle::category::ScenarioCategory;
use crate::lifecycle::shared::RunContext;

/// Name given to the card created for card scenarios.
pub const FIXTURE_CARD_NAME: &str = "New_Card";

/// One step of scenario setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupStage {
    /// Open the scenario's session.
    OpenSession,
    /// Bind the shared board's id and name.
    BindSharedBoard,
    /// Create a board owned by the scenario.
    CreatePrivateBoard,
    /// Bind the shared board's first list.
    BindSharedList,
    /// Look up the first list of the scenario's board.
    BindFirstList,
    /// Create a card owned by the scenario on the bound list.
    CreateCard,
}

impl SetupStage {
    /// Position in the dependency order; stages never run after a stage of
    /// higher rank.
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::OpenSession => 0,
            Self::BindSharedBoard | Self::CreatePrivateBoard => 1,
            Self::BindSharedList | Self::BindFirstList => 2,
            Self::CreateCard => 3,
        }
    }
}

/// One step of scenario teardown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeardownStage {
    /// Delete every card the scenario owns.
    DeleteOwnedCards,
    /// Delete every board the scenario owns.
    DeleteOwnedBoards,
    /// Dispose of the session.
    CloseSession,
}

/// Setup and teardown for one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HookEntry {
    /// The category this entry serves.
    pub category: ScenarioCategory,
    /// Setup stages, in order.
    pub setup: &'static [SetupStage],
    /// Teardown stages, in order.
    pub teardown: &'static [TeardownStage],
}

const RELEASE_ALL: &[TeardownStage] = &[
    TeardownStage::DeleteOwnedCards,
    TeardownStage::DeleteOwnedBoards,
    TeardownStage::CloseSession,
];

static NO_HOOKS: HookEntry = HookEntry {
    category: ScenarioCategory::Untagged,
    setup: &[],
    teardown: &[],
};

/// The dispatch table.
pub static HOOKS: [HookEntry; 6] = [
    HookEntry {
        category: ScenarioCategory::Skipped,
        setup: &[],
        teardown: &[],
    },
    HookEntry {
        category: ScenarioCategory::Untagged,
        setup: &[],
        teardown: &[],
    },
    HookEntry {
        category: ScenarioCategory::BoardShared,
        setup: &[SetupStage::OpenSession, SetupStage::BindSharedBoard],
        teardown: RELEASE_ALL,
    },
    HookEntry {
        category: ScenarioCategory::BoardPrivate,
        setup: &[SetupStage::OpenSession, SetupStage::CreatePrivateBoard],
        teardown: RELEASE_ALL,
    },
    HookEntry {
        category: ScenarioCategory::CardShared,
        setup: &[
            SetupStage::OpenSession,
            SetupStage::BindSharedBoard,
            SetupStage::BindSharedList,
            SetupStage::CreateCard,
        ],
        teardown: RELEASE_ALL,
    },
    HookEntry {
        category: ScenarioCategory::CardPrivate,
        setup: &[
            SetupStage::OpenSession,
            SetupStage::CreatePrivateBoard,
            SetupStage::BindFirstList,
            SetupStage::CreateCard,
        ],
        teardown: RELEASE_ALL,
    },
];

/// Look up the hooks for `category`.
#[must_use]
pub fn hooks_for(category: ScenarioCategory) -> &'static HookEntry {
    HOOKS
        .iter()
        .find(|entry| entry.category == category)
        .unwrap_or(&NO_HOOKS)
}

/// The kind of resource a teardown failure concerns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    /// A board.
    Board,
    /// A card.
    Card,
}

/// A resource teardown could not delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeardownFailure {
    /// What was being deleted.
    pub kind: ResourceKind,
    /// Its identifier.
    pub id: String,
    /// Why the delete failed.
    pub reason: String,
}

/// What teardown did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeardownReport {
    /// Resources deleted, in order.
    pub deleted: Vec<(ResourceKind, String)>,
    /// Resources that could not be deleted.
    pub failures: Vec<TeardownFailure>,
}

impl TeardownReport {
    /// Whether every delete succeeded.
    #[must_use]
    pub const fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    fn record(&mut self, kind: ResourceKind, id: String, result: Result<()>) {
        match result {
            Ok(()) => self.deleted.push((kind, id)),
            Err(e) => {
                warn!(?kind, %id, error = %e, "teardown could not delete resource");
                self.failures.push(TeardownFailure {
                    kind,
                    id,
                    reason: e.to_string(),
                });
            }
        }
    }
}

/// How a scenario ended.
#[derive(Debug)]
pub enum ScenarioResult {
    /// Setup and body succeeded.
    Passed,
    /// Setup or body failed.
    Failed(BoardcheckError),
    /// The scenario was tagged `@skip`.
    Skipped,
}

/// The result of [`Lifecycle::run_scenario`].
#[derive(Debug)]
pub struct ScenarioOutcome {
    /// The category the tags classified into.
    pub category: ScenarioCategory,
    /// Pass, fail or skip.
    pub result: ScenarioResult,
    /// What teardown did.
    pub teardown: TeardownReport,
}

impl ScenarioOutcome {
    /// Whether the scenario did not fail. Teardown failures do not count.
    #[must_use]
    pub const fn succeeded(&self) -> bool {
        !matches!(self.result, ScenarioResult::Failed(_))
    }
}

/// Runs scenario hooks against one run's shared state.
#[derive(Debug, Clone, Copy)]
pub struct Lifecycle<'r> {
    run: &'r RunContext,
}

impl<'r> Lifecycle<'r> {
    /// Bind the lifecycle to a run.
    #[must_use]
    pub const fn new(run: &'r RunContext) -> Self {
        Self { run }
    }

    /// A fresh context for one scenario.
    #[must_use]
    pub fn new_context(&self) -> ScenarioContext {
        ScenarioContext::new(self.run.session().transport())
    }

    /// Run every setup stage for `category`, stopping at the first failure.
    ///
    /// # Errors
    ///
    /// Returns the failing stage's error. Resources created by earlier stages
    /// stay recorded in the context so teardown can remove them.
    pub async fn setup(&self, category: ScenarioCategory, ctx: &mut ScenarioContext) -> Result<()> {
        for stage in hooks_for(category).setup {
            debug!(?stage, %category, "running setup stage");
            self.run_setup_stage(*stage, ctx).await?;
        }
        Ok(())
    }

    async fn run_setup_stage(&self, stage: SetupStage, ctx: &mut ScenarioContext) -> Result<()> {
        match stage {
            SetupStage::OpenSession => ctx.open_session(self.run.open_session()),
            SetupStage::BindSharedBoard => ctx.bind_shared_board(self.run.shared()?),
            SetupStage::BindSharedList => ctx.bind_shared_list(self.run.shared()?),
            SetupStage::CreatePrivateBoard => create_private_board(ctx).await?,
            SetupStage::BindFirstList => {
                let board_id = ctx.require_board_id()?.to_owned();
                let list_id = ctx.boards()?.first_list(&board_id).await?;
                ctx.list_id = Some(list_id);
            }
            SetupStage::CreateCard => create_fixture_card(ctx).await?,
        }
        Ok(())
    }

    /// Undo `category`'s setup.
    ///
    /// Never fails: each delete is attempted on its own, bounded by the run's
    /// teardown timeout, and failures are logged and reported.
    pub async fn teardown(
        &self,
        category: ScenarioCategory,
        ctx: &mut ScenarioContext,
    ) -> TeardownReport {
        let mut report = TeardownReport::default();
        let limit = self.run.teardown_timeout();
        // Steps may have altered the cached resource objects' credentials.
        ctx.reset_resources();
        for stage in hooks_for(category).teardown {
            debug!(?stage, %category, "running teardown stage");
            match stage {
                TeardownStage::DeleteOwnedCards => {
                    delete_owned_cards(ctx, limit, &mut report).await;
                }
                TeardownStage::DeleteOwnedBoards => {
                    delete_owned_boards(ctx, limit, &mut report).await;
                }
                TeardownStage::CloseSession => ctx.close_session(),
            }
        }
        report
    }

    /// Classify `tags`, run setup, the body and teardown.
    ///
    /// Setup and the body share the run's deadline; when it is reached they
    /// are abandoned and the scenario fails with a timeout. Teardown runs
    /// whether setup or the body failed or timed out. A panic in the body is
    /// resumed after teardown has run.
    pub async fn run_scenario<I, S, F>(&self, tags: I, body: F) -> ScenarioOutcome
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
        F: for<'c> FnOnce(&'c mut ScenarioContext) -> BoxFuture<'c, Result<()>>,
    {
        let category = ScenarioCategory::from_tags(tags);
        if !category.runs() {
            info!(%category, "scenario skipped");
            return ScenarioOutcome {
                category,
                result: ScenarioResult::Skipped,
                teardown: TeardownReport::default(),
            };
        }

        let mut ctx = self.new_context();
        let attempt = AssertUnwindSafe(self.run.deadline().enforce("scenario", async {
            self.setup(category, &mut ctx).await?;
            body(&mut ctx).await
        }))
        .catch_unwind()
        .await;

        let teardown = self.teardown(category, &mut ctx).await;
        let result = match attempt {
            Ok(Ok(())) => ScenarioResult::Passed,
            Ok(Err(e)) => ScenarioResult::Failed(e),
            Err(panic) => std::panic::resume_unwind(panic),
        };
        ScenarioOutcome {
            category,
            result,
            teardown,
        }
    }
}

async fn create_private_board(ctx: &mut ScenarioContext) -> Result<()> {
    let boards = ctx.boards()?.clone();
    let response = boards.create_board(None).await?;
    let board_id = BoardResource::extract_board_id(&response)?;
    ctx.own_board(&board_id);
    ctx.board_name = response.string_field("name")?;
    info!(%board_id, "created scenario board");
    ctx.board_id = Some(board_id);
    Ok(())
}

async fn create_fixture_card(ctx: &mut ScenarioContext) -> Result<()> {
    let list_id = ctx.require_list_id()?.to_owned();
    let cards = ctx.cards()?.clone();
    let response = cards.create_card(&list_id, Some(FIXTURE_CARD_NAME)).await?;
    let card_id = CardResource::extract_card_id(&response)?;
    ctx.own_card(&card_id);
    info!(%card_id, %list_id, "created scenario card");
    ctx.card_id = Some(card_id);
    Ok(())
}

async fn bounded_delete<T, F>(limit: Duration, delete: F) -> Result<()>
where
    F: Future<Output = Result<T>>,
{
    match timeout(limit, delete).await {
        Ok(result) => result.map(|_| ()),
        Err(_) => Err(BoardcheckError::Timeout {
            stage: String::from("teardown"),
            seconds: limit.as_secs(),
        }),
    }
}

async fn delete_owned_cards(
    ctx: &mut ScenarioContext,
    limit: Duration,
    report: &mut TeardownReport,
) {
    let owned = ctx.owned().cards().to_vec();
    for card_id in owned {
        let result = match ctx.cards() {
            Ok(cards) => bounded_delete(limit, cards.clone().delete_card(&card_id)).await,
            Err(e) => Err(e.into()),
        };
        ctx.release_card(&card_id);
        report.record(ResourceKind::Card, card_id, result);
    }
}

async fn delete_owned_boards(
    ctx: &mut ScenarioContext,
    limit: Duration,
    report: &mut TeardownReport,
) {
    let owned = ctx.owned().boards().to_vec();
    for board_id in owned {
        if ctx.is_shared_board(&board_id) {
            ctx.release_board(&board_id);
            continue;
        }
        let result = match ctx.boards() {
            Ok(boards) => bounded_delete(limit, boards.clone().delete_board(&board_id)).await,
            Err(e) => Err(e.into()),
        };
        ctx.release_board(&board_id);
        report.record(ResourceKind::Board, board_id, result);
    }
}
