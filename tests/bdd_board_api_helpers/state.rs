//! Run-wide state and the per-scenario world for board service scenarios.
//!
//! The test harness has no global hooks, so the run is modelled explicitly:
//! the first scenario to start creates the shared fixture and the last one
//! in flight deletes it again. Each world runs its category's setup when it
//! is built and its teardown when it is dropped, which also happens when a
//! step fails and the scenario unwinds.

use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};

use boardcheck::api::BoxFuture;
use boardcheck::config::{AppConfig, Cli, Commands, CredentialCache, load_config};
use boardcheck::context::ScenarioContext;
use boardcheck::error::Result as BoardcheckResult;
use boardcheck::lifecycle::{Lifecycle, RunContext, RunDeadline, ScenarioCategory};
use tokio::runtime::Runtime;
use tracing::warn;
use wiremock::MockServer;

use super::StepResult;
use crate::fake_api::FakeBoardApi;

/// Environment variable switching the suite to the live service.
const LIVE_VAR: &str = "BOARDCHECK_LIVE";

/// What the suite talks to.
enum Backend {
    /// In-process fake; the server is kept alive for the whole run.
    Fake {
        _api: FakeBoardApi,
        _server: MockServer,
    },
    /// The configured service.
    Live,
}

#[derive(Default)]
struct SharedRun {
    run: Option<RunContext>,
    active: usize,
}

/// Process-wide resources shared by every scenario.
struct Suite {
    runtime: Runtime,
    _backend: Backend,
    config: AppConfig,
    credentials: CredentialCache,
    shared: Mutex<SharedRun>,
}

static SUITE: OnceLock<Result<Suite, String>> = OnceLock::new();

impl Suite {
    fn get() -> Result<&'static Self, String> {
        SUITE.get_or_init(Self::build).as_ref().map_err(Clone::clone)
    }

    fn build() -> Result<Self, String> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .map_err(|e| format!("failed to start the test runtime: {e}"))?;

        let live = std::env::var(LIVE_VAR).is_ok_and(|v| v == "1");
        let (backend, config) = if live {
            let cli = Cli {
                command: Commands::Smoke,
                config: None,
                base_url: None,
            };
            let config = load_config(&cli).map_err(|e| e.to_string())?;
            (Backend::Live, config)
        } else {
            let api = FakeBoardApi::new();
            let server = runtime.block_on(api.serve());
            let config = FakeBoardApi::config(&server);
            (
                Backend::Fake {
                    _api: api,
                    _server: server,
                },
                config,
            )
        };

        // Credentials are resolved once for the whole run.
        let credentials = CredentialCache::new();
        credentials
            .get_or_resolve(&config)
            .map_err(|e| e.to_string())?;

        Ok(Self {
            runtime,
            _backend: backend,
            config,
            credentials,
            shared: Mutex::new(SharedRun::default()),
        })
    }

    fn lock(&self) -> MutexGuard<'_, SharedRun> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Join the run, creating the shared fixture if nobody holds it.
    fn acquire<T>(&self, f: impl FnOnce(&RunContext) -> T) -> Result<T, String> {
        let mut guard = self.lock();
        if guard.run.is_none() {
            let run = self
                .runtime
                .block_on(RunContext::start(
                    &self.config,
                    &self.credentials,
                    RunDeadline::unbounded(),
                ))
                .map_err(|e| format!("shared fixture could not be created: {e}"))?;
            guard.run = Some(run);
        }
        let run = guard
            .run
            .as_ref()
            .ok_or_else(|| String::from("shared fixture is unavailable"))?;
        let value = f(run);
        guard.active += 1;
        Ok(value)
    }

    /// Leave the run, deleting the shared fixture when nobody else holds it.
    fn release(&self, f: impl FnOnce(&RunContext)) {
        let mut guard = self.lock();
        if let Some(run) = guard.run.as_ref() {
            f(run);
        }
        guard.active = guard.active.saturating_sub(1);
        if guard.active > 0 {
            return;
        }
        if let Some(mut run) = guard.run.take() {
            if let Err(e) = self.runtime.block_on(run.after_all()) {
                warn!(error = %e, "failed to remove shared fixture");
            }
        }
    }
}

/// Per-scenario world handed to every step.
pub struct ScenarioWorld {
    suite: Option<&'static Suite>,
    category: ScenarioCategory,
    ctx: Option<ScenarioContext>,
    setup_error: Option<String>,
}

impl ScenarioWorld {
    /// Join the run and perform `category`'s setup.
    ///
    /// Failures are recorded rather than raised so that the first step
    /// reports them as a scenario failure.
    pub fn start(category: ScenarioCategory) -> Self {
        let suite = match Suite::get() {
            Ok(suite) => suite,
            Err(e) => return Self::failed(category, e),
        };
        let joined = suite.acquire(|run| {
            let lifecycle = Lifecycle::new(run);
            let mut ctx = lifecycle.new_context();
            let setup = suite.runtime.block_on(lifecycle.setup(category, &mut ctx));
            (ctx, setup)
        });
        match joined {
            Ok((ctx, setup)) => Self {
                suite: Some(suite),
                category,
                ctx: Some(ctx),
                setup_error: setup.err().map(|e| format!("{category} setup failed: {e}")),
            },
            Err(e) => Self::failed(category, e),
        }
    }

    const fn failed(category: ScenarioCategory, error: String) -> Self {
        Self {
            suite: None,
            category,
            ctx: None,
            setup_error: Some(error),
        }
    }

    fn ready(&mut self) -> StepResult<(&'static Suite, &mut ScenarioContext)> {
        if let Some(error) = &self.setup_error {
            return Err(error.clone());
        }
        let suite = self
            .suite
            .ok_or_else(|| String::from("scenario did not join the run"))?;
        let ctx = self
            .ctx
            .as_mut()
            .ok_or_else(|| String::from("scenario context is unavailable"))?;
        Ok((suite, ctx))
    }

    /// Run an asynchronous step to completion.
    pub(crate) fn step<F>(&mut self, f: F) -> StepResult<()>
    where
        F: for<'c> FnOnce(&'c mut ScenarioContext) -> BoxFuture<'c, BoardcheckResult<()>>,
    {
        let (suite, ctx) = self.ready()?;
        suite.runtime.block_on(f(ctx)).map_err(|e| e.to_string())
    }

    /// Run a synchronous step.
    pub(crate) fn check<F>(&mut self, f: F) -> StepResult<()>
    where
        F: FnOnce(&mut ScenarioContext) -> BoardcheckResult<()>,
    {
        let (_, ctx) = self.ready()?;
        f(ctx).map_err(|e| e.to_string())
    }
}

impl Drop for ScenarioWorld {
    fn drop(&mut self) {
        let (Some(suite), Some(mut ctx)) = (self.suite, self.ctx.take()) else {
            return;
        };
        let category = self.category;
        suite.release(|run| {
            let report = suite
                .runtime
                .block_on(Lifecycle::new(run).teardown(category, &mut ctx));
            for failure in &report.failures {
                warn!(
                    kind = ?failure.kind,
                    id = %failure.id,
                    reason = %failure.reason,
                    "scenario cleanup failed"
                );
            }
        });
    }
}
