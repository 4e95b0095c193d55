//! Run-level fixture: one board and its first list shared by read-only
//! scenarios, plus the deadline the run's scenarios work under.

use std::future::Future;
use std::time::Duration;

use tokio::time::{Instant, timeout, timeout_at};
use tracing::{info, warn};

use crate::api::{BoardResource, Session};
use crate::config::{AppConfig, CredentialCache};
use crate::error::{BoardcheckError, ContextError, Result};

/// The instant by which a run must have finished its setup and scenario
/// bodies.
///
/// Teardown is never cut short by the deadline; it has its own per-call
/// bound.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunDeadline {
    bound: Option<(Instant, Duration)>,
}

impl RunDeadline {
    /// No deadline.
    #[must_use]
    pub const fn unbounded() -> Self {
        Self { bound: None }
    }

    /// A deadline `bound` from now.
    #[must_use]
    pub fn after(bound: Duration) -> Self {
        Self {
            bound: Instant::now().checked_add(bound).map(|at| (at, bound)),
        }
    }

    /// Whether the deadline has been reached.
    #[must_use]
    pub fn has_passed(self) -> bool {
        self.bound.is_some_and(|(at, _)| Instant::now() >= at)
    }

    /// The timeout error reported for `stage`.
    #[must_use]
    pub fn expired(self, stage: &str) -> BoardcheckError {
        BoardcheckError::Timeout {
            stage: stage.to_owned(),
            seconds: self.bound.map_or(0, |(_, bound)| bound.as_secs()),
        }
    }

    /// Drive `future` until it completes or the deadline is reached.
    ///
    /// Once the deadline has passed `future` is never polled, so no request
    /// is started.
    ///
    /// # Errors
    ///
    /// Returns `future`'s error, or [`Self::expired`] for `stage`.
    pub async fn enforce<T, E, F>(self, stage: &str, future: F) -> Result<T>
    where
        F: Future<Output = std::result::Result<T, E>>,
        BoardcheckError: From<E>,
    {
        let Some((at, _)) = self.bound else {
            return Ok(future.await?);
        };
        if Instant::now() >= at {
            return Err(self.expired(stage));
        }
        match timeout_at(at, future).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(self.expired(stage)),
        }
    }
}

/// The shared board created in [`RunContext::before_all`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharedFixture {
    board_id: String,
    board_name: String,
    list_id: String,
}

impl SharedFixture {
    /// Describe an existing board and list.
    #[must_use]
    pub fn new(board_id: &str, board_name: &str, list_id: &str) -> Self {
        Self {
            board_id: board_id.to_owned(),
            board_name: board_name.to_owned(),
            list_id: list_id.to_owned(),
        }
    }

    /// The shared board's id.
    #[must_use]
    pub fn board_id(&self) -> &str {
        &self.board_id
    }

    /// The shared board's name.
    #[must_use]
    pub fn board_name(&self) -> &str {
        &self.board_name
    }

    /// The shared board's first list.
    #[must_use]
    pub fn list_id(&self) -> &str {
        &self.list_id
    }
}

/// State owned by the whole run and handed to every scenario's hooks.
///
/// The shared fixture is only ever exposed by shared reference.
#[derive(Debug)]
pub struct RunContext {
    session: Session,
    shared: Option<SharedFixture>,
    teardown_timeout: Duration,
    deadline: RunDeadline,
}

impl RunContext {
    /// Wrap a session without creating the shared fixture.
    #[must_use]
    pub const fn new(session: Session, teardown_timeout: Duration) -> Self {
        Self {
            session,
            shared: None,
            teardown_timeout,
            deadline: RunDeadline::unbounded(),
        }
    }

    /// Bound scenario setup and bodies by `deadline`.
    #[must_use]
    pub const fn with_deadline(mut self, deadline: RunDeadline) -> Self {
        self.deadline = deadline;
        self
    }

    /// Resolve credentials through `credentials`, open an HTTP session and
    /// run [`Self::before_all`].
    ///
    /// # Errors
    ///
    /// Fails before any call is made when credentials are missing, and
    /// otherwise with whatever `before_all` reports.
    pub async fn start(
        config: &AppConfig,
        credentials: &CredentialCache,
        deadline: RunDeadline,
    ) -> Result<Self> {
        let session = Session::open(credentials.get_or_resolve(config)?)?;
        Self::before_all(
            session,
            Duration::from_secs(config.teardown_timeout_secs),
            deadline,
        )
        .await
    }

    /// Create the shared board and look up its first list.
    ///
    /// Both calls are bounded by `deadline`, which the run keeps for its
    /// scenarios.
    ///
    /// # Errors
    ///
    /// Fails if the board cannot be created, has no lists or the deadline
    /// is reached. A board that was created before the failure is deleted
    /// again.
    pub async fn before_all(
        session: Session,
        teardown_timeout: Duration,
        deadline: RunDeadline,
    ) -> Result<Self> {
        let mut run = Self::new(session, teardown_timeout).with_deadline(deadline);
        let boards = BoardResource::new(&run.session);

        let response = deadline
            .enforce("before_all", boards.create_board(None))
            .await?;
        let board_id = BoardResource::extract_board_id(&response)?;
        let board_name = response.string_field("name")?.unwrap_or_default();

        let list_id = match deadline
            .enforce("before_all", boards.first_list(&board_id))
            .await
        {
            Ok(list_id) => list_id,
            Err(e) => {
                match timeout(teardown_timeout, boards.delete_board(&board_id)).await {
                    Ok(Ok(_)) => info!(%board_id, "removed incomplete shared board"),
                    Ok(Err(cleanup)) => {
                        warn!(%board_id, error = %cleanup, "failed to remove incomplete shared board");
                    }
                    Err(_) => warn!(%board_id, "timed out removing incomplete shared board"),
                }
                return Err(e);
            }
        };

        info!(%board_id, %board_name, %list_id, "created shared fixture");
        run.shared = Some(SharedFixture {
            board_id,
            board_name,
            list_id,
        });
        Ok(run)
    }

    /// The shared fixture.
    ///
    /// # Errors
    ///
    /// Returns `ContextError::SharedFixtureUnavailable` before `before_all`
    /// has succeeded or after `after_all`.
    pub fn shared(&self) -> std::result::Result<&SharedFixture, ContextError> {
        self.shared
            .as_ref()
            .ok_or(ContextError::SharedFixtureUnavailable)
    }

    /// A session for one scenario, sharing the run's transport and
    /// credentials.
    #[must_use]
    pub fn open_session(&self) -> Session {
        self.session.clone()
    }

    /// The run's session.
    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    /// The bound applied to each teardown delete and to [`Self::after_all`].
    #[must_use]
    pub const fn teardown_timeout(&self) -> Duration {
        self.teardown_timeout
    }

    /// The deadline scenario setup and bodies run under.
    #[must_use]
    pub const fn deadline(&self) -> RunDeadline {
        self.deadline
    }

    /// Delete the shared board.
    ///
    /// Runs regardless of scenario outcomes and at most once; later calls
    /// do nothing.
    ///
    /// # Errors
    ///
    /// Returns `BoardcheckError::Timeout` when the delete exceeds the
    /// teardown bound, or the delete's own error.
    pub async fn after_all(&mut self) -> Result<()> {
        let Some(shared) = self.shared.take() else {
            return Ok(());
        };
        let boards = BoardResource::new(&self.session);
        let outcome = timeout(self.teardown_timeout, boards.delete_board(&shared.board_id)).await;
        match outcome {
            Ok(result) => {
                result?;
                info!(board_id = %shared.board_id, "removed shared fixture");
                Ok(())
            }
            Err(_) => Err(BoardcheckError::Timeout {
                stage: String::from("after_all"),
                seconds: self.teardown_timeout.as_secs(),
            }),
        }
    }
}
