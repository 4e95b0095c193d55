//! Per-scenario mutable state shared by hooks and steps.
//!
//! A [`ScenarioContext`] is created at scenario start and discarded at the
//! end. It carries the scenario's session, the identifiers steps read and
//! write, the last response, and the ledger of resources the scenario owns.
//! Resource objects are built through explicit factories that fail until a
//! session has been opened.

use std::sync::Arc;

use crate::api::{ApiResponse, BoardResource, CardResource, Session, Transport};
use crate::error::{ContextError, StateField};
use crate::lifecycle::SharedFixture;

/// Remote resources a scenario created and must delete in teardown.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OwnedResources {
    boards: Vec<String>,
    cards: Vec<String>,
}

impl OwnedResources {
    /// Board ids in creation order.
    #[must_use]
    pub fn boards(&self) -> &[String] {
        &self.boards
    }

    /// Card ids in creation order.
    #[must_use]
    pub fn cards(&self) -> &[String] {
        &self.cards
    }

    /// Whether nothing is owned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.boards.is_empty() && self.cards.is_empty()
    }
}

/// State for one scenario.
pub struct ScenarioContext {
    transport: Arc<dyn Transport>,
    session: Option<Session>,
    boards: Option<BoardResource>,
    cards: Option<CardResource>,
    shared_board_id: Option<String>,
    owned: OwnedResources,
    /// Identifier of the board the scenario works on.
    pub board_id: Option<String>,
    /// Name of that board as created.
    pub board_name: Option<String>,
    /// Identifier of the list cards are created on.
    pub list_id: Option<String>,
    /// Identifier of the scenario's card.
    pub card_id: Option<String>,
    /// The last response captured by a request step.
    pub response: Option<ApiResponse>,
}

impl std::fmt::Debug for ScenarioContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScenarioContext")
            .field("session", &self.session)
            .field("board_id", &self.board_id)
            .field("board_name", &self.board_name)
            .field("list_id", &self.list_id)
            .field("card_id", &self.card_id)
            .field("response", &self.response)
            .field("owned", &self.owned)
            .finish_non_exhaustive()
    }
}

impl ScenarioContext {
    /// Create an empty context.
    ///
    /// `transport` is used for requests that carry no credentials; resource
    /// objects need a session opened with [`Self::open_session`].
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            session: None,
            boards: None,
            cards: None,
            shared_board_id: None,
            owned: OwnedResources::default(),
            board_id: None,
            board_name: None,
            list_id: None,
            card_id: None,
            response: None,
        }
    }

    /// Attach a session, replacing any earlier one and its resource objects.
    pub fn open_session(&mut self, session: Session) {
        self.reset_resources();
        self.session = Some(session);
    }

    /// Detach and dispose of the session.
    pub fn close_session(&mut self) {
        self.reset_resources();
        if let Some(session) = self.session.take() {
            session.close();
        }
    }

    /// The active session, if any.
    #[must_use]
    pub const fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// The transport for requests sent without credentials.
    #[must_use]
    pub fn transport(&self) -> Arc<dyn Transport> {
        Arc::clone(&self.transport)
    }

    /// Board operations bound to the session, built on first use.
    ///
    /// # Errors
    ///
    /// Returns `ContextError::NotInitialized` when no session is open.
    pub fn boards(&mut self) -> Result<&mut BoardResource, ContextError> {
        let session = self.session.as_ref().ok_or(ContextError::NotInitialized)?;
        Ok(self
            .boards
            .get_or_insert_with(|| BoardResource::new(session)))
    }

    /// Card operations bound to the session, built on first use.
    ///
    /// # Errors
    ///
    /// Returns `ContextError::NotInitialized` when no session is open.
    pub fn cards(&mut self) -> Result<&mut CardResource, ContextError> {
        let session = self.session.as_ref().ok_or(ContextError::NotInitialized)?;
        Ok(self.cards.get_or_insert_with(|| CardResource::new(session)))
    }

    /// Drop cached resource objects so the next access builds fresh ones.
    pub fn reset_resources(&mut self) {
        self.boards = None;
        self.cards = None;
    }

    /// Point the scenario at the run's shared board.
    pub fn bind_shared_board(&mut self, shared: &SharedFixture) {
        self.shared_board_id = Some(shared.board_id().to_owned());
        self.board_id = Some(shared.board_id().to_owned());
        self.board_name = Some(shared.board_name().to_owned());
    }

    /// Point the scenario at the shared board's first list.
    pub fn bind_shared_list(&mut self, shared: &SharedFixture) {
        self.list_id = Some(shared.list_id().to_owned());
    }

    /// Whether `board_id` is the run's shared board.
    #[must_use]
    pub fn is_shared_board(&self, board_id: &str) -> bool {
        self.shared_board_id.as_deref() == Some(board_id)
    }

    /// Record a board this scenario created. The shared board is never
    /// recorded.
    pub fn own_board(&mut self, board_id: &str) {
        if self.is_shared_board(board_id) || self.owned.boards.iter().any(|b| b == board_id) {
            return;
        }
        self.owned.boards.push(board_id.to_owned());
    }

    /// Record a card this scenario created.
    pub fn own_card(&mut self, card_id: &str) {
        if self.owned.cards.iter().any(|c| c == card_id) {
            return;
        }
        self.owned.cards.push(card_id.to_owned());
    }

    /// Forget a board that no longer needs deleting.
    pub fn release_board(&mut self, board_id: &str) {
        self.owned.boards.retain(|b| b != board_id);
    }

    /// Forget a card that no longer needs deleting.
    pub fn release_card(&mut self, card_id: &str) {
        self.owned.cards.retain(|c| c != card_id);
    }

    /// The resources this scenario currently owns.
    #[must_use]
    pub const fn owned(&self) -> &OwnedResources {
        &self.owned
    }

    /// The last response.
    ///
    /// # Errors
    ///
    /// Returns `ContextError::Missing` when no request step has run.
    pub fn require_response(&self) -> Result<&ApiResponse, ContextError> {
        self.response
            .as_ref()
            .ok_or(ContextError::Missing(StateField::Response))
    }

    /// The board id.
    ///
    /// # Errors
    ///
    /// Returns `ContextError::Missing` when no board id is set.
    pub fn require_board_id(&self) -> Result<&str, ContextError> {
        require(self.board_id.as_deref(), StateField::BoardId)
    }

    /// The board id, refusing the shared board.
    ///
    /// # Errors
    ///
    /// Returns `ContextError::Missing` when no board id is set and
    /// `ContextError::SharedFixtureProtected` when it names the shared board.
    pub fn require_mutable_board_id(&self) -> Result<&str, ContextError> {
        let board_id = self.require_board_id()?;
        if self.is_shared_board(board_id) {
            return Err(ContextError::SharedFixtureProtected {
                board_id: board_id.to_owned(),
            });
        }
        Ok(board_id)
    }

    /// The board name.
    ///
    /// # Errors
    ///
    /// Returns `ContextError::Missing` when no board name is set.
    pub fn require_board_name(&self) -> Result<&str, ContextError> {
        require(self.board_name.as_deref(), StateField::BoardName)
    }

    /// The list id.
    ///
    /// # Errors
    ///
    /// Returns `ContextError::Missing` when no list id is set.
    pub fn require_list_id(&self) -> Result<&str, ContextError> {
        require(self.list_id.as_deref(), StateField::ListId)
    }

    /// The card id.
    ///
    /// # Errors
    ///
    /// Returns `ContextError::Missing` when no card id is set.
    pub fn require_card_id(&self) -> Result<&str, ContextError> {
        require(self.card_id.as_deref(), StateField::CardId)
    }
}

fn require(value: Option<&str>, field: StateField) -> Result<&str, ContextError> {
    value.ok_or(ContextError::Missing(field))
}
