//! Semantic error types for boardcheck.
//!
//! Conditions a caller might inspect or map to a scenario outcome are modelled
//! as semantic enums (via `thiserror`). Opaque errors (`eyre::Report`) are
//! reserved for the binary boundary.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be parsed.
    #[error("failed to parse configuration file: {message}")]
    ParseError {
        /// A description of the parse error.
        message: String,
    },

    /// One or more required configuration values are missing.
    #[error("missing required configuration: {field}")]
    MissingRequired {
        /// The missing variable names, comma-separated.
        field: String,
    },

    /// A configuration value failed validation.
    #[error("invalid configuration value for '{field}': {reason}")]
    InvalidValue {
        /// The name of the invalid field.
        field: String,
        /// The reason the value is invalid.
        reason: String,
    },

    /// The `OrthoConfig` library returned an error while merging layers.
    #[error("configuration loading failed: {0}")]
    OrthoConfig(Arc<ortho_config::OrthoError>),
}

/// Errors raised by outbound calls to the board service.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The service answered with a status other than the one the operation
    /// expected.
    #[error("{operation}: expected {expected} status but got {actual}\nResponse body: {body}")]
    UnexpectedStatus {
        /// The operation that issued the call.
        operation: String,
        /// The expected status code.
        expected: u16,
        /// The status code actually returned.
        actual: u16,
        /// The response body, or `[unavailable]`.
        body: String,
    },

    /// The request could not be sent or its response could not be read.
    #[error("request to '{path}' failed: {message}")]
    Transport {
        /// The request path relative to the base URL.
        path: String,
        /// A description of the transport failure.
        message: String,
    },

    /// The response body did not have the expected shape.
    #[error("malformed response: {message}")]
    MalformedResponse {
        /// What was missing or unreadable.
        message: String,
    },

    /// A board had no lists although at least one was required.
    #[error("no lists found on board '{board_id}'")]
    NoLists {
        /// The board that was queried.
        board_id: String,
    },
}

/// A piece of scenario state a step may depend on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateField {
    /// The last response captured by a request step.
    Response,
    /// The identifier of the scenario's board.
    BoardId,
    /// The identifier of the scenario's card.
    CardId,
    /// The identifier of the scenario's list.
    ListId,
    /// The name of the scenario's board.
    BoardName,
}

impl StateField {
    /// Human-readable message explaining how to satisfy the precondition.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::Response => {
                "Response is not available. Ensure a request step has run before this assertion."
            }
            Self::BoardId => "Board ID is not available. Ensure a board has been created.",
            Self::CardId => "Card ID is not available. Ensure a card has been created.",
            Self::ListId => "List ID is not available. Ensure a board with lists has been created.",
            Self::BoardName => "Board name is not available. Ensure a board has been created.",
        }
    }
}

impl fmt::Display for StateField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Errors caused by steps running before their preconditions hold.
#[derive(Debug, Error)]
pub enum ContextError {
    /// A resource object was requested before the session was opened.
    #[error("scenario context is not initialized: no API session is open")]
    NotInitialized,

    /// A step needed a value that no earlier step or hook provided.
    #[error("{0}")]
    Missing(StateField),

    /// A fixture required the shared run fixture but none was created.
    #[error("shared fixture is not available; run-level setup has not completed")]
    SharedFixtureUnavailable,

    /// A data-table row did not hold a key and a value.
    #[error("data table row {row} must have a key and a value")]
    MalformedTable {
        /// One-based row number.
        row: usize,
    },

    /// A step tried to rename or delete the run's shared board.
    #[error("board '{board_id}' is the shared fixture and must not be modified by a scenario")]
    SharedFixtureProtected {
        /// The shared board's identifier.
        board_id: String,
    },
}

/// Errors raised when a retrieved value does not match expectations.
#[derive(Debug, Error)]
pub enum AssertionError {
    /// A field held a different value than expected.
    #[error("expected {field} {expected} but got {actual}")]
    Mismatch {
        /// The field under comparison.
        field: String,
        /// The expected value.
        expected: String,
        /// The observed value.
        actual: String,
    },

    /// The response body did not contain an expected fragment.
    #[error("expected message \"{expected}\" but got \"{actual}\"")]
    MissingText {
        /// The fragment that should be present.
        expected: String,
        /// The full body that was searched.
        actual: String,
    },

    /// An identifier was empty or absent.
    #[error("{what} is invalid or missing")]
    InvalidIdentifier {
        /// Which identifier was invalid.
        what: String,
    },
}

/// Top-level error type for boardcheck.
///
/// Aggregates the domain-specific errors into a single type. At the binary
/// boundary these are converted to `eyre::Report`.
#[derive(Debug, Error)]
pub enum BoardcheckError {
    /// An error occurred during configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// An outbound call failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// A step ran before its preconditions held.
    #[error(transparent)]
    Context(#[from] ContextError),

    /// A retrieved value did not match.
    #[error(transparent)]
    Assertion(#[from] AssertionError),

    /// A run-level bound elapsed.
    #[error("{stage} timed out after {seconds} seconds")]
    Timeout {
        /// The stage that timed out.
        stage: String,
        /// The bound in seconds.
        seconds: u64,
    },
}

/// A specialised `Result` type for boardcheck operations.
pub type Result<T> = std::result::Result<T, BoardcheckError>;
