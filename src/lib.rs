//! Behaviour-driven API checks for a project-board REST service.
//!
//! `boardcheck` exercises a Trello-style board service over HTTP: boards and
//! cards are created, read, renamed and deleted, and every response is
//! checked against the expected status and payload. The library's core is a
//! fixture lifecycle manager that decides, from a scenario's tags, which
//! boards and cards must exist before the scenario runs and which must be
//! deleted afterwards.
//!
//! # Fixtures
//!
//! One shared board is created before any scenario and deleted after the
//! last one. Read-only scenarios borrow it; destructive scenarios get a
//! private board they own. Everything a scenario owns is deleted when it
//! finishes, whether it passed, failed or panicked.
//!
//! # Modules
//!
//! - [`api`]: HTTP transport and the board and card resource clients
//! - [`config`]: Configuration with layered precedence (CLI > env > file > defaults)
//! - [`context`]: Per-scenario mutable state and resource ownership
//! - [`error`]: Semantic error types for the application
//! - [`lifecycle`]: Tag classification, hook table and the shared fixture
//! - [`logging`]: Tracing subscriber setup
//! - [`steps`]: Behaviour behind each step phrase
//! - [`suite`]: Built-in smoke scenarios and command entry points

pub mod api;
pub mod config;
pub mod context;
pub mod error;
pub mod lifecycle;
pub mod logging;
pub mod steps;
pub mod suite;
