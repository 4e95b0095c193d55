//! Command-line argument definitions for boardcheck.

use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};

/// Command-line interface for boardcheck.
#[derive(Debug, Parser)]
#[command(name = "boardcheck")]
#[command(
    author,
    version,
    about = "Behaviour-driven API checks for a project-board REST service"
)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file.
    #[arg(long, global = true)]
    pub config: Option<Utf8PathBuf>,

    /// Base URL of the board service (overrides `TRELLO_API_BASE_URL`).
    #[arg(long, global = true)]
    pub base_url: Option<String>,
}

/// Available subcommands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum Commands {
    /// Validate the configuration and exit.
    Check,

    /// Run the built-in smoke scenarios against the configured service.
    Smoke,

    /// Delete every board owned by the authenticated member.
    Purge,
}
