//! `boardcheck` application entry point.
//!
//! Validates configuration, runs the built-in smoke scenarios against a board
//! service, or purges leftover boards. It uses `eyre` for opaque error
//! handling at the application boundary, converting domain-specific errors
//! into human-readable reports.
//!
//! Configuration is loaded with layered precedence via `OrthoConfig`:
//! 1. Application defaults
//! 2. Configuration file (`~/.config/boardcheck/config.toml` or path from `BOARDCHECK_CONFIG_PATH`)
//! 3. Environment variables (`TRELLO_API_*`, `BOARDCHECK_*`)
//! 4. Command-line arguments

use std::process::ExitCode;

use boardcheck::api::PurgeReport;
use boardcheck::config::{AppConfig, Cli, Commands, CredentialCache, load_config};
use boardcheck::error::Result as BoardcheckResult;
use boardcheck::lifecycle::ScenarioResult;
use boardcheck::logging;
use boardcheck::suite::{self, SmokeReport};
use clap::Parser;
use eyre::{Report, Result as EyreResult, WrapErr};

/// Application entry point.
///
/// Exits non-zero when a smoke scenario fails or a purge leaves boards
/// behind; configuration and transport errors surface as `eyre` reports.
fn main() -> EyreResult<ExitCode> {
    let cli = Cli::parse();
    let config = load_config(&cli).map_err(Report::from)?;
    logging::init(&config.log_filter);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .wrap_err("failed to start the async runtime")?;

    let credentials = CredentialCache::new();
    let passed = runtime
        .block_on(run(cli.command, &config, &credentials))
        .map_err(Report::from)?;
    Ok(if passed {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Execute the CLI command, returning whether it succeeded.
///
/// Keeps semantic errors inside the run loop so the CLI boundary owns
/// conversion to `eyre::Report`.
async fn run(
    command: Commands,
    config: &AppConfig,
    credentials: &CredentialCache,
) -> BoardcheckResult<bool> {
    match command {
        Commands::Check => check(config, credentials),
        Commands::Smoke => Ok(print_smoke(&suite::smoke(config, credentials).await?)),
        Commands::Purge => Ok(print_purge(&suite::purge(config, credentials).await?)),
    }
}

#[expect(clippy::print_stdout, reason = "CLI output is the intended behaviour")]
fn check(config: &AppConfig, cache: &CredentialCache) -> BoardcheckResult<bool> {
    let credentials = suite::check(config, cache)?;
    println!("Configuration OK. Target: {}", credentials.base_url());
    Ok(true)
}

#[expect(clippy::print_stdout, reason = "CLI output is the intended behaviour")]
fn print_smoke(report: &SmokeReport) -> bool {
    for named in &report.outcomes {
        let status = match named.outcome.result {
            ScenarioResult::Passed => String::from("ok"),
            ScenarioResult::Skipped => String::from("skipped"),
            ScenarioResult::Failed(ref e) => format!("FAILED: {e}"),
        };
        println!("[{}] {}: {status}", named.outcome.category, named.name);
        for failure in &named.outcome.teardown.failures {
            println!(
                "    cleanup of {:?} {} failed: {}",
                failure.kind, failure.id, failure.reason
            );
        }
    }
    let failed = report.failures().count();
    println!(
        "{} scenarios, {failed} failed, {} cleanup failures",
        report.outcomes.len(),
        report.teardown_failures()
    );
    report.is_success()
}

#[expect(clippy::print_stdout, reason = "CLI output is the intended behaviour")]
fn print_purge(report: &PurgeReport) -> bool {
    for short_link in &report.deleted {
        println!("deleted {short_link}");
    }
    for (short_link, reason) in &report.failed {
        println!("could not delete {short_link}: {reason}");
    }
    println!(
        "{} boards deleted, {} failed",
        report.deleted.len(),
        report.failed.len()
    );
    report.is_clean()
}
