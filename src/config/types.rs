//! Configuration data types for boardcheck.

use ortho_config::{OrthoConfig, OrthoResult, PostMergeContext, PostMergeHook};
use serde::{Deserialize, Serialize};

/// Default upper bound for a whole smoke run, in seconds.
pub const DEFAULT_RUN_TIMEOUT_SECS: u64 = 300;

/// Default upper bound for run-level teardown, in seconds.
pub const DEFAULT_TEARDOWN_TIMEOUT_SECS: u64 = 10;

/// Default `tracing` filter directive.
pub const DEFAULT_LOG_FILTER: &str = "boardcheck=info";

/// Root application configuration.
///
/// Loaded from configuration files, environment variables and command-line
/// arguments with layered precedence (lowest to highest): defaults,
/// configuration file, environment variables, command-line arguments.
///
/// Configuration files are discovered in this order:
/// 1. Path specified via the `BOARDCHECK_CONFIG_PATH` environment variable
/// 2. `.boardcheck.toml` in the current working directory
/// 3. `.boardcheck.toml` in the home directory
/// 4. `~/.config/boardcheck/config.toml` (XDG default)
///
/// The API credentials are optional at this level so that the file and
/// environment layers can each contribute part of them. Use
/// [`Credentials::from_config`](crate::config::Credentials::from_config) to
/// enforce that all three are present.
#[derive(Debug, Clone, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(
    prefix = "BOARDCHECK",
    post_merge_hook,
    discovery(
        app_name = "boardcheck",
        env_var = "BOARDCHECK_CONFIG_PATH",
        config_file_name = "config.toml",
        dotfile_name = ".boardcheck.toml",
        config_cli_long = "config",
        config_cli_visible = true,
    )
)]
pub struct AppConfig {
    /// API key sent as the `key` query parameter.
    #[ortho_config(skip_cli)]
    pub api_key: Option<String>,

    /// API token sent as the `token` query parameter.
    #[ortho_config(skip_cli)]
    pub api_token: Option<String>,

    /// Base URL of the board service, e.g. `https://api.trello.com/1/`.
    pub api_base_url: Option<String>,

    /// Upper bound for an entire smoke run, in seconds.
    #[serde(default = "default_run_timeout_secs")]
    #[ortho_config(skip_cli)]
    pub run_timeout_secs: u64,

    /// Upper bound for run-level teardown, in seconds.
    #[serde(default = "default_teardown_timeout_secs")]
    #[ortho_config(skip_cli)]
    pub teardown_timeout_secs: u64,

    /// `tracing` filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    #[ortho_config(skip_cli)]
    pub log_filter: String,
}

const fn default_run_timeout_secs() -> u64 {
    DEFAULT_RUN_TIMEOUT_SECS
}

const fn default_teardown_timeout_secs() -> u64 {
    DEFAULT_TEARDOWN_TIMEOUT_SECS
}

fn default_log_filter() -> String {
    String::from(DEFAULT_LOG_FILTER)
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_token: None,
            api_base_url: None,
            run_timeout_secs: DEFAULT_RUN_TIMEOUT_SECS,
            teardown_timeout_secs: DEFAULT_TEARDOWN_TIMEOUT_SECS,
            log_filter: default_log_filter(),
        }
    }
}

impl PostMergeHook for AppConfig {
    fn post_merge(&mut self, _ctx: &PostMergeContext) -> OrthoResult<()> {
        // Blank strings from any layer behave as if the value were absent so
        // that credential resolution reports them as missing.
        for value in [
            &mut self.api_key,
            &mut self.api_token,
            &mut self.api_base_url,
        ] {
            if value.as_deref().is_some_and(|v| v.trim().is_empty()) {
                *value = None;
            }
        }
        Ok(())
    }
}
