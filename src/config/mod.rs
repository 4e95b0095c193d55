//! Configuration system for boardcheck.
//!
//! Provides the configuration structures, CLI definitions and the credential
//! resolver. Precedence: CLI flags override environment variables, which
//! override configuration files, which override defaults.
//!
//! # Example Configuration
//!
//! ```toml
//! api_key = "0123456789abcdef"
//! api_token = "ATTA..."
//! api_base_url = "https://api.trello.com/1/"
//! run_timeout_secs = 300
//! teardown_timeout_secs = 10
//! log_filter = "boardcheck=debug"
//! ```

mod cli;
mod credentials;
mod loader;
mod types;

#[cfg(test)]
mod tests;

pub use cli::{Cli, Commands};
pub use credentials::{Auth, CredentialCache, Credentials};
pub use loader::{
    API_BASE_URL_VAR, API_KEY_VAR, API_TOKEN_VAR, CONFIG_PATH_VAR, env_var_names, load_config,
    load_config_with_env,
};
pub use types::{
    AppConfig, DEFAULT_LOG_FILTER, DEFAULT_RUN_TIMEOUT_SECS, DEFAULT_TEARDOWN_TIMEOUT_SECS,
};
