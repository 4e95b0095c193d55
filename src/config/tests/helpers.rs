//! Shared fixtures and helper functions for config tests.

use std::sync::Arc;

use ortho_config::MergeComposer;
use rstest::fixture;

use crate::config::{
    AppConfig, DEFAULT_LOG_FILTER, DEFAULT_RUN_TIMEOUT_SECS, DEFAULT_TEARDOWN_TIMEOUT_SECS,
};

/// Fixture providing an `AppConfig` parsed from a full TOML example.
#[fixture]
pub fn app_config_from_full_toml() -> AppConfig {
    let toml = r#"
        api_key = "file-key"
        api_token = "file-token"
        api_base_url = "https://api.trello.com/1/"
        run_timeout_secs = 120
        teardown_timeout_secs = 5
        log_filter = "boardcheck=debug"
    "#;

    ortho_config::toml::from_str(toml).expect("TOML parsing should succeed")
}

/// Fixture providing an `AppConfig` parsed from a minimal TOML example.
#[fixture]
pub fn app_config_from_partial_toml() -> AppConfig {
    let toml = r#"
        api_base_url = "http://localhost:8080/1/"
    "#;

    ortho_config::toml::from_str(toml).expect("TOML parsing should succeed")
}

/// Helper: Creates a `MergeComposer` with defaults layer already pushed.
pub fn create_composer_with_defaults() -> Result<MergeComposer, ortho_config::serde_json::Error> {
    let mut composer = MergeComposer::new();
    let defaults = ortho_config::serde_json::to_value(AppConfig::default())?;
    composer.push_defaults(defaults);
    Ok(composer)
}

/// Helper: Merges layers from a composer into `AppConfig`.
pub fn merge_config(composer: MergeComposer) -> Result<AppConfig, Arc<ortho_config::OrthoError>> {
    AppConfig::merge_from_layers(composer.layers())
}

/// Helper: Asserts that the non-credential settings hold their defaults.
pub fn assert_config_has_defaults(config: &AppConfig) {
    assert_eq!(config.run_timeout_secs, DEFAULT_RUN_TIMEOUT_SECS);
    assert_eq!(config.teardown_timeout_secs, DEFAULT_TEARDOWN_TIMEOUT_SECS);
    assert_eq!(config.log_filter, DEFAULT_LOG_FILTER);
    assert!(config.api_key.is_none(), "api_key should default to None");
    assert!(config.api_token.is_none(), "api_token should default to None");
    assert!(
        config.api_base_url.is_none(),
        "api_base_url should default to None"
    );
}
