//! Defaults and TOML parsing tests for `AppConfig`.

use rstest::rstest;

use crate::config::AppConfig;
use crate::config::tests::helpers::{
    app_config_from_full_toml, app_config_from_partial_toml, assert_config_has_defaults,
};

#[rstest]
fn app_config_default_has_no_credentials() {
    assert_config_has_defaults(&AppConfig::default());
}

#[rstest]
fn app_config_parses_full_toml(app_config_from_full_toml: AppConfig) {
    let config = app_config_from_full_toml;
    assert_eq!(config.api_key.as_deref(), Some("file-key"));
    assert_eq!(config.api_token.as_deref(), Some("file-token"));
    assert_eq!(
        config.api_base_url.as_deref(),
        Some("https://api.trello.com/1/")
    );
    assert_eq!(config.run_timeout_secs, 120);
    assert_eq!(config.teardown_timeout_secs, 5);
    assert_eq!(config.log_filter, "boardcheck=debug");
}

#[rstest]
fn app_config_partial_toml_keeps_defaults(app_config_from_partial_toml: AppConfig) {
    let config = app_config_from_partial_toml;
    assert_eq!(
        config.api_base_url.as_deref(),
        Some("http://localhost:8080/1/")
    );
    assert_eq!(config.run_timeout_secs, 300);
    assert_eq!(config.teardown_timeout_secs, 10);
    assert_eq!(config.log_filter, "boardcheck=info");
}
