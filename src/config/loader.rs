//! Configuration loading with layered precedence.
//!
//! Precedence (lowest to highest): application defaults, configuration file,
//! environment variables, command-line arguments.
//!
//! Layers are composed manually with `MergeComposer` so that the credential
//! variables keep their established `TRELLO_API_*` names while the remaining
//! settings use the `BOARDCHECK_` prefix, and so that typed environment
//! values fail fast instead of being silently ignored.
//!
//! Environment access goes through [`mockable::Env`], letting tests supply a
//! `MockEnv` rather than mutating process state.

use camino::Utf8PathBuf;
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use ortho_config::discovery::ConfigDiscovery;
use ortho_config::serde_json::{self, Map, Value};
use ortho_config::{MergeComposer, toml};

use crate::config::{AppConfig, Cli};
use crate::error::{ConfigError, Result};

/// The type of value expected from an environment variable.
#[derive(Clone, Copy)]
enum EnvVarType {
    /// String value (always accepted).
    String,
    /// Unsigned 64-bit integer. Invalid values return an error.
    U64,
}

/// Specification for a single environment variable mapping.
struct EnvVarSpec {
    /// The environment variable name.
    env_var: &'static str,
    /// The config field the value lands in.
    field: &'static str,
    /// The expected value type.
    var_type: EnvVarType,
}

/// Environment variable naming the API key.
pub const API_KEY_VAR: &str = "TRELLO_API_KEY";

/// Environment variable naming the API token.
pub const API_TOKEN_VAR: &str = "TRELLO_API_TOKEN";

/// Environment variable naming the API base URL.
pub const API_BASE_URL_VAR: &str = "TRELLO_API_BASE_URL";

/// Environment variable overriding config file discovery.
pub const CONFIG_PATH_VAR: &str = "BOARDCHECK_CONFIG_PATH";

/// Table of all environment variables and the fields they populate.
const ENV_VAR_SPECS: &[EnvVarSpec] = &[
    EnvVarSpec {
        env_var: API_KEY_VAR,
        field: "api_key",
        var_type: EnvVarType::String,
    },
    EnvVarSpec {
        env_var: API_TOKEN_VAR,
        field: "api_token",
        var_type: EnvVarType::String,
    },
    EnvVarSpec {
        env_var: API_BASE_URL_VAR,
        field: "api_base_url",
        var_type: EnvVarType::String,
    },
    EnvVarSpec {
        env_var: "BOARDCHECK_RUN_TIMEOUT_SECS",
        field: "run_timeout_secs",
        var_type: EnvVarType::U64,
    },
    EnvVarSpec {
        env_var: "BOARDCHECK_TEARDOWN_TIMEOUT_SECS",
        field: "teardown_timeout_secs",
        var_type: EnvVarType::U64,
    },
    EnvVarSpec {
        env_var: "BOARDCHECK_LOG_FILTER",
        field: "log_filter",
        var_type: EnvVarType::String,
    },
];

/// Returns the environment variable names recognised by the config loader.
///
/// Tests use this to scrub the environment without hard-coding the list.
#[must_use]
pub fn env_var_names() -> Vec<&'static str> {
    ENV_VAR_SPECS.iter().map(|spec| spec.env_var).collect()
}

/// Load configuration from the process environment with full precedence.
///
/// # Errors
///
/// Returns `ConfigError` if a configuration file is malformed, a typed
/// environment variable cannot be parsed, or the layers fail to merge.
pub fn load_config(cli: &Cli) -> Result<AppConfig> {
    load_config_with_env(cli, &mockable::DefaultEnv::new())
}

/// Load configuration reading environment variables through `env`.
///
/// # Errors
///
/// See [`load_config`].
pub fn load_config_with_env<E: mockable::Env>(cli: &Cli, env: &E) -> Result<AppConfig> {
    let mut composer = MergeComposer::new();

    let defaults =
        serde_json::to_value(AppConfig::default()).map_err(|e| ConfigError::ParseError {
            message: format!("failed to serialise defaults: {e}"),
        })?;
    composer.push_defaults(defaults);

    if let Some(path) = discover_config_file(cli, env) {
        load_config_file(&path, &mut composer)?;
    }

    let env_values = collect_env_vars(env)?;
    if !env_values.is_null() {
        composer.push_environment(env_values);
    }

    let cli_overrides = build_cli_overrides(cli);
    if !cli_overrides.is_null() {
        composer.push_cli(cli_overrides);
    }

    let config =
        AppConfig::merge_from_layers(composer.layers()).map_err(ConfigError::OrthoConfig)?;
    Ok(config)
}

/// Pick the configuration file: an existing `--config` path, then the
/// `BOARDCHECK_CONFIG_PATH` variable, then the standard discovery locations.
fn discover_config_file<E: mockable::Env>(cli: &Cli, env: &E) -> Option<Utf8PathBuf> {
    cli.config
        .clone()
        .filter(|p| p.exists())
        .or_else(|| {
            env.string(CONFIG_PATH_VAR)
                .filter(|p| !p.is_empty())
                .map(Utf8PathBuf::from)
                .filter(|p| p.exists())
        })
        .or_else(|| {
            let discovery = ConfigDiscovery::builder("boardcheck")
                .config_file_name("config.toml")
                .dotfile_name(".boardcheck.toml")
                .build();
            discovery
                .candidates()
                .into_iter()
                .filter(|p| p.exists())
                .find_map(|p| Utf8PathBuf::try_from(p).ok())
        })
}

/// Read a TOML configuration file and push it onto the composer.
fn load_config_file(path: &Utf8PathBuf, composer: &mut MergeComposer) -> Result<()> {
    let current_dir = Utf8PathBuf::from(".");
    let parent = path
        .parent()
        .filter(|p| !p.as_str().is_empty())
        .unwrap_or_else(|| current_dir.as_ref());
    let file_name = path.file_name().unwrap_or(path.as_str());

    let dir = Dir::open_ambient_dir(parent, ambient_authority()).map_err(|e| {
        ConfigError::ParseError {
            message: format!("failed to open directory {parent}: {e}"),
        }
    })?;

    let content = dir
        .read_to_string(file_name)
        .map_err(|e| ConfigError::ParseError {
            message: format!("failed to read {path}: {e}"),
        })?;

    let value = toml::from_str::<Value>(&content).map_err(|e| ConfigError::ParseError {
        message: format!("failed to parse {path}: {e}"),
    })?;

    composer.push_file(value, Some(path.clone()));
    Ok(())
}

/// Collect the mapped environment variables into a JSON object.
///
/// # Errors
///
/// Returns `ConfigError::InvalidValue` when a typed variable cannot be parsed.
fn collect_env_vars<E: mockable::Env>(env: &E) -> Result<Value> {
    let mut root = Map::new();

    for spec in ENV_VAR_SPECS {
        let Some(raw_value) = env.string(spec.env_var) else {
            continue;
        };

        let json_value = match spec.var_type {
            EnvVarType::String => Value::String(raw_value),
            EnvVarType::U64 => match raw_value.trim().parse::<u64>() {
                Ok(n) => Value::Number(n.into()),
                Err(_) => {
                    return Err(ConfigError::InvalidValue {
                        field: spec.env_var.to_owned(),
                        reason: format!("expected unsigned integer, got '{raw_value}'"),
                    }
                    .into());
                }
            },
        };

        root.insert(spec.field.to_owned(), json_value);
    }

    if root.is_empty() {
        Ok(Value::Null)
    } else {
        Ok(Value::Object(root))
    }
}

/// Build a JSON value containing CLI overrides.
fn build_cli_overrides(cli: &Cli) -> Value {
    cli.base_url.as_ref().map_or(Value::Null, |url| {
        let mut overrides = Map::new();
        overrides.insert("api_base_url".to_owned(), Value::String(url.clone()));
        Value::Object(overrides)
    })
}
