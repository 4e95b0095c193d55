//! Resolution of the API credentials every outbound call needs.
//!
//! The key, token and base URL are the only values boardcheck cannot default.
//! They are checked together so that a single error names every missing
//! variable.

use std::sync::OnceLock;

use crate::config::AppConfig;
use crate::config::loader::{API_BASE_URL_VAR, API_KEY_VAR, API_TOKEN_VAR};
use crate::error::{ConfigError, Result};

/// The key/token pair appended to every request.
#[derive(Clone, PartialEq, Eq)]
pub struct Auth {
    /// API key (`key` query parameter).
    pub key: String,
    /// API token (`token` query parameter).
    pub token: String,
}

impl std::fmt::Debug for Auth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Auth")
            .field("key", &"<redacted>")
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Fully resolved, immutable credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    auth: Auth,
    base_url: String,
}

impl Credentials {
    /// Build credentials directly from their parts.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingRequired` naming each blank value and
    /// `ConfigError::InvalidValue` if the base URL is not HTTP(S).
    pub fn new(key: &str, token: &str, base_url: &str) -> Result<Self> {
        resolve(Some(key), Some(token), Some(base_url))
    }

    /// Resolve credentials from merged configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingRequired` listing every absent variable
    /// (`TRELLO_API_KEY`, `TRELLO_API_TOKEN`, `TRELLO_API_BASE_URL`) and
    /// `ConfigError::InvalidValue` if the base URL is not HTTP(S).
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        resolve(
            config.api_key.as_deref(),
            config.api_token.as_deref(),
            config.api_base_url.as_deref(),
        )
    }

    /// The key/token pair.
    #[must_use]
    pub const fn auth(&self) -> &Auth {
        &self.auth
    }

    /// The service base URL, always ending in `/`.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn resolve(
    raw_key: Option<&str>,
    raw_token: Option<&str>,
    raw_base_url: Option<&str>,
) -> Result<Credentials> {
    let fields = (present(raw_key), present(raw_token), present(raw_base_url));

    let (Some(key), Some(token), Some(base_url)) = fields else {
        let missing: Vec<&str> = [
            (fields.0.is_none(), API_KEY_VAR),
            (fields.1.is_none(), API_TOKEN_VAR),
            (fields.2.is_none(), API_BASE_URL_VAR),
        ]
        .into_iter()
        .filter_map(|(absent, name)| absent.then_some(name))
        .collect();
        return Err(ConfigError::MissingRequired {
            field: missing.join(", "),
        }
        .into());
    };

    if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        return Err(ConfigError::InvalidValue {
            field: API_BASE_URL_VAR.to_owned(),
            reason: format!("expected an http:// or https:// URL, got '{base_url}'"),
        }
        .into());
    }

    let normalised = if base_url.ends_with('/') {
        base_url.to_owned()
    } else {
        format!("{base_url}/")
    };

    Ok(Credentials {
        auth: Auth {
            key: key.to_owned(),
            token: token.to_owned(),
        },
        base_url: normalised,
    })
}

/// Memoises the first successful credential resolution.
///
/// Failed resolutions are not cached, so a later call can succeed once the
/// configuration is fixed.
#[derive(Debug, Default)]
pub struct CredentialCache {
    cell: OnceLock<Credentials>,
}

impl CredentialCache {
    /// Create an empty cache.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            cell: OnceLock::new(),
        }
    }

    /// Return the cached credentials, resolving them from `config` on first
    /// use.
    ///
    /// # Errors
    ///
    /// See [`Credentials::from_config`].
    pub fn get_or_resolve(&self, config: &AppConfig) -> Result<&Credentials> {
        if let Some(credentials) = self.cell.get() {
            return Ok(credentials);
        }
        let resolved = Credentials::from_config(config)?;
        Ok(self.cell.get_or_init(|| resolved))
    }
}
