//! The per-scenario API session.

use std::sync::Arc;

use tracing::debug;

use crate::api::transport::{HttpTransport, Transport};
use crate::config::{Auth, Credentials};
use crate::error::ApiError;

/// An open connection context: a transport plus the credentials to use.
///
/// Cloning is cheap and shares the underlying transport.
#[derive(Clone)]
pub struct Session {
    transport: Arc<dyn Transport>,
    credentials: Credentials,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("base_url", &self.credentials.base_url())
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Open an HTTP session against the configured base URL.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Transport` if the HTTP client cannot be built.
    pub fn open(credentials: &Credentials) -> Result<Self, ApiError> {
        let transport = HttpTransport::new(credentials.base_url())?;
        debug!(base_url = credentials.base_url(), "opened API session");
        Ok(Self::with_transport(Arc::new(transport), credentials.clone()))
    }

    /// Build a session around an existing transport.
    #[must_use]
    pub fn with_transport(transport: Arc<dyn Transport>, credentials: Credentials) -> Self {
        Self {
            transport,
            credentials,
        }
    }

    /// The transport requests are sent through.
    #[must_use]
    pub fn transport(&self) -> Arc<dyn Transport> {
        Arc::clone(&self.transport)
    }

    /// The credentials this session was opened with.
    #[must_use]
    pub const fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// The key/token pair.
    #[must_use]
    pub const fn auth(&self) -> &Auth {
        self.credentials.auth()
    }

    /// Dispose of the session.
    pub fn close(self) {
        debug!(base_url = self.credentials.base_url(), "closed API session");
    }
}
