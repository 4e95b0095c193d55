//! Behaviour shared by every resource object.
//!
//! A [`ResourceClient`] owns a private copy of the credentials, so altering
//! them (for example to simulate an invalid key) never affects the session or
//! other resource objects.

use std::sync::Arc;

use rand::seq::IndexedRandom;

use crate::api::session::Session;
use crate::api::transport::{ApiRequest, ApiResponse, Method, Transport};
use crate::config::Auth;
use crate::error::ApiError;

const NAME_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const NAME_SUFFIX_LEN: usize = 6;

/// Generate `<prefix>_xxxxxx` with a random base-36 suffix.
#[must_use]
pub fn random_name(prefix: &str) -> String {
    let mut rng = rand::rng();
    let suffix: String = (0..NAME_SUFFIX_LEN)
        .filter_map(|_| NAME_ALPHABET.choose(&mut rng).copied().map(char::from))
        .collect();
    format!("{prefix}_{suffix}")
}

/// Issues authenticated requests and checks their status codes.
#[derive(Clone)]
pub struct ResourceClient {
    transport: Arc<dyn Transport>,
    auth: Auth,
}

impl std::fmt::Debug for ResourceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceClient")
            .field("auth", &self.auth)
            .finish_non_exhaustive()
    }
}

impl ResourceClient {
    /// Bind a client to a session, copying its credentials.
    #[must_use]
    pub fn new(session: &Session) -> Self {
        Self {
            transport: session.transport(),
            auth: session.auth().clone(),
        }
    }

    /// Replace this client's API key.
    pub fn set_key(&mut self, key: &str) {
        key.clone_into(&mut self.auth.key);
    }

    /// The credentials this client sends.
    #[must_use]
    pub const fn auth(&self) -> &Auth {
        &self.auth
    }

    /// Start a request with the `key` and `token` query parameters set.
    #[must_use]
    pub fn request(&self, method: Method, path: impl Into<String>) -> ApiRequest {
        ApiRequest::new(method, path)
            .with_query("key", self.auth.key.as_str())
            .with_query("token", self.auth.token.as_str())
    }

    /// Send a request without checking its status.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Transport` if the call could not be made.
    pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        self.transport.send(request).await
    }

    /// Send a request and require `expected` as the status.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Transport` if the call could not be made and
    /// `ApiError::UnexpectedStatus` on any other status.
    pub async fn send_expecting(
        &self,
        operation: &str,
        request: ApiRequest,
        expected: u16,
    ) -> Result<ApiResponse, ApiError> {
        let response = self.send(request).await?;
        expect_status(operation, response, expected)
    }
}

/// Require `expected` as the status of `response`.
///
/// # Errors
///
/// Returns `ApiError::UnexpectedStatus` carrying the body (or
/// `[unavailable]`) when the status differs.
pub fn expect_status(
    operation: &str,
    response: ApiResponse,
    expected: u16,
) -> Result<ApiResponse, ApiError> {
    if response.status() == expected {
        return Ok(response);
    }
    Err(ApiError::UnexpectedStatus {
        operation: operation.to_owned(),
        expected,
        actual: response.status(),
        body: response.body_or_unavailable().to_owned(),
    })
}
