//! Outbound HTTP plumbing.
//!
//! [`Transport`] is the seam between resource objects and the network:
//! production code uses [`HttpTransport`] (reqwest), while tests inject
//! `mockall` mocks or an in-process fake service.

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use serde_json::Value;
use tracing::debug;

use crate::error::ApiError;

/// A boxed future for async trait methods.
///
/// Keeps [`Transport`] object-safe and compatible with `mockall::automock`.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Placeholder used when a response body could not be read.
pub const BODY_UNAVAILABLE: &str = "[unavailable]";

/// HTTP verbs used against the board service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// `GET`
    Get,
    /// `POST`
    Post,
    /// `PUT`
    Put,
    /// `DELETE`
    Delete,
}

impl Method {
    fn as_reqwest(self) -> reqwest::Method {
        match self {
            Self::Get => reqwest::Method::GET,
            Self::Post => reqwest::Method::POST,
            Self::Put => reqwest::Method::PUT,
            Self::Delete => reqwest::Method::DELETE,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        };
        f.write_str(verb)
    }
}

/// A single outbound request.
///
/// `path` is relative to the service base URL unless it is already an
/// absolute `http(s)://` URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    /// HTTP verb.
    pub method: Method,
    /// Path relative to the base URL.
    pub path: String,
    /// Query parameters, in insertion order.
    pub query: Vec<(String, String)>,
    /// Form fields sent as `application/x-www-form-urlencoded`.
    pub form: Vec<(String, String)>,
    /// JSON body; sent instead of the form when present.
    pub json: Option<Value>,
}

impl ApiRequest {
    /// Create a request with no parameters.
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            form: Vec::new(),
            json: None,
        }
    }

    /// Append a query parameter.
    #[must_use]
    pub fn with_query(mut self, key: &str, value: impl Into<String>) -> Self {
        self.query.push((key.to_owned(), value.into()));
        self
    }

    /// Append a form field.
    #[must_use]
    pub fn with_form(mut self, key: &str, value: impl Into<String>) -> Self {
        self.form.push((key.to_owned(), value.into()));
        self
    }

    /// Send `body` as JSON.
    #[must_use]
    pub fn with_json(mut self, body: Value) -> Self {
        self.json = Some(body);
        self
    }

    /// Look up the first query parameter called `key`.
    #[must_use]
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// The status and body of a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    status: u16,
    body: Option<String>,
}

impl ApiResponse {
    /// Build a response; `body` is `None` when it could not be read.
    #[must_use]
    pub const fn new(status: u16, body: Option<String>) -> Self {
        Self { status, body }
    }

    /// The HTTP status code.
    #[must_use]
    pub const fn status(&self) -> u16 {
        self.status
    }

    /// The body text, if it could be read.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.body.as_deref()
    }

    /// The body text, or `[unavailable]`.
    #[must_use]
    pub fn body_or_unavailable(&self) -> &str {
        self.text().unwrap_or(BODY_UNAVAILABLE)
    }

    /// Parse the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::MalformedResponse` if the body is unavailable or is
    /// not valid JSON.
    pub fn json(&self) -> Result<Value, ApiError> {
        let text = self.text().ok_or_else(|| ApiError::MalformedResponse {
            message: String::from("response body is unavailable"),
        })?;
        serde_json::from_str(text).map_err(|e| ApiError::MalformedResponse {
            message: format!("response body is not JSON: {e}"),
        })
    }

    /// Read a string field from a JSON object body.
    ///
    /// Returns `Ok(None)` if the field is absent, null or not a string.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::MalformedResponse` if the body is not JSON.
    pub fn string_field(&self, field: &str) -> Result<Option<String>, ApiError> {
        Ok(self
            .json()?
            .get(field)
            .and_then(Value::as_str)
            .map(str::to_owned))
    }
}

/// Sends [`ApiRequest`]s and returns their [`ApiResponse`]s.
///
/// Implementations issue exactly one outbound call per `send` and never
/// retry. A non-success status is not an error at this level.
#[cfg_attr(test, mockall::automock)]
pub trait Transport: Send + Sync {
    /// Send one request.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Transport` if the request could not be sent.
    fn send(&self, request: ApiRequest) -> BoxFuture<'_, Result<ApiResponse, ApiError>>;
}

/// Production [`Transport`] backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    /// Create a transport rooted at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Transport` if the HTTP client cannot be built (for
    /// example, because TLS initialisation failed).
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| ApiError::Transport {
                path: base_url.to_owned(),
                message: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self {
            client,
            base_url: base_url.to_owned(),
        })
    }

    /// Resolve a request path against the base URL.
    #[must_use]
    pub fn url_for(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_owned();
        }
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

impl Transport for HttpTransport {
    fn send(&self, request: ApiRequest) -> BoxFuture<'_, Result<ApiResponse, ApiError>> {
        Box::pin(async move {
            let url = self.url_for(&request.path);
            // Credentials travel in the query string, so only the path is logged.
            debug!(method = %request.method, path = %request.path, "sending request");

            let mut builder = self.client.request(request.method.as_reqwest(), &url);
            if !request.query.is_empty() {
                builder = builder.query(&request.query);
            }
            if let Some(body) = &request.json {
                builder = builder.json(body);
            } else if !request.form.is_empty() {
                builder = builder.form(&request.form);
            }

            let response = builder.send().await.map_err(|e| ApiError::Transport {
                path: request.path.clone(),
                message: e.without_url().to_string(),
            })?;
            let status = response.status().as_u16();
            let body = response.text().await.ok();
            debug!(method = %request.method, path = %request.path, status, "received response");
            Ok(ApiResponse::new(status, body))
        })
    }
}
