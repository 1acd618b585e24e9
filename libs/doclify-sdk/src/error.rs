use doclify_http::{HttpError, TransportRequest, TransportResponse};
use http::{HeaderMap, StatusCode};
use serde_json::Value;
use thiserror::Error;

/// Message used when a failed response carries no `error.message`.
pub const DEFAULT_REQUEST_ERROR_MESSAGE: &str = "Invalid request parameters.";

/// Invalid client configuration, reported at construction.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("Repository option is missing.")]
    MissingRepository,

    #[error("Repository token is missing.")]
    MissingToken,

    #[error("Invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

/// Cache backend failure.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CacheError {
    #[error("Cache backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl CacheError {
    #[must_use]
    pub fn backend(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Backend(err.into())
    }
}

/// The API answered with a 4xx or 5xx status.
///
/// Carries the request that was sent, the raw response and, when the body is
/// JSON, its decoded form. The `x-api-key` header is marked sensitive so it
/// does not show up in `Debug` output.
#[derive(Debug, Error)]
#[error("{message} (HTTP {})", .response.status)]
pub struct RequestError {
    message: String,
    request: TransportRequest,
    response: TransportResponse,
    data: Option<Value>,
}

impl RequestError {
    #[must_use]
    pub fn from_response(mut request: TransportRequest, response: TransportResponse) -> Self {
        mark_sensitive(&mut request.headers);

        let data: Option<Value> = serde_json::from_slice(&response.body).ok();
        let message = data
            .as_ref()
            .and_then(|d| d.pointer("/error/message"))
            .and_then(Value::as_str)
            .map_or_else(|| DEFAULT_REQUEST_ERROR_MESSAGE.to_owned(), str::to_owned);

        Self {
            message,
            request,
            response,
            data,
        }
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[must_use]
    pub fn request(&self) -> &TransportRequest {
        &self.request
    }

    #[must_use]
    pub fn response(&self) -> &TransportResponse {
        &self.response
    }

    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.response.status
    }

    /// Decoded response body, if it was valid JSON.
    #[must_use]
    pub fn data(&self) -> Option<&Value> {
        self.data.as_ref()
    }
}

fn mark_sensitive(headers: &mut HeaderMap) {
    if let Some(value) = headers.get_mut("x-api-key") {
        value.set_sensitive(true);
    }
}

/// Top-level SDK error.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DoclifyError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Request(Box<RequestError>),

    #[error(transparent)]
    Transport(#[from] HttpError),

    #[error("Failed to decode response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error(transparent)]
    Cache(#[from] CacheError),
}

impl From<RequestError> for DoclifyError {
    fn from(err: RequestError) -> Self {
        Self::Request(Box::new(err))
    }
}

impl DoclifyError {
    /// The failed-response details, if this is an HTTP status failure.
    #[must_use]
    pub fn as_request_error(&self) -> Option<&RequestError> {
        match self {
            Self::Request(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}
