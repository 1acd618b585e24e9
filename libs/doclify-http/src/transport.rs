use crate::error::HttpError;
use async_trait::async_trait;
use bytes::Bytes;
use http::{HeaderMap, Method, StatusCode};

/// A single outbound request, already fully resolved.
///
/// `uri` must be absolute; headers are sent exactly as given.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub method: Method,
    pub uri: String,
    pub headers: HeaderMap,
    pub body: Option<String>,
}

impl TransportRequest {
    /// Bodiless GET with no headers.
    #[must_use]
    pub fn get(uri: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            uri: uri.into(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    /// Replace the header set.
    #[must_use]
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Attach a body.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }
}

/// A fully-read response. The body is already decompressed.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TransportResponse {
    #[must_use]
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    /// `true` for 4xx and 5xx statuses.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        self.status.is_client_error() || self.status.is_server_error()
    }
}

/// Sends one HTTP request and returns the complete response.
///
/// Implementations return `Ok` for every HTTP status and `Err` only when no
/// response could be obtained.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a request.
    ///
    /// # Errors
    ///
    /// Returns `HttpError` for invalid URIs or headers, connection failures,
    /// timeouts, TLS failures and oversized bodies.
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, HttpError>;
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_request_get_defaults() {
        let req = TransportRequest::get("https://example.com/a");
        assert_eq!(req.method, Method::GET);
        assert_eq!(req.uri, "https://example.com/a");
        assert!(req.headers.is_empty());
        assert!(req.body.is_none());
    }

    #[test]
    fn test_response_failure_classification() {
        assert!(!TransportResponse::new(StatusCode::OK, "").is_failure());
        assert!(!TransportResponse::new(StatusCode::NOT_MODIFIED, "").is_failure());
        assert!(TransportResponse::new(StatusCode::NOT_FOUND, "").is_failure());
        assert!(TransportResponse::new(StatusCode::BAD_GATEWAY, "").is_failure());
    }
}
