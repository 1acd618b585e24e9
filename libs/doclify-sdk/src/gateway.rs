//! Request dispatch with optional response caching.

use doclify_http::Transport;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::cache::{ResponseCache, request_key};
use crate::codec::{RequestCodec, RequestOptions};
use crate::config::CacheConfig;
use crate::error::{DoclifyError, RequestError};

/// Encodes requests, sends them over the transport and decodes the result.
///
/// The only component that talks to the [`Transport`].
#[derive(Clone)]
pub struct RequestGateway {
    codec: Arc<RequestCodec>,
    transport: Arc<dyn Transport>,
}

impl std::fmt::Debug for RequestGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestGateway")
            .field("codec", &self.codec)
            .finish_non_exhaustive()
    }
}

impl RequestGateway {
    #[must_use]
    pub fn new(codec: RequestCodec, transport: Arc<dyn Transport>) -> Self {
        Self {
            codec: Arc::new(codec),
            transport,
        }
    }

    #[must_use]
    pub fn codec(&self) -> &RequestCodec {
        &self.codec
    }

    /// Sends a GET to `endpoint` and returns the decoded JSON body as-is.
    ///
    /// # Errors
    /// - [`DoclifyError::Request`] for a 4xx/5xx response
    /// - [`DoclifyError::Transport`] for encoding or network failures
    /// - [`DoclifyError::Decode`] if a successful body is not JSON
    pub async fn send_request(
        &self,
        endpoint: &str,
        options: &RequestOptions,
    ) -> Result<Value, DoclifyError> {
        let request = self.codec.encode(endpoint, options)?;
        debug!(endpoint, uri = %request.uri, "sending request");

        let response = self.transport.send(request.clone()).await?;

        if response.is_failure() {
            warn!(endpoint, status = %response.status, "request failed");
            return Err(RequestError::from_response(request, response).into());
        }

        decode_body(&response.body)
    }
}

// An empty body decodes to null.
fn decode_body(body: &[u8]) -> Result<Value, DoclifyError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_slice(body)?)
}

#[derive(Clone)]
struct AttachedCache {
    backend: Arc<dyn ResponseCache>,
    config: CacheConfig,
}

/// [`RequestGateway`] with an optional response cache in front.
///
/// Without a cache every call goes to the transport. With one, successful
/// responses are stored under [`request_key`] for the configured TTL;
/// failures are never cached.
#[derive(Clone)]
pub struct CachingGateway {
    gateway: RequestGateway,
    cache: Option<AttachedCache>,
}

impl std::fmt::Debug for CachingGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachingGateway")
            .field("gateway", &self.gateway)
            .field("cache_ttl", &self.cache.as_ref().map(|c| c.config.ttl))
            .finish_non_exhaustive()
    }
}

impl CachingGateway {
    #[must_use]
    pub fn new(gateway: RequestGateway) -> Self {
        Self {
            gateway,
            cache: None,
        }
    }

    /// Attaches (or replaces) the cache backend.
    pub fn attach_cache(&mut self, backend: Arc<dyn ResponseCache>, config: CacheConfig) {
        self.cache = Some(AttachedCache { backend, config });
    }

    #[must_use]
    pub fn with_cache(mut self, backend: Arc<dyn ResponseCache>, config: CacheConfig) -> Self {
        self.attach_cache(backend, config);
        self
    }

    #[must_use]
    pub fn cache(&self) -> Option<&Arc<dyn ResponseCache>> {
        self.cache.as_ref().map(|c| &c.backend)
    }

    #[must_use]
    pub fn gateway(&self) -> &RequestGateway {
        &self.gateway
    }

    /// Serves `endpoint` from the cache when possible.
    ///
    /// # Errors
    /// Everything [`RequestGateway::send_request`] returns, plus
    /// [`DoclifyError::Cache`] if the backend fails.
    pub async fn request_with_cache(
        &self,
        endpoint: &str,
        options: &RequestOptions,
    ) -> Result<Value, DoclifyError> {
        let Some(cache) = &self.cache else {
            return self.gateway.send_request(endpoint, options).await;
        };

        let key = request_key(endpoint, &options.query);
        if let Some(value) = cache.backend.get(&key).await? {
            debug!(endpoint, key = %key, "cache hit");
            return Ok(value);
        }
        debug!(endpoint, key = %key, "cache miss");

        let value = self.gateway.send_request(endpoint, options).await?;
        cache.backend.set(&key, &value, cache.config.ttl).await?;
        Ok(value)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::query::QueryParams;
    use crate::test_support::{BrokenCache, CountingCache, MockTransport, test_codec};
    use http::StatusCode;
    use serde_json::json;
    use std::time::Duration;

    fn gateway(transport: &Arc<MockTransport>) -> RequestGateway {
        RequestGateway::new(test_codec(), transport.clone())
    }

    fn search_options(limit: &str) -> RequestOptions {
        RequestOptions::new().with_query(QueryParams::new().with("q", "[]").with("limit", limit))
    }

    #[tokio::test]
    async fn test_send_request_returns_decoded_json() {
        let transport = Arc::new(MockTransport::json(&json!([{"id": 1}])));
        let value = gateway(&transport)
            .send_request("documents/search", &search_options("20"))
            .await
            .unwrap();

        assert_eq!(value, json!([{"id": 1}]));
        let request = transport.last_request();
        assert_eq!(request.method, http::Method::GET);
        assert_eq!(
            request.uri,
            "https://acme.cdn.doclify.io/api/v2/documents/search?q=%5B%5D&limit=20"
        );
        assert_eq!(request.headers["x-api-key"], "secret");
    }

    #[tokio::test]
    async fn test_send_request_returns_scalars_and_null() {
        let transport = Arc::new(MockTransport::json(&json!(42)));
        let value = gateway(&transport)
            .send_request("documents/count", &RequestOptions::new())
            .await
            .unwrap();
        assert_eq!(value, json!(42));

        let transport = Arc::new(MockTransport::status(StatusCode::OK, ""));
        let value = gateway(&transport)
            .send_request("documents/single", &RequestOptions::new())
            .await
            .unwrap();
        assert_eq!(value, Value::Null);
    }

    #[tokio::test]
    async fn test_http_failure_becomes_request_error() {
        let transport = Arc::new(MockTransport::status(
            StatusCode::UNPROCESSABLE_ENTITY,
            r#"{"error":{"message":"Invalid operator"}}"#,
        ));
        let err = gateway(&transport)
            .send_request("documents/search", &search_options("20"))
            .await
            .unwrap_err();

        let request_err = err.as_request_error().unwrap();
        assert_eq!(request_err.message(), "Invalid operator");
        assert_eq!(request_err.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(request_err.request().uri.contains("documents/search"));
    }

    #[tokio::test]
    async fn test_transport_error_propagates() {
        let transport = Arc::new(MockTransport::timeout());
        let err = gateway(&transport)
            .send_request("documents/search", &RequestOptions::new())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DoclifyError::Transport(doclify_http::HttpError::Timeout(_))
        ));
    }

    #[tokio::test]
    async fn test_non_json_success_is_decode_error() {
        let transport = Arc::new(MockTransport::status(StatusCode::OK, "<html>"));
        let err = gateway(&transport)
            .send_request("documents/search", &RequestOptions::new())
            .await
            .unwrap_err();
        assert!(matches!(err, DoclifyError::Decode(_)));
    }

    #[tokio::test]
    async fn test_cache_round_trip_issues_one_transport_call() {
        let transport = Arc::new(MockTransport::json(&json!({"data": ["a"]})));
        let cache = Arc::new(CountingCache::default());
        let caching = CachingGateway::new(gateway(&transport))
            .with_cache(cache.clone(), CacheConfig::default());

        let options = search_options("20");
        let first = caching
            .request_with_cache("documents/search", &options)
            .await
            .unwrap();
        let second = caching
            .request_with_cache("documents/search", &options)
            .await
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(transport.calls(), 1);
        assert_eq!(cache.gets(), 2);
        assert_eq!(cache.sets(), 1);
        assert_eq!(cache.last_ttl(), Some(Duration::from_secs(300)));
    }

    #[tokio::test]
    async fn test_different_queries_do_not_collide() {
        let transport = Arc::new(MockTransport::json(&json!([])));
        let caching = CachingGateway::new(gateway(&transport))
            .with_cache(Arc::new(CountingCache::default()), CacheConfig::default());

        caching
            .request_with_cache("documents/search", &search_options("10"))
            .await
            .unwrap();
        caching
            .request_with_cache("documents/search", &search_options("20"))
            .await
            .unwrap();

        assert_eq!(transport.calls(), 2);
    }

    #[tokio::test]
    async fn test_host_and_headers_do_not_affect_key() {
        let transport = Arc::new(MockTransport::json(&json!([])));
        let caching = CachingGateway::new(gateway(&transport))
            .with_cache(Arc::new(CountingCache::default()), CacheConfig::default());

        caching
            .request_with_cache("documents/search", &search_options("10"))
            .await
            .unwrap();
        let with_header = search_options("10").with_header("x-trace-id", "abc");
        caching
            .request_with_cache("documents/search", &with_header)
            .await
            .unwrap();

        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn test_configured_ttl_is_used() {
        let transport = Arc::new(MockTransport::json(&json!([])));
        let cache = Arc::new(CountingCache::default());
        let config = CacheConfig::default().with_ttl(Duration::from_secs(30));
        let caching = CachingGateway::new(gateway(&transport)).with_cache(cache.clone(), config);

        caching
            .request_with_cache("documents/search", &search_options("10"))
            .await
            .unwrap();
        assert_eq!(cache.last_ttl(), Some(Duration::from_secs(30)));
    }

    #[tokio::test]
    async fn test_failures_are_not_cached() {
        let transport = Arc::new(MockTransport::status(StatusCode::NOT_FOUND, "{}"));
        let cache = Arc::new(CountingCache::default());
        let caching = CachingGateway::new(gateway(&transport))
            .with_cache(cache.clone(), CacheConfig::default());

        for _ in 0..2 {
            let err = caching
                .request_with_cache("documents/single", &RequestOptions::new())
                .await
                .unwrap_err();
            assert!(matches!(err, DoclifyError::Request(_)));
        }

        assert_eq!(transport.calls(), 2);
        assert_eq!(cache.sets(), 0);
    }

    #[tokio::test]
    async fn test_no_cache_always_hits_transport() {
        let transport = Arc::new(MockTransport::json(&json!({})));
        let caching = CachingGateway::new(gateway(&transport));
        assert!(caching.cache().is_none());

        for _ in 0..3 {
            caching
                .request_with_cache("documents/single", &RequestOptions::new())
                .await
                .unwrap();
        }
        assert_eq!(transport.calls(), 3);
    }

    #[tokio::test]
    async fn test_cache_backend_error_propagates() {
        let transport = Arc::new(MockTransport::json(&json!({})));
        let caching = CachingGateway::new(gateway(&transport))
            .with_cache(Arc::new(BrokenCache), CacheConfig::default());

        let err = caching
            .request_with_cache("documents/single", &RequestOptions::new())
            .await
            .unwrap_err();
        assert!(matches!(err, DoclifyError::Cache(_)));
        assert_eq!(transport.calls(), 0);
    }
}
