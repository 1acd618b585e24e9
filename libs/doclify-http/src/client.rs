use crate::builder::HttpTransportBuilder;
use crate::config::TransportSecurity;
use crate::error::{HttpError, InvalidUriKind};
use crate::transport::{Transport, TransportRequest, TransportResponse};
use async_trait::async_trait;
use bytes::Bytes;
use http::Request;
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use std::time::Duration;
use tower::ServiceExt;
use tower::util::BoxCloneSyncService;

/// Type alias for the boxed response body that supports decompression.
pub type ResponseBody =
    http_body_util::combinators::BoxBody<Bytes, Box<dyn std::error::Error + Send + Sync>>;

/// Type-erased service stack built by [`HttpTransportBuilder`].
pub(crate) type InnerService =
    BoxCloneSyncService<Request<Full<Bytes>>, http::Response<ResponseBody>, HttpError>;

/// hyper-based [`Transport`] with a tower middleware stack.
///
/// `HttpTransport` is `Clone + Send + Sync`; cloning shares the connection pool.
#[derive(Clone)]
pub struct HttpTransport {
    pub(crate) service: InnerService,
    pub(crate) max_body_size: usize,
    pub(crate) request_timeout: Duration,
    pub(crate) transport_security: TransportSecurity,
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("max_body_size", &self.max_body_size)
            .field("request_timeout", &self.request_timeout)
            .field("transport_security", &self.transport_security)
            .finish_non_exhaustive()
    }
}

impl HttpTransport {
    /// Create a transport with default configuration
    ///
    /// # Errors
    /// Returns an error if TLS initialization fails
    pub fn new() -> Result<Self, HttpError> {
        HttpTransportBuilder::new().build()
    }

    /// Create a builder for configuring the transport
    #[must_use]
    pub fn builder() -> HttpTransportBuilder {
        HttpTransportBuilder::new()
    }

    fn validate_url(&self, url: &str) -> Result<http::Uri, HttpError> {
        let uri: http::Uri = url
            .parse()
            .map_err(|e: http::uri::InvalidUri| HttpError::InvalidUri {
                url: url.to_owned(),
                kind: InvalidUriKind::ParseError,
                reason: e.to_string(),
            })?;

        if uri.authority().is_none() {
            return Err(HttpError::InvalidUri {
                url: url.to_owned(),
                kind: InvalidUriKind::MissingAuthority,
                reason: "missing host/authority".to_owned(),
            });
        }

        match uri.scheme_str() {
            Some("https") => Ok(uri),
            Some("http") => match self.transport_security {
                TransportSecurity::AllowInsecureHttp => Ok(uri),
                TransportSecurity::TlsOnly => Err(HttpError::InvalidScheme {
                    scheme: "http".to_owned(),
                    reason: "HTTPS required (transport security is TlsOnly)".to_owned(),
                }),
            },
            Some(scheme) => Err(HttpError::InvalidScheme {
                scheme: scheme.to_owned(),
                reason: "only http:// and https:// schemes are supported".to_owned(),
            }),
            None => Err(HttpError::InvalidUri {
                url: url.to_owned(),
                kind: InvalidUriKind::MissingScheme,
                reason: "missing scheme".to_owned(),
            }),
        }
    }

    async fn read_body(&self, body: ResponseBody) -> Result<Bytes, HttpError> {
        let limit = self.max_body_size;
        let collect: std::pin::Pin<
            Box<
                dyn std::future::Future<
                        Output = Result<
                            http_body_util::Collected<Bytes>,
                            Box<dyn std::error::Error + Send + Sync>,
                        >,
                    > + Send,
            >,
        > = Box::pin(Limited::new(body, limit).collect());

        match tokio::time::timeout(self.request_timeout, collect).await {
            Err(_) => Err(HttpError::Timeout(self.request_timeout)),
            Ok(Ok(collected)) => Ok(collected.to_bytes()),
            Ok(Err(e)) if e.is::<LengthLimitError>() => Err(HttpError::BodyTooLarge { limit }),
            Ok(Err(e)) => Err(HttpError::Transport(e)),
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, HttpError> {
        let uri = self.validate_url(&request.uri)?;

        let mut builder = Request::builder().method(request.method.clone()).uri(uri);
        if let Some(headers) = builder.headers_mut() {
            *headers = request.headers;
        }
        let body = request.body.map(Bytes::from).unwrap_or_default();
        let http_request = builder.body(Full::new(body))?;

        tracing::debug!(method = %request.method, uri = %request.uri, "sending request");

        let response = self.service.clone().oneshot(http_request).await?;
        let (parts, body) = response.into_parts();
        let body = self.read_body(body).await?;

        tracing::debug!(
            uri = %request.uri,
            status = parts.status.as_u16(),
            bytes = body.len(),
            "received response"
        );

        Ok(TransportResponse {
            status: parts.status,
            headers: parts.headers,
            body,
        })
    }
}
