//! Request encoding: endpoint + options into a [`TransportRequest`].

use doclify_http::{HttpError, InvalidUriKind, TransportRequest};
use http::header::{ACCEPT, ACCEPT_ENCODING, CONTENT_TYPE, HeaderName, HeaderValue, USER_AGENT};
use http::HeaderMap;
use secrecy::{ExposeSecret, SecretString};
use url::Url;

use crate::config::ResolvedConfig;
use crate::query::QueryParams;

const API_KEY: &str = "x-api-key";

/// Per-call request options.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Query parameters; the only part that contributes to the cache key.
    pub query: QueryParams,
    /// Base to resolve the endpoint against instead of the client base.
    pub host: Option<String>,
    /// Extra headers, overriding the defaults on collision.
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl RequestOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_query(mut self, query: QueryParams) -> Self {
        self.query = query;
        self
    }

    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }
}

/// Builds URIs and headers for the Doclify API.
pub struct RequestCodec {
    base_url: Url,
    token: SecretString,
    user_agent: String,
}

impl std::fmt::Debug for RequestCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestCodec")
            .field("base_url", &self.base_url.as_str())
            .field("user_agent", &self.user_agent)
            .finish_non_exhaustive()
    }
}

impl RequestCodec {
    #[must_use]
    pub fn new(config: &ResolvedConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            token: config.token.clone(),
            user_agent: config.user_agent.clone(),
        }
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolves `endpoint` against `host` (or the client base) per RFC 3986
    /// and appends the percent-encoded query when it is non-empty.
    ///
    /// # Errors
    /// Returns [`HttpError::InvalidUri`] if `host` or the resolved reference
    /// cannot be parsed.
    pub fn build_uri(
        &self,
        endpoint: &str,
        host: Option<&str>,
        query: &QueryParams,
    ) -> Result<String, HttpError> {
        let base = match host {
            Some(host) => Url::parse(host).map_err(|e| invalid_uri(host, &e))?,
            None => self.base_url.clone(),
        };
        let mut url = base.join(endpoint).map_err(|e| invalid_uri(endpoint, &e))?;

        if !query.is_empty() {
            url.set_query(Some(&encode_query(query)));
        }

        Ok(url.into())
    }

    /// Default headers with `overrides` applied on top.
    ///
    /// # Errors
    /// Returns an [`HttpError`] for an invalid header name or value.
    pub fn build_headers(
        &self,
        overrides: &[(String, String)],
        has_body: bool,
    ) -> Result<HeaderMap, HttpError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("gzip"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, HeaderValue::from_str(&self.user_agent)?);

        let mut api_key = HeaderValue::from_str(self.token.expose_secret())?;
        api_key.set_sensitive(true);
        headers.insert(HeaderName::from_static(API_KEY), api_key);

        if has_body {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }

        for (name, value) in overrides {
            let name = HeaderName::from_bytes(name.as_bytes())?;
            headers.insert(name, HeaderValue::from_str(value)?);
        }

        Ok(headers)
    }

    /// Encodes a GET request for `endpoint`.
    ///
    /// # Errors
    /// Returns an [`HttpError`] if the URI or headers are invalid.
    pub fn encode(
        &self,
        endpoint: &str,
        options: &RequestOptions,
    ) -> Result<TransportRequest, HttpError> {
        let uri = self.build_uri(endpoint, options.host.as_deref(), &options.query)?;
        let headers = self.build_headers(&options.headers, options.body.is_some())?;

        let mut request = TransportRequest::get(uri).with_headers(headers);
        if let Some(body) = &options.body {
            request = request.with_body(body.as_str());
        }
        Ok(request)
    }
}

/// RFC 3986 form encoding: unreserved characters pass through, everything
/// else is percent-encoded (space becomes `%20`).
#[must_use]
pub fn encode_query(query: &QueryParams) -> String {
    query
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

fn invalid_uri(url: &str, err: &url::ParseError) -> HttpError {
    HttpError::InvalidUri {
        url: url.to_owned(),
        kind: InvalidUriKind::ParseError,
        reason: err.to_string(),
    }
}
