use doclify_http::{HttpTransportBuilder, HttpTransportConfig, Transport};
use secrecy::SecretString;
use serde_json::Value;
use std::sync::Arc;
use url::Url;

use crate::cache::ResponseCache;
use crate::codec::{RequestCodec, RequestOptions};
use crate::config::{CacheConfig, ClientConfig};
use crate::documents::Documents;
use crate::error::DoclifyError;
use crate::gateway::{CachingGateway, RequestGateway};

/// Entry point of the SDK, bound to one repository.
///
/// Cheap to clone; clones share the transport and the cache backend.
#[derive(Debug, Clone)]
pub struct Client {
    repository: String,
    gateway: CachingGateway,
}

impl Client {
    /// Client over the default HTTPS transport.
    ///
    /// # Errors
    /// Returns [`DoclifyError::Config`] for a missing repository or token, or
    /// [`DoclifyError::Transport`] if the TLS transport cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self, DoclifyError> {
        Self::builder().config(config).build()
    }

    #[must_use]
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    #[must_use]
    pub fn repository(&self) -> &str {
        &self.repository
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        self.gateway.gateway().codec().base_url()
    }

    /// Attaches a response cache; later calls on this client (and builders it
    /// creates) go through it.
    pub fn add_cache(&mut self, cache: Arc<dyn ResponseCache>, config: CacheConfig) {
        self.gateway.attach_cache(cache, config);
    }

    #[must_use]
    pub fn cache(&self) -> Option<&Arc<dyn ResponseCache>> {
        self.gateway.cache()
    }

    /// A fresh document query.
    pub fn documents(&self) -> Documents {
        Documents::new(self.gateway.clone())
    }

    /// Uncached request to an arbitrary endpoint.
    ///
    /// # Errors
    /// See [`RequestGateway::send_request`].
    pub async fn request(
        &self,
        endpoint: &str,
        options: &RequestOptions,
    ) -> Result<Value, DoclifyError> {
        self.send_request(endpoint, options).await
    }

    /// # Errors
    /// See [`RequestGateway::send_request`].
    pub async fn send_request(
        &self,
        endpoint: &str,
        options: &RequestOptions,
    ) -> Result<Value, DoclifyError> {
        self.gateway.gateway().send_request(endpoint, options).await
    }

    /// Request served from the attached cache when possible.
    ///
    /// # Errors
    /// See [`CachingGateway::request_with_cache`].
    pub async fn request_with_cache(
        &self,
        endpoint: &str,
        options: &RequestOptions,
    ) -> Result<Value, DoclifyError> {
        self.gateway.request_with_cache(endpoint, options).await
    }
}

/// Builder for [`Client`].
///
/// Without an explicit transport, an [`HttpTransport`](doclify_http::HttpTransport)
/// is built from the transport config (defaults when unset).
#[derive(Default)]
pub struct ClientBuilder {
    config: ClientConfig,
    transport: Option<Arc<dyn Transport>>,
    transport_config: Option<HttpTransportConfig>,
    cache: Option<(Arc<dyn ResponseCache>, CacheConfig)>,
}

impl ClientBuilder {
    #[must_use]
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn repository(mut self, repository: impl Into<String>) -> Self {
        self.config.repository = Some(repository.into());
        self
    }

    #[must_use]
    pub fn token(mut self, token: impl Into<String>) -> Self {
        let token: String = token.into();
        self.config.token = Some(SecretString::from(token));
        self
    }

    /// Uses `transport` instead of building an HTTP transport.
    #[must_use]
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    #[must_use]
    pub fn transport_config(mut self, config: HttpTransportConfig) -> Self {
        self.transport_config = Some(config);
        self
    }

    #[must_use]
    pub fn cache(mut self, cache: Arc<dyn ResponseCache>, config: CacheConfig) -> Self {
        self.cache = Some((cache, config));
        self
    }

    /// # Errors
    /// Returns [`DoclifyError::Config`] for invalid configuration, or
    /// [`DoclifyError::Transport`] if the HTTP transport cannot be built.
    pub fn build(self) -> Result<Client, DoclifyError> {
        let resolved = self.config.validate()?;

        let transport: Arc<dyn Transport> = match self.transport {
            Some(transport) => transport,
            None => {
                let config = self.transport_config.unwrap_or_default();
                Arc::new(HttpTransportBuilder::with_config(config).build()?)
            }
        };

        let codec = RequestCodec::new(&resolved);
        let mut gateway = CachingGateway::new(RequestGateway::new(codec, transport));
        if let Some((cache, config)) = self.cache {
            gateway.attach_cache(cache, config);
        }

        tracing::debug!(
            repository = %resolved.repository,
            base_url = %resolved.base_url,
            cached = gateway.cache().is_some(),
            "Doclify client initialized"
        );

        Ok(Client {
            repository: resolved.repository,
            gateway,
        })
    }
}

impl std::fmt::Debug for ClientBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientBuilder")
            .field("config", &self.config)
            .field("transport_config", &self.transport_config)
            .field("cache", &self.cache.as_ref().map(|(_, config)| config))
            .finish_non_exhaustive()
    }
}
