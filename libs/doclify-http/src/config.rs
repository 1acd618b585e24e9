use std::time::Duration;

/// Default maximum response body size (10 MiB)
pub const DEFAULT_MAX_BODY_SIZE: usize = 10 * 1024 * 1024;

/// Transport security configuration
///
/// Controls whether the transport enforces TLS or allows insecure HTTP.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[non_exhaustive]
pub enum TransportSecurity {
    /// Require TLS for all connections (HTTPS only) - default and recommended
    #[default]
    TlsOnly,
    /// Allow insecure HTTP connections (for testing with mock servers only)
    ///
    /// **WARNING**: the API key travels in a header, so this exposes it in
    /// clear text. Never use against the Doclify CDN.
    AllowInsecureHttp,
}

/// Overall HTTP transport configuration
///
/// TLS always verifies against the bundled Mozilla root set; the CDN
/// certificates chain to public roots, so no OS trust store is consulted.
#[derive(Debug, Clone)]
pub struct HttpTransportConfig {
    /// Per-request timeout, covering the body read as well (default: 30 seconds)
    pub request_timeout: Duration,

    /// TCP connect timeout (default: 10 seconds)
    pub connect_timeout: Duration,

    /// Maximum response body size in bytes, measured after decompression (default: 10 MiB)
    pub max_body_size: usize,

    /// Transport security mode (default: `TlsOnly`)
    pub transport: TransportSecurity,

    /// Maximum number of redirects to follow; `0` disables following (default: 10)
    pub max_redirects: usize,

    /// Timeout for idle pooled connections (default: 90 seconds)
    pub pool_idle_timeout: Option<Duration>,

    /// Maximum number of idle connections per host (default: 32)
    pub pool_max_idle_per_host: usize,
}

impl Default for HttpTransportConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            max_body_size: DEFAULT_MAX_BODY_SIZE,
            transport: TransportSecurity::TlsOnly,
            max_redirects: 10,
            pool_idle_timeout: Some(Duration::from_secs(90)),
            pool_max_idle_per_host: 32,
        }
    }
}

impl HttpTransportConfig {
    /// Short timeouts and a small pool, for CLIs and one-shot tools
    #[must_use]
    pub fn minimal() -> Self {
        Self {
            request_timeout: Duration::from_secs(10),
            connect_timeout: Duration::from_secs(5),
            pool_max_idle_per_host: 4,
            ..Self::default()
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = HttpTransportConfig::default();
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.connect_timeout, Duration::from_secs(10));
        assert_eq!(config.max_body_size, DEFAULT_MAX_BODY_SIZE);
        assert_eq!(config.transport, TransportSecurity::TlsOnly);
        assert_eq!(config.max_redirects, 10);
    }

    #[test]
    fn test_minimal_config() {
        let config = HttpTransportConfig::minimal();
        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert_eq!(config.connect_timeout, Duration::from_secs(5));
        assert_eq!(config.pool_max_idle_per_host, 4);
        assert_eq!(config.transport, TransportSecurity::TlsOnly);
    }
}
