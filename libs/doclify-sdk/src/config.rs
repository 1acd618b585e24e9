//! Client and cache configuration.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use crate::error::ConfigError;

/// `User-Agent` sent when the configuration does not override it.
pub const DEFAULT_USER_AGENT: &str = concat!("doclify-rust-sdk/", env!("CARGO_PKG_VERSION"));

/// TTL applied to cached responses unless configured otherwise.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

/// Capacity of the in-memory cache backend unless configured otherwise.
pub const DEFAULT_CACHE_MAX_ENTRIES: u64 = 10_000;

/// Connection settings for a single Doclify repository.
///
/// `repository` and `token` are required; they are optional here so that
/// configuration can be assembled from several layers before validation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClientConfig {
    /// Repository slug, used as the CDN subdomain.
    pub repository: Option<String>,

    /// API key sent as `x-api-key`.
    pub token: Option<SecretString>,

    /// Overrides the `https://{repository}.cdn.doclify.io/api/v2/` base.
    pub base_url: Option<String>,

    /// Overrides [`DEFAULT_USER_AGENT`].
    pub user_agent: Option<String>,
}

impl ClientConfig {
    #[must_use]
    pub fn new(repository: impl Into<String>, token: impl Into<String>) -> Self {
        let token: String = token.into();
        Self {
            repository: Some(repository.into()),
            token: Some(SecretString::from(token)),
            base_url: None,
            user_agent: None,
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Checks the required fields and resolves the base URL.
    ///
    /// Empty strings count as missing.
    ///
    /// # Errors
    /// Returns [`ConfigError`] if the repository or token is missing, or the
    /// base URL cannot be parsed.
    pub fn validate(&self) -> Result<ResolvedConfig, ConfigError> {
        let repository = self
            .repository
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .ok_or(ConfigError::MissingRepository)?;

        let token = self
            .token
            .as_ref()
            .filter(|t| !t.expose_secret().trim().is_empty())
            .ok_or(ConfigError::MissingToken)?;

        let raw_base = match &self.base_url {
            Some(base) => base.clone(),
            None => format!("https://{repository}.cdn.doclify.io/api/v2/"),
        };
        let base_url = parse_base_url(&raw_base)?;

        Ok(ResolvedConfig {
            repository: repository.to_owned(),
            token: token.clone(),
            base_url,
            user_agent: self
                .user_agent
                .clone()
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_owned()),
        })
    }
}

/// Validated form of [`ClientConfig`].
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub repository: String,
    pub token: SecretString,
    pub base_url: Url,
    pub user_agent: String,
}

// A base without a trailing slash would drop its last segment on join.
fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let normalized = if raw.ends_with('/') {
        raw.to_owned()
    } else {
        format!("{raw}/")
    };

    let url = Url::parse(&normalized).map_err(|e| ConfigError::InvalidBaseUrl {
        url: raw.to_owned(),
        reason: e.to_string(),
    })?;

    if url.cannot_be_a_base() || url.host_str().is_none() {
        return Err(ConfigError::InvalidBaseUrl {
            url: raw.to_owned(),
            reason: "base URL must be absolute with a host".to_owned(),
        });
    }

    Ok(url)
}

/// Response cache settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CacheConfig {
    /// Time-to-live for cached responses, in whole seconds.
    #[serde(with = "duration_secs")]
    pub ttl: Duration,

    /// Maximum number of entries held by the in-memory backend.
    pub max_entries: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_CACHE_TTL,
            max_entries: DEFAULT_CACHE_MAX_ENTRIES,
        }
    }
}

impl CacheConfig {
    #[must_use]
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}
