//! Layered CLI configuration.
//!
//! Precedence, lowest first: built-in defaults, YAML file (`--config`),
//! environment (`DOCLIFY__` prefix, `__` separates nested keys, e.g.
//! `DOCLIFY__CLIENT__TOKEN`), command line overrides.

use anyhow::Result;
use doclify_http::{DEFAULT_MAX_BODY_SIZE, HttpTransportConfig, TransportSecurity};
use doclify_sdk::{CacheConfig, ClientConfig};
use figment::Figment;
use figment::providers::{Env, Format, Yaml};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::path::Path;
use std::time::Duration;

pub const ENV_PREFIX: &str = "DOCLIFY__";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub client: ClientConfig,
    /// Response caching; disabled when absent.
    pub cache: Option<CacheConfig>,
    pub http: HttpConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HttpConfig {
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
    pub max_body_size: usize,
    /// Permit plain `http://` base URLs. Local testing only.
    pub allow_insecure_http: bool,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            connect_timeout_secs: 10,
            max_body_size: DEFAULT_MAX_BODY_SIZE,
            allow_insecure_http: false,
        }
    }
}

impl HttpConfig {
    #[must_use]
    pub fn to_transport_config(&self) -> HttpTransportConfig {
        let mut config = HttpTransportConfig::minimal();
        config.request_timeout = Duration::from_secs(self.timeout_secs);
        config.connect_timeout = Duration::from_secs(self.connect_timeout_secs);
        config.max_body_size = self.max_body_size;
        if self.allow_insecure_http {
            tracing::warn!("plain HTTP enabled; the API key will be sent unencrypted");
            config.transport = TransportSecurity::AllowInsecureHttp;
        }
        config
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// Default filter directive when neither `-v` nor `RUST_LOG` is given.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_owned(),
        }
    }
}

/// Values given on the command line; `None` leaves the config untouched.
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub repository: Option<String>,
    pub token: Option<String>,
    pub base_url: Option<String>,
    pub no_cache: bool,
}

impl AppConfig {
    /// Loads defaults, then the YAML file if given, then the environment.
    ///
    /// # Errors
    /// Returns an error if a layer cannot be read or does not match the schema.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Ok(Self::figment(path).extract()?)
    }

    fn figment(path: Option<&Path>) -> Figment {
        let mut figment = Figment::new();
        if let Some(path) = path {
            figment = figment.merge(Yaml::file(path));
        }
        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    pub fn apply_cli_overrides(&mut self, overrides: &CliOverrides) {
        if let Some(repository) = &overrides.repository {
            self.client.repository = Some(repository.clone());
        }
        if let Some(token) = &overrides.token {
            self.client.token = Some(SecretString::from(token.clone()));
        }
        if let Some(base_url) = &overrides.base_url {
            self.client.base_url = Some(base_url.clone());
        }
        if overrides.no_cache {
            self.cache = None;
        }
    }

    /// Effective configuration with the token masked.
    #[must_use]
    pub fn redacted(&self) -> Value {
        json!({
            "client": {
                "repository": self.client.repository,
                "token": self.client.token.as_ref().map(|_| "[REDACTED]"),
                "base_url": self.client.base_url,
                "user_agent": self.client.user_agent,
            },
            "cache": self.cache,
            "http": self.http,
            "logging": self.logging,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::io::Write;

    fn write_yaml(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults_without_file() {
        let config = AppConfig::load(None).unwrap();
        assert!(config.cache.is_none());
        assert_eq!(config.http, HttpConfig::default());
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn test_yaml_layer() {
        let file = write_yaml(
            r"
client:
  repository: acme
  token: from-file
cache:
  ttl: 60
http:
  timeout_secs: 5
logging:
  level: debug
",
        );

        let config = AppConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.client.repository.as_deref(), Some("acme"));
        assert_eq!(
            config.client.token.as_ref().unwrap().expose_secret(),
            "from-file"
        );
        let cache = config.cache.unwrap();
        assert_eq!(cache.ttl, Duration::from_secs(60));
        assert_eq!(cache.max_entries, 10_000);
        assert_eq!(config.http.timeout_secs, 5);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let file = write_yaml("client:\n  repo: acme\n");
        assert!(AppConfig::load(Some(file.path())).is_err());
    }

    #[test]
    fn test_cli_overrides_win() {
        let file = write_yaml("client:\n  repository: acme\n  token: t\ncache: {}\n");
        let mut config = AppConfig::load(Some(file.path())).unwrap();

        config.apply_cli_overrides(&CliOverrides {
            repository: Some("other".to_owned()),
            token: Some("cli-token".to_owned()),
            base_url: Some("http://127.0.0.1:9000/api/v2/".to_owned()),
            no_cache: true,
        });

        assert_eq!(config.client.repository.as_deref(), Some("other"));
        assert_eq!(
            config.client.token.as_ref().unwrap().expose_secret(),
            "cli-token"
        );
        assert_eq!(
            config.client.base_url.as_deref(),
            Some("http://127.0.0.1:9000/api/v2/")
        );
        assert!(config.cache.is_none());
    }

    #[test]
    fn test_redacted_hides_token() {
        let mut config = AppConfig::default();
        config.apply_cli_overrides(&CliOverrides {
            token: Some("hunter2".to_owned()),
            ..CliOverrides::default()
        });

        let printed = config.redacted().to_string();
        assert!(!printed.contains("hunter2"));
        assert!(printed.contains("[REDACTED]"));
    }

    #[test]
    fn test_transport_config_mapping() {
        let http = HttpConfig {
            timeout_secs: 7,
            connect_timeout_secs: 2,
            max_body_size: 1024,
            allow_insecure_http: true,
        };
        let transport = http.to_transport_config();
        assert_eq!(transport.request_timeout, Duration::from_secs(7));
        assert_eq!(transport.max_body_size, 1024);
        assert_eq!(transport.connect_timeout, Duration::from_secs(2));
        assert_eq!(transport.transport, TransportSecurity::AllowInsecureHttp);
    }
}
