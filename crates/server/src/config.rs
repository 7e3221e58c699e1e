use serde::Deserialize;
use std::net::SocketAddr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration build error: {0}")]
    Build(#[from] config::ConfigError),
    #[error("Invalid configuration: {0}")]
    Validation(String),
}

#[derive(Clone, Debug, Deserialize)]
pub struct AppConfig {
    /// Socket address the HTTP server listens on.
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    /// Public base URL, used for the discovery document.
    #[serde(default = "default_issuer_url")]
    pub issuer_url: String,
    /// Reported `expires_in` of issued tokens, in seconds. Not enforced.
    #[serde(default = "default_access_token_lifetime")]
    pub access_token_lifetime: u64,
    /// Expose `/debug/identities`.
    #[serde(default = "default_debug_endpoints")]
    pub debug_endpoints: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            issuer_url: default_issuer_url(),
            access_token_lifetime: default_access_token_lifetime(),
            debug_endpoints: default_debug_endpoints(),
        }
    }
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bind_address.parse::<SocketAddr>().is_err() {
            return Err(ConfigError::Validation(format!(
                "bind_address is not a socket address: {}",
                self.bind_address
            )));
        }
        match url::Url::parse(&self.issuer_url) {
            Ok(u) if matches!(u.scheme(), "http" | "https") => {}
            _ => {
                return Err(ConfigError::Validation(format!(
                    "issuer_url must be an absolute http(s) URL: {}",
                    self.issuer_url
                )));
            }
        }
        if self.access_token_lifetime == 0 {
            return Err(ConfigError::Validation(
                "access_token_lifetime must be > 0".into(),
            ));
        }
        Ok(())
    }

    /// Issuer URL without a trailing slash.
    pub fn issuer(&self) -> &str {
        self.issuer_url.trim_end_matches('/')
    }
}

fn default_bind_address() -> String {
    "0.0.0.0:8085".to_string()
}

fn default_issuer_url() -> String {
    "http://localhost:8085".to_string()
}

fn default_access_token_lifetime() -> u64 {
    3600
}

fn default_debug_endpoints() -> bool {
    true
}

/// Load application configuration from an optional `config.yaml` + environment overrides.
///
/// Environment variables matching a key override the file value, with nested keys
/// separated by double underscores. Every key has a default, so running without a
/// config file is fine.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    use config::{Config, Environment, File};
    let cfg = Config::builder()
        .add_source(File::with_name("config.yaml").required(false))
        .add_source(Environment::default().separator("__"))
        .build()?;

    let app: AppConfig = cfg.try_deserialize()?;
    app.validate()?;
    Ok(app)
}

/// Convenience helper for binaries wanting panic-on-error behaviour.
pub fn load_config_or_panic() -> AppConfig {
    match load_config() {
        Ok(c) => c,
        Err(e) => panic!("Failed to load configuration: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = AppConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.access_token_lifetime, 3600);
        assert_eq!(cfg.bind_address, "0.0.0.0:8085");
    }

    #[test]
    fn rejects_zero_lifetime() {
        let cfg = AppConfig {
            access_token_lifetime: 0,
            ..AppConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn rejects_bad_bind_address() {
        let cfg = AppConfig {
            bind_address: "localhost".into(),
            ..AppConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_relative_issuer() {
        let cfg = AppConfig {
            issuer_url: "/esia".into(),
            ..AppConfig::default()
        };
        assert!(cfg.validate().is_err());

        let cfg = AppConfig {
            issuer_url: "ftp://example.com".into(),
            ..AppConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn issuer_strips_trailing_slash() {
        let cfg = AppConfig {
            issuer_url: "https://esia.example.org/".into(),
            ..AppConfig::default()
        };
        assert_eq!(cfg.issuer(), "https://esia.example.org");
    }
}
