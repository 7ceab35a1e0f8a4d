//! Configuration module - Environment-based configuration
//!
//! Every variable has a default so the service starts with no environment
//! at all (mock gateway on 0.0.0.0:8080).

use std::env;
use std::sync::Arc;
use std::time::Duration;

use crate::i18n::Locale;
use crate::onchain::{build_gateway, ChainGateway, GatewayMode};

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    // Server config
    pub host: String,
    pub port: u16,

    // Chain gateway
    pub gateway_mode: GatewayMode,
    pub relay_url: Option<String>,
    pub relay_timeout_secs: u64,

    // Default locale for user-facing messages
    pub locale: Locale,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            gateway_mode: GatewayMode::Mock,
            relay_url: None,
            relay_timeout_secs: 30,
            locale: Locale::En,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; unparseable values fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        Self {
            host: lookup("TWIN_HOST").unwrap_or(defaults.host),
            port: lookup("TWIN_PORT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.port),
            gateway_mode: lookup("TWIN_GATEWAY")
                .and_then(|v| GatewayMode::parse(&v))
                .unwrap_or(defaults.gateway_mode),
            relay_url: lookup("TWIN_RELAY_URL").filter(|v| !v.trim().is_empty()),
            relay_timeout_secs: lookup("TWIN_RELAY_TIMEOUT_SECS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.relay_timeout_secs),
            locale: lookup("TWIN_LOCALE")
                .map(|v| Locale::from_tag(&v))
                .unwrap_or(defaults.locale),
        }
    }

    /// Get server bind address
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub gateway: Arc<dyn ChainGateway>,
}

impl AppState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.relay_timeout_secs))
            .build()?;

        let gateway = build_gateway(config.gateway_mode, config.relay_url.as_deref(), http_client);

        Ok(Self::with_gateway(config, gateway))
    }

    /// State with an explicitly injected gateway.
    pub fn with_gateway(config: Config, gateway: Arc<dyn ChainGateway>) -> Self {
        Self {
            config: Arc::new(config),
            gateway,
        }
    }
}
