// Configuration module entry point
// Reads the process environment once at startup and holds the shared runtime state

mod state;
mod types;

use std::net::{SocketAddr, ToSocketAddrs};

pub use state::AppState;
pub use types::{Config, ContentConfig, EnvSettings, LoggingConfig, ServerConfig, TimeoutConfig};

/// Errors raised while turning the environment into a [`Config`]
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid environment configuration: {0}")]
    Invalid(#[from] config::ConfigError),
    #[error("invalid listen address {address}:{port}: {reason}")]
    Address {
        address: String,
        port: u16,
        reason: String,
    },
}

impl Config {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(None)
    }

    /// Load configuration from an explicit variable map instead of the
    /// process environment. Keys use the environment spelling (`PORT`).
    pub fn from_vars(vars: Option<config::Map<String, String>>) -> Result<Self, ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::Environment::default().ignore_empty(true).source(vars))
            .set_default("address", "0.0.0.0")?
            .set_default("port", 8080)?
            .set_default("read_timeout_seconds", 5)?
            .set_default("write_timeout_seconds", 10)?
            .set_default("idle_timeout_seconds", 120)?
            .set_default("csp_header", "")?
            .set_default("base_href", "/")?
            .set_default("config_json", "{}")?
            .set_default("access_log", true)?
            .set_default("access_log_format", "combined")?
            .build()?;

        let env: EnvSettings = settings.try_deserialize()?;
        Ok(env.into())
    }

    /// Resolve the listen address. Hostnames such as `localhost` are looked up
    /// once; the first result wins.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let ServerConfig { address, port, .. } = &self.server;
        let address_error = |reason: String| ConfigError::Address {
            address: address.clone(),
            port: *port,
            reason,
        };

        (address.as_str(), *port)
            .to_socket_addrs()
            .map_err(|e| address_error(e.to_string()))?
            .next()
            .ok_or_else(|| address_error("no address resolved".to_string()))
    }
}
