// Configuration types module
// Defines the environment settings and the grouped runtime configuration

use serde::Deserialize;
use std::time::Duration;

/// Flat view of the process environment, one field per variable.
///
/// The `config` crate lowercases environment keys, so `READ_TIMEOUT_SECONDS`
/// lands in `read_timeout_seconds`.
#[derive(Debug, Deserialize, Clone)]
pub struct EnvSettings {
    pub address: String,
    pub port: u16,
    pub workers: Option<usize>,
    pub read_timeout_seconds: u64,
    pub write_timeout_seconds: u64,
    pub idle_timeout_seconds: u64,
    pub csp_header: String,
    pub base_href: String,
    pub config_json: String,
    pub access_log: bool,
    pub access_log_format: String,
    pub access_log_file: Option<String>,
    pub error_log_file: Option<String>,
}

/// Main configuration structure
#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub timeouts: TimeoutConfig,
    pub content: ContentConfig,
    pub logging: LoggingConfig,
}

/// Listener and runtime configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub address: String,
    pub port: u16,
    pub workers: Option<usize>,
}

/// Connection timeouts, in seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeoutConfig {
    pub read: u64,
    pub write: u64,
    pub idle: u64,
}

impl TimeoutConfig {
    /// Drain bound used at shutdown
    pub const fn write_duration(&self) -> Duration {
        Duration::from_secs(self.write)
    }

    /// Bound on receiving the first request; `None` when set to 0
    pub fn read_limit(&self) -> Option<Duration> {
        seconds(self.read)
    }

    /// Bound on producing and writing one response; `None` when set to 0
    pub fn write_limit(&self) -> Option<Duration> {
        seconds(self.write)
    }

    /// Bound on the wait between requests. 0 falls back to the read limit.
    pub fn idle_limit(&self) -> Option<Duration> {
        seconds(self.idle).or_else(|| self.read_limit())
    }
}

fn seconds(value: u64) -> Option<Duration> {
    (value > 0).then(|| Duration::from_secs(value))
}

/// Settings that shape what gets served
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentConfig {
    /// Raw CSP template; empty selects the built-in policy, `false` disables CSP
    pub csp_header: String,
    /// Replacement for the index document's `<base href="/"`
    pub base_href: String,
    /// Body of the synthetic `/config.json` asset
    pub config_json: String,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    pub access_log: bool,
    /// Access log format (combined, common or json)
    pub access_log_format: String,
    /// Access log file path (optional, stdout if not set)
    pub access_log_file: Option<String>,
    /// Error log file path (optional, stderr if not set)
    pub error_log_file: Option<String>,
}

impl From<EnvSettings> for Config {
    fn from(env: EnvSettings) -> Self {
        Self {
            server: ServerConfig {
                address: env.address,
                port: env.port,
                workers: env.workers,
            },
            timeouts: TimeoutConfig {
                read: env.read_timeout_seconds,
                write: env.write_timeout_seconds,
                idle: env.idle_timeout_seconds,
            },
            content: ContentConfig {
                csp_header: env.csp_header,
                base_href: env.base_href,
                config_json: env.config_json,
            },
            logging: LoggingConfig {
                access_log: env.access_log,
                access_log_format: env.access_log_format,
                access_log_file: env.access_log_file,
                error_log_file: env.error_log_file,
            },
        }
    }
}
