//! Client configuration from defaults and environment variables.
//!
//! Precedence (highest first): explicit CLI flags, `TUMBA_*` environment
//! variables (a `.env` file is loaded by the binary), built-in defaults.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::api::request::DEFAULT_TIMEOUT;
use crate::keychain::session::DEFAULT_SERVICE;
use crate::keychain::LegacyDefaults;

pub const DEFAULT_BASE_URL: &str = "http://localhost:3000/api/v1";

pub const ENV_API_URL: &str = "TUMBA_API_URL";
pub const ENV_TIMEOUT_SECS: &str = "TUMBA_TIMEOUT_SECS";
pub const ENV_KEYCHAIN_SERVICE: &str = "TUMBA_KEYCHAIN_SERVICE";
pub const ENV_LEGACY_STORE: &str = "TUMBA_LEGACY_STORE";
pub const ENV_LOG_TRAFFIC: &str = "TUMBA_LOG_TRAFFIC";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} has invalid value {value:?}: {reason}")]
    InvalidValue {
        name: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Base URL every route path is appended to.
    pub base_url: String,
    /// Timeout for requests that do not set their own.
    pub timeout: Duration,
    /// Keychain service the session records live under.
    pub keychain_service: String,
    /// Location of the pre-keychain plaintext defaults file.
    pub legacy_store_path: Option<PathBuf>,
    /// Log request/response diagnostics at debug level.
    pub log_traffic: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            keychain_service: DEFAULT_SERVICE.to_string(),
            legacy_store_path: LegacyDefaults::default_location(),
            log_traffic: true,
        }
    }
}

impl ClientConfig {
    /// Defaults overridden by `TUMBA_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup(ENV_API_URL).filter(|v| !v.trim().is_empty()) {
            config.base_url = url.trim().to_string();
        }
        if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
            let secs: u64 = raw.trim().parse().map_err(|e: std::num::ParseIntError| {
                ConfigError::InvalidValue {
                    name: ENV_TIMEOUT_SECS,
                    value: raw.clone(),
                    reason: e.to_string(),
                }
            })?;
            if secs == 0 {
                return Err(ConfigError::InvalidValue {
                    name: ENV_TIMEOUT_SECS,
                    value: raw,
                    reason: "must be at least 1".to_string(),
                });
            }
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(service) = lookup(ENV_KEYCHAIN_SERVICE).filter(|v| !v.trim().is_empty()) {
            config.keychain_service = service.trim().to_string();
        }
        if let Some(path) = lookup(ENV_LEGACY_STORE).filter(|v| !v.trim().is_empty()) {
            config.legacy_store_path = Some(PathBuf::from(path));
        }
        if let Some(raw) = lookup(ENV_LOG_TRAFFIC) {
            config.log_traffic = parse_bool(ENV_LOG_TRAFFIC, &raw)?;
        }

        Ok(config)
    }
}

fn parse_bool(name: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            name,
            value: raw.to_string(),
            reason: "expected a boolean".to_string(),
        }),
    }
}
