//! Configuration management.

mod file_config;

pub use file_config::{find_config_file, load_config, ConfigError};

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::utils::RetryConfig;

/// Catalog endpoint used when none is configured
pub const DEFAULT_ENDPOINT: &str = "http://nyx.vima.ekt.gr:3000/api/books";

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Search endpoint settings
    #[serde(default)]
    pub endpoint: EndpointConfig,

    /// Page cache settings
    #[serde(default)]
    pub cache: CacheConfig,

    /// Retry settings for transient network failures
    #[serde(default)]
    pub retry: RetryPolicyConfig,

    /// Pager settings
    #[serde(default)]
    pub pagination: PaginationConfig,
}

/// Search endpoint configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// URL the search body is POSTed to
    #[serde(default = "default_endpoint_url")]
    pub url: String,

    /// Per-attempt timeout
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Connection establishment timeout
    #[serde(default = "default_connect_timeout_seconds")]
    pub connect_timeout_seconds: u64,
}

impl EndpointConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_seconds)
    }
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            url: default_endpoint_url(),
            timeout_seconds: default_timeout_seconds(),
            connect_timeout_seconds: default_connect_timeout_seconds(),
        }
    }
}

fn default_endpoint_url() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_timeout_seconds() -> u64 {
    10
}

fn default_connect_timeout_seconds() -> u64 {
    5
}

/// Page cache configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Keep fetched pages for the session
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

fn default_true() -> bool {
    true
}

/// Retry policy for network failures
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryPolicyConfig {
    /// Total attempts including the first one
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,

    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
}

impl RetryPolicyConfig {
    /// Backoff multiplier to use; anything below 1.0 or not finite means
    /// constant backoff
    pub fn effective_multiplier(&self) -> f64 {
        if self.backoff_multiplier.is_finite() && self.backoff_multiplier >= 1.0 {
            self.backoff_multiplier
        } else {
            tracing::warn!(
                "Ignoring backoff_multiplier {}; using 1.0",
                self.backoff_multiplier
            );
            1.0
        }
    }
}

impl Default for RetryPolicyConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            backoff_multiplier: default_backoff_multiplier(),
        }
    }
}

fn default_max_attempts() -> u32 {
    3
}

fn default_initial_delay_ms() -> u64 {
    250
}

fn default_max_delay_ms() -> u64 {
    2000
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

/// Pager configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaginationConfig {
    /// Records per page served by the endpoint
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Number of numbered links shown in the pager
    #[serde(default = "default_page_range")]
    pub page_range: u32,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            page_range: default_page_range(),
        }
    }
}

fn default_page_size() -> u32 {
    20
}

fn default_page_range() -> u32 {
    5
}

impl Config {
    /// Retry settings combined with the endpoint's per-attempt timeout
    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig {
            max_attempts: self.retry.max_attempts.max(1),
            initial_delay: Duration::from_millis(self.retry.initial_delay_ms),
            max_delay: Duration::from_millis(self.retry.max_delay_ms),
            backoff_multiplier: self.retry.effective_multiplier(),
            attempt_timeout: self.endpoint.timeout(),
        }
    }

    /// Effective configuration rendered as TOML
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))
    }
}
