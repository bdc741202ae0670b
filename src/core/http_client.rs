//! # HTTP Client Factory
//!
//! Centralized HTTP client creation so both backend flavours share the same
//! connection settings.

use crate::config::BenchConfig;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;

/// Timeout applied to the short model-listing calls
pub const LIST_MODELS_TIMEOUT: Duration = Duration::from_secs(2);

/// HTTP client configuration errors
#[derive(Debug, Error)]
pub enum HttpClientError {
    #[error("Failed to build HTTP client: {0}")]
    BuildError(#[from] reqwest::Error),
}

/// HTTP client pool configuration
#[derive(Debug, Clone)]
pub struct PoolConfig {
    pub max_idle_per_host: usize,
    pub idle_timeout: Duration,
    pub keepalive: Option<Duration>,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_idle_per_host: 2,
            idle_timeout: Duration::from_secs(90),
            keepalive: Some(Duration::from_secs(60)),
        }
    }
}

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Overall request timeout, `None` waits for as long as generation takes
    pub timeout: Option<Duration>,
    pub connect_timeout: Duration,
    pub pool: PoolConfig,
    pub compression: bool,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: None,
            connect_timeout: Duration::from_secs(5),
            pool: PoolConfig::default(),
            compression: true,
        }
    }
}

impl From<&BenchConfig> for HttpClientConfig {
    fn from(config: &BenchConfig) -> Self {
        Self {
            timeout: config.request_timeout(),
            ..Self::default()
        }
    }
}

/// HTTP client builder with configurable options
pub struct HttpClientBuilder {
    config: HttpClientConfig,
}

impl HttpClientBuilder {
    /// Create a new HTTP client builder with default configuration
    pub fn new() -> Self {
        Self {
            config: HttpClientConfig::default(),
        }
    }

    /// Create HTTP client builder from the benchmark settings
    pub fn from_config(config: &BenchConfig) -> Self {
        Self {
            config: HttpClientConfig::from(config),
        }
    }

    /// Set request timeout
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Enable or disable compression
    pub fn compression(mut self, enabled: bool) -> Self {
        self.config.compression = enabled;
        self
    }

    /// Build the HTTP client
    pub fn build(self) -> Result<Client, HttpClientError> {
        let mut builder = Client::builder()
            .connect_timeout(self.config.connect_timeout)
            .pool_max_idle_per_host(self.config.pool.max_idle_per_host)
            .pool_idle_timeout(self.config.pool.idle_timeout);

        if let Some(timeout) = self.config.timeout {
            builder = builder.timeout(timeout);
        }

        if let Some(keepalive) = self.config.pool.keepalive {
            builder = builder.tcp_keepalive(keepalive);
        }

        if self.config.compression {
            builder = builder.gzip(true).brotli(true);
        }

        builder.build().map_err(HttpClientError::from)
    }
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
