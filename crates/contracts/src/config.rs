//! AppConfig - Config Loader output
//!
//! Describes the full service configuration: producer endpoint, retry budget,
//! stats reporting and the inbound HTTP server.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use validator::Validate;

/// Complete service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Downstream producer service
    pub producer: ProducerConfig,

    /// Retry budget per logical dispatch
    #[serde(default)]
    pub retry: RetryConfig,

    /// Periodic stats reporting
    #[serde(default)]
    pub stats: StatsConfig,

    /// Inbound HTTP server
    #[serde(default)]
    pub server: ServerConfig,
}

impl AppConfig {
    /// Config with only the producer host set, everything else defaulted
    pub fn with_producer_host(host: impl Into<String>) -> Self {
        Self {
            producer: ProducerConfig {
                host: host.into(),
                ..ProducerConfig::default()
            },
            retry: RetryConfig::default(),
            stats: StatsConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

/// Producer endpoint and pooled transport settings
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ProducerConfig {
    /// Producer host name
    #[validate(length(min = 1, message = "producer host cannot be empty"))]
    pub host: String,

    /// Producer port
    #[serde(default = "default_producer_port")]
    #[validate(range(min = 1, message = "port must be > 0"))]
    pub port: u16,

    /// TCP connect timeout (ms)
    #[serde(default = "default_connect_timeout_ms")]
    #[validate(range(min = 1, message = "connect_timeout_ms must be > 0"))]
    pub connect_timeout_ms: u64,

    /// Whole-request (socket) timeout (ms)
    #[serde(default = "default_socket_timeout_ms")]
    #[validate(range(min = 1, message = "socket_timeout_ms must be > 0"))]
    pub socket_timeout_ms: u64,

    /// Total connection bound
    #[serde(default = "default_max_connections")]
    #[validate(range(min = 1, message = "max_connections must be > 0"))]
    pub max_connections: usize,

    /// Per-destination connection bound
    #[serde(default = "default_max_connections_per_route")]
    #[validate(range(min = 1, message = "max_connections_per_route must be > 0"))]
    pub max_connections_per_route: usize,
}

impl ProducerConfig {
    /// `http://{host}:{port}/publish`
    pub fn publish_url(&self) -> String {
        format!("http://{}:{}/publish", self.host, self.port)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn socket_timeout(&self) -> Duration {
        Duration::from_millis(self.socket_timeout_ms)
    }
}

impl Default for ProducerConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: default_producer_port(),
            connect_timeout_ms: default_connect_timeout_ms(),
            socket_timeout_ms: default_socket_timeout_ms(),
            max_connections: default_max_connections(),
            max_connections_per_route: default_max_connections_per_route(),
        }
    }
}

fn default_producer_port() -> u16 {
    9090
}

fn default_connect_timeout_ms() -> u64 {
    3000
}

fn default_socket_timeout_ms() -> u64 {
    5000
}

fn default_max_connections() -> usize {
    200
}

fn default_max_connections_per_route() -> usize {
    50
}

/// Retry budget
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RetryConfig {
    /// Attempts per logical dispatch, including the first
    #[serde(default = "default_max_attempts")]
    #[validate(range(min = 1, message = "max_attempts must be >= 1"))]
    pub max_attempts: u32,

    /// Backoff base; delay before attempt n+1 is 2^n * base
    #[serde(default = "default_base_delay_ms")]
    #[validate(range(min = 1, message = "base_delay_ms must be > 0"))]
    pub base_delay_ms: u64,
}

impl RetryConfig {
    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
        }
    }
}

fn default_max_attempts() -> u32 {
    3
}

fn default_base_delay_ms() -> u64 {
    100
}

/// Stats reporter settings
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct StatsConfig {
    /// Reporting period (ms)
    #[serde(default = "default_stats_interval_ms")]
    #[validate(range(min = 1, message = "interval_ms must be > 0"))]
    pub interval_ms: u64,

    /// Upper bound on shutdown joins (ms)
    #[serde(default = "default_shutdown_grace_ms")]
    #[validate(range(min = 1, message = "shutdown_grace_ms must be > 0"))]
    pub shutdown_grace_ms: u64,
}

impl StatsConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_millis(self.shutdown_grace_ms)
    }
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_stats_interval_ms(),
            shutdown_grace_ms: default_shutdown_grace_ms(),
        }
    }
}

fn default_stats_interval_ms() -> u64 {
    5000
}

fn default_shutdown_grace_ms() -> u64 {
    2000
}

/// Inbound HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ServerConfig {
    /// Bind address
    #[serde(default = "default_server_host")]
    #[validate(length(min = 1, message = "server host cannot be empty"))]
    pub host: String,

    /// Bind port
    #[serde(default = "default_server_port")]
    #[validate(range(min = 1, message = "port must be > 0"))]
    pub port: u16,

    /// Upper bound on how long a review request waits for its dispatch (ms)
    #[serde(default = "default_request_timeout_ms")]
    #[validate(range(min = 1, message = "request_timeout_ms must be > 0"))]
    pub request_timeout_ms: u64,

    /// Largest accepted album image (bytes)
    #[serde(default = "default_max_image_bytes")]
    #[validate(range(min = 1, message = "max_image_bytes must be > 0"))]
    pub max_image_bytes: usize,
}

impl ServerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
            request_timeout_ms: default_request_timeout_ms(),
            max_image_bytes: default_max_image_bytes(),
        }
    }
}

fn default_server_host() -> String {
    "0.0.0.0".to_string()
}

fn default_server_port() -> u16 {
    8080
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

fn default_max_image_bytes() -> usize {
    50 * 1024 * 1024
}
