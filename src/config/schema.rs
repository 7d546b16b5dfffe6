//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for a host pool.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

pub use crate::resilience::backoff::BackoffConfig;

/// Root configuration for a host pool.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct PoolConfig {
    /// Hosts requests are routed to, in registration order.
    pub hosts: Vec<HostConfig>,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Per-host backoff after retryable failures.
    pub backoff: BackoffConfig,

    /// Liveness sweep settings.
    pub ping: PingConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// A single host definition.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct HostConfig {
    /// Origin of the host, optionally with a base path (e.g., "https://db1:8086").
    pub url: String,

    /// Transport options for this host.
    #[serde(default)]
    pub options: HostOptions,
}

impl HostConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            options: HostOptions::default(),
        }
    }
}

/// Transport options applied to the HTTP client of one host.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct HostOptions {
    /// TLS settings.
    pub tls: TlsOptions,

    /// Honor HTTP(S)_PROXY environment variables (default: false).
    pub use_system_proxy: bool,
}

/// TLS options for a host.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TlsOptions {
    /// Skip certificate verification. Only for test clusters.
    pub accept_invalid_certs: bool,

    /// Additional root certificate (PEM).
    pub ca_cert_path: Option<String>,
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Default timeout for one attempt against one host, in milliseconds.
    pub request_ms: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_ms: 10_000 }
    }
}

/// Ping (liveness sweep) configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PingConfig {
    /// Per-host probe timeout in milliseconds.
    pub timeout_ms: u64,

    /// Path to probe.
    pub path: String,

    /// Response header carrying the server version.
    pub version_header: String,

    /// Interval between sweeps when monitoring, in seconds.
    pub interval_secs: u64,
}

impl Default for PingConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 5_000,
            path: "/ping".to_string(),
            version_header: "X-Influxdb-Version".to_string(),
            interval_secs: 10,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log format ("pretty" or "json").
    pub log_format: String,

    /// Record metrics through the `metrics` facade.
    pub metrics_enabled: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            metrics_enabled: true,
        }
    }
}
