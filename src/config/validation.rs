//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate host URLs and reject duplicates
//! - Validate value ranges (timeouts > 0, backoff bounds, jitter in [0, 1])
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: PoolConfig → Result<(), Vec<ValidationError>>
//! - An empty host list is valid; hosts can be registered later

use std::collections::HashSet;

use thiserror::Error;
use url::Url;

use crate::config::schema::PoolConfig;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("host '{url}' is not a valid URL: {reason}")]
    InvalidHostUrl { url: String, reason: String },

    #[error("host '{0}' is listed more than once")]
    DuplicateHost(String),

    #[error("{field} must be greater than zero")]
    ZeroValue { field: &'static str },

    #[error("backoff.initial_ms ({initial_ms}) exceeds backoff.max_ms ({max_ms})")]
    BackoffBounds { initial_ms: u64, max_ms: u64 },

    #[error("backoff.jitter must be within [0, 1], got {0}")]
    JitterOutOfRange(f64),

    #[error("ping.path must start with '/', got '{0}'")]
    PingPath(String),

    #[error("unknown log format '{0}' (expected \"pretty\" or \"json\")")]
    LogFormat(String),
}

/// Parse a host origin, accepting only http and https.
pub fn parse_host_url(raw: &str) -> Result<Url, String> {
    let url = Url::parse(raw).map_err(|e| e.to_string())?;
    match url.scheme() {
        "http" | "https" => {}
        other => return Err(format!("unsupported scheme '{}'", other)),
    }
    if url.host_str().is_none() {
        return Err("missing host".to_string());
    }
    Ok(url)
}

/// Check a configuration, collecting every problem.
pub fn validate_config(config: &PoolConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let mut seen = HashSet::new();
    for host in &config.hosts {
        match parse_host_url(&host.url) {
            Ok(url) => {
                if !seen.insert(url.to_string()) {
                    errors.push(ValidationError::DuplicateHost(host.url.clone()));
                }
            }
            Err(reason) => errors.push(ValidationError::InvalidHostUrl {
                url: host.url.clone(),
                reason,
            }),
        }
    }

    if config.timeouts.request_ms == 0 {
        errors.push(ValidationError::ZeroValue { field: "timeouts.request_ms" });
    }
    if config.ping.timeout_ms == 0 {
        errors.push(ValidationError::ZeroValue { field: "ping.timeout_ms" });
    }
    if config.ping.interval_secs == 0 {
        errors.push(ValidationError::ZeroValue { field: "ping.interval_secs" });
    }

    let backoff = &config.backoff;
    if backoff.initial_ms == 0 {
        errors.push(ValidationError::ZeroValue { field: "backoff.initial_ms" });
    }
    if backoff.initial_ms > backoff.max_ms {
        errors.push(ValidationError::BackoffBounds {
            initial_ms: backoff.initial_ms,
            max_ms: backoff.max_ms,
        });
    }
    if !(0.0..=1.0).contains(&backoff.jitter) {
        errors.push(ValidationError::JitterOutOfRange(backoff.jitter));
    }

    if !config.ping.path.starts_with('/') {
        errors.push(ValidationError::PingPath(config.ping.path.clone()));
    }

    match config.observability.log_format.as_str() {
        "pretty" | "json" => {}
        other => errors.push(ValidationError::LogFormat(other.to_string())),
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::HostConfig;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&PoolConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = PoolConfig::default();
        config.hosts.push(HostConfig::new("ftp://db1"));
        config.hosts.push(HostConfig::new("http://db2:8086"));
        config.hosts.push(HostConfig::new("http://db2:8086"));
        config.timeouts.request_ms = 0;
        config.backoff.initial_ms = 20_000;
        config.backoff.jitter = 1.5;
        config.ping.path = "ping".to_string();
        config.observability.log_format = "xml".to_string();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 7, "{:?}", errors);
        assert!(matches!(errors[0], ValidationError::InvalidHostUrl { .. }));
        assert_eq!(errors[1], ValidationError::DuplicateHost("http://db2:8086".into()));
        assert!(errors.contains(&ValidationError::ZeroValue { field: "timeouts.request_ms" }));
        assert!(errors.contains(&ValidationError::BackoffBounds {
            initial_ms: 20_000,
            max_ms: 10_000
        }));
        assert!(errors.contains(&ValidationError::JitterOutOfRange(1.5)));
    }

    #[test]
    fn test_parse_host_url() {
        assert!(parse_host_url("https://db1:8086/prefix").is_ok());
        assert!(parse_host_url("db1:8086").is_err());
        assert!(parse_host_url("not a url").is_err());
    }
}
