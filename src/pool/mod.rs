//! Host pool: routing, health tracking and retry.
//!
//! # Data Flow
//! ```text
//! Caller builds RequestOptions
//!     → Pool::execute
//!     → snapshot hosts eligible now (host.rs)
//!     → round_robin.rs picks one of them
//!     → send with per-attempt timeout
//!     → classify (resilience::retries)
//!         - success:   host.on_success, decode body (discard / text / json)
//!         - retryable: host.on_retryable_failure, try the next untried host
//!         - terminal:  return RequestError, host untouched
//!     → all initially eligible hosts failed → ServiceUnavailable(last cause)
//! ```
//!
//! # Design Decisions
//! - One attempt per host per logical call; a failed host waits out its backoff
//! - Health lives on each host behind its own lock; hosts never coordinate
//! - The host list is swapped atomically on registration, readers never block

pub mod error;
pub mod host;
pub mod request;
pub mod round_robin;

use std::sync::Arc;
use std::time::{Duration, Instant};

use arc_swap::ArcSwap;
use serde::de::DeserializeOwned;
use tracing::Instrument;
use uuid::Uuid;

use crate::config::{HostOptions, PingConfig, PoolConfig};
use crate::config::validation::parse_host_url;
use crate::observability::metrics;
use crate::resilience::backoff::ExponentialBackoff;
use crate::resilience::retries::Outcome;

pub use error::{AttemptError, DecodeError, PoolError, PoolResult, RequestError};
pub use host::{Host, HostHealth};
pub use request::{RawResponse, RequestOptions};
pub use round_robin::RoundRobin;

/// Result of a single attempt against a single host.
enum Attempt {
    Success(RawResponse),
    Retryable(AttemptError),
    Terminal(RequestError),
}

/// A pool of interchangeable hosts.
#[derive(Debug)]
pub struct Pool {
    hosts: ArcSwap<Vec<Arc<Host>>>,
    round_robin: RoundRobin,
    backoff: ExponentialBackoff,
    timeout: Duration,
    ping: PingConfig,
    metrics_enabled: bool,
}

impl Pool {
    /// Create an empty pool from configuration, then register its hosts.
    pub fn from_config(config: &PoolConfig) -> PoolResult<Self> {
        let pool = Self {
            hosts: ArcSwap::from_pointee(Vec::new()),
            round_robin: RoundRobin::new(),
            backoff: ExponentialBackoff::new(config.backoff),
            timeout: Duration::from_millis(config.timeouts.request_ms),
            ping: config.ping.clone(),
            metrics_enabled: config.observability.metrics_enabled,
        };

        for host in &config.hosts {
            pool.add_host(&host.url, host.options.clone())?;
        }

        tracing::info!(
            hosts = pool.hosts.load().len(),
            timeout_ms = config.timeouts.request_ms,
            backoff_initial_ms = config.backoff.initial_ms,
            backoff_max_ms = config.backoff.max_ms,
            "Host pool created"
        );
        Ok(pool)
    }

    /// Register a host. It starts out eligible.
    pub fn add_host(&self, url: &str, options: HostOptions) -> PoolResult<Arc<Host>> {
        let parsed = parse_host_url(url).map_err(|reason| PoolError::InvalidHost {
            url: url.to_string(),
            reason,
        })?;
        let host = Arc::new(Host::new(parsed, options, self.backoff)?);

        self.hosts.rcu(|hosts| {
            let mut updated = Vec::with_capacity(hosts.len() + 1);
            updated.extend(hosts.iter().cloned());
            updated.push(Arc::clone(&host));
            updated
        });

        tracing::debug!(host = %host, "Host registered");
        if self.metrics_enabled {
            metrics::record_host_eligible(host.url().as_str(), true);
        }
        Ok(host)
    }

    /// All registered hosts, in registration order.
    pub fn hosts(&self) -> Vec<Arc<Host>> {
        self.hosts.load().iter().cloned().collect()
    }

    /// Default per-attempt timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn ping_config(&self) -> &PingConfig {
        &self.ping
    }

    pub fn metrics_enabled(&self) -> bool {
        self.metrics_enabled
    }

    /// Return true if at least one host is eligible right now.
    pub fn host_is_available(&self) -> bool {
        self.host_is_available_at(Instant::now())
    }

    /// Return true if at least one host is eligible at `now`.
    pub fn host_is_available_at(&self, now: Instant) -> bool {
        self.hosts.load().iter().any(|h| h.is_eligible(now))
    }

    /// Run a request, discarding the response body.
    pub async fn discard(&self, request: &RequestOptions) -> PoolResult<()> {
        self.execute(request).await.map(|_| ())
    }

    /// Run a request, returning the body as text.
    pub async fn text(&self, request: &RequestOptions) -> PoolResult<String> {
        let response = self.execute(request).await?;
        Ok(String::from_utf8(response.body).map_err(DecodeError::from)?)
    }

    /// Run a request, parsing the body as JSON.
    pub async fn json<T: DeserializeOwned>(&self, request: &RequestOptions) -> PoolResult<T> {
        let response = self.execute(request).await?;
        Ok(serde_json::from_slice(&response.body).map_err(DecodeError::from)?)
    }

    /// Run a request against the next eligible host, retrying on the others.
    pub async fn execute(&self, request: &RequestOptions) -> PoolResult<RawResponse> {
        let span = tracing::debug_span!(
            "pool_request",
            request_id = %Uuid::new_v4(),
            method = %request.method,
            path = %request.path,
        );
        self.dispatch(request).instrument(span).await
    }

    async fn dispatch(&self, request: &RequestOptions) -> PoolResult<RawResponse> {
        let start = Instant::now();
        let method = request.method.as_str();

        let candidates: Vec<Arc<Host>> = self
            .hosts
            .load()
            .iter()
            .filter(|h| h.is_eligible(start))
            .cloned()
            .collect();

        if candidates.is_empty() {
            tracing::warn!("No host available");
            self.record_request(method, "no_host", start);
            return Err(PoolError::NoHostAvailable);
        }

        let timeout = request.timeout.unwrap_or(self.timeout);
        let mut tried: Vec<Arc<Host>> = Vec::with_capacity(candidates.len());
        let mut last_error = None;

        while tried.len() < candidates.len() {
            let now = Instant::now();
            let remaining: Vec<&Arc<Host>> = candidates
                .iter()
                .filter(|h| !tried.iter().any(|t| Arc::ptr_eq(t, h)) && h.is_eligible(now))
                .collect();

            let Some(host) = self.round_robin.next(&remaining).map(|h| Arc::clone(*h)) else {
                break;
            };
            tried.push(Arc::clone(&host));

            tracing::debug!(host = %host, attempt = tried.len(), "Sending request");

            match self.attempt(&host, request, timeout).await {
                Attempt::Success(response) => {
                    self.record_attempt(&host, Outcome::Success);
                    if host.on_success() {
                        tracing::info!(host = %host, "Host recovered");
                        self.record_eligible(&host, true);
                    }
                    tracing::debug!(host = %host, status = %response.status, "Request succeeded");
                    self.record_request(method, "success", start);
                    return Ok(response);
                }
                Attempt::Retryable(error) => {
                    self.record_attempt(&host, Outcome::Retryable);
                    let delay = host.on_retryable_failure(Instant::now());
                    self.record_eligible(&host, false);
                    tracing::warn!(
                        host = %host,
                        attempt = tried.len(),
                        error = %error,
                        backoff_ms = delay.as_millis() as u64,
                        "Retryable failure, host backed off"
                    );
                    last_error = Some(error);
                }
                Attempt::Terminal(error) => {
                    self.record_attempt(&host, Outcome::Terminal);
                    tracing::info!(host = %host, status = %error.status, "Request rejected by host");
                    self.record_request(method, "request_error", start);
                    return Err(PoolError::Request(error));
                }
            }
        }

        self.record_request(method, "unavailable", start);
        match last_error {
            Some(source) => {
                tracing::warn!(attempts = tried.len(), error = %source, "All hosts failed");
                Err(PoolError::ServiceUnavailable {
                    attempts: tried.len(),
                    source,
                })
            }
            // every candidate was backed off by a concurrent call before we reached it
            None => Err(PoolError::NoHostAvailable),
        }
    }

    async fn attempt(&self, host: &Host, request: &RequestOptions, timeout: Duration) -> Attempt {
        let mut builder = host
            .client()
            .request(request.method.clone(), host.url_for(&request.path))
            .headers(request.headers.clone());
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let call = async {
            let response = builder.send().await?;
            let status = response.status();
            let headers = response.headers().clone();
            let body = response.bytes().await?;
            Ok::<_, reqwest::Error>((status, headers, body.to_vec()))
        };

        let host_name = host.url().to_string();
        match tokio::time::timeout(timeout, call).await {
            Err(_) => Attempt::Retryable(AttemptError::Timeout {
                host: host_name,
                timeout,
            }),
            Ok(Err(source)) if source.is_timeout() => Attempt::Retryable(AttemptError::Timeout {
                host: host_name,
                timeout,
            }),
            Ok(Err(source)) => Attempt::Retryable(AttemptError::Transport {
                host: host_name,
                source,
            }),
            Ok(Ok((status, headers, body))) => match Outcome::from_status(status) {
                Outcome::Success => Attempt::Success(RawResponse {
                    host: host_name,
                    status,
                    headers,
                    body,
                }),
                Outcome::Retryable => Attempt::Retryable(AttemptError::Status {
                    host: host_name,
                    status,
                    body: String::from_utf8_lossy(&body).into_owned(),
                }),
                Outcome::Terminal => Attempt::Terminal(RequestError {
                    status,
                    headers,
                    body,
                }),
            },
        }
    }

    fn record_attempt(&self, host: &Host, outcome: Outcome) {
        if self.metrics_enabled {
            metrics::record_attempt(host.url().as_str(), outcome);
        }
    }

    fn record_eligible(&self, host: &Host, eligible: bool) {
        if self.metrics_enabled {
            metrics::record_host_eligible(host.url().as_str(), eligible);
        }
    }

    fn record_request(&self, method: &str, result: &'static str, start: Instant) {
        if self.metrics_enabled {
            metrics::record_request(method, result, start);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HostConfig;

    fn config(hosts: &[&str]) -> PoolConfig {
        let mut config = PoolConfig::default();
        config.backoff.jitter = 0.0;
        config.hosts = hosts.iter().map(|h| HostConfig::new(*h)).collect();
        config
    }

    #[test]
    fn test_from_config_registers_hosts_in_order() {
        let pool = Pool::from_config(&config(&["http://db1:8086", "http://db2:8086"])).unwrap();
        let urls: Vec<_> = pool.hosts().iter().map(|h| h.url().to_string()).collect();
        assert_eq!(urls, ["http://db1:8086/", "http://db2:8086/"]);
        assert_eq!(pool.timeout(), Duration::from_secs(10));
        assert!(pool.host_is_available());
    }

    #[test]
    fn test_invalid_host_rejected() {
        let pool = Pool::from_config(&config(&[])).unwrap();
        let err = pool.add_host("db1:8086", HostOptions::default()).unwrap_err();
        assert!(matches!(err, PoolError::InvalidHost { .. }));
        assert!(pool.hosts().is_empty());
    }

    #[test]
    fn test_empty_pool_has_no_available_host() {
        let pool = Pool::from_config(&config(&[])).unwrap();
        assert!(!pool.host_is_available());
    }

    #[test]
    fn test_availability_follows_backoff() {
        let pool = Pool::from_config(&config(&["http://db1:8086"])).unwrap();
        let host = &pool.hosts()[0];
        let now = Instant::now();
        host.on_retryable_failure(now);

        assert!(!pool.host_is_available_at(now));
        assert!(pool.host_is_available_at(now + Duration::from_millis(300)));
    }

    #[tokio::test]
    async fn test_no_host_available_without_io() {
        let pool = Pool::from_config(&config(&["http://192.0.2.1:8086"])).unwrap();
        pool.hosts()[0].on_retryable_failure(Instant::now());

        let err = pool.discard(&RequestOptions::get("/ping")).await.unwrap_err();
        assert!(matches!(err, PoolError::NoHostAvailable));
        assert!(err.is_service_unavailable());
    }
}
