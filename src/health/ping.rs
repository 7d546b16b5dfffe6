//! Liveness probing.
//!
//! # Responsibilities
//! - Probe every host concurrently with a bounded timeout
//! - Report reachability, round-trip time and server version per host
//!
//! # Design Decisions
//! - Probes never touch routing health; a ping can show a host recovered
//!   while requests still wait out its backoff
//! - A failed or slow probe is a report entry, never an error

use std::time::{Duration, Instant};

use futures_util::future::join_all;

use crate::observability::metrics;
use crate::pool::{Host, Pool};

/// Outcome of probing one host.
#[derive(Debug, Clone, PartialEq)]
pub struct PingStats {
    pub url: String,
    pub online: bool,
    /// Round-trip time, only for online hosts.
    pub rtt: Option<Duration>,
    /// Value of the version header, only for online hosts.
    pub version: Option<String>,
}

impl PingStats {
    fn offline(host: &Host) -> Self {
        Self {
            url: host.url().to_string(),
            online: false,
            rtt: None,
            version: None,
        }
    }
}

/// Probe a single host.
pub async fn ping_host(host: &Host, timeout: Duration, path: &str, version_header: &str) -> PingStats {
    let url = host.url_for(path);
    let start = Instant::now();

    let response = match tokio::time::timeout(timeout, host.client().get(url).send()).await {
        Ok(Ok(response)) => response,
        Ok(Err(e)) => {
            tracing::debug!(host = %host, error = %e, "Ping failed: connection error");
            return PingStats::offline(host);
        }
        Err(_) => {
            tracing::debug!(host = %host, timeout_ms = timeout.as_millis() as u64, "Ping failed: timeout");
            return PingStats::offline(host);
        }
    };

    if !response.status().is_success() {
        tracing::debug!(host = %host, status = %response.status(), "Ping failed: non-success status");
        return PingStats::offline(host);
    }

    let rtt = start.elapsed();
    let version = response
        .headers()
        .get(version_header)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);

    PingStats {
        url: host.url().to_string(),
        online: true,
        rtt: Some(rtt),
        version,
    }
}

impl Pool {
    /// Probe every registered host in parallel. Results follow registration order.
    pub async fn ping(&self, timeout: Duration, path: &str) -> Vec<PingStats> {
        let hosts = self.hosts();
        let version_header = self.ping_config().version_header.clone();

        let results = join_all(
            hosts
                .iter()
                .map(|host| ping_host(host, timeout, path, &version_header)),
        )
        .await;

        if self.metrics_enabled() {
            for stats in &results {
                metrics::record_host_online(&stats.url, stats.online);
            }
        }
        results
    }

    /// Probe every host using the configured timeout and path.
    pub async fn ping_default(&self) -> Vec<PingStats> {
        let timeout = Duration::from_millis(self.ping_config().timeout_ms);
        let path = self.ping_config().path.clone();
        self.ping(timeout, &path).await
    }
}
