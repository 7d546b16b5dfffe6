//! Periodic liveness sweeps.
//!
//! # Responsibilities
//! - Ping every host on a fixed interval
//! - Log reachability changes and hand each report to the caller

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time;

use crate::config::PingConfig;
use crate::health::ping::PingStats;
use crate::pool::Pool;

pub struct PingMonitor {
    pool: Arc<Pool>,
    config: PingConfig,
}

impl PingMonitor {
    pub fn new(pool: Arc<Pool>, config: PingConfig) -> Self {
        Self { pool, config }
    }

    /// Sweep until shutdown, passing every report to `on_report`.
    pub async fn run<F>(self, mut shutdown: broadcast::Receiver<()>, mut on_report: F)
    where
        F: FnMut(&[PingStats]) + Send,
    {
        tracing::info!(
            interval = self.config.interval_secs,
            path = %self.config.path,
            "Ping monitor starting"
        );

        let timeout = Duration::from_millis(self.config.timeout_ms);
        let mut ticker = time::interval(Duration::from_secs(self.config.interval_secs));
        let mut last_seen: HashMap<String, bool> = HashMap::new();

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let report = self.pool.ping(timeout, &self.config.path).await;
                    log_changes(&mut last_seen, &report);
                    on_report(&report);
                }
                _ = shutdown.recv() => {
                    tracing::info!("Ping monitor received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }
}

fn log_changes(last_seen: &mut HashMap<String, bool>, report: &[PingStats]) {
    for stats in report {
        let previous = last_seen.insert(stats.url.clone(), stats.online);
        if previous == Some(stats.online) {
            continue;
        }
        if stats.online {
            tracing::info!(
                host = %stats.url,
                rtt_ms = stats.rtt.map(|d| d.as_millis() as u64),
                version = stats.version.as_deref(),
                "Host online"
            );
        } else {
            tracing::warn!(host = %stats.url, "Host offline");
        }
    }
}
