//! Metrics collection.
//!
//! # Metrics
//! - `hostpool_attempts_total` (counter): attempts by host and outcome
//! - `hostpool_requests_total` (counter): logical calls by method and result
//! - `hostpool_request_duration_seconds` (histogram): logical call latency, retries included
//! - `hostpool_host_eligible` (gauge): 1=routable, 0=backed off
//! - `hostpool_host_online` (gauge): 1=last ping succeeded, 0=failed
//!
//! Recorded through the `metrics` facade; the embedding application installs the recorder.

use std::time::Instant;

use crate::resilience::retries::Outcome;

pub fn record_attempt(host: &str, outcome: Outcome) {
    metrics::counter!(
        "hostpool_attempts_total",
        "host" => host.to_string(),
        "outcome" => outcome.as_str()
    )
    .increment(1);
}

pub fn record_request(method: &str, result: &'static str, start: Instant) {
    metrics::counter!(
        "hostpool_requests_total",
        "method" => method.to_string(),
        "result" => result
    )
    .increment(1);
    metrics::histogram!("hostpool_request_duration_seconds", "method" => method.to_string())
        .record(start.elapsed().as_secs_f64());
}

pub fn record_host_eligible(host: &str, eligible: bool) {
    metrics::gauge!("hostpool_host_eligible", "host" => host.to_string())
        .set(if eligible { 1.0 } else { 0.0 });
}

pub fn record_host_online(host: &str, online: bool) {
    metrics::gauge!("hostpool_host_online", "host" => host.to_string())
        .set(if online { 1.0 } else { 0.0 });
}
