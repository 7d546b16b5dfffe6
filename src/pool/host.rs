//! Host abstraction.
//!
//! # Responsibilities
//! - Represent a single database host and its HTTP client
//! - Track routing health (backoff state, unavailable-until deadline)
//! - Build request URLs relative to the host's base path

use std::fs;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use reqwest::{Certificate, Client};
use url::Url;

use crate::config::HostOptions;
use crate::pool::error::{PoolError, PoolResult};
use crate::resilience::backoff::ExponentialBackoff;

/// Routing health of one host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HostHealth {
    /// Backoff applied on the next retryable failure.
    pub backoff: ExponentialBackoff,
    /// Host is skipped until this instant. `None` when eligible.
    pub unavailable_until: Option<Instant>,
}

/// A single host in the pool.
#[derive(Debug)]
pub struct Host {
    url: Url,
    options: HostOptions,
    client: Client,
    health: Mutex<HostHealth>,
}

impl Host {
    /// Create a host, building its HTTP client from the transport options.
    pub fn new(url: Url, options: HostOptions, backoff: ExponentialBackoff) -> PoolResult<Self> {
        let client = build_client(&url, &options)?;
        Ok(Self::with_client(url, options, client, backoff))
    }

    /// Create a host around an existing client.
    pub fn with_client(
        url: Url,
        options: HostOptions,
        client: Client,
        backoff: ExponentialBackoff,
    ) -> Self {
        Self {
            url,
            options,
            client,
            health: Mutex::new(HostHealth {
                backoff: backoff.reset(),
                unavailable_until: None,
            }),
        }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn options(&self) -> &HostOptions {
        &self.options
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    /// URL for `path`, appended to the host's base path.
    pub fn url_for(&self, path: &str) -> Url {
        let mut url = self.url.clone();
        let base = self.url.path().trim_end_matches('/');
        url.set_path(&format!("{}/{}", base, path.trim_start_matches('/')));
        url.set_query(None);
        url
    }

    // --- Health Logic ---

    fn lock(&self) -> MutexGuard<'_, HostHealth> {
        // Health updates are plain field writes; a poisoned lock still holds a usable record.
        self.health.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshot of the current health record.
    pub fn health(&self) -> HostHealth {
        *self.lock()
    }

    /// Return true if the host may be routed to at `now`.
    pub fn is_eligible(&self, now: Instant) -> bool {
        match self.lock().unavailable_until {
            None => true,
            Some(until) => now >= until,
        }
    }

    /// Report a successful response. Returns true if the host had been backed off.
    pub fn on_success(&self) -> bool {
        let mut health = self.lock();
        let was_degraded = health.unavailable_until.is_some() || health.backoff.attempt() > 0;
        health.unavailable_until = None;
        health.backoff = health.backoff.reset();
        was_degraded
    }

    /// Report a retryable failure observed at `now`. Returns the backoff applied.
    pub fn on_retryable_failure(&self, now: Instant) -> Duration {
        let mut health = self.lock();
        let delay = health.backoff.delay();
        health.unavailable_until = Some(now + delay);
        health.backoff = health.backoff.next();
        delay
    }
}

impl std::fmt::Display for Host {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.url)
    }
}

fn build_client(url: &Url, options: &HostOptions) -> PoolResult<Client> {
    let invalid = |reason: String| PoolError::InvalidHost {
        url: url.to_string(),
        reason,
    };

    let mut builder = Client::builder();
    if !options.use_system_proxy {
        builder = builder.no_proxy();
    }
    if options.tls.accept_invalid_certs {
        tracing::warn!(host = %url, "TLS certificate verification disabled");
        builder = builder.danger_accept_invalid_certs(true);
    }
    if let Some(path) = &options.tls.ca_cert_path {
        let pem = fs::read(path).map_err(|e| invalid(format!("cannot read CA file {}: {}", path, e)))?;
        let cert = Certificate::from_pem(&pem).map_err(|e| invalid(format!("invalid CA file {}: {}", path, e)))?;
        builder = builder.add_root_certificate(cert);
    }

    builder.build().map_err(|e| invalid(e.to_string()))
}
