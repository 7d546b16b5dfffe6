//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Attempt against a host finishes:
//!     → retries.rs (classify: success / retryable / terminal)
//!     → On retryable: backoff.rs (how long the host sits out)
//!     → pool moves on to the next eligible host
//! ```
//!
//! # Design Decisions
//! - Backoff is advisory: a backed-off host is skipped at selection time, nobody sleeps
//! - Retries go to a different host, never the same host twice in one call
//! - Classification is a pure function of the attempt result

pub mod backoff;
pub mod retries;

pub use backoff::{BackoffConfig, ExponentialBackoff};
pub use retries::Outcome;
