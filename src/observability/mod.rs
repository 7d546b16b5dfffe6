//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Pool and prober produce:
//!     → logging.rs (structured log events, one span per logical call)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → Log aggregation (stdout, JSON)
//!     → Whatever `metrics` recorder the application installs
//! ```
//!
//! # Design Decisions
//! - Structured logging (JSON) for machine parsing
//! - Request ID attached to every event of a logical call
//! - Metrics are cheap (no-ops until a recorder is installed)

pub mod logging;
pub mod metrics;
