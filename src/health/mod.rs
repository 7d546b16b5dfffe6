//! Liveness probing subsystem.
//!
//! # Data Flow
//! ```text
//! Pool::ping (ping.rs):
//!     → one GET per host, all in parallel
//!     → bounded by a per-probe timeout
//!     → PingStats per host, registration order
//!
//! PingMonitor (monitor.rs):
//!     Periodic timer
//!     → Pool::ping
//!     → log reachability changes, hand report to caller
//! ```
//!
//! # Design Decisions
//! - Probing is independent of request routing; it never changes host backoff
//! - One host's slow probe never delays another host's result

pub mod monitor;
pub mod ping;

pub use monitor::PingMonitor;
pub use ping::{ping_host, PingStats};
