//! Resilient HTTP host pool for database clients.
//!
//! Routes each request to an eligible host, backs failing hosts off
//! exponentially and retries on the remaining hosts.

pub mod config;
pub mod health;
pub mod lifecycle;
pub mod observability;
pub mod pool;
pub mod resilience;

pub use config::PoolConfig;
pub use health::PingStats;
pub use lifecycle::Shutdown;
pub use pool::{Pool, PoolError, RequestOptions};
