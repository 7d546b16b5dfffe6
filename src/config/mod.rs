//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → PoolConfig (validated, immutable)
//!     → Pool::from_config builds hosts and clients
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; hosts may still be added to a running pool
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::BackoffConfig;
pub use schema::HostConfig;
pub use schema::HostOptions;
pub use schema::ObservabilityConfig;
pub use schema::PingConfig;
pub use schema::PoolConfig;
pub use schema::TimeoutConfig;
pub use schema::TlsOptions;
