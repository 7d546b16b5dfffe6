//! Lifecycle management.
//!
//! # Design Decisions
//! - The pool itself has no background tasks; only optional monitors need stopping
//! - Shutdown is a broadcast so any number of tasks can listen

pub mod shutdown;

pub use shutdown::Shutdown;
