//! Outcome classification.
//!
//! # Responsibilities
//! - Decide whether a finished attempt counts against the host
//! - Decide whether the logical call moves on to another host
//!
//! # Design Decisions
//! - Connection errors, timeouts and 5xx are the host's fault: retry elsewhere, back the host off
//! - Any other non-2xx status is the request's fault: surface it, leave the host alone

use reqwest::StatusCode;

/// Classification of one attempt against one host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Retryable,
    Terminal,
}

impl Outcome {
    /// Classify a response status.
    pub fn from_status(status: StatusCode) -> Self {
        if status.is_server_error() {
            Outcome::Retryable
        } else if status.as_u16() >= 300 {
            Outcome::Terminal
        } else {
            Outcome::Success
        }
    }

    /// Label used in logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Success => "success",
            Outcome::Retryable => "retryable",
            Outcome::Terminal => "terminal",
        }
    }
}
