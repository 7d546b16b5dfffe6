//! Pool error definitions.

use std::time::Duration;

use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use thiserror::Error;

/// Why a single attempt against a host was retryable.
#[derive(Debug, Error)]
pub enum AttemptError {
    /// The attempt did not complete within its timeout.
    #[error("request to {host} timed out after {ms}ms", ms = .timeout.as_millis())]
    Timeout { host: String, timeout: Duration },

    /// Connection, TLS or protocol failure.
    #[error("transport error talking to {host}: {source}")]
    Transport {
        host: String,
        #[source]
        source: reqwest::Error,
    },

    /// The host answered with a server error.
    #[error("{host} responded with {status}")]
    Status {
        host: String,
        status: StatusCode,
        body: String,
    },
}

impl AttemptError {
    /// The host this attempt was sent to.
    pub fn host(&self) -> &str {
        match self {
            AttemptError::Timeout { host, .. }
            | AttemptError::Transport { host, .. }
            | AttemptError::Status { host, .. } => host,
        }
    }
}

/// A response the request itself is to blame for.
#[derive(Debug, Clone, Error)]
#[error("request failed with status {status}{}", body_suffix(.body))]
pub struct RequestError {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl RequestError {
    /// Response body as text, lossily decoded.
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

fn body_suffix(body: &[u8]) -> String {
    if body.is_empty() {
        String::new()
    } else {
        format!(": {}", String::from_utf8_lossy(body))
    }
}

/// The response body could not be read in the requested shape.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("response body is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("response body is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors returned by pool operations.
#[derive(Debug, Error)]
pub enum PoolError {
    /// No host was eligible when the call started; nothing was sent.
    #[error("No host available")]
    NoHostAvailable,

    /// Every host eligible at call start was tried and failed.
    #[error("service unavailable after {attempts} attempt(s): {source}")]
    ServiceUnavailable {
        attempts: usize,
        #[source]
        source: AttemptError,
    },

    /// A terminal (non-retryable) response.
    #[error(transparent)]
    Request(#[from] RequestError),

    /// A successful response whose body could not be decoded.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// A host could not be registered.
    #[error("invalid host '{url}': {reason}")]
    InvalidHost { url: String, reason: String },
}

impl PoolError {
    /// True for both service-unavailable cases.
    pub fn is_service_unavailable(&self) -> bool {
        matches!(
            self,
            PoolError::NoHostAvailable | PoolError::ServiceUnavailable { .. }
        )
    }

    /// Status of the terminal response, if any.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            PoolError::Request(e) => Some(e.status),
            PoolError::ServiceUnavailable {
                source: AttemptError::Status { status, .. },
                ..
            } => Some(*status),
            _ => None,
        }
    }
}

/// Result type for pool operations.
pub type PoolResult<T> = Result<T, PoolError>;
