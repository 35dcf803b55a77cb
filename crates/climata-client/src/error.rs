//! Client error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClimateError {
    /// Non-2xx response under strict status checking. Never produced for a
    /// 429, which the transport retries instead.
    #[error("HTTP error: status {status}")]
    Http { status: u16 },

    /// Malformed JSON from the service. Surfaced, not recovered.
    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    /// The persistence layer is unreachable or refused the operation,
    /// including the uniqueness violation from re-inserting a key.
    #[error("cache unavailable: {0}")]
    Cache(#[from] rusqlite::Error),

    /// Cache filesystem setup failed.
    #[error("cache I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl ClimateError {
    /// Whether the caller could reasonably retry the failed operation.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http { status } => *status >= 500,
            Self::Network(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }
}
