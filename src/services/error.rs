//! Errors raised by the external collaborators.

use thiserror::Error;

/// Errors from a market-data provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("market data request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("market data endpoint returned HTTP {status}")]
    Status { status: u16 },

    #[error("market data request timed out after {after_ms}ms")]
    Timeout { after_ms: u64 },

    #[error("market data API error: {message}")]
    Api { message: String },

    #[error("malformed market data response: {message}")]
    Malformed { message: String },

    #[error("invalid market data endpoint: {0}")]
    Url(#[from] url::ParseError),
}

impl ProviderError {
    /// Worth retrying: transport failures, slow attempts, 5xx and 429.
    pub fn is_transient(&self) -> bool {
        match self {
            ProviderError::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            ProviderError::Status { status } => *status == 429 || *status >= 500,
            ProviderError::Timeout { .. } => true,
            _ => false,
        }
    }
}

/// Errors from a notification channel.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("notification request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("notification rejected ({status}): {message}")]
    Api { status: u16, message: String },
}
