//! Errors raised while talking to the catalog API.

use thiserror::Error;

/// Message shown to users when retries against HTTP 429 run out.
pub const RATE_LIMIT_MESSAGE: &str = "API rate limit exceeded. Please wait a moment and try again.";

#[derive(Debug, Error)]
pub enum FetchError {
    /// Every attempt was rejected with HTTP 429.
    #[error("Exceeded maximum retry attempts due to rate limiting ({attempts} attempts)")]
    RateLimitExceeded { attempts: u32 },

    /// Any non-2xx status other than 429.
    #[error("Upstream returned HTTP {status} for {url}")]
    Upstream { status: u16, url: String },

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Unexpected response shape, expected {expected}")]
    UnexpectedPayload { expected: &'static str },
}

impl FetchError {
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, FetchError::RateLimitExceeded { .. })
    }

    /// Text suitable for an error banner.
    pub fn user_message(&self) -> String {
        match self {
            FetchError::RateLimitExceeded { .. } => RATE_LIMIT_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }
}
