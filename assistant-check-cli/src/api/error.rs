use reqwest::StatusCode;
use thiserror::Error;

/// Failures of a single assistant request
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("HTTP {}: {}", .status.as_u16(), .body)]
    Status { status: StatusCode, body: String },

    /// Status is absent when the quota error arrived inside a 200 body
    #[error("Rate limited: {message}")]
    RateLimited {
        status: Option<StatusCode>,
        message: String,
    },

    #[error("Invalid response body: {0}")]
    InvalidBody(String),
}

impl ApiError {
    pub fn from_status(status: StatusCode, body: String) -> Self {
        let body = if body.is_empty() {
            status.canonical_reason().unwrap_or("Unknown error").to_string()
        } else {
            body
        };

        match status {
            _ if status == StatusCode::TOO_MANY_REQUESTS || looks_rate_limited(&body) => {
                ApiError::RateLimited {
                    status: Some(status),
                    message: format!("HTTP {}: {}", status.as_u16(), body),
                }
            }
            _ => ApiError::Status { status, body },
        }
    }

    pub fn from_transport(err: reqwest::Error, timeout_seconds: u64) -> Self {
        if err.is_timeout() {
            ApiError::Timeout(timeout_seconds)
        } else {
            ApiError::NetworkError(err.to_string())
        }
    }

    /// HTTP status the error came with, if the server answered at all
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::RateLimited { status, .. } => *status,
            _ => None,
        }
    }

    /// Soft outcome: the upstream quota was exhausted, not a broken tool
    pub fn is_rate_limited(&self) -> bool {
        match self {
            ApiError::RateLimited { .. } => true,
            ApiError::Status { body, .. } => looks_rate_limited(body),
            _ => false,
        }
    }
}

/// Whether an error text reports an exhausted quota
pub fn looks_rate_limited(text: &str) -> bool {
    let text = text.to_lowercase();
    ["429", "rate limit", "rate_limit", "quota"]
        .iter()
        .any(|marker| text.contains(marker))
}
