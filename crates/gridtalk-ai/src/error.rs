//! Error types for gridtalk-ai

use thiserror::Error;

/// Result type alias using gridtalk-ai Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when calling the reasoning backend
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// API returned an error response
    #[error("API error: {message} (type: {error_type})")]
    Api { error_type: String, message: String },

    /// Rate limit exceeded
    #[error("Rate limited: retry after {retry_after:?} seconds")]
    RateLimited { retry_after: Option<u64> },

    /// Invalid API key
    #[error("Invalid or missing API key")]
    InvalidApiKey,

    /// Unexpected response format
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),
}

impl Error {
    /// Create an API error from type and message
    pub fn api(error_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Api {
            error_type: error_type.into(),
            message: message.into(),
        }
    }

    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Http(_) | Error::RateLimited { .. } => true,
            Error::Api {
                error_type,
                message,
            } => {
                let et = error_type.to_lowercase();
                let msg = message.to_lowercase();
                et.contains("rate_limit")
                    || et.contains("overloaded")
                    || msg.contains("rate limit")
                    || msg.contains("overloaded")
                    || msg.contains("too many requests")
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_rate_limited() {
        assert!(Error::RateLimited { retry_after: Some(5) }.is_retryable());
        assert!(Error::RateLimited { retry_after: None }.is_retryable());
    }

    #[test]
    fn test_retryable_api_rate_limit_error_type() {
        let e = Error::api("rate_limit_error", "You have exceeded the rate limit");
        assert!(e.is_retryable());
    }

    #[test]
    fn test_retryable_api_overloaded_message() {
        let e = Error::api("server_error", "API is overloaded right now");
        assert!(e.is_retryable());
    }

    #[test]
    fn test_not_retryable_api_auth() {
        let e = Error::api("authentication_error", "Invalid API key");
        assert!(!e.is_retryable());
    }

    #[test]
    fn test_not_retryable_other() {
        assert!(!Error::InvalidApiKey.is_retryable());
        assert!(!Error::UnexpectedResponse("empty choices".into()).is_retryable());
    }
}
