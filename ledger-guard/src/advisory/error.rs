use thiserror::Error;

/// Errors raised while requesting or reading a remediation narrative.
#[derive(Debug, Error)]
pub enum AdvisoryError {
    /// The advisor is missing a credential or was given invalid settings.
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Authentication failed (invalid or expired API key).
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// Network error (connection failed, timeout, etc.).
    #[error("Network error: {message}")]
    Network { message: String },

    /// Rate limited by the provider.
    #[error("Rate limited. Retry after {retry_after_secs:?} seconds")]
    RateLimited { retry_after_secs: Option<u64> },

    /// The provider returned an error status.
    #[error("Server error ({status}): {message}")]
    ServerError { status: u16, message: String },

    /// The reply could not be read as a narrative.
    #[error("Invalid reply: {message}")]
    InvalidReply { message: String },

    /// Serialization/deserialization error.
    #[error("Serialization error: {message}")]
    Serialization { message: String },
}

impl AdvisoryError {
    /// Returns true if this error is transient and the request could be retried.
    pub fn is_retryable(&self) -> bool {
        match self {
            AdvisoryError::Network { .. } => true,
            AdvisoryError::RateLimited { .. } => true,
            AdvisoryError::ServerError { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Returns the suggested retry delay in seconds, if available.
    pub fn retry_after(&self) -> Option<u64> {
        match self {
            AdvisoryError::RateLimited { retry_after_secs } => *retry_after_secs,
            _ => None,
        }
    }
}

impl From<serde_json::Error> for AdvisoryError {
    fn from(err: serde_json::Error) -> Self {
        AdvisoryError::Serialization {
            message: err.to_string(),
        }
    }
}

/// Result type for advisory operations.
pub type AdvisoryResult<T> = std::result::Result<T, AdvisoryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_retryable() {
        assert!(AdvisoryError::Network {
            message: "timeout".to_string()
        }
        .is_retryable());
        assert!(AdvisoryError::RateLimited {
            retry_after_secs: Some(30)
        }
        .is_retryable());
        assert!(AdvisoryError::ServerError {
            status: 503,
            message: String::new()
        }
        .is_retryable());
        assert!(!AdvisoryError::ServerError {
            status: 400,
            message: String::new()
        }
        .is_retryable());
        assert!(!AdvisoryError::InvalidReply {
            message: "not json".to_string()
        }
        .is_retryable());
    }

    #[test]
    fn test_retry_after() {
        let err = AdvisoryError::RateLimited {
            retry_after_secs: Some(12),
        };
        assert_eq!(err.retry_after(), Some(12));
        assert_eq!(
            AdvisoryError::Authentication {
                message: "bad key".to_string()
            }
            .retry_after(),
            None
        );
    }
}
