use async_trait::async_trait;
use thiserror::Error;

/// Errors from a single chat-completion request
#[derive(Error, Debug)]
pub enum ChatError {
    /// Invalid request parameters (HTTP 400)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Invalid or missing API key (HTTP 401)
    #[error("Invalid API key - authentication failed")]
    InvalidApiKey,

    /// Forbidden - permission denied (HTTP 403)
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Model or endpoint not found (HTTP 404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Rate limit exceeded (HTTP 429)
    #[error("Rate limit exceeded - too many requests")]
    RateLimitExceeded,

    /// Server error from the model endpoint (HTTP 5xx)
    #[error("Server error ({0}): {1}")]
    ServerError(u16, String),

    /// Network or connection error
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Request timeout
    #[error("Request timeout")]
    Timeout,

    /// Response body did not have the expected chat-completion shape
    #[error("Malformed chat completion response: {0}")]
    MalformedResponse(String),

    /// Any other unexpected status
    #[error("Unknown error ({0}): {1}")]
    UnknownError(u16, String),
}

impl ChatError {
    /// Returns true if this error is transient and should be retried
    pub const fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::RateLimitExceeded | Self::ServerError(_, _) | Self::Timeout | Self::NetworkError(_)
        )
    }

    /// Build an error from a non-success HTTP status and its body
    pub fn from_status(status: u16, body: String) -> Self {
        match status {
            400 => Self::InvalidRequest(body),
            401 => Self::InvalidApiKey,
            403 => Self::Forbidden(body),
            404 => Self::NotFound(body),
            429 => Self::RateLimitExceeded,
            500..=599 => Self::ServerError(status, body),
            _ => Self::UnknownError(status, body),
        }
    }
}

/// Port for an LLM agent that answers a single user turn.
///
/// Every call is independent: implementations must not carry conversation
/// state from one call to the next.
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Send `prompt` as the sole user message and return the reply text.
    async fn complete(&self, prompt: &str) -> Result<String, ChatError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_classification() {
        assert!(matches!(ChatError::from_status(400, "x".into()), ChatError::InvalidRequest(_)));
        assert!(matches!(ChatError::from_status(401, String::new()), ChatError::InvalidApiKey));
        assert!(matches!(ChatError::from_status(429, String::new()), ChatError::RateLimitExceeded));
        assert!(matches!(ChatError::from_status(503, "busy".into()), ChatError::ServerError(503, _)));
        assert!(matches!(ChatError::from_status(418, String::new()), ChatError::UnknownError(418, _)));
    }

    #[test]
    fn test_transient_errors() {
        assert!(ChatError::RateLimitExceeded.is_transient());
        assert!(ChatError::ServerError(500, "test".to_string()).is_transient());
        assert!(ChatError::Timeout.is_transient());
        assert!(!ChatError::InvalidApiKey.is_transient());
        assert!(!ChatError::MalformedResponse("no choices".to_string()).is_transient());
    }
}
