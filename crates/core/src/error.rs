//! Error types for the CareTutor domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error enum.

use thiserror::Error;

/// The top-level error type for all CareTutor operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Document store errors ---
    #[error("Document store error: {0}")]
    Store(#[from] StoreError),

    // --- Model provider errors ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- Query routing errors ---
    #[error("Routing error: {0}")]
    Routing(#[from] RoutingError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("Store request failed: {message} (status: {status_code})")]
    ApiError {
        status_code: u16,
        message: String,
    },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Document not found: {0}")]
    NotFound(String),

    #[error("Rate limited by document store")]
    RateLimited,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid store response: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError {
        status_code: u16,
        message: String,
    },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Model response contained no text segment")]
    EmptyResponse,
}

#[derive(Debug, Clone, Error)]
pub enum RoutingError {
    #[error("No frameworks available: the framework catalog is empty")]
    NoFrameworksAvailable,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_error_displays_correctly() {
        let err = Error::Store(StoreError::ApiError {
            status_code: 403,
            message: "insufficient permissions".into(),
        });
        assert!(err.to_string().contains("403"));
        assert!(err.to_string().contains("insufficient permissions"));
    }

    #[test]
    fn provider_error_displays_correctly() {
        let err = Error::Provider(ProviderError::RateLimited {
            retry_after_secs: 5,
        });
        assert!(err.to_string().contains("5s"));
    }

    #[test]
    fn routing_error_names_the_empty_catalog() {
        let err = Error::Routing(RoutingError::NoFrameworksAvailable);
        assert!(err.to_string().contains("catalog is empty"));
    }

    #[test]
    fn config_error_carries_its_message() {
        let err = Error::Config {
            message: "unknown context strategy: hybrid".into(),
        };
        assert!(err.to_string().contains("hybrid"));
    }
}
