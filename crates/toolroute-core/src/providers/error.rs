//! Adapter error types

use thiserror::Error;

/// Errors a model adapter can report from `chat`
#[derive(Error, Debug)]
pub enum ProviderError {
    /// A credential or account setting needed to build the adapter is absent
    #[error("{provider} requires {setting}")]
    MissingCredentials { provider: String, setting: String },

    /// The configured endpoint is not a usable URL
    #[error("invalid {provider} endpoint '{endpoint}': {message}")]
    InvalidEndpoint {
        provider: String,
        endpoint: String,
        message: String,
    },

    /// API request failed
    #[error("{provider} API error ({status}): {message}")]
    ApiError {
        provider: String,
        status: u16,
        message: String,
    },

    /// Network/HTTP error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Request was cancelled
    #[error("Request cancelled")]
    Cancelled,

    /// The backend reported an error in the middle of a streamed reply
    #[error("{provider} stream error: {message}")]
    Stream { provider: String, message: String },

    /// Invalid response from provider
    #[error("Invalid response from {provider}: {message}")]
    InvalidResponse { provider: String, message: String },

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ProviderError {
    /// Create an API error
    pub fn api_error(provider: impl Into<String>, status: u16, message: impl Into<String>) -> Self {
        Self::ApiError {
            provider: provider.into(),
            status,
            message: message.into(),
        }
    }

    /// Create a missing credentials error
    pub fn missing_credentials(provider: impl Into<String>, setting: impl Into<String>) -> Self {
        Self::MissingCredentials {
            provider: provider.into(),
            setting: setting.into(),
        }
    }

    pub fn invalid_endpoint(
        provider: impl Into<String>,
        endpoint: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidEndpoint {
            provider: provider.into(),
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    /// Create a mid-stream error
    pub fn stream(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Stream {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create an invalid response error
    pub fn invalid_response(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

pub type ProviderResult<T> = Result<T, ProviderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = ProviderError::api_error("cf-worker-ai", 401, "Unauthorized");
        assert_eq!(err.to_string(), "cf-worker-ai API error (401): Unauthorized");

        let err = ProviderError::missing_credentials("cf-worker-ai", "CF_WORKER_AI_TOKEN");
        assert_eq!(err.to_string(), "cf-worker-ai requires CF_WORKER_AI_TOKEN");

        assert!(ProviderError::Cancelled.is_cancelled());
        assert!(!ProviderError::Other("x".into()).is_cancelled());
    }
}
