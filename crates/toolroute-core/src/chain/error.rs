//! Chain error types

use thiserror::Error;

use crate::providers::ProviderError;
use crate::tools::HandlerError;

/// Errors surfaced by registration and by `ToolChain::invoke`
///
/// Every failure ends the invocation; nothing is retried.
#[derive(Error, Debug)]
pub enum ChainError {
    /// A tool with this name already exists (including the reserved fallback)
    #[error("tool already registered: {0}")]
    DuplicateName(String),

    /// The model selected a tool that is not registered
    #[error("tool not found: {0}")]
    ToolNotFound(String),

    /// A tool schema could not be encoded as JSON
    #[error("failed to serialize tool schema: {0}")]
    SchemaSerialization(#[source] serde_json::Error),

    /// The model adapter failed
    #[error("chat failed")]
    Chat(#[source] ProviderError),

    /// The model reply is not a `{"tool", "toolInput"}` object
    #[error("invalid response: {reason}")]
    InvalidResponse { reason: String },

    /// The conversational tool was selected but no handler is bound
    #[error("conversational handler not set")]
    FallbackHandlerUnset,

    /// The caller cancelled the invocation while the model call was outstanding
    #[error("invocation cancelled")]
    Cancelled,

    /// The selected tool's handler failed
    #[error(transparent)]
    Handler(HandlerError),
}

impl ChainError {
    pub fn invalid_response(reason: impl Into<String>) -> Self {
        Self::InvalidResponse {
            reason: reason.into(),
        }
    }

    /// Map an adapter failure, keeping cancellation distinguishable
    pub fn from_provider(err: ProviderError) -> Self {
        if err.is_cancelled() {
            Self::Cancelled
        } else {
            Self::Chat(err)
        }
    }

    /// The handler's own error, if this failure came from a handler
    pub fn handler_error(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match self {
            Self::Handler(err) => Some(err.as_ref()),
            _ => None,
        }
    }

    pub fn into_handler_error(self) -> Result<HandlerError, Self> {
        match self {
            Self::Handler(err) => Ok(err),
            other => Err(other),
        }
    }

    /// Short machine-readable name of the error kind
    pub fn kind(&self) -> &'static str {
        match self {
            Self::DuplicateName(_) => "duplicate_name",
            Self::ToolNotFound(_) => "tool_not_found",
            Self::SchemaSerialization(_) => "schema_serialization",
            Self::Chat(_) => "chat",
            Self::InvalidResponse { .. } => "invalid_response",
            Self::FallbackHandlerUnset => "fallback_handler_unset",
            Self::Cancelled => "cancelled",
            Self::Handler(_) => "handler",
        }
    }
}

pub type ChainResult<T> = Result<T, ChainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Error)]
    #[error("weather service unreachable")]
    struct Unreachable;

    #[test]
    fn test_handler_error_is_transparent() {
        let err = ChainError::Handler(Box::new(Unreachable));

        assert_eq!(err.to_string(), "weather service unreachable");
        assert_eq!(err.kind(), "handler");
        assert!(err.handler_error().unwrap().downcast_ref::<Unreachable>().is_some());

        let inner = err.into_handler_error().unwrap();
        assert!(inner.downcast_ref::<Unreachable>().is_some());
    }

    #[test]
    fn test_from_provider() {
        assert!(matches!(
            ChainError::from_provider(ProviderError::Cancelled),
            ChainError::Cancelled
        ));

        let err = ChainError::from_provider(ProviderError::api_error("ollama", 500, "boom"));
        assert_eq!(err.kind(), "chat");
        assert_eq!(err.to_string(), "chat failed");
        let source = std::error::Error::source(&err).unwrap();
        assert_eq!(source.to_string(), "ollama API error (500): boom");
    }
}
