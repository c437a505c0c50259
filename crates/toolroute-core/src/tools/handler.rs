//! Handler capabilities bound to tools

use crate::types::ToolInput;

/// Opaque error raised by a tool handler
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// Handler for a registered tool
///
/// Runs synchronously on the invoking task with the arguments the model
/// supplied, unvalidated.
pub trait ToolHandler: Send + Sync {
    fn call(&self, input: ToolInput) -> Result<(), HandlerError>;
}

impl<F> ToolHandler for F
where
    F: Fn(ToolInput) -> Result<(), HandlerError> + Send + Sync,
{
    fn call(&self, input: ToolInput) -> Result<(), HandlerError> {
        self(input)
    }
}

/// Handler for the built-in conversational tool
///
/// Receives the model's natural-language answer. It is a notification and
/// has no error channel.
pub trait FallbackHandler: Send + Sync {
    fn respond(&self, response: &str);
}

impl<F> FallbackHandler for F
where
    F: Fn(&str) + Send + Sync,
{
    fn respond(&self, response: &str) {
        self(response)
    }
}
