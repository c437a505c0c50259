//! Core types shared by the registry, the chain and the adapters

mod message;
mod tool;
mod cancellation;

pub use message::{ChatMessage, MessageRole};
pub use tool::{ToolCall, ToolInput};
pub use cancellation::CancellationToken;
