//! Tool selection chain
//!
//! One invocation moves through these stages, failing out of any of them
//! with a single [`ChainError`]:
//!
//! ```text
//! Idle → PromptRendered → ModelCalled → ReplyParsed → Dispatched
//! ```

mod error;
mod tool_chain;

pub use error::{ChainError, ChainResult};
pub use tool_chain::{parse_reply, Dispatch, Stage, ToolChain};
