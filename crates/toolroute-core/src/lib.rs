//! Toolroute Core
//!
//! Single-shot tool selection over a chat model. Each invocation renders the
//! registered tools into a system prompt, asks the model once, parses its
//! reply as `{"tool": .., "toolInput": {..}}` and runs exactly one handler.
//! A built-in `conversationalResponse` tool, always last in the catalog,
//! lets the model answer in plain words.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use serde_json::json;
//! use toolroute_core::{ConsoleLogger, Dispatch, HandlerError, OllamaProvider, ToolChain, ToolInput};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//! let logger = Arc::new(ConsoleLogger::new());
//! let model = OllamaProvider::new("http://localhost:11434", "llama3", logger.clone())?;
//! let chain = ToolChain::new(Arc::new(model), logger);
//!
//! chain.register_tool(
//!     "getWeather",
//!     "Get the current weather in a given location",
//!     json!({"type": "object", "properties": {"location": {"type": "string"}}}),
//!     |input: ToolInput| -> Result<(), HandlerError> {
//!         println!("weather for {:?}", input.get("location"));
//!         Ok(())
//!     },
//! )?;
//! chain.set_fallback_handler(|reply: &str| println!("{}", reply));
//!
//! match chain.invoke("What is the weather like in Jakarta?").await? {
//!     Dispatch::Conversational => {}
//!     Dispatch::Tool { name } => println!("ran {}", name),
//! }
//! # Ok(())
//! # }
//! ```

pub mod chain;
pub mod config;
pub mod logging;
pub mod prompt;
pub mod providers;
pub mod tools;
pub mod types;

pub use types::{CancellationToken, ChatMessage, MessageRole, ToolCall, ToolInput};

pub use logging::{ConsoleLogger, LogLevel, Logger, MemoryLogger, NoOpLogger};

pub use config::{ConfigError, ConfigFile, ConfigResult, FileConfig};

pub use providers::{
    create_provider, supported_providers, CfWorkerAiProvider, ChatOptions, MockProvider,
    OllamaProvider, Provider, ProviderError, ProviderResult,
};

pub use tools::{
    FallbackHandler, HandlerError, ToolDescriptor, ToolHandler, ToolRegistry, FALLBACK_TOOL_NAME,
};

pub use chain::{ChainError, ChainResult, Dispatch, ToolChain};
