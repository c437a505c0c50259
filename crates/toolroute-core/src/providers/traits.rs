//! Provider trait definition

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::types::{CancellationToken, ChatMessage};
use super::error::ProviderResult;

/// Free-form per-request options
///
/// Adapters pick out the keys they understand and may forward or ignore the
/// rest.
pub type ChatOptions = Map<String, Value>;

/// Option key requesting a constrained output format
pub const FORMAT_OPTION: &str = "format";

/// Value of [`FORMAT_OPTION`] requesting JSON-only output
pub const JSON_FORMAT: &str = "json";

/// Option key for how long a local model stays loaded, in seconds
pub const KEEP_ALIVE_OPTION: &str = "keep_alive";

/// Model adapter
///
/// Each backend (Ollama, Cloudflare Workers AI, the mock) implements this
/// trait. `chat` may stream internally but resolves to the fully assembled
/// reply or fails as a whole.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Stable adapter identity (e.g., "ollama", "cf-worker-ai")
    fn name(&self) -> &str;

    /// Send one chat request and return the complete reply text
    async fn chat(
        &self,
        messages: Vec<ChatMessage>,
        options: ChatOptions,
        cancel_token: CancellationToken,
    ) -> ProviderResult<String>;
}
