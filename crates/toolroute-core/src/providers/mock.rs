//! Mock provider for testing
//!
//! Provides deterministic replies without network dependencies and records
//! every request it receives.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

use super::error::{ProviderError, ProviderResult};
use super::traits::{ChatOptions, Provider};
use crate::log_debug;
use crate::logging::Logger;
use crate::types::{CancellationToken, ChatMessage};

/// Mock response mode
#[derive(Debug, Clone)]
pub enum MockMode {
    /// Return a fixed reply
    Fixed(String),
    /// Assemble the reply from chunks, sleeping between them
    Chunks(Vec<String>),
    /// Fail with the given message
    Error(String),
    /// Never reply; only cancellation ends the call
    Pending,
}

/// A request seen by the mock
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub messages: Vec<ChatMessage>,
    pub options: ChatOptions,
}

/// Mock LLM provider for testing
pub struct MockProvider {
    name: String,
    mode: MockMode,
    chunk_delay_ms: u64,
    calls: Mutex<Vec<RecordedCall>>,
    logger: Arc<dyn Logger>,
}

impl MockProvider {
    /// Create a mock in the given mode
    pub fn new(mode: MockMode, logger: Arc<dyn Logger>) -> Self {
        Self {
            name: "mock".to_string(),
            mode,
            chunk_delay_ms: 0,
            calls: Mutex::new(Vec::new()),
            logger,
        }
    }

    /// Create a fixed reply provider
    pub fn fixed(reply: impl Into<String>, logger: Arc<dyn Logger>) -> Self {
        Self::new(MockMode::Fixed(reply.into()), logger)
    }

    /// Create a chunked reply provider
    pub fn chunked(chunks: Vec<String>, delay_ms: u64, logger: Arc<dyn Logger>) -> Self {
        Self::new(MockMode::Chunks(chunks), logger).with_delay(delay_ms)
    }

    /// Create an error-producing provider
    pub fn error(message: impl Into<String>, logger: Arc<dyn Logger>) -> Self {
        Self::new(MockMode::Error(message.into()), logger)
    }

    /// Create a provider that never answers
    pub fn pending(logger: Arc<dyn Logger>) -> Self {
        Self::new(MockMode::Pending, logger)
    }

    /// Report a different adapter identity (e.g., "ollama")
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set chunk delay
    pub fn with_delay(mut self, delay_ms: u64) -> Self {
        self.chunk_delay_ms = delay_ms;
        self
    }

    /// Requests received so far, oldest first
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn last_call(&self) -> Option<RecordedCall> {
        self.calls.lock().last().cloned()
    }

    async fn assemble(&self, chunks: &[String], cancel_token: &CancellationToken) -> ProviderResult<String> {
        let mut reply = String::new();
        for (i, chunk) in chunks.iter().enumerate() {
            if cancel_token.is_cancelled() {
                return Err(ProviderError::Cancelled);
            }
            if i > 0 && self.chunk_delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(self.chunk_delay_ms)).await;
            }
            reply.push_str(chunk);
        }
        Ok(reply)
    }
}

#[async_trait]
impl Provider for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn chat(
        &self,
        messages: Vec<ChatMessage>,
        options: ChatOptions,
        cancel_token: CancellationToken,
    ) -> ProviderResult<String> {
        log_debug!(self.logger, "MockProvider: chat called with {} messages", messages.len());
        self.calls.lock().push(RecordedCall { messages, options });

        match &self.mode {
            MockMode::Fixed(reply) => {
                if cancel_token.is_cancelled() {
                    return Err(ProviderError::Cancelled);
                }
                Ok(reply.clone())
            }
            MockMode::Chunks(chunks) => self.assemble(chunks, &cancel_token).await,
            MockMode::Error(message) => Err(ProviderError::Other(format!("Mock error: {}", message))),
            MockMode::Pending => {
                cancel_token.cancelled().await;
                Err(ProviderError::Cancelled)
            }
        }
    }
}
