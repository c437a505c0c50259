//! Single-shot tool selection and dispatch

use std::sync::Arc;

use serde_json::Value;

use super::error::{ChainError, ChainResult};
use crate::config::ChainSettings;
use crate::log_debug;
use crate::logging::Logger;
use crate::prompt;
use crate::providers::{ChatOptions, Provider, FORMAT_OPTION, JSON_FORMAT};
use crate::tools::{
    FallbackHandler, ToolDescriptor, ToolHandler, ToolRegistry, FALLBACK_RESPONSE_FIELD,
    FALLBACK_TOOL_NAME,
};
use crate::types::{CancellationToken, ChatMessage, ToolCall};

/// Which handler a successful invocation ran
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// The conversational fallback handler ran
    Conversational,
    /// The named tool's handler ran
    Tool { name: String },
}

/// Invocation progress, reported at debug level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    PromptRendered,
    ModelCalled,
    ReplyParsed,
    Dispatched,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Idle => "idle",
            Stage::PromptRendered => "prompt_rendered",
            Stage::ModelCalled => "model_called",
            Stage::ReplyParsed => "reply_parsed",
            Stage::Dispatched => "dispatched",
        };
        f.write_str(name)
    }
}

/// Asks a model to pick exactly one registered tool and runs it
///
/// `invoke` takes `&self`, so one chain can serve concurrent callers; the
/// registry lock is never held across the model call or a handler.
pub struct ToolChain {
    provider: Arc<dyn Provider>,
    registry: ToolRegistry,
    settings: ChainSettings,
    logger: Arc<dyn Logger>,
}

impl ToolChain {
    /// Create a chain with default settings
    pub fn new(provider: Arc<dyn Provider>, logger: Arc<dyn Logger>) -> Self {
        Self::with_settings(provider, ChainSettings::default(), logger)
    }

    pub fn with_settings(
        provider: Arc<dyn Provider>,
        settings: ChainSettings,
        logger: Arc<dyn Logger>,
    ) -> Self {
        Self {
            provider,
            registry: ToolRegistry::new(),
            settings,
            logger,
        }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub fn provider(&self) -> &Arc<dyn Provider> {
        &self.provider
    }

    pub fn settings(&self) -> &ChainSettings {
        &self.settings
    }

    /// Register a tool; see [`ToolRegistry::register`]
    pub fn register_tool<H>(
        &self,
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: Value,
        handler: H,
    ) -> ChainResult<()>
    where
        H: ToolHandler + 'static,
    {
        self.registry.register(name, description, parameters, handler)
    }

    /// Bind the conversational fallback handler; last write wins
    pub fn set_fallback_handler<H>(&self, handler: H)
    where
        H: FallbackHandler + 'static,
    {
        self.registry.set_fallback_handler(handler)
    }

    /// Options sent with every request to this chain's adapter
    pub fn chat_options(&self) -> ChatOptions {
        let mut options = ChatOptions::new();
        if self.settings.requires_json_mode(self.provider.name()) {
            options.insert(FORMAT_OPTION.to_string(), Value::from(JSON_FORMAT));
        }
        options
    }

    /// Build the system and user messages for `message`
    pub fn build_messages(&self, message: &str) -> ChainResult<Vec<ChatMessage>> {
        messages_for(&self.registry.snapshot(), message)
    }

    /// Run one invocation that cannot be cancelled
    pub async fn invoke(&self, message: &str) -> ChainResult<Dispatch> {
        self.invoke_with_cancel(message, &CancellationToken::new()).await
    }

    /// Run one invocation
    ///
    /// Renders the prompt, calls the adapter once, parses the reply and runs
    /// exactly one handler. If `cancel` fires while the adapter call is
    /// outstanding, fails with `Cancelled` without looking at any output.
    pub async fn invoke_with_cancel(
        &self,
        message: &str,
        cancel: &CancellationToken,
    ) -> ChainResult<Dispatch> {
        self.stage(Stage::Idle, "invocation started");

        let snapshot = self.registry.snapshot();
        let messages = messages_for(&snapshot, message)?;
        self.stage(Stage::PromptRendered, &format!("{} tools in catalog", snapshot.len()));

        let options = self.chat_options();
        let chat = self.provider.chat(messages, options, cancel.clone());
        let reply = match cancel.run_until_cancelled(chat).await {
            Some(result) => result.map_err(ChainError::from_provider)?,
            None => return Err(ChainError::Cancelled),
        };
        if cancel.is_cancelled() {
            return Err(ChainError::Cancelled);
        }
        self.stage(
            Stage::ModelCalled,
            &format!("{} replied with {} bytes", self.provider.name(), reply.len()),
        );

        let call = parse_reply(&reply)?;
        self.stage(Stage::ReplyParsed, &format!("selected tool '{}'", call.name));

        let dispatch = self.dispatch(call)?;
        self.stage(Stage::Dispatched, &format!("{:?}", dispatch));
        Ok(dispatch)
    }

    fn dispatch(&self, call: ToolCall) -> ChainResult<Dispatch> {
        if call.name == FALLBACK_TOOL_NAME {
            let response = call.get_arg_str(FALLBACK_RESPONSE_FIELD).ok_or_else(|| {
                ChainError::invalid_response(format!(
                    "{} requires a string '{}' field",
                    FALLBACK_TOOL_NAME, FALLBACK_RESPONSE_FIELD
                ))
            })?;
            let handler = self
                .registry
                .fallback_handler()
                .ok_or(ChainError::FallbackHandlerUnset)?;

            handler.respond(response);
            return Ok(Dispatch::Conversational);
        }

        let tool = self.registry.lookup(&call.name)?;
        let Some(handler) = tool.handler() else {
            return Err(ChainError::ToolNotFound(call.name));
        };

        handler.call(call.input).map_err(ChainError::Handler)?;
        Ok(Dispatch::Tool { name: call.name })
    }

    fn stage(&self, stage: Stage, detail: &str) {
        log_debug!(self.logger, "[ToolChain] {}: {}", stage, detail);
    }
}

fn messages_for(tools: &[Arc<ToolDescriptor>], message: &str) -> ChainResult<Vec<ChatMessage>> {
    let system_prompt = prompt::render(tools)?;
    Ok(vec![ChatMessage::system(system_prompt), ChatMessage::user(message)])
}

/// Decode a raw reply strictly as `{"tool": .., "toolInput": {..}}`
pub fn parse_reply(reply: &str) -> ChainResult<ToolCall> {
    ToolCall::from_reply(reply).map_err(|e| ChainError::invalid_response(e.to_string()))
}
