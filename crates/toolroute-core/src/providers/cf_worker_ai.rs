//! Cloudflare Workers AI adapter

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use super::error::{ProviderError, ProviderResult};
use super::traits::{ChatOptions, Provider};
use crate::config::CfWorkerAiSettings;
use crate::log_debug;
use crate::logging::Logger;
use crate::types::{CancellationToken, ChatMessage};

const PROVIDER: &str = "cf-worker-ai";

pub const DEFAULT_API_BASE: &str = "https://api.cloudflare.com/client/v4/accounts";
pub const DEFAULT_MODEL: &str = "@cf/meta/llama-3-8b-instruct";

#[derive(Debug, Serialize)]
struct RunRequest<'a> {
    messages: &'a [ChatMessage],
}

#[derive(Debug, Deserialize)]
struct RunResponse {
    #[serde(default)]
    result: Option<RunResult>,
    #[serde(default)]
    success: bool,
    #[serde(default, alias = "error")]
    errors: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct RunResult {
    #[serde(default)]
    response: String,
}

/// Workers AI chat adapter
///
/// Does not support constrained output, so every option is ignored.
pub struct CfWorkerAiProvider {
    endpoint: String,
    token: String,
    model: String,
    http: reqwest::Client,
    logger: Arc<dyn Logger>,
}

impl std::fmt::Debug for CfWorkerAiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CfWorkerAiProvider")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .finish()
    }
}

impl CfWorkerAiProvider {
    /// Create an adapter for `account_id` using bearer `token`
    pub fn new(
        account_id: &str,
        token: impl Into<String>,
        model: impl Into<String>,
        logger: Arc<dyn Logger>,
    ) -> ProviderResult<Self> {
        let token = token.into();
        if account_id.is_empty() {
            return Err(ProviderError::missing_credentials(PROVIDER, "CF_WORKER_AI_ACCOUNT_ID"));
        }
        if token.is_empty() {
            return Err(ProviderError::missing_credentials(PROVIDER, "CF_WORKER_AI_TOKEN"));
        }

        let model = model.into();
        let endpoint = format!("{}/{}/ai/run/{}", DEFAULT_API_BASE, account_id, model);
        reqwest::Url::parse(&endpoint)
            .map_err(|e| ProviderError::invalid_endpoint(PROVIDER, &endpoint, e.to_string()))?;

        Ok(Self {
            endpoint,
            token,
            model,
            http: reqwest::Client::new(),
            logger,
        })
    }

    /// Create an adapter from configuration
    pub fn from_settings(settings: &CfWorkerAiSettings, logger: Arc<dyn Logger>) -> ProviderResult<Self> {
        Self::new(
            settings.account_id.as_deref().unwrap_or_default(),
            settings.token.clone().unwrap_or_default(),
            settings.model.clone(),
            logger,
        )
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn run(&self, messages: &[ChatMessage]) -> ProviderResult<String> {
        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.token)
            .json(&RunRequest { messages })
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if status != reqwest::StatusCode::OK {
            return Err(ProviderError::api_error(
                PROVIDER,
                status.as_u16(),
                format!("error with status code: {}", status),
            ));
        }

        extract_response(status.as_u16(), &body)
    }
}

fn extract_response(status: u16, body: &str) -> ProviderResult<String> {
    let parsed: RunResponse = serde_json::from_str(body)?;
    if !parsed.success {
        let errors: Vec<String> = parsed
            .errors
            .iter()
            .map(|e| match e {
                Value::String(s) => s.clone(),
                Value::Object(o) => o
                    .get("message")
                    .and_then(|m| m.as_str())
                    .map(str::to_string)
                    .unwrap_or_else(|| e.to_string()),
                other => other.to_string(),
            })
            .collect();
        return Err(ProviderError::api_error(
            PROVIDER,
            status,
            format!("chat failed: {}", errors.join(", ")),
        ));
    }

    parsed
        .result
        .map(|r| r.response)
        .ok_or_else(|| ProviderError::invalid_response(PROVIDER, "missing result"))
}

#[async_trait]
impl Provider for CfWorkerAiProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn chat(
        &self,
        messages: Vec<ChatMessage>,
        _options: ChatOptions,
        cancel_token: CancellationToken,
    ) -> ProviderResult<String> {
        log_debug!(
            self.logger,
            "[CfWorkerAiProvider] chat: model={}, messages={}",
            self.model,
            messages.len()
        );

        match cancel_token.run_until_cancelled(self.run(&messages)).await {
            Some(result) => result,
            None => Err(ProviderError::Cancelled),
        }
    }
}
