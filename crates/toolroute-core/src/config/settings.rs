//! Configuration file structure

use serde::{Deserialize, Serialize};

pub const DEFAULT_OLLAMA_HOST: &str = "http://localhost:11434";
pub const DEFAULT_OLLAMA_MODEL: &str = "llama3";

/// Top-level YAML document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    pub chain: ChainSettings,
    pub ollama: OllamaSettings,
    pub cf_worker_ai: CfWorkerAiSettings,
}

/// Settings for the tool chain itself
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainSettings {
    /// Adapter identities that get `format: json` on every request
    pub json_mode_providers: Vec<String>,
}

impl Default for ChainSettings {
    fn default() -> Self {
        Self {
            json_mode_providers: vec!["ollama".to_string()],
        }
    }
}

impl ChainSettings {
    pub fn requires_json_mode(&self, provider_name: &str) -> bool {
        self.json_mode_providers.iter().any(|p| p == provider_name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OllamaSettings {
    pub host: String,
    pub model: String,
    /// How long the model stays loaded after a request
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keep_alive_secs: Option<u64>,
}

impl Default for OllamaSettings {
    fn default() -> Self {
        Self {
            host: DEFAULT_OLLAMA_HOST.to_string(),
            model: DEFAULT_OLLAMA_MODEL.to_string(),
            keep_alive_secs: None,
        }
    }
}

#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CfWorkerAiSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    pub model: String,
}

impl Default for CfWorkerAiSettings {
    fn default() -> Self {
        Self {
            account_id: None,
            token: None,
            model: crate::providers::CF_WORKER_AI_DEFAULT_MODEL.to_string(),
        }
    }
}

impl std::fmt::Debug for CfWorkerAiSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CfWorkerAiSettings")
            .field("account_id", &self.account_id)
            .field("token", &self.token.as_ref().map(|_| "***"))
            .field("model", &self.model)
            .finish()
    }
}

impl CfWorkerAiSettings {
    pub fn has_credentials(&self) -> bool {
        self.account_id.as_deref().is_some_and(|a| !a.is_empty())
            && self.token.as_deref().is_some_and(|t| !t.is_empty())
    }
}
