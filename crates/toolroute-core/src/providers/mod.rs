//! Model adapters
//!
//! The chain only depends on the [`Provider`] trait. Concrete adapters:
//! - `OllamaProvider`: local/remote Ollama server, streamed NDJSON replies
//! - `CfWorkerAiProvider`: Cloudflare Workers AI
//! - `MockProvider`: scripted replies for tests

mod traits;
mod error;
mod mock;
mod ollama;
mod cf_worker_ai;

pub use traits::{ChatOptions, Provider, FORMAT_OPTION, JSON_FORMAT, KEEP_ALIVE_OPTION};
pub use error::{ProviderError, ProviderResult};
pub use mock::{MockMode, MockProvider, RecordedCall};
pub use ollama::OllamaProvider;
pub use cf_worker_ai::{CfWorkerAiProvider, DEFAULT_MODEL as CF_WORKER_AI_DEFAULT_MODEL};

use crate::config::ConfigFile;
use crate::logging::Logger;
use std::sync::Arc;

/// Create an adapter for the given provider ID from configuration
pub fn create_provider(
    provider_id: &str,
    config: &ConfigFile,
    logger: Arc<dyn Logger>,
) -> ProviderResult<Arc<dyn Provider>> {
    match provider_id.to_lowercase().as_str() {
        "ollama" => Ok(Arc::new(OllamaProvider::from_settings(&config.ollama, logger)?)),
        "cf-worker-ai" | "cloudflare" => Ok(Arc::new(CfWorkerAiProvider::from_settings(
            &config.cf_worker_ai,
            logger,
        )?)),
        "mock" => Ok(Arc::new(MockProvider::new(
            MockMode::Fixed(r#"{"tool":"conversationalResponse","toolInput":{"response":"mock"}}"#.to_string()),
            logger,
        ))),
        other => Err(ProviderError::Other(format!("unsupported provider: {}", other))),
    }
}

/// List all supported provider IDs
pub fn supported_providers() -> Vec<&'static str> {
    vec!["ollama", "cf-worker-ai", "mock"]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::NoOpLogger;

    #[test]
    fn test_create_known_providers() {
        let mut config = ConfigFile::default();
        config.cf_worker_ai.account_id = Some("acc".to_string());
        config.cf_worker_ai.token = Some("tok".to_string());

        for id in supported_providers() {
            let provider = create_provider(id, &config, NoOpLogger::shared()).unwrap();
            assert_eq!(provider.name(), id);
        }
    }

    #[test]
    fn test_create_unknown_provider() {
        let err = create_provider("genie", &ConfigFile::default(), NoOpLogger::shared())
            .err()
            .unwrap();
        assert!(err.to_string().contains("unsupported provider"));
    }

    #[test]
    fn test_cloudflare_requires_credentials() {
        let err = create_provider("cf-worker-ai", &ConfigFile::default(), NoOpLogger::shared())
            .err()
            .unwrap();
        assert!(matches!(err, ProviderError::MissingCredentials { .. }));
    }
}
