//! Configuration
//!
//! - `FileConfig`: YAML file (user level by default)
//! - environment overrides (`OLLAMA_HOST`, `CF_WORKER_AI_TOKEN`, ...)
//!
//! The chain itself only reads [`ChainSettings`]; adapter settings are
//! consumed by `providers::create_provider`.

mod error;
mod settings;
mod file;
mod env;

pub use error::{ConfigError, ConfigResult};
pub use settings::{
    ConfigFile, ChainSettings, OllamaSettings, CfWorkerAiSettings,
    DEFAULT_OLLAMA_HOST, DEFAULT_OLLAMA_MODEL,
};
pub use file::FileConfig;
pub use env::{apply_env, apply_env_with, env_override_names};
