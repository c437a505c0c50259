//! Environment variable overrides

use std::env;

use once_cell::sync::Lazy;

use super::settings::ConfigFile;

type Setter = fn(&mut ConfigFile, String);

/// Environment variables that override file settings, in application order
static ENV_OVERRIDES: Lazy<Vec<(&'static str, Setter)>> = Lazy::new(|| {
    vec![
        ("OLLAMA_HOST", set_ollama_host as Setter),
        ("OLLAMA_MODEL", set_ollama_model as Setter),
        ("CF_WORKER_AI_ACCOUNT_ID", set_cf_account_id as Setter),
        ("CF_WORKER_AI_TOKEN", set_cf_token as Setter),
        ("CF_WORKER_AI_MODEL", set_cf_model as Setter),
    ]
});

fn set_ollama_host(config: &mut ConfigFile, value: String) {
    config.ollama.host = value;
}

fn set_ollama_model(config: &mut ConfigFile, value: String) {
    config.ollama.model = value;
}

fn set_cf_account_id(config: &mut ConfigFile, value: String) {
    config.cf_worker_ai.account_id = Some(value);
}

fn set_cf_token(config: &mut ConfigFile, value: String) {
    config.cf_worker_ai.token = Some(value);
}

fn set_cf_model(config: &mut ConfigFile, value: String) {
    config.cf_worker_ai.model = value;
}

/// Names of every recognized override variable
pub fn env_override_names() -> Vec<&'static str> {
    ENV_OVERRIDES.iter().map(|(name, _)| *name).collect()
}

/// Apply overrides from the process environment
pub fn apply_env(config: &mut ConfigFile) -> Vec<&'static str> {
    apply_env_with(config, |name| env::var(name).ok())
}

/// Apply overrides from `lookup`; empty values are ignored
///
/// Returns the names of the variables that were applied.
pub fn apply_env_with<F>(config: &mut ConfigFile, lookup: F) -> Vec<&'static str>
where
    F: Fn(&str) -> Option<String>,
{
    let mut applied = Vec::new();
    for (name, setter) in ENV_OVERRIDES.iter() {
        if let Some(value) = lookup(name).filter(|v| !v.is_empty()) {
            setter(config, value);
            applied.push(*name);
        }
    }
    applied
}
