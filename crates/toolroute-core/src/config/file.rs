//! File-based configuration (YAML)
//!
//! The user-level file lives at `<config dir>/toolroute/config.yaml`.

use std::fs;
use std::path::{Path, PathBuf};

use super::env::apply_env;
use super::error::ConfigResult;
use super::settings::ConfigFile;

/// Reads and writes a [`ConfigFile`] at a fixed path
///
/// # Example
///
/// ```no_run
/// use toolroute_core::config::FileConfig;
///
/// let config = FileConfig::user().load_with_env().unwrap();
/// println!("ollama at {}", config.ollama.host);
/// ```
#[derive(Debug, Clone)]
pub struct FileConfig {
    path: PathBuf,
}

impl FileConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// User-level config (~/.config/toolroute/config.yaml on Linux)
    pub fn user() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")).join(".config"));
        Self::new(config_dir.join("toolroute").join("config.yaml"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Load the file; a missing file yields the defaults
    pub fn load(&self) -> ConfigResult<ConfigFile> {
        if !self.path.exists() {
            return Ok(ConfigFile::default());
        }

        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(ConfigFile::default());
        }
        Ok(serde_yaml::from_str(&content)?)
    }

    /// Load the file, then apply environment overrides
    pub fn load_with_env(&self) -> ConfigResult<ConfigFile> {
        let mut config = self.load()?;
        apply_env(&mut config);
        Ok(config)
    }

    /// Write `config`, creating parent directories as needed
    pub fn save(&self, config: &ConfigFile) -> ConfigResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = serde_yaml::to_string(config)?;
        fs::write(&self.path, content)?;
        Ok(())
    }
}
