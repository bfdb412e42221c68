//! Configuration management for Forge
//!
//! Settings load from `.forge/config.toml` in the working directory, with
//! every field defaulted so a missing file is not an error. The model name
//! can additionally be overridden through the `FORGE_MODEL` environment
//! variable.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::Result;

/// Top-level Forge configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForgeConfig {
    /// Directory generated projects are written under
    #[serde(default = "default_projects_dir")]
    pub projects_dir: String,

    /// Model selection
    #[serde(default)]
    pub models: ModelConfig,

    /// Pipeline execution defaults
    #[serde(default)]
    pub pipeline: PipelineSettings,

    /// HTTP server settings
    #[serde(default)]
    pub server: ServerSettings,
}

/// Model configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Default model to use
    #[serde(default = "default_model")]
    pub default: String,

    /// Environment variable containing the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

/// Pipeline execution defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSettings {
    /// Ceiling on total coder invocations, a safety net against malformed
    /// task lists
    #[serde(default = "default_step_limit")]
    pub step_limit: usize,

    /// Maximum tokens per model response
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,

    /// Maximum read/list round-trips per coder step
    #[serde(default = "default_tool_round_limit")]
    pub tool_round_limit: usize,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_port")]
    pub port: u16,

    /// Open the frontend in a browser on launch
    #[serde(default)]
    pub open_browser: bool,
}

// Default value providers
fn default_projects_dir() -> String {
    "projects".to_string()
}

fn default_model() -> String {
    "sonnet".to_string()
}

fn default_api_key_env() -> String {
    "ANTHROPIC_API_KEY".to_string()
}

fn default_step_limit() -> usize {
    100
}

fn default_max_tokens() -> usize {
    16000
}

fn default_tool_round_limit() -> usize {
    4
}

fn default_port() -> u16 {
    8000
}

impl ForgeConfig {
    /// Load configuration from `.forge/config.toml` or use defaults
    pub fn load_or_default(root: &Path) -> Result<Self> {
        let config_path = root.join(".forge/config.toml");

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            Ok(toml::from_str(&content).map_err(|e| {
                crate::ForgeError::Config(format!("Failed to parse config file: {}", e))
            })?)
        } else {
            Ok(Self::default())
        }
    }

    /// Write default configuration to `.forge/config.toml`
    pub fn write_default(root: &Path) -> Result<()> {
        let config_dir = root.join(".forge");
        std::fs::create_dir_all(&config_dir)?;

        let config_path = config_dir.join("config.toml");
        let config = Self::default();
        let content = toml::to_string_pretty(&config)
            .map_err(|e| crate::ForgeError::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    /// Resolve the model name, preferring the `FORGE_MODEL` environment
    /// variable over the configured default
    pub fn model_name(&self) -> String {
        std::env::var("FORGE_MODEL").unwrap_or_else(|_| self.models.default.clone())
    }
}

impl Default for ForgeConfig {
    fn default() -> Self {
        Self {
            projects_dir: default_projects_dir(),
            models: ModelConfig::default(),
            pipeline: PipelineSettings::default(),
            server: ServerSettings::default(),
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            default: default_model(),
            api_key_env: default_api_key_env(),
        }
    }
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            step_limit: default_step_limit(),
            max_tokens: default_max_tokens(),
            tool_round_limit: default_tool_round_limit(),
        }
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            port: default_port(),
            open_browser: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = ForgeConfig::default();
        assert_eq!(config.projects_dir, "projects");
        assert_eq!(config.models.default, "sonnet");
        assert_eq!(config.pipeline.step_limit, 100);
        assert_eq!(config.server.port, 8000);
        assert!(!config.server.open_browser);
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let config = ForgeConfig::load_or_default(dir.path()).unwrap();
        assert_eq!(config.pipeline.max_tokens, 16000);
    }

    #[test]
    fn test_write_then_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        ForgeConfig::write_default(dir.path()).unwrap();
        assert!(dir.path().join(".forge/config.toml").exists());

        let config = ForgeConfig::load_or_default(dir.path()).unwrap();
        assert_eq!(config.models.api_key_env, "ANTHROPIC_API_KEY");
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let config_dir = dir.path().join(".forge");
        std::fs::create_dir_all(&config_dir).unwrap();
        std::fs::write(
            config_dir.join("config.toml"),
            "projects_dir = \"out\"\n\n[server]\nport = 9001\n",
        )
        .unwrap();

        let config = ForgeConfig::load_or_default(dir.path()).unwrap();
        assert_eq!(config.projects_dir, "out");
        assert_eq!(config.server.port, 9001);
        assert_eq!(config.pipeline.step_limit, 100);
    }
}
