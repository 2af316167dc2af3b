//! Configuration management for forge
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (FORGE_*)
//! 3. Config file (~/.config/forge/config.toml)
//! 4. Default values

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::llm::RetryConfig;
use crate::{Error, Result};

/// Default OpenAI-compatible endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// Default model name
pub const DEFAULT_MODEL: &str = "openai/gpt-oss-120b";

/// Model provider configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Base URL of the chat-completions API
    pub base_url: String,

    /// Model to use for every stage
    pub model: String,

    /// Environment variable holding the API key
    pub api_key_env: String,

    /// API key set directly in the config file
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    /// Sampling temperature (provider default when unset)
    pub temperature: Option<f32>,

    /// Per-request timeout
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,

    /// Maximum model round-trips in one coder tool conversation
    pub max_tool_rounds: usize,

    /// Retry policy for transient provider failures
    pub retry: RetryConfig,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key_env: "GROQ_API_KEY".to_string(),
            api_key: None,
            temperature: None,
            timeout: Duration::from_secs(120),
            max_tool_rounds: 25,
            retry: RetryConfig::default(),
        }
    }
}

impl LlmConfig {
    /// Find the API key, preferring the config file over the environment
    pub fn resolve_api_key(&self) -> Result<String> {
        if let Some(key) = self.api_key.as_ref().filter(|k| !k.is_empty()) {
            return Ok(key.clone());
        }

        std::env::var(&self.api_key_env)
            .ok()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                Error::Config(format!(
                    "No API key found. Set {} or llm.api_key in the config file",
                    self.api_key_env
                ))
            })
    }
}

/// Pipeline run configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Directory under which project roots are created
    pub output_dir: PathBuf,

    /// Maximum number of stage invocations in one run
    pub step_limit: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("generated_project"),
            step_limit: 100,
        }
    }
}

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Model provider configuration
    pub llm: LlmConfig,

    /// Pipeline configuration
    pub pipeline: PipelineConfig,
}

/// Values supplied on the command line
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub output_dir: Option<PathBuf>,
    pub step_limit: Option<usize>,
}

impl Config {
    /// Load configuration from the default config file location
    ///
    /// Returns default config if file doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();

        if let Some(path) = config_path {
            if path.exists() {
                return Self::load_from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(Error::Io)?;
        toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))
    }

    /// Get the default config file path
    ///
    /// Returns `~/.config/forge/config.toml` on Unix
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("forge").join("config.toml"))
    }

    /// Apply environment variable overrides
    ///
    /// Supported variables:
    /// - FORGE_MODEL: Model to use
    /// - FORGE_BASE_URL: Chat-completions endpoint
    /// - FORGE_OUTPUT_DIR: Directory for generated projects
    /// - FORGE_STEP_LIMIT: Maximum stage invocations per run
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(model) = std::env::var("FORGE_MODEL") {
            self.llm.model = model;
        }

        if let Ok(base_url) = std::env::var("FORGE_BASE_URL") {
            self.llm.base_url = base_url;
        }

        if let Ok(dir) = std::env::var("FORGE_OUTPUT_DIR") {
            self.pipeline.output_dir = PathBuf::from(dir);
        }

        if let Some(limit) = std::env::var("FORGE_STEP_LIMIT")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            self.pipeline.step_limit = limit;
        }

        self
    }

    /// Apply CLI flag overrides
    pub fn with_cli_overrides(mut self, overrides: CliOverrides) -> Self {
        if let Some(model) = overrides.model {
            self.llm.model = model;
        }

        if let Some(base_url) = overrides.base_url {
            self.llm.base_url = base_url;
        }

        if let Some(dir) = overrides.output_dir {
            self.pipeline.output_dir = dir;
        }

        if let Some(limit) = overrides.step_limit {
            self.pipeline.step_limit = limit;
        }

        self
    }

    /// Load configuration with all overrides applied
    ///
    /// Priority: CLI > env > config file > defaults
    pub fn load_with_overrides(overrides: CliOverrides) -> Result<Self> {
        Ok(Self::load()?
            .with_env_overrides()
            .with_cli_overrides(overrides))
    }
}
