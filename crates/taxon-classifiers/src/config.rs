//! Configuration for the suggestion engine and its text generator

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use taxon_core::{Error, Result};

/// Configuration for the suggestion engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Upper bound on a single model call, in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Whether the keyword scorer runs automatically when the model yields nothing
    #[serde(default)]
    pub fallback: FallbackPolicy,

    /// Remote text generator; `None` gives a keyword-only engine
    #[serde(default)]
    pub generator: Option<GeneratorConfig>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            fallback: FallbackPolicy::default(),
            generator: None,
        }
    }
}

impl EngineConfig {
    /// Parse configuration from YAML text
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml)
            .map_err(|e| Error::config(format!("Invalid engine config: {}", e)))
    }

    /// Load configuration from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&content)
    }

    /// Model call timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// What the engine does when the model produces no suggestions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FallbackPolicy {
    /// Return the model result as-is; the caller decides whether to fall back
    #[default]
    Manual,
    /// Run the keyword scorer over the same leaves
    Auto,
}

/// Remote text-generation endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Wire protocol spoken by the endpoint
    #[serde(default)]
    pub provider: Provider,

    /// API base URL, e.g. `https://api.openai.com/v1`
    #[serde(default)]
    pub base_url: Option<String>,

    /// Model identifier
    pub model: String,

    /// Inline API key; prefer `api_key_env`
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,

    /// Environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Completion token limit
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

impl GeneratorConfig {
    /// Create a config for `model` with defaults for everything else
    pub fn new(provider: Provider, model: impl Into<String>) -> Self {
        Self {
            provider,
            base_url: None,
            model: model.into(),
            api_key: None,
            api_key_env: default_api_key_env(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
        }
    }

    /// Resolve the API key from the inline value or the environment
    ///
    /// A missing or blank key is a configuration error: no call could succeed.
    pub fn resolve_api_key(&self) -> Result<String> {
        let key = match &self.api_key {
            Some(key) => key.clone(),
            None => std::env::var(&self.api_key_env).unwrap_or_default(),
        };

        if key.trim().is_empty() {
            return Err(Error::config(format!(
                "No API key for {} generator: set `api_key` or the {} environment variable",
                self.provider.as_str(),
                self.api_key_env
            )));
        }

        Ok(key)
    }

    /// Base URL, falling back to the provider's public endpoint
    pub fn base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or_else(|| self.provider.default_base_url())
            .trim_end_matches('/')
    }
}

/// Supported text-generation wire protocols
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// OpenAI-compatible `/chat/completions`
    #[default]
    OpenAi,
    /// Anthropic `/messages`
    Anthropic,
}

impl Provider {
    /// Lowercase provider name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Anthropic => "anthropic",
        }
    }

    /// Public API endpoint for the provider
    pub fn default_base_url(&self) -> &'static str {
        match self {
            Self::OpenAi => "https://api.openai.com/v1",
            Self::Anthropic => "https://api.anthropic.com/v1",
        }
    }
}

fn default_timeout_ms() -> u64 {
    15_000
}

fn default_api_key_env() -> String {
    "TAXON_API_KEY".to_string()
}

fn default_temperature() -> f32 {
    0.2
}

fn default_max_tokens() -> u32 {
    512
}
