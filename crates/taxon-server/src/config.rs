//! Server configuration

use serde::{Deserialize, Serialize};
use std::path::Path;
use taxon_classifiers::{EngineConfig, FallbackPolicy};
use tracing::info;

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Listen port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Largest accepted request body
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,

    /// Suggestion engine settings
    #[serde(default)]
    pub engine: EngineConfig,
}

impl ServerConfig {
    /// Load configuration from file, or use defaults when it does not exist
    pub fn load(config_path: &str) -> anyhow::Result<Self> {
        if Path::new(config_path).exists() {
            let content = std::fs::read_to_string(config_path)?;
            Ok(serde_yaml::from_str(&content)?)
        } else {
            info!("Config file {} not found, using defaults", config_path);
            Ok(Self::default())
        }
    }

    /// Apply command-line overrides
    pub fn apply_overrides(
        &mut self,
        listen: Option<&str>,
        port: Option<u16>,
        fallback: Option<FallbackPolicy>,
    ) {
        if let Some(listen) = listen {
            self.listen = listen.to_string();
        }

        if let Some(port) = port {
            self.port = port;
        }

        if let Some(fallback) = fallback {
            self.engine.fallback = fallback;
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            port: default_port(),
            max_body_bytes: default_max_body_bytes(),
            engine: EngineConfig::default(),
        }
    }
}

fn default_listen() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_max_body_bytes() -> usize {
    1024 * 1024
}
