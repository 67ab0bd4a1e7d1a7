//! Shared application state

use anyhow::Result;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use taxon_classifiers::SuggestionEngine;
use tracing::info;

use crate::config::ServerConfig;

/// Application state shared across all requests
#[derive(Clone)]
pub struct AppState {
    /// Loaded configuration
    pub config: Arc<ServerConfig>,

    /// Suggestion engine; holds no per-request state
    pub engine: Arc<SuggestionEngine>,

    /// Prometheus metrics handle for rendering
    pub metrics_handle: PrometheusHandle,
}

impl AppState {
    /// Initialize application state from configuration
    ///
    /// Fails when a generator is configured without a usable API key.
    pub fn new(config: ServerConfig, metrics_handle: PrometheusHandle) -> Result<Self> {
        let engine = SuggestionEngine::from_config(&config.engine)?;

        info!(
            "Engine ready: model={} fallback={:?} timeout={}ms",
            engine.has_model(),
            engine.fallback_policy(),
            config.engine.timeout_ms
        );

        Ok(Self::with_engine(config, engine, metrics_handle))
    }

    /// Assemble state around an existing engine
    pub fn with_engine(
        config: ServerConfig,
        engine: SuggestionEngine,
        metrics_handle: PrometheusHandle,
    ) -> Self {
        Self {
            config: Arc::new(config),
            engine: Arc::new(engine),
            metrics_handle,
        }
    }
}
