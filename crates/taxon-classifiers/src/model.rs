//! Model-assisted classifier
//!
//! Sends the leaf catalog and the request to a text generator and turns the
//! reply into validated suggestions. The model is trusted for id selection,
//! confidence and ordering only; names and paths always come from the leaf
//! set. This type is the error boundary for the remote call: `classify`
//! logs every failure and returns an empty ranking.

use crate::classifier::{CategoryClassifier, ClassifierKind};
use crate::config::GeneratorConfig;
use crate::generator::{HttpGenerator, TextGenerator};
use crate::prompt::build_prompt;
use crate::response::parse_candidates;
use crate::validator::validate;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::{Duration, Instant};
use taxon_core::{CategorySuggestion, Error, LeafCategory, Result, SuggestionRequest};
use tracing::{debug, warn};

/// Classifier backed by a remote text-generation model
#[derive(Clone)]
pub struct ModelClassifier {
    generator: Arc<dyn TextGenerator>,
    timeout: Duration,
}

impl ModelClassifier {
    /// Create a classifier around an existing generator
    pub fn new(generator: Arc<dyn TextGenerator>, timeout: Duration) -> Self {
        Self { generator, timeout }
    }

    /// Create a classifier talking to the configured HTTP endpoint
    ///
    /// Fails with [`Error::Config`] when no API key is available.
    pub fn from_config(config: GeneratorConfig, timeout: Duration) -> Result<Self> {
        let generator = HttpGenerator::new(config)?;
        Ok(Self::new(Arc::new(generator), timeout))
    }

    /// Per-call timeout
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Classify, surfacing the failure instead of collapsing it
    pub async fn try_classify(
        &self,
        request: &SuggestionRequest,
        leaves: &[LeafCategory],
    ) -> Result<Vec<CategorySuggestion>> {
        if leaves.is_empty() {
            return Ok(Vec::new());
        }

        let prompt = build_prompt(request, leaves);
        debug!(
            "Requesting classification from {} over {} leaves",
            self.generator.model(),
            leaves.len()
        );

        let start = Instant::now();
        let raw = tokio::time::timeout(self.timeout, self.generator.generate(&prompt))
            .await
            .map_err(|_| Error::Timeout)??;
        metrics::histogram!("taxon_model_latency_us").record(start.elapsed().as_micros() as f64);

        let candidates = parse_candidates(&raw)?;
        let proposed = candidates.len();
        let suggestions = validate(candidates, leaves);

        debug!(
            "Model proposed {} candidates, {} passed validation",
            proposed,
            suggestions.len()
        );

        Ok(suggestions)
    }
}

#[async_trait]
impl CategoryClassifier for ModelClassifier {
    async fn classify(
        &self,
        request: &SuggestionRequest,
        leaves: &[LeafCategory],
    ) -> Vec<CategorySuggestion> {
        match self.try_classify(request, leaves).await {
            Ok(suggestions) => suggestions,
            Err(e) => {
                warn!("Model classification failed, returning no suggestions: {}", e);
                metrics::counter!("taxon_model_failures_total", "kind" => e.kind()).increment(1);
                Vec::new()
            }
        }
    }

    fn name(&self) -> &str {
        self.generator.model()
    }

    fn kind(&self) -> ClassifierKind {
        ClassifierKind::Model
    }
}
