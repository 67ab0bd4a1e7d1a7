//! Suggestion engine
//!
//! Composes the full flow for one request: index the category snapshot,
//! run the chosen producer over its leaves, and pass the result through the
//! validator. Nothing is cached between calls; every call rebuilds the index
//! from the categories it is handed.
//!
//! Falling back from the model to the keyword scorer is the caller's call by
//! default ([`FallbackPolicy::Manual`]); [`FallbackPolicy::Auto`] chains them.

use crate::classifier::CategoryClassifier;
use crate::config::{EngineConfig, FallbackPolicy};
use crate::keyword::KeywordClassifier;
use crate::model::ModelClassifier;
use crate::validator::{validate, CandidateSuggestion};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use taxon_core::{
    CategoryIndex, CategoryNode, CategorySuggestion, LeafCategory, Result, SuggestionRequest,
};
use tracing::{debug, info, warn};

/// Which producer a call should use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Model when configured, keyword otherwise, chained per the fallback policy
    #[default]
    Auto,
    /// Model only
    Model,
    /// Keyword scorer only
    Keyword,
}

/// Which producer generated a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionSource {
    /// The remote model
    Model,
    /// The keyword scorer
    Keyword,
    /// No producer ran
    None,
}

/// Result of one engine call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestionOutcome {
    /// Validated suggestions, best first
    pub suggestions: Vec<CategorySuggestion>,

    /// Producer that generated them
    pub source: SuggestionSource,
}

impl SuggestionOutcome {
    fn empty() -> Self {
        Self {
            suggestions: Vec::new(),
            source: SuggestionSource::None,
        }
    }
}

/// Stateless leaf-category suggestion engine
#[derive(Clone)]
pub struct SuggestionEngine {
    model: Option<Arc<dyn CategoryClassifier>>,
    keyword: KeywordClassifier,
    fallback: FallbackPolicy,
}

impl SuggestionEngine {
    /// Create an engine from explicit parts
    pub fn new(model: Option<Arc<dyn CategoryClassifier>>, fallback: FallbackPolicy) -> Self {
        Self {
            model,
            keyword: KeywordClassifier::new(),
            fallback,
        }
    }

    /// Create an engine from configuration
    ///
    /// A configured generator without a usable API key is a fatal
    /// configuration error.
    pub fn from_config(config: &EngineConfig) -> Result<Self> {
        let model = match &config.generator {
            Some(generator) => {
                let classifier = ModelClassifier::from_config(generator.clone(), config.timeout())?;
                Some(Arc::new(classifier) as Arc<dyn CategoryClassifier>)
            }
            None => {
                info!("No generator configured, suggestions use the keyword scorer");
                None
            }
        };

        Ok(Self::new(model, config.fallback))
    }

    /// Whether a model producer is configured
    pub fn has_model(&self) -> bool {
        self.model.is_some()
    }

    /// Fallback policy in effect
    pub fn fallback_policy(&self) -> FallbackPolicy {
        self.fallback
    }

    /// Leaf categories of a snapshot, with paths
    pub fn leaves(&self, categories: &[CategoryNode]) -> Vec<LeafCategory> {
        CategoryIndex::build(categories).into_leaves()
    }

    /// Suggest leaf categories using the engine's default strategy
    pub async fn suggest(
        &self,
        request: &SuggestionRequest,
        categories: &[CategoryNode],
    ) -> SuggestionOutcome {
        self.suggest_with(request, categories, Strategy::Auto).await
    }

    /// Run the keyword scorer directly
    pub async fn fallback(
        &self,
        request: &SuggestionRequest,
        categories: &[CategoryNode],
    ) -> SuggestionOutcome {
        self.suggest_with(request, categories, Strategy::Keyword).await
    }

    /// Suggest leaf categories using an explicit strategy
    pub async fn suggest_with(
        &self,
        request: &SuggestionRequest,
        categories: &[CategoryNode],
        strategy: Strategy,
    ) -> SuggestionOutcome {
        metrics::counter!("taxon_requests_total").increment(1);

        let index = CategoryIndex::build(categories);
        let leaves = index.leaves();
        if leaves.is_empty() {
            debug!("No leaf categories in snapshot, skipping classification");
            return SuggestionOutcome::empty();
        }

        let outcome = match (strategy, &self.model) {
            (Strategy::Keyword, _) | (Strategy::Auto, None) => {
                self.run(&self.keyword, SuggestionSource::Keyword, request, leaves)
                    .await
            }
            (Strategy::Model, None) => {
                warn!("Model strategy requested but no generator is configured");
                SuggestionOutcome::empty()
            }
            (Strategy::Model, Some(model)) => {
                self.run(&**model, SuggestionSource::Model, request, leaves)
                    .await
            }
            (Strategy::Auto, Some(model)) => {
                let outcome = self
                    .run(&**model, SuggestionSource::Model, request, leaves)
                    .await;

                if outcome.suggestions.is_empty() && self.fallback == FallbackPolicy::Auto {
                    info!("Model returned no suggestions, falling back to keyword scorer");
                    metrics::counter!("taxon_fallback_total").increment(1);
                    self.run(&self.keyword, SuggestionSource::Keyword, request, leaves)
                        .await
                } else {
                    outcome
                }
            }
        };

        debug!(
            "Suggested {} categories via {:?}",
            outcome.suggestions.len(),
            outcome.source
        );

        outcome
    }

    async fn run(
        &self,
        classifier: &dyn CategoryClassifier,
        source: SuggestionSource,
        request: &SuggestionRequest,
        leaves: &[LeafCategory],
    ) -> SuggestionOutcome {
        let produced = classifier.classify(request, leaves).await;

        // Producers are pluggable, so their output is checked again here
        let suggestions = validate(
            produced
                .into_iter()
                .map(|s| CandidateSuggestion::new(s.id, s.confidence)),
            leaves,
        );

        SuggestionOutcome {
            suggestions,
            source,
        }
    }
}
