//! Classifier trait and common types

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use taxon_core::{CategorySuggestion, LeafCategory, SuggestionRequest};

/// Ranks leaf categories for a free-text service request
///
/// Implementations never fail: anything that goes wrong collapses into an
/// empty ranking so the caller can decide what to try next. Every returned
/// suggestion references one of `leaves` and has already been validated.
#[async_trait]
pub trait CategoryClassifier: Send + Sync {
    /// Rank `leaves` for the request, best first, at most five entries
    async fn classify(
        &self,
        request: &SuggestionRequest,
        leaves: &[LeafCategory],
    ) -> Vec<CategorySuggestion>;

    /// Get the classifier name
    fn name(&self) -> &str;

    /// Which kind of producer this is
    fn kind(&self) -> ClassifierKind;
}

/// Producer kind, reported alongside results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassifierKind {
    /// Remote text-generation model
    Model,
    /// Local keyword overlap scorer
    Keyword,
}

impl ClassifierKind {
    /// Lowercase label used in logs and metrics
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Model => "model",
            Self::Keyword => "keyword",
        }
    }
}
