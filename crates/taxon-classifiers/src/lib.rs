//! Taxon Classifiers
//!
//! Leaf category ranking for free-text service requests.
//!
//! Two producers share one output contract:
//! - Model: a remote text generator picks ids from the leaf catalog
//! - Keyword: deterministic token overlap against leaf paths, always available
//!
//! Whatever the producer, results pass through [`validator::validate`]
//! before reaching the caller: ids must name a leaf of the snapshot,
//! confidence must lie in `[0, 1]`, and at most five suggestions are kept.

pub mod classifier;
pub mod config;
pub mod engine;
pub mod generator;
pub mod keyword;
pub mod model;
pub mod prompt;
pub mod response;
pub mod validator;

pub use classifier::{CategoryClassifier, ClassifierKind};
pub use config::{EngineConfig, FallbackPolicy, GeneratorConfig, Provider};
pub use engine::{Strategy, SuggestionEngine, SuggestionOutcome, SuggestionSource};
pub use generator::{HttpGenerator, TextGenerator};
pub use keyword::{score_fallback, KeywordClassifier};
pub use model::ModelClassifier;
pub use validator::{validate, CandidateSuggestion, MAX_SUGGESTIONS};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::classifier::{CategoryClassifier, ClassifierKind};
    pub use crate::engine::{Strategy, SuggestionEngine, SuggestionOutcome, SuggestionSource};
    pub use crate::keyword::KeywordClassifier;
    pub use crate::model::ModelClassifier;
    pub use taxon_core::prelude::*;
}
