//! Keyword overlap scorer
//!
//! Deterministic, local ranking used when the remote model is unavailable.
//! Each whitespace token of the request longer than three characters scores
//! one point for every leaf whose lowercased path contains it. Matching is
//! plain substring containment: "eletricista" does not match "eletricidade".

use crate::classifier::{CategoryClassifier, ClassifierKind};
use crate::validator::{validate, CandidateSuggestion, MAX_SUGGESTIONS};
use async_trait::async_trait;
use taxon_core::{CategorySuggestion, LeafCategory, SuggestionRequest};
use tracing::debug;

/// Tokens must be longer than this many characters to count
pub const MIN_TOKEN_CHARS: usize = 3;

/// Points needed for a full-confidence match before the ceiling applies
pub const SCORE_SCALE: f64 = 10.0;

/// Highest confidence the scorer will ever report
pub const CONFIDENCE_CEILING: f64 = 0.8;

/// Rank leaves by token overlap between the request and each leaf path
///
/// Ties keep leaf order. At most [`MAX_SUGGESTIONS`] entries are returned.
pub fn score_fallback(
    request: &SuggestionRequest,
    leaves: &[LeafCategory],
) -> Vec<CategorySuggestion> {
    let text = request.text().to_lowercase();
    let tokens: Vec<&str> = text
        .split_whitespace()
        .filter(|token| token.chars().count() > MIN_TOKEN_CHARS)
        .collect();

    let mut scored: Vec<CandidateSuggestion> = leaves
        .iter()
        .filter_map(|leaf| {
            let path = leaf.path.to_lowercase();
            let raw = tokens.iter().filter(|token| path.contains(*token)).count();
            let confidence = (raw as f64 / SCORE_SCALE).min(CONFIDENCE_CEILING);
            (confidence > 0.0).then(|| CandidateSuggestion::new(leaf.id.clone(), confidence))
        })
        .collect();

    // Vec::sort_by is stable, equal scores stay in leaf order
    scored.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    scored.truncate(MAX_SUGGESTIONS);

    debug!(
        "Keyword scorer matched {} tokens against {} leaves, {} ranked",
        tokens.len(),
        leaves.len(),
        scored.len()
    );

    validate(scored, leaves)
}

/// [`CategoryClassifier`] wrapper around [`score_fallback`]
#[derive(Debug, Clone, Default)]
pub struct KeywordClassifier;

impl KeywordClassifier {
    /// Create a new keyword classifier
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CategoryClassifier for KeywordClassifier {
    async fn classify(
        &self,
        request: &SuggestionRequest,
        leaves: &[LeafCategory],
    ) -> Vec<CategorySuggestion> {
        score_fallback(request, leaves)
    }

    fn name(&self) -> &str {
        "keyword"
    }

    fn kind(&self) -> ClassifierKind {
        ClassifierKind::Keyword
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use taxon_core::{CategoryIndex, CategoryNode};

    fn leaf(id: &str, path: &str) -> LeafCategory {
        LeafCategory {
            id: id.to_string(),
            name: path.rsplit(" → ").next().unwrap_or(path).to_string(),
            path: path.to_string(),
        }
    }

    #[test]
    fn test_marketplace_example_ranks_related_leaf_first() {
        let nodes = vec![
            CategoryNode::root("A", "Casa"),
            CategoryNode::child("B", "Eletricidade", "A"),
            CategoryNode::root("J", "Jardim"),
            CategoryNode::child("P", "Poda", "J"),
        ];
        let index = CategoryIndex::build(&nodes);
        let request =
            SuggestionRequest::new("Preciso de um eletricista", "Tomada avariada em casa");

        let result = score_fallback(&request, index.leaves());

        // Only "casa" literally appears in B's path
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id, "B");
        assert_eq!(result[0].path, "Casa → Eletricidade");
        assert!((result[0].confidence - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_short_tokens_are_ignored() {
        let leaves = vec![leaf("a", "Car → Tow")];
        let request = SuggestionRequest::new("car tow", "");
        assert!(score_fallback(&request, &leaves).is_empty());
    }

    #[test]
    fn test_token_length_counts_characters() {
        // "pão" is three characters but four bytes
        let leaves = vec![leaf("a", "Padaria → Pão")];
        let request = SuggestionRequest::new("pão", "");
        assert!(score_fallback(&request, &leaves).is_empty());
    }

    #[test]
    fn test_match_is_case_insensitive() {
        let leaves = vec![leaf("a", "Home → PLUMBING")];
        let request = SuggestionRequest::new("Plumbing", "");
        assert_eq!(score_fallback(&request, &leaves).len(), 1);
    }

    #[test]
    fn test_repeated_tokens_each_score() {
        let leaves = vec![leaf("a", "Home → Plumbing")];
        let request = SuggestionRequest::new("plumbing plumbing", "plumbing");
        let result = score_fallback(&request, &leaves);
        assert!((result[0].confidence - 0.3).abs() < 1e-9);
    }

    #[test]
    fn test_confidence_capped() {
        let leaves = vec![leaf("a", "Home → Plumbing")];
        let request = SuggestionRequest::new("plumbing ".repeat(20), "");
        let result = score_fallback(&request, &leaves);
        assert_eq!(result[0].confidence, CONFIDENCE_CEILING);
    }

    #[test]
    fn test_ties_keep_leaf_order_and_truncate() {
        let leaves: Vec<LeafCategory> = (0..8)
            .map(|i| leaf(&format!("l{}", i), &format!("Home → Repair {}", i)))
            .collect();
        let request = SuggestionRequest::new("repair", "");

        let result = score_fallback(&request, &leaves);
        let ids: Vec<_> = result.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["l0", "l1", "l2", "l3", "l4"]);
    }

    #[test]
    fn test_higher_overlap_ranks_first() {
        let leaves = vec![
            leaf("a", "Home → Garden"),
            leaf("b", "Home → Garden → Lawn mowing"),
        ];
        let request = SuggestionRequest::new("garden lawn", "mowing");

        let result = score_fallback(&request, &leaves);
        assert_eq!(result[0].id, "b");
        assert_eq!(result[1].id, "a");
    }

    #[tokio::test]
    async fn test_keyword_classifier_trait() {
        let classifier = KeywordClassifier::new();
        let leaves = vec![leaf("a", "Home → Plumbing")];
        let result = classifier
            .classify(&SuggestionRequest::new("plumbing", ""), &leaves)
            .await;

        assert_eq!(result.len(), 1);
        assert_eq!(classifier.name(), "keyword");
        assert_eq!(classifier.kind(), ClassifierKind::Keyword);
    }

    fn words() -> impl Strategy<Value = String> {
        prop::collection::vec("[a-e]{2,6}", 0..12).prop_map(|w| w.join(" "))
    }

    fn leaf_set() -> impl Strategy<Value = Vec<LeafCategory>> {
        prop::collection::vec(words(), 0..15).prop_map(|paths| {
            paths
                .into_iter()
                .enumerate()
                .map(|(i, path)| leaf(&format!("l{}", i), &path))
                .collect()
        })
    }

    proptest! {
        #[test]
        fn prop_deterministic(title in words(), description in words(), leaves in leaf_set()) {
            let request = SuggestionRequest::new(title, description);
            prop_assert_eq!(score_fallback(&request, &leaves), score_fallback(&request, &leaves));
        }

        #[test]
        fn prop_bounded(title in words(), description in words(), leaves in leaf_set()) {
            let request = SuggestionRequest::new(title, description);
            let result = score_fallback(&request, &leaves);
            prop_assert!(result.len() <= MAX_SUGGESTIONS);
            for suggestion in &result {
                prop_assert!(suggestion.confidence > 0.0);
                prop_assert!(suggestion.confidence <= CONFIDENCE_CEILING);
            }
            for pair in result.windows(2) {
                prop_assert!(pair[0].confidence >= pair[1].confidence);
            }
        }
    }
}
