//! Suggestion validation
//!
//! The single gate every producer's output passes through. A candidate is
//! kept only when its id names one of the supplied leaves and its confidence
//! lies in `[0, 1]`. Display fields come from the leaf record, never from
//! the candidate. Rejected candidates are dropped one by one; they never
//! fail the batch and are never replaced.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use taxon_core::{CategorySuggestion, LeafCategory};
use tracing::debug;

/// Upper bound on suggestions returned by any producer
pub const MAX_SUGGESTIONS: usize = 5;

/// An unvalidated `(id, confidence)` pair proposed by a producer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateSuggestion {
    /// Proposed leaf id
    pub id: String,

    /// Proposed confidence
    pub confidence: f64,
}

impl CandidateSuggestion {
    /// Create a new candidate
    pub fn new(id: impl Into<String>, confidence: f64) -> Self {
        Self {
            id: id.into(),
            confidence,
        }
    }
}

/// Validate and enrich candidates against the authoritative leaf set
///
/// Candidate order is preserved; the result holds at most
/// [`MAX_SUGGESTIONS`] entries. A repeated id keeps its first occurrence.
pub fn validate<I>(candidates: I, leaves: &[LeafCategory]) -> Vec<CategorySuggestion>
where
    I: IntoIterator<Item = CandidateSuggestion>,
{
    let by_id: HashMap<&str, &LeafCategory> =
        leaves.iter().map(|leaf| (leaf.id.as_str(), leaf)).collect();
    let mut seen: HashSet<String> = HashSet::new();
    let mut accepted = Vec::new();
    let mut dropped = 0usize;

    for candidate in candidates {
        if accepted.len() == MAX_SUGGESTIONS {
            break;
        }

        let Some(leaf) = by_id.get(candidate.id.as_str()) else {
            debug!("Dropping candidate with unknown leaf id '{}'", candidate.id);
            dropped += 1;
            continue;
        };

        if !is_valid_confidence(candidate.confidence) {
            debug!(
                "Dropping candidate '{}' with out-of-range confidence {}",
                candidate.id, candidate.confidence
            );
            dropped += 1;
            continue;
        }

        if !seen.insert(candidate.id.clone()) {
            dropped += 1;
            continue;
        }

        accepted.push(CategorySuggestion::from_leaf(leaf, candidate.confidence));
    }

    if dropped > 0 {
        metrics::counter!("taxon_dropped_candidates_total").increment(dropped as u64);
    }

    accepted
}

fn is_valid_confidence(confidence: f64) -> bool {
    confidence.is_finite() && (0.0..=1.0).contains(&confidence)
}
