//! Core types for Taxon

use serde::{Deserialize, Serialize};

/// A category as stored by the caller: a flat record with a parent pointer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryNode {
    /// Opaque identifier
    pub id: String,

    /// Display name
    pub name: String,

    /// Parent category, `None` for roots
    #[serde(default, alias = "parent_id")]
    pub parent_id: Option<String>,
}

impl CategoryNode {
    /// Create a root category
    pub fn root(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            parent_id: None,
        }
    }

    /// Create a category under `parent_id`
    pub fn child(
        id: impl Into<String>,
        name: impl Into<String>,
        parent_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            parent_id: Some(parent_id.into()),
        }
    }
}

/// A category with no children in the current snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeafCategory {
    /// Identifier of the underlying node
    pub id: String,

    /// Display name of the underlying node
    pub name: String,

    /// Root-to-node path
    pub path: String,
}

/// A ranked, validated category suggestion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySuggestion {
    /// Leaf category id
    pub id: String,

    /// Leaf display name, always taken from the category snapshot
    pub name: String,

    /// Leaf path, always taken from the category snapshot
    pub path: String,

    /// Relevance in [0, 1]; a ranking signal, not a probability
    pub confidence: f64,
}

impl CategorySuggestion {
    /// Build a suggestion for `leaf` with the given confidence
    pub fn from_leaf(leaf: &LeafCategory, confidence: f64) -> Self {
        Self {
            id: leaf.id.clone(),
            name: leaf.name.clone(),
            path: leaf.path.clone(),
            confidence,
        }
    }
}

/// Free text describing a requested service
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestionRequest {
    /// Short title, e.g. the gig headline
    pub title: String,

    /// Longer description
    #[serde(default)]
    pub description: String,
}

impl SuggestionRequest {
    /// Create a new request
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
        }
    }

    /// Title and description joined by a single space
    pub fn text(&self) -> String {
        format!("{} {}", self.title, self.description)
    }
}
