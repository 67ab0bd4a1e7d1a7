//! Taxon Core
//!
//! Core types, traits, and utilities shared across Taxon components.
//!
//! This crate provides:
//! - Category data types (flat nodes, derived leaves, ranked suggestions)
//! - Error types and result handling
//! - The tree indexer that derives paths and leaves from a flat parent-pointer list

pub mod error;
pub mod tree;
pub mod types;

pub use error::{Error, Result};
pub use tree::{CategoryIndex, PATH_SEPARATOR};
pub use types::{CategoryNode, CategorySuggestion, LeafCategory, SuggestionRequest};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::tree::CategoryIndex;
    pub use crate::types::{CategoryNode, CategorySuggestion, LeafCategory, SuggestionRequest};
}
