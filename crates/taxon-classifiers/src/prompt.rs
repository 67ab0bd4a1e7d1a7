//! Prompt construction for model-assisted classification

use std::fmt::Write;
use taxon_core::{LeafCategory, SuggestionRequest};

/// Fewest suggestions the model is asked for
pub const MIN_REQUESTED: usize = 3;

/// Most suggestions the model is asked for
pub const MAX_REQUESTED: usize = 5;

/// Build the classification prompt
///
/// Every leaf is listed as `<path> (ID: <id>)`, followed by the request
/// text and the output contract: a bare JSON array of `{id, confidence}`
/// objects, best match first.
pub fn build_prompt(request: &SuggestionRequest, leaves: &[LeafCategory]) -> String {
    let mut catalog = String::new();
    for leaf in leaves {
        // Writing into a String cannot fail
        let _ = writeln!(catalog, "- {} (ID: {})", leaf.path, leaf.id);
    }

    format!(
        r#"You classify service requests for a services marketplace.

Choose the categories below that best match the request. Only the listed categories may be used.

CATEGORIES:
{catalog}
REQUEST TITLE: {title}
REQUEST DESCRIPTION: {description}

Respond with a JSON array of {min} to {max} objects, ordered from most to least relevant:
[{{"id": "<category ID>", "confidence": <number between 0 and 1>}}]

Rules:
- "id" must be copied exactly from an (ID: ...) in the list above.
- "confidence" is a number from 0 to 1.
- Output only the JSON array. No markdown, no explanation."#,
        catalog = catalog,
        title = request.title.trim(),
        description = request.description.trim(),
        min = MIN_REQUESTED,
        max = MAX_REQUESTED,
    )
}
