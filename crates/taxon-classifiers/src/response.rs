//! Model response extraction
//!
//! The model is asked for a bare JSON array but frequently wraps it in a
//! markdown fence or surrounds it with prose. The widest `[...]` span is
//! parsed; when there is none, the whole trimmed text is tried instead.
//! Array elements that do not look like `{id, confidence}` are skipped.
//! Validation against the leaf set happens later.

use crate::validator::CandidateSuggestion;
use serde::Deserialize;
use taxon_core::{Error, Result};
use tracing::debug;

#[derive(Debug, Deserialize)]
struct RawCandidate {
    id: RawId,
    confidence: f64,
}

/// Models sometimes emit numeric ids unquoted
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(serde_json::Number),
}

impl RawId {
    fn into_string(self) -> String {
        match self {
            Self::Text(text) => text,
            Self::Number(number) => number.to_string(),
        }
    }
}

/// Locate the bracketed span in raw model output
///
/// Returns the slice from the first `[` to the last `]` that follows it,
/// or the trimmed input when no such span exists.
pub fn extract_json_span(raw: &str) -> &str {
    if let Some(start) = raw.find('[') {
        if let Some(end) = raw.rfind(']') {
            if end > start {
                return &raw[start..=end];
            }
        }
    }
    raw.trim()
}

/// Parse raw model output into unvalidated candidates
pub fn parse_candidates(raw: &str) -> Result<Vec<CandidateSuggestion>> {
    let span = extract_json_span(raw);
    let value: serde_json::Value = serde_json::from_str(span)
        .map_err(|e| Error::parse(format!("Model output is not valid JSON: {}", e)))?;

    let serde_json::Value::Array(entries) = value else {
        return Err(Error::parse("Model output is not a JSON array"));
    };

    let candidates = entries
        .into_iter()
        .filter_map(|entry| match serde_json::from_value::<RawCandidate>(entry) {
            Ok(raw) => Some(CandidateSuggestion::new(raw.id.into_string(), raw.confidence)),
            Err(e) => {
                debug!("Skipping malformed model entry: {}", e);
                None
            }
        })
        .collect();

    Ok(candidates)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_array() {
        let candidates = parse_candidates(r#"[{"id":"B","confidence":0.9}]"#).unwrap();
        assert_eq!(candidates, vec![CandidateSuggestion::new("B", 0.9)]);
    }

    #[test]
    fn test_fenced_array_with_prose() {
        let raw = "Here you go:\n```json\n[\n  {\"id\": \"B\", \"confidence\": 0.8},\n  {\"id\": \"C\", \"confidence\": 0.4}\n]\n```\nHope this helps.";
        let candidates = parse_candidates(raw).unwrap();
        assert_eq!(
            candidates,
            vec![
                CandidateSuggestion::new("B", 0.8),
                CandidateSuggestion::new("C", 0.4)
            ]
        );
    }

    #[test]
    fn test_numeric_ids_become_strings() {
        let candidates = parse_candidates(r#"[{"id": 17, "confidence": 0.5}]"#).unwrap();
        assert_eq!(candidates[0].id, "17");
    }

    #[test]
    fn test_malformed_entries_are_skipped() {
        let raw = r#"[{"id":"B","confidence":0.9}, {"id":"C"}, "junk", {"id":"D","confidence":"high"}, {"id":"E","confidence":0.2}]"#;
        let ids: Vec<_> = parse_candidates(raw)
            .unwrap()
            .into_iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(ids, vec!["B", "E"]);
    }

    #[test]
    fn test_empty_array() {
        assert!(parse_candidates("[]").unwrap().is_empty());
    }

    #[test]
    fn test_prose_only_is_an_error() {
        let err = parse_candidates("I think it's electrical work.").unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }

    #[test]
    fn test_non_array_json_is_an_error() {
        let err = parse_candidates(r#"{"id":"B","confidence":0.9}"#).unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }

    #[test]
    fn test_truncated_array_is_an_error() {
        let err = parse_candidates(r#"[{"id":"B","confidence":0.9"#).unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }

    #[test]
    fn test_extract_span() {
        assert_eq!(extract_json_span("x [1, [2]] y"), "[1, [2]]");
        assert_eq!(extract_json_span("  ] nothing [  "), "] nothing [");
        assert_eq!(extract_json_span("  {} "), "{}");
    }
}
