//! Highlight definitions and their materialization into annotations.
//!
//! A [`HighlightDefinition`] says what to search for and which color to
//! paint matches in. Definitions are keyed by a caller-assigned
//! [`TermId`], which is also the key the search results are stored under.

mod materialize;

pub use materialize::{materialize, materialize_by_term, MaterializeOptions};

use crate::annotations::AnnotationColor;
use crate::error::{Error, Result};
use crate::search::TermId;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Highlight definitions keyed by term id.
pub type Definitions = IndexMap<TermId, HighlightDefinition>;

/// RGB triple, each channel 0–255.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    /// Red channel
    pub r: u8,
    /// Green channel
    pub g: u8,
    /// Blue channel
    pub b: u8,
}

impl Rgb {
    /// Create a color.
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Opaque annotation color with these channels.
    pub fn to_annotation_color(self) -> AnnotationColor {
        AnnotationColor::rgb(self.r, self.g, self.b)
    }
}

/// What to search for and how to paint it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighlightDefinition {
    /// Search term (non-empty)
    pub term: String,
    /// Highlight color
    pub color: Rgb,
    /// Treat the term as a regular expression
    #[serde(default)]
    pub use_regex: bool,
    /// Match letter case exactly
    #[serde(default)]
    pub case_sensitive: bool,
}

impl HighlightDefinition {
    /// Create a plain, case-insensitive definition.
    pub fn new(term: impl Into<String>, color: Rgb) -> Self {
        Self {
            term: term.into(),
            color,
            use_regex: false,
            case_sensitive: false,
        }
    }

    /// Treat the term as a regular expression.
    pub fn with_regex(mut self, value: bool) -> Self {
        self.use_regex = value;
        self
    }

    /// Set case sensitivity.
    pub fn with_case_sensitive(mut self, value: bool) -> Self {
        self.case_sensitive = value;
        self
    }

    /// Check the definition is searchable.
    pub fn validate(&self, term_id: &TermId) -> Result<()> {
        if self.term.is_empty() {
            return Err(Error::InvalidDefinition {
                term_id: term_id.to_string(),
                reason: "term is empty".to_string(),
            });
        }
        Ok(())
    }
}

#[derive(Deserialize)]
struct DefinitionRecord {
    id: TermId,
    #[serde(flatten)]
    definition: HighlightDefinition,
}

/// Parse an ordered definition list from JSON.
///
/// The input is an array of objects with an `id` field next to the
/// definition fields, e.g.
/// `[{"id": "1", "term": "im", "color": {"r": 255, "g": 0, "b": 0}}]`.
pub fn parse_definitions(json: &str) -> Result<Vec<(TermId, HighlightDefinition)>> {
    let records: Vec<DefinitionRecord> = serde_json::from_str(json)?;
    let terms: Vec<(TermId, HighlightDefinition)> =
        records.into_iter().map(|r| (r.id, r.definition)).collect();
    for (id, definition) in &terms {
        definition.validate(id)?;
    }
    Ok(terms)
}

/// Load an ordered definition list from a JSON file.
pub fn load_definitions(path: impl AsRef<Path>) -> Result<Vec<(TermId, HighlightDefinition)>> {
    let json = std::fs::read_to_string(path.as_ref())?;
    parse_definitions(&json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_definitions() {
        let json = r#"[
            {"id": "1", "term": "im", "color": {"r": 255, "g": 0, "b": 0}, "use_regex": true},
            {"id": "2", "term": "po", "color": {"r": 0, "g": 255, "b": 0}, "case_sensitive": true}
        ]"#;
        let terms = parse_definitions(json).unwrap();

        assert_eq!(terms.len(), 2);
        assert_eq!(terms[0].0, TermId::from("1"));
        assert!(terms[0].1.use_regex);
        assert!(!terms[0].1.case_sensitive);
        assert_eq!(terms[1].1.color, Rgb::new(0, 255, 0));
        assert!(terms[1].1.case_sensitive);
    }

    #[test]
    fn test_parse_rejects_empty_term() {
        let json = r#"[{"id": "1", "term": "", "color": {"r": 0, "g": 0, "b": 0}}]"#;
        let err = parse_definitions(json).unwrap_err();
        assert!(matches!(err, Error::InvalidDefinition { .. }));
    }

    #[test]
    fn test_parse_rejects_out_of_range_channel() {
        let json = r#"[{"id": "1", "term": "x", "color": {"r": 256, "g": 0, "b": 0}}]"#;
        assert!(matches!(parse_definitions(json), Err(Error::Json(_))));
    }

    #[test]
    fn test_rgb_to_annotation_color() {
        let color = Rgb::new(0, 255, 0).to_annotation_color();
        assert_eq!((color.r, color.g, color.b, color.a), (0, 255, 0, 1.0));
    }
}
