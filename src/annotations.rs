//! Annotation requests handed to the engine's annotation layer.
//!
//! # Supported Annotation Types
//!
//! - Text highlight (one or more quads on a page, stroke color, opacity)
//! - Rectangle (a single box, used as the document-loaded marker)

use crate::geometry::{bounding_rect_of, Quad, Rect};
use crate::search::TermId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier assigned by the annotation layer when an annotation is added.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnnotationId(pub u64);

impl fmt::Display for AnnotationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// RGBA color as the annotation layer takes it.
///
/// Channels are 0–255; alpha is 0.0–1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnnotationColor {
    /// Red channel
    pub r: u8,
    /// Green channel
    pub g: u8,
    /// Blue channel
    pub b: u8,
    /// Alpha (0.0 = transparent, 1.0 = opaque)
    pub a: f32,
}

impl AnnotationColor {
    /// Create an opaque color.
    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }
}

impl Default for AnnotationColor {
    fn default() -> Self {
        // Yellow, the usual highlight color
        Self::rgb(255, 255, 0)
    }
}

/// A text highlight covering one search match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighlightAnnotation {
    /// 1-based page number
    pub page_number: u32,
    /// Quads covering the highlighted text
    pub quads: Vec<Quad>,
    /// Stroke color
    pub stroke_color: AnnotationColor,
    /// Opacity (0.0 = transparent, 1.0 = opaque)
    pub opacity: f32,
    /// Author/creator of the annotation
    pub author: Option<String>,
    /// Term whose match this highlight renders
    pub term_id: Option<TermId>,
}

impl HighlightAnnotation {
    /// Create a highlight annotation.
    pub fn new(page_number: u32, quads: Vec<Quad>, stroke_color: AnnotationColor) -> Self {
        Self {
            page_number,
            quads,
            stroke_color,
            opacity: 1.0,
            author: None,
            term_id: None,
        }
    }

    /// Set the opacity (0.0 = transparent, 1.0 = opaque).
    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity.clamp(0.0, 1.0);
        self
    }

    /// Set the author.
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    /// Tag the highlight with the term that produced it.
    pub fn with_term_id(mut self, term_id: TermId) -> Self {
        self.term_id = Some(term_id);
        self
    }

    /// Bounding rectangle derived from the quads.
    pub fn rect(&self) -> Option<Rect> {
        bounding_rect_of(&self.quads)
    }
}

/// A rectangle shape annotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RectangleAnnotation {
    /// 1-based page number
    pub page_number: u32,
    /// Rectangle in page coordinates
    pub rect: Rect,
    /// Stroke color
    pub stroke_color: AnnotationColor,
    /// Author/creator of the annotation
    pub author: Option<String>,
}

impl RectangleAnnotation {
    /// Create a rectangle annotation with a red stroke.
    pub fn new(page_number: u32, rect: Rect) -> Self {
        Self {
            page_number,
            rect,
            stroke_color: AnnotationColor::rgb(255, 0, 0),
            author: None,
        }
    }

    /// Set the author.
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }
}

/// Any annotation the layer can hold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Annotation {
    /// Text highlight
    Highlight(HighlightAnnotation),
    /// Rectangle
    Rectangle(RectangleAnnotation),
}

impl Annotation {
    /// Page the annotation lives on.
    pub fn page_number(&self) -> u32 {
        match self {
            Self::Highlight(h) => h.page_number,
            Self::Rectangle(r) => r.page_number,
        }
    }

    /// Area the annotation covers on its page. `None` for a highlight
    /// without quads.
    pub fn rect(&self) -> Option<Rect> {
        match self {
            Self::Highlight(h) => h.rect(),
            Self::Rectangle(r) => Some(r.rect),
        }
    }

    /// Author, if set.
    pub fn author(&self) -> Option<&str> {
        match self {
            Self::Highlight(h) => h.author.as_deref(),
            Self::Rectangle(r) => r.author.as_deref(),
        }
    }

    /// The highlight payload, if this is a highlight.
    pub fn as_highlight(&self) -> Option<&HighlightAnnotation> {
        match self {
            Self::Highlight(h) => Some(h),
            Self::Rectangle(_) => None,
        }
    }
}

impl From<HighlightAnnotation> for Annotation {
    fn from(annotation: HighlightAnnotation) -> Self {
        Self::Highlight(annotation)
    }
}

impl From<RectangleAnnotation> for Annotation {
    fn from(annotation: RectangleAnnotation) -> Self {
        Self::Rectangle(annotation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_highlight_builder() {
        let quad = Quad::from_rect(&Rect::new(72.0, 720.0, 100.0, 12.0));
        let highlight = HighlightAnnotation::new(1, vec![quad], AnnotationColor::rgb(255, 0, 0))
            .with_opacity(1.5)
            .with_author("Guest")
            .with_term_id(TermId::from("1"));

        assert_eq!(highlight.opacity, 1.0);
        assert_eq!(highlight.author.as_deref(), Some("Guest"));
        assert_eq!(highlight.term_id, Some(TermId::from("1")));
        assert_eq!(highlight.rect(), Some(Rect::new(72.0, 720.0, 100.0, 12.0)));
    }

    #[test]
    fn test_default_color_is_opaque_yellow() {
        assert_eq!(AnnotationColor::default(), AnnotationColor::rgb(255, 255, 0));
        assert_eq!(AnnotationColor::default().a, 1.0);
    }

    #[test]
    fn test_annotation_accessors() {
        let rect = RectangleAnnotation::new(2, Rect::new(100.0, 150.0, 200.0, 50.0))
            .with_author("Guest");
        let annotation = Annotation::from(rect);

        assert_eq!(annotation.page_number(), 2);
        assert_eq!(annotation.rect(), Some(Rect::new(100.0, 150.0, 200.0, 50.0)));
        assert_eq!(annotation.author(), Some("Guest"));
        assert!(annotation.as_highlight().is_none());
    }

    #[test]
    fn test_annotation_serializes_with_tag() {
        let highlight = HighlightAnnotation::new(1, vec![], AnnotationColor::rgb(0, 255, 0));
        let annotation = Annotation::from(highlight);
        assert!(annotation.rect().is_none());

        let json = serde_json::to_value(annotation).unwrap();
        assert_eq!(json["type"], "highlight");
        assert_eq!(json["page_number"], 1);
    }
}
