//! Engine-native match geometry and its normalization into canonical quads.

use crate::geometry::{Quad, Rect};
use serde::{Deserialize, Serialize};

/// One quadrilateral as the document engine reports it.
///
/// The engine lists corners clockwise starting at the top-left:
/// `(x1, y1)` top-left, `(x2, y2)` top-right, `(x3, y3)` bottom-right,
/// `(x4, y4)` bottom-left.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RawQuad {
    /// Top-left x
    pub x1: f64,
    /// Top-left y
    pub y1: f64,
    /// Top-right x
    pub x2: f64,
    /// Top-right y
    pub y2: f64,
    /// Bottom-right x
    pub x3: f64,
    /// Bottom-right y
    pub y3: f64,
    /// Bottom-left x
    pub x4: f64,
    /// Bottom-left y
    pub y4: f64,
}

impl RawQuad {
    /// Engine-native record for an axis-aligned rectangle.
    pub fn from_rect(rect: &Rect) -> Self {
        Self {
            x1: rect.left(),
            y1: rect.top(),
            x2: rect.right(),
            y2: rect.top(),
            x3: rect.right(),
            y3: rect.bottom(),
            x4: rect.left(),
            y4: rect.bottom(),
        }
    }

    /// True if all eight coordinates are finite numbers.
    pub fn is_finite(&self) -> bool {
        [self.x1, self.y1, self.x2, self.y2, self.x3, self.y3, self.x4, self.y4]
            .iter()
            .all(|v| v.is_finite())
    }
}

/// Convert one engine-native quad into canonical corner order.
///
/// Every output coordinate is taken from exactly one input coordinate; no
/// field falls through from a default or a previous call. Degenerate input
/// yields a degenerate (zero-area) quad.
///
/// # Examples
///
/// ```
/// use highlight_oxide::geometry::{Quad, Rect};
/// use highlight_oxide::search::{normalize, RawQuad};
///
/// let rect = Rect::new(72.0, 100.0, 40.0, 12.0);
/// assert_eq!(normalize(&RawQuad::from_rect(&rect)), Quad::from_rect(&rect));
/// ```
pub fn normalize(raw: &RawQuad) -> Quad {
    Quad {
        // bottom-left
        x1: raw.x4,
        y1: raw.y4,
        // bottom-right
        x2: raw.x3,
        y2: raw.y3,
        // top-right
        x3: raw.x2,
        y3: raw.y2,
        // top-left
        x4: raw.x1,
        y4: raw.y1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_maps_every_corner() {
        let raw = RawQuad {
            x1: 1.0,
            y1: 2.0,
            x2: 3.0,
            y2: 4.0,
            x3: 5.0,
            y3: 6.0,
            x4: 7.0,
            y4: 8.0,
        };
        let quad = normalize(&raw);
        assert_eq!(quad.to_array(), [7.0, 8.0, 5.0, 6.0, 3.0, 4.0, 1.0, 2.0]);
    }

    #[test]
    fn test_normalize_rect_matches_canonical_rect() {
        let rect = Rect::new(100.0, 150.0, 200.0, 50.0);
        let quad = normalize(&RawQuad::from_rect(&rect));
        assert_eq!(quad, Quad::from_rect(&rect));
        assert_eq!(quad.bounding_rect(), rect);
    }

    #[test]
    fn test_normalize_degenerate() {
        let quad = normalize(&RawQuad::default());
        assert_eq!(quad, Quad::default());
        assert_eq!(quad.bounding_rect(), Rect::default());
    }

    #[test]
    fn test_raw_quad_finiteness() {
        assert!(RawQuad::default().is_finite());
        let raw = RawQuad {
            x3: f64::INFINITY,
            ..RawQuad::default()
        };
        assert!(!raw.is_finite());
    }
}
