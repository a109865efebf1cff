//! Geometric primitives in page coordinates.
//!
//! Page coordinates put (0, 0) at the top-left corner of the page, with y
//! growing downwards. All values are `f64` to match the precision the
//! document engine reports match geometry in.

use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle in page space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    /// X coordinate of top-left corner
    pub x: f64,
    /// Y coordinate of top-left corner
    pub y: f64,
    /// Width of rectangle
    pub width: f64,
    /// Height of rectangle
    pub height: f64,
}

impl Rect {
    /// Create a new rectangle from position and dimensions.
    ///
    /// # Examples
    ///
    /// ```
    /// use highlight_oxide::geometry::Rect;
    ///
    /// let rect = Rect::new(100.0, 150.0, 200.0, 50.0);
    /// assert_eq!(rect.right(), 300.0);
    /// assert_eq!(rect.bottom(), 200.0);
    /// ```
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a rectangle from two corner points.
    pub fn from_points(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self {
            x: x0,
            y: y0,
            width: x1 - x0,
            height: y1 - y0,
        }
    }

    /// Get the left edge x-coordinate.
    pub fn left(&self) -> f64 {
        self.x
    }

    /// Get the right edge x-coordinate.
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Get the top edge y-coordinate.
    pub fn top(&self) -> f64 {
        self.y
    }

    /// Get the bottom edge y-coordinate.
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Compute the union of this rectangle with another.
    ///
    /// Returns the smallest rectangle that contains both rectangles.
    pub fn union(&self, other: &Rect) -> Rect {
        let x0 = self.left().min(other.left());
        let y0 = self.top().min(other.top());
        let x1 = self.right().max(other.right());
        let y1 = self.bottom().max(other.bottom());
        Rect::from_points(x0, y0, x1, y1)
    }
}

/// Canonical four-corner polygon describing a highlighted region.
///
/// Corners run counter-clockwise (as drawn on screen) starting at the
/// bottom-left: `(x1, y1)` bottom-left, `(x2, y2)` bottom-right,
/// `(x3, y3)` top-right, `(x4, y4)` top-left. This is the order the
/// annotation layer expects for text highlight quads.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Quad {
    /// Bottom-left x
    pub x1: f64,
    /// Bottom-left y
    pub y1: f64,
    /// Bottom-right x
    pub x2: f64,
    /// Bottom-right y
    pub y2: f64,
    /// Top-right x
    pub x3: f64,
    /// Top-right y
    pub y3: f64,
    /// Top-left x
    pub x4: f64,
    /// Top-left y
    pub y4: f64,
}

impl Quad {
    /// Create a quad covering a rectangle.
    ///
    /// # Examples
    ///
    /// ```
    /// use highlight_oxide::geometry::{Quad, Rect};
    ///
    /// let quad = Quad::from_rect(&Rect::new(10.0, 20.0, 30.0, 5.0));
    /// assert_eq!((quad.x1, quad.y1), (10.0, 25.0));
    /// assert_eq!((quad.x3, quad.y3), (40.0, 20.0));
    /// ```
    pub fn from_rect(rect: &Rect) -> Self {
        Self {
            x1: rect.left(),
            y1: rect.bottom(),
            x2: rect.right(),
            y2: rect.bottom(),
            x3: rect.right(),
            y3: rect.top(),
            x4: rect.left(),
            y4: rect.top(),
        }
    }

    /// Flatten to `[x1, y1, x2, y2, x3, y3, x4, y4]`.
    pub fn to_array(&self) -> [f64; 8] {
        [self.x1, self.y1, self.x2, self.y2, self.x3, self.y3, self.x4, self.y4]
    }

    /// Get the bounding rectangle of the quad.
    pub fn bounding_rect(&self) -> Rect {
        let min_x = self.x1.min(self.x2).min(self.x3).min(self.x4);
        let max_x = self.x1.max(self.x2).max(self.x3).max(self.x4);
        let min_y = self.y1.min(self.y2).min(self.y3).min(self.y4);
        let max_y = self.y1.max(self.y2).max(self.y3).max(self.y4);

        Rect::from_points(min_x, min_y, max_x, max_y)
    }

    /// True if all eight coordinates are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.to_array().iter().all(|v| v.is_finite())
    }
}

/// Bounding rectangle of a set of quads, `None` when the set is empty.
pub fn bounding_rect_of(quads: &[Quad]) -> Option<Rect> {
    quads
        .iter()
        .map(Quad::bounding_rect)
        .reduce(|acc, r| acc.union(&r))
}
