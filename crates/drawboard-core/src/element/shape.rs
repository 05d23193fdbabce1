//! Two-corner shapes: line, arrow, rectangle, ellipse and diamond.

use super::{ElementId, sanitize_thickness};
use crate::geometry::normalize_rect;
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use uuid::Uuid;

/// Which two-corner shape a [`ShapeElement`] body is drawn as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Line,
    Arrow,
    Rect,
    Ellipse,
    Diamond,
}

impl ShapeKind {
    /// Rect, ellipse and diamond can carry a fill.
    pub fn is_fillable(self) -> bool {
        matches!(self, ShapeKind::Rect | ShapeKind::Ellipse | ShapeKind::Diamond)
    }
}

/// Body shared by every two-corner shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeElement {
    pub id: ElementId,
    pub color: String,
    pub thickness: f64,
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    /// Fill color, only honored for fillable kinds.
    #[serde(default)]
    pub fill: Option<String>,
}

impl ShapeElement {
    /// Create a shape spanning `start` to `end`.
    pub fn new(color: impl Into<String>, thickness: f64, start: Point, end: Point) -> Self {
        Self {
            id: Uuid::new_v4(),
            color: color.into(),
            thickness: sanitize_thickness(thickness),
            x1: start.x,
            y1: start.y,
            x2: end.x,
            y2: end.y,
            fill: None,
        }
    }

    pub fn start(&self) -> Point {
        Point::new(self.x1, self.y1)
    }

    pub fn end(&self) -> Point {
        Point::new(self.x2, self.y2)
    }

    /// Normalized bounding rectangle of the two corners.
    pub fn rect(&self) -> Rect {
        normalize_rect(self.x1, self.y1, self.x2, self.y2)
    }

    /// Top, right, bottom and left vertices of the inscribed rhombus.
    pub fn diamond_vertices(&self) -> [Point; 4] {
        let rect = self.rect();
        let center = rect.center();
        [
            Point::new(center.x, rect.y0),
            Point::new(rect.x1, center.y),
            Point::new(center.x, rect.y1),
            Point::new(rect.x0, center.y),
        ]
    }

    /// The two barb endpoints of an arrow head at `end`.
    ///
    /// Barbs sit at ±π/7 from the shaft and are `max(10, 3.5 * thickness)` long.
    pub fn arrow_head(&self) -> (Point, Point) {
        let angle = (self.y2 - self.y1).atan2(self.x2 - self.x1);
        let head_length = (self.thickness * 3.5).max(10.0);
        let left = Point::new(
            self.x2 - head_length * (angle - PI / 7.0).cos(),
            self.y2 - head_length * (angle - PI / 7.0).sin(),
        );
        let right = Point::new(
            self.x2 - head_length * (angle + PI / 7.0).cos(),
            self.y2 - head_length * (angle + PI / 7.0).sin(),
        );
        (left, right)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::distance;

    #[test]
    fn test_shape_creation() {
        let shape = ShapeElement::new("#ef4444", 0.0, Point::new(10.0, 20.0), Point::new(0.0, 5.0));
        assert!(shape.thickness > 0.0);
        assert_eq!(shape.rect(), Rect::new(0.0, 5.0, 10.0, 20.0));
        assert!(shape.fill.is_none());
    }

    #[test]
    fn test_diamond_vertices() {
        let shape = ShapeElement::new("#000000", 2.0, Point::new(0.0, 0.0), Point::new(20.0, 10.0));
        let [top, right, bottom, left] = shape.diamond_vertices();
        assert_eq!(top, Point::new(10.0, 0.0));
        assert_eq!(right, Point::new(20.0, 5.0));
        assert_eq!(bottom, Point::new(10.0, 10.0));
        assert_eq!(left, Point::new(0.0, 5.0));
    }

    #[test]
    fn test_arrow_head_length_and_symmetry() {
        let shape = ShapeElement::new("#000000", 2.0, Point::new(0.0, 0.0), Point::new(100.0, 0.0));
        let (left, right) = shape.arrow_head();
        assert!((distance(left, shape.end()) - 10.0).abs() < 1e-9);
        assert!((distance(right, shape.end()) - 10.0).abs() < 1e-9);
        assert!((left.y + right.y).abs() < 1e-9);
        assert!(left.x < 100.0 && right.x < 100.0);

        let thick = ShapeElement::new("#000000", 6.0, Point::new(0.0, 0.0), Point::new(100.0, 0.0));
        let (left, _) = thick.arrow_head();
        assert!((distance(left, thick.end()) - 21.0).abs() < 1e-9);
    }
}
