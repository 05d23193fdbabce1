//! Geometry kernel: distances, rectangle normalization, bounds and axis remapping.
//!
//! Everything here works in world space and never fails: degenerate inputs
//! (zero-length segments, zero-size boxes, empty strokes) fall back to a safe
//! answer instead of producing NaN.

use crate::element::DrawingElement;
use kurbo::{Point, Rect, Vec2};

/// Below this extent an axis is treated as collapsed when remapping.
pub const AXIS_EPSILON: f64 = 1e-5;

/// Euclidean distance between two points.
pub fn distance(a: Point, b: Point) -> f64 {
    (a.x - b.x).hypot(a.y - b.y)
}

/// Distance from a point to the segment `a -> b`.
///
/// The projection parameter is clamped to `[0, 1]`; a zero-length segment
/// degenerates to the point distance.
pub fn distance_to_segment(point: Point, a: Point, b: Point) -> f64 {
    let seg = Vec2::new(b.x - a.x, b.y - a.y);
    let pv = Vec2::new(point.x - a.x, point.y - a.y);
    let len_sq = seg.hypot2();
    if len_sq == 0.0 {
        return distance(point, a);
    }
    let t = (pv.dot(seg) / len_sq).clamp(0.0, 1.0);
    let proj = Point::new(a.x + t * seg.x, a.y + t * seg.y);
    distance(point, proj)
}

/// Normalize two corners into a rectangle with `x0 <= x1` and `y0 <= y1`.
///
/// The result only depends on the unordered pairs `{x1, x2}` and `{y1, y2}`.
pub fn normalize_rect(x1: f64, y1: f64, x2: f64, y2: f64) -> Rect {
    Rect::new(x1.min(x2), y1.min(y2), x1.max(x2), y1.max(y2))
}

/// Axis-aligned bounds of an element in world space.
///
/// Pen strokes use the min/max over their samples and return `None` when the
/// stroke has no samples yet. Box and segment elements return the normalized
/// rectangle of their two corners.
pub fn element_bounds(element: &DrawingElement) -> Option<Rect> {
    match element {
        DrawingElement::Pen(pen) => {
            let first = pen.points.first()?;
            let mut bounds = Rect::new(first.x, first.y, first.x, first.y);
            for point in &pen.points[1..] {
                bounds.x0 = bounds.x0.min(point.x);
                bounds.y0 = bounds.y0.min(point.y);
                bounds.x1 = bounds.x1.max(point.x);
                bounds.y1 = bounds.y1.max(point.y);
            }
            Some(bounds)
        }
        DrawingElement::Text(text) => Some(normalize_rect(text.x1, text.y1, text.x2, text.y2)),
        DrawingElement::Line(shape)
        | DrawingElement::Arrow(shape)
        | DrawingElement::Rect(shape)
        | DrawingElement::Ellipse(shape)
        | DrawingElement::Diamond(shape) => {
            Some(normalize_rect(shape.x1, shape.y1, shape.x2, shape.y2))
        }
    }
}

/// Linearly rescale `value` from `[from_start, from_end]` to `[to_start, to_end]`.
///
/// When the source interval is narrower than [`AXIS_EPSILON`] the mapping
/// becomes a pure translation by `to_start - from_start`.
pub fn map_axis_coordinate(
    value: f64,
    from_start: f64,
    from_end: f64,
    to_start: f64,
    to_end: f64,
) -> f64 {
    let from_size = from_end - from_start;
    if from_size.abs() < AXIS_EPSILON {
        return value + (to_start - from_start);
    }
    let ratio = (value - from_start) / from_size;
    to_start + ratio * (to_end - to_start)
}

/// Remap every coordinate of an element from one bounding box to another.
///
/// `to` is taken verbatim (x0 is the image of `from.x0`, and so on), so an
/// inverted target box mirrors the element instead of being re-normalized.
pub fn scale_element_to_bounds(element: &DrawingElement, from: Rect, to: Rect) -> DrawingElement {
    let map_x = |v: f64| map_axis_coordinate(v, from.x0, from.x1, to.x0, to.x1);
    let map_y = |v: f64| map_axis_coordinate(v, from.y0, from.y1, to.y0, to.y1);

    let mut scaled = element.clone();
    match &mut scaled {
        DrawingElement::Pen(pen) => {
            for point in &mut pen.points {
                point.x = map_x(point.x);
                point.y = map_y(point.y);
            }
        }
        DrawingElement::Text(text) => {
            text.x1 = map_x(text.x1);
            text.y1 = map_y(text.y1);
            text.x2 = map_x(text.x2);
            text.y2 = map_y(text.y2);
        }
        DrawingElement::Line(shape)
        | DrawingElement::Arrow(shape)
        | DrawingElement::Rect(shape)
        | DrawingElement::Ellipse(shape)
        | DrawingElement::Diamond(shape) => {
            shape.x1 = map_x(shape.x1);
            shape.y1 = map_y(shape.y1);
            shape.x2 = map_x(shape.x2);
            shape.y2 = map_y(shape.y2);
        }
    }
    scaled
}

/// Midpoint of two points.
pub fn midpoint(a: Point, b: Point) -> Point {
    Point::new((a.x + b.x) * 0.5, (a.y + b.y) * 0.5)
}
