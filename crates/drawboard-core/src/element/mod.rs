//! Drawing element definitions for the whiteboard.
//!
//! Elements are plain data. The serialized form is an internally tagged JSON
//! object (`{"type": "rect", "id": ..., "x1": ...}`) so the shared store can
//! hold elements written by any client that speaks the same layout.

mod pen;
mod shape;
mod text;

pub use pen::{PenElement, StrokePoint};
pub use shape::{ShapeElement, ShapeKind};
pub use text::TextElement;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for elements.
pub type ElementId = Uuid;

/// Smallest stroke thickness an element may carry.
pub const MIN_THICKNESS: f64 = 0.1;

pub(crate) fn sanitize_thickness(thickness: f64) -> f64 {
    if thickness.is_finite() {
        thickness.max(MIN_THICKNESS)
    } else {
        MIN_THICKNESS
    }
}

/// Discriminant of a [`DrawingElement`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Line,
    Arrow,
    Rect,
    Ellipse,
    Diamond,
    Pen,
    Text,
}

/// Any element that can live on the board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum DrawingElement {
    Line(ShapeElement),
    Arrow(ShapeElement),
    Rect(ShapeElement),
    Ellipse(ShapeElement),
    Diamond(ShapeElement),
    Pen(PenElement),
    Text(TextElement),
}

impl DrawingElement {
    /// Wrap a shape body in the variant for `kind`.
    pub fn from_shape(kind: ShapeKind, shape: ShapeElement) -> Self {
        match kind {
            ShapeKind::Line => DrawingElement::Line(shape),
            ShapeKind::Arrow => DrawingElement::Arrow(shape),
            ShapeKind::Rect => DrawingElement::Rect(shape),
            ShapeKind::Ellipse => DrawingElement::Ellipse(shape),
            ShapeKind::Diamond => DrawingElement::Diamond(shape),
        }
    }

    pub fn id(&self) -> ElementId {
        match self {
            DrawingElement::Line(s)
            | DrawingElement::Arrow(s)
            | DrawingElement::Rect(s)
            | DrawingElement::Ellipse(s)
            | DrawingElement::Diamond(s) => s.id,
            DrawingElement::Pen(p) => p.id,
            DrawingElement::Text(t) => t.id,
        }
    }

    pub fn kind(&self) -> ElementKind {
        match self {
            DrawingElement::Line(_) => ElementKind::Line,
            DrawingElement::Arrow(_) => ElementKind::Arrow,
            DrawingElement::Rect(_) => ElementKind::Rect,
            DrawingElement::Ellipse(_) => ElementKind::Ellipse,
            DrawingElement::Diamond(_) => ElementKind::Diamond,
            DrawingElement::Pen(_) => ElementKind::Pen,
            DrawingElement::Text(_) => ElementKind::Text,
        }
    }

    /// Stroke (ink) color as stored.
    pub fn color(&self) -> &str {
        match self {
            DrawingElement::Line(s)
            | DrawingElement::Arrow(s)
            | DrawingElement::Rect(s)
            | DrawingElement::Ellipse(s)
            | DrawingElement::Diamond(s) => &s.color,
            DrawingElement::Pen(p) => &p.color,
            DrawingElement::Text(t) => &t.color,
        }
    }

    pub fn thickness(&self) -> f64 {
        match self {
            DrawingElement::Line(s)
            | DrawingElement::Arrow(s)
            | DrawingElement::Rect(s)
            | DrawingElement::Ellipse(s)
            | DrawingElement::Diamond(s) => s.thickness,
            DrawingElement::Pen(p) => p.thickness,
            DrawingElement::Text(t) => t.thickness,
        }
    }

    /// Shape kind and body for line/arrow/rect/ellipse/diamond.
    pub fn as_shape(&self) -> Option<(ShapeKind, &ShapeElement)> {
        match self {
            DrawingElement::Line(s) => Some((ShapeKind::Line, s)),
            DrawingElement::Arrow(s) => Some((ShapeKind::Arrow, s)),
            DrawingElement::Rect(s) => Some((ShapeKind::Rect, s)),
            DrawingElement::Ellipse(s) => Some((ShapeKind::Ellipse, s)),
            DrawingElement::Diamond(s) => Some((ShapeKind::Diamond, s)),
            DrawingElement::Pen(_) | DrawingElement::Text(_) => None,
        }
    }

    pub fn as_shape_mut(&mut self) -> Option<&mut ShapeElement> {
        match self {
            DrawingElement::Line(s)
            | DrawingElement::Arrow(s)
            | DrawingElement::Rect(s)
            | DrawingElement::Ellipse(s)
            | DrawingElement::Diamond(s) => Some(s),
            DrawingElement::Pen(_) | DrawingElement::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&TextElement> {
        match self {
            DrawingElement::Text(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_pen(&self) -> Option<&PenElement> {
        match self {
            DrawingElement::Pen(p) => Some(p),
            _ => None,
        }
    }

    /// Rect, ellipse and diamond accept a fill color.
    pub fn is_fillable(&self) -> bool {
        matches!(
            self,
            DrawingElement::Rect(_) | DrawingElement::Ellipse(_) | DrawingElement::Diamond(_)
        )
    }

    /// Line and arrow, whose geometry is the segment itself.
    pub fn is_segment(&self) -> bool {
        matches!(self, DrawingElement::Line(_) | DrawingElement::Arrow(_))
    }
}
