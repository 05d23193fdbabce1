//! Boxed text elements.

use super::{ElementId, sanitize_thickness};
use crate::geometry::normalize_rect;
use kurbo::Rect;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A block of text placed in a box. The box is both the placement and the
/// size the renderer fits the lines into.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextElement {
    pub id: ElementId,
    pub color: String,
    /// Drives the default font size when the box is first estimated.
    pub thickness: f64,
    pub text: String,
    pub font_family: String,
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl TextElement {
    pub fn new(
        text: impl Into<String>,
        color: impl Into<String>,
        thickness: f64,
        font_family: impl Into<String>,
        bounds: Rect,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            color: color.into(),
            thickness: sanitize_thickness(thickness),
            text: text.into(),
            font_family: font_family.into(),
            x1: bounds.x0,
            y1: bounds.y0,
            x2: bounds.x1,
            y2: bounds.y1,
        }
    }

    pub fn rect(&self) -> Rect {
        normalize_rect(self.x1, self.y1, self.x2, self.y2)
    }

    /// Place the box with its top-left corner at `(x, y)`.
    pub fn set_box(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.x1 = x;
        self.y1 = y;
        self.x2 = x + width;
        self.y2 = y + height;
    }
}
