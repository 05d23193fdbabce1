//! Tool selection.

use crate::element::ShapeKind;
use serde::{Deserialize, Serialize};

/// The active canvas tool. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    #[default]
    Select,
    Hand,
    Pen,
    Eraser,
    Line,
    Arrow,
    Rect,
    Ellipse,
    Diamond,
    Text,
}

impl ToolKind {
    pub const ALL: [ToolKind; 10] = [
        ToolKind::Select,
        ToolKind::Hand,
        ToolKind::Pen,
        ToolKind::Eraser,
        ToolKind::Line,
        ToolKind::Arrow,
        ToolKind::Rect,
        ToolKind::Ellipse,
        ToolKind::Diamond,
        ToolKind::Text,
    ];

    /// Map a single-key shortcut to a tool. Case-insensitive.
    pub fn from_shortcut(key: &str) -> Option<Self> {
        match key.to_ascii_lowercase().as_str() {
            "v" | "1" => Some(ToolKind::Select),
            "h" => Some(ToolKind::Hand),
            "p" => Some(ToolKind::Pen),
            "e" => Some(ToolKind::Eraser),
            "t" => Some(ToolKind::Text),
            "r" => Some(ToolKind::Rect),
            "o" => Some(ToolKind::Ellipse),
            "d" => Some(ToolKind::Diamond),
            "l" => Some(ToolKind::Line),
            "a" => Some(ToolKind::Arrow),
            _ => None,
        }
    }

    /// The shape this tool draws, if it is a shape tool.
    pub fn shape_kind(self) -> Option<ShapeKind> {
        match self {
            ToolKind::Line => Some(ShapeKind::Line),
            ToolKind::Arrow => Some(ShapeKind::Arrow),
            ToolKind::Rect => Some(ShapeKind::Rect),
            ToolKind::Ellipse => Some(ShapeKind::Ellipse),
            ToolKind::Diamond => Some(ShapeKind::Diamond),
            _ => None,
        }
    }

    /// Pen and the shape tools start a draft on pointer down.
    pub fn is_drawing_tool(self) -> bool {
        self == ToolKind::Pen || self.shape_kind().is_some()
    }
}
