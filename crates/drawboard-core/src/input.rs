//! Input events delivered by the host to the board.

use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Device that produced a pointer event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerKind {
    #[default]
    Mouse,
    Pen,
    Touch,
}

/// A pointer sample in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerInput {
    /// Host pointer id; a gesture only follows the pointer that started it.
    pub pointer_id: u32,
    /// Position relative to the canvas origin, in screen pixels.
    pub position: Point,
    /// Device pressure; zero when the device does not report any.
    pub pressure: f64,
    pub kind: PointerKind,
    /// Event timestamp in milliseconds.
    pub timestamp_ms: f64,
}

impl PointerInput {
    /// A mouse sample with no pressure.
    pub fn mouse(pointer_id: u32, position: Point, timestamp_ms: f64) -> Self {
        Self {
            pointer_id,
            position,
            pressure: 0.0,
            kind: PointerKind::Mouse,
            timestamp_ms,
        }
    }

    pub fn pen(pointer_id: u32, position: Point, pressure: f64, timestamp_ms: f64) -> Self {
        Self {
            pointer_id,
            position,
            pressure,
            kind: PointerKind::Pen,
            timestamp_ms,
        }
    }
}

/// Where keyboard focus sits when a key event arrives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyFocus {
    #[default]
    Canvas,
    /// An input, textarea or contenteditable element has focus.
    TextInput,
}

/// Keys the text editor overlay forwards to the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextEditorKey {
    Enter { shift: bool },
    Escape,
}

/// What the host should do with pointer capture after an event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PointerResponse {
    pub capture: Option<u32>,
    pub release: Option<u32>,
}

impl PointerResponse {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn capture(pointer_id: u32) -> Self {
        Self {
            capture: Some(pointer_id),
            release: None,
        }
    }

    pub fn release(pointer_id: u32) -> Self {
        Self {
            capture: None,
            release: Some(pointer_id),
        }
    }
}
