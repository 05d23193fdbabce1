//! Drawboard Core Library
//!
//! Platform-agnostic data model and interaction logic for the Drawboard
//! collaborative whiteboard.

pub mod board;
pub mod color;
pub mod config;
pub mod element;
pub mod geometry;
pub mod input;
pub mod resize;
pub mod store;
pub mod stroke;
pub mod text_layout;
pub mod tools;
pub mod viewport;

pub use board::{BoardView, Gesture, PointerState, StyleState, TextEditorOverlay, Whiteboard};
pub use config::{BoardConfig, ConfigError, FontOption};
pub use element::{DrawingElement, ElementId, ElementKind, PenElement, ShapeElement, ShapeKind, StrokePoint, TextElement};
pub use hit_test::{CursorHint, ResizeHandle};
pub use input::{KeyFocus, PointerInput, PointerKind, PointerResponse, TextEditorKey};
pub use store::{CrdtStore, DocumentAdapter, ElementMap, ElementStore, MemoryStore, StoreError};
pub use tools::ToolKind;
pub use viewport::Viewport;
