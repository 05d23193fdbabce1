//! Renderer trait abstraction.

use drawboard_core::BoardView;
use drawboard_core::color::{canvas_background, resolve_color};
use kurbo::Size;
use peniko::Color;
use thiserror::Error;

/// Renderer errors.
#[derive(Debug, Error)]
pub enum RendererError {
    #[error("Font registration failed: {0}")]
    FontRegistration(String),
}

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RendererError>;

/// Blue used for the dashed selection outline.
pub const SELECTION_COLOR: Color = Color::from_rgba8(37, 99, 235, 255);

const BACKGROUND_FALLBACK: Color = Color::from_rgba8(255, 255, 255, 255);

/// Context for a single render frame.
pub struct RenderContext<'a> {
    /// The board state to render.
    pub board: BoardView<'a>,
    /// Viewport size in physical pixels.
    pub viewport_size: Size,
    /// Device pixel ratio (for HiDPI).
    pub scale_factor: f64,
    /// Host theme. Drives ink remapping and the background.
    pub is_dark: bool,
    pub background_color: Color,
    pub selection_color: Color,
}

impl<'a> RenderContext<'a> {
    /// Create a new render context for a light theme.
    pub fn new(board: BoardView<'a>, viewport_size: Size) -> Self {
        Self {
            board,
            viewport_size,
            scale_factor: 1.0,
            is_dark: false,
            background_color: resolve_color(canvas_background(false), BACKGROUND_FALLBACK),
            selection_color: SELECTION_COLOR,
        }
    }

    /// Set the scale factor for HiDPI.
    pub fn with_scale_factor(mut self, scale_factor: f64) -> Self {
        self.scale_factor = scale_factor;
        self
    }

    /// Switch theme. Also resets the background to the theme's canvas color.
    pub fn with_dark_mode(mut self, is_dark: bool) -> Self {
        self.is_dark = is_dark;
        self.background_color = resolve_color(canvas_background(is_dark), BACKGROUND_FALLBACK);
        self
    }

    pub fn with_selection_color(mut self, color: Color) -> Self {
        self.selection_color = color;
        self
    }
}

/// Trait for rendering backends.
pub trait Renderer: Send + Sync {
    /// Build the scene for a frame.
    ///
    /// Called once per frame the board hands out; should prepare all drawing commands.
    fn build_scene(&mut self, ctx: &RenderContext);

    /// Get the background color (for clearing).
    fn background_color(&self, ctx: &RenderContext) -> Color {
        ctx.background_color
    }
}
