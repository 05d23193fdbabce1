//! Pan/zoom viewport and world/screen conversion.

use kurbo::{Affine, Point, Vec2};
use serde::{Deserialize, Serialize};

pub const MIN_ZOOM_PERCENT: f64 = 10.0;
pub const MAX_ZOOM_PERCENT: f64 = 500.0;
pub const ZOOM_STEP_PERCENT: f64 = 10.0;
pub const DEFAULT_ZOOM_PERCENT: f64 = 100.0;

/// The view onto the board.
///
/// `screen = (world + pan) * zoom / 100`. Pan is expressed in the same unit
/// as the pointer deltas that drive it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Viewport {
    /// Zoom as a percentage.
    pub zoom: f64,
    pub pan: Vec2,
    pub min_zoom: f64,
    pub max_zoom: f64,
    pub zoom_step: f64,
    pub default_zoom: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            zoom: DEFAULT_ZOOM_PERCENT,
            pan: Vec2::ZERO,
            min_zoom: MIN_ZOOM_PERCENT,
            max_zoom: MAX_ZOOM_PERCENT,
            zoom_step: ZOOM_STEP_PERCENT,
            default_zoom: DEFAULT_ZOOM_PERCENT,
        }
    }
}

impl Viewport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Viewport with custom zoom limits. The default zoom is clamped into range.
    pub fn with_limits(min_zoom: f64, max_zoom: f64, zoom_step: f64, default_zoom: f64) -> Self {
        let default_zoom = default_zoom.clamp(min_zoom, max_zoom);
        Self {
            zoom: default_zoom,
            pan: Vec2::ZERO,
            min_zoom,
            max_zoom,
            zoom_step,
            default_zoom,
        }
    }

    /// Zoom as a scale factor.
    pub fn scale(&self) -> f64 {
        self.zoom / 100.0
    }

    /// World to screen transform.
    pub fn transform(&self) -> Affine {
        Affine::scale(self.scale()) * Affine::translate(self.pan)
    }

    /// Screen to world transform.
    pub fn inverse_transform(&self) -> Affine {
        Affine::translate(-self.pan) * Affine::scale(1.0 / self.scale())
    }

    pub fn world_to_screen(&self, world: Point) -> Point {
        self.transform() * world
    }

    pub fn screen_to_world(&self, screen: Point) -> Point {
        self.inverse_transform() * screen
    }

    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = zoom.clamp(self.min_zoom, self.max_zoom);
    }

    pub fn zoom_in(&mut self) {
        self.set_zoom(self.zoom + self.zoom_step);
    }

    pub fn zoom_out(&mut self) {
        self.set_zoom(self.zoom - self.zoom_step);
    }

    pub fn reset_zoom(&mut self) {
        self.zoom = self.default_zoom;
    }

    /// Translate the pan offset by a raw pointer delta.
    pub fn pan_by(&mut self, delta: Vec2) {
        self.pan += delta;
    }
}
