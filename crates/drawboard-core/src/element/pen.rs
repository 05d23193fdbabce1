//! Freehand pen strokes.

use super::{ElementId, sanitize_thickness};
use crate::geometry::distance;
use crate::stroke::{MIN_SAMPLE_DISTANCE, smooth_stroke_point};
use kurbo::Point;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single committed stroke sample in world space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrokePoint {
    pub x: f64,
    pub y: f64,
    /// Sample timestamp in milliseconds.
    pub t: f64,
    /// Normalized pressure in `[0.1, 1]`.
    pub pressure: f64,
}

impl StrokePoint {
    pub fn new(x: f64, y: f64, t: f64, pressure: f64) -> Self {
        Self { x, y, t, pressure }
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// A freehand stroke made of ordered samples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PenElement {
    pub id: ElementId,
    pub color: String,
    pub thickness: f64,
    #[serde(default)]
    pub points: Vec<StrokePoint>,
}

impl PenElement {
    /// Create an empty stroke.
    pub fn new(color: impl Into<String>, thickness: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            color: color.into(),
            thickness: sanitize_thickness(thickness),
            points: Vec::new(),
        }
    }

    /// Create a stroke seeded with its first sample.
    pub fn starting_at(color: impl Into<String>, thickness: f64, first: StrokePoint) -> Self {
        let mut pen = Self::new(color, thickness);
        pen.points.push(first);
        pen
    }

    pub fn last_point(&self) -> Option<&StrokePoint> {
        self.points.last()
    }

    /// Blend a raw sample toward the last committed one and append it.
    ///
    /// Returns `false` when the smoothed point lands closer than
    /// [`MIN_SAMPLE_DISTANCE`] to the previous sample and was dropped.
    /// An empty stroke takes the raw sample as is.
    pub fn push_sample(&mut self, raw: StrokePoint) -> bool {
        let Some(last) = self.points.last().copied() else {
            self.points.push(raw);
            return true;
        };
        let next = smooth_stroke_point(&last, &raw);
        if distance(last.position(), next.position()) < MIN_SAMPLE_DISTANCE {
            return false;
        }
        self.points.push(next);
        true
    }
}
