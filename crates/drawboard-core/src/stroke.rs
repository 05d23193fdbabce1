//! Freehand stroke model: sampling, smoothing and variable width synthesis.
//!
//! Raw pointer samples become [`StrokePoint`]s, are blended toward the last
//! committed sample, and are later turned into a list of quadratic segments
//! whose widths follow pressure and speed. The renderer only has to draw what
//! [`stroke_geometry`] returns.

use crate::element::{PenElement, StrokePoint};
use crate::geometry::{distance, midpoint};
use crate::input::PointerKind;
use kurbo::Point;

/// Pressure used when a pen reports zero.
pub const PEN_FALLBACK_PRESSURE: f64 = 0.55;
/// Pressure used when a mouse or touch reports zero.
pub const DEFAULT_FALLBACK_PRESSURE: f64 = 0.45;
pub const MIN_PRESSURE: f64 = 0.1;
pub const MAX_PRESSURE: f64 = 1.0;

/// Smoothed samples closer than this to the last one are dropped.
pub const MIN_SAMPLE_DISTANCE: f64 = 0.4;
/// Raw steps shorter than this are damped harder.
pub const JITTER_STEP: f64 = 3.0;
const JITTER_BLEND: f64 = 0.45;
const STROKE_BLEND: f64 = 0.7;

pub const PEN_BASE_THICKNESS_BOOST: f64 = 1.22;
pub const PEN_MIN_WIDTH_MULTIPLIER: f64 = 0.74;
pub const PEN_MAX_WIDTH_MULTIPLIER: f64 = 1.16;
/// Width carried into the first segment, relative to thickness.
pub const PEN_INITIAL_WIDTH_MULTIPLIER: f64 = 0.95;
const WIDTH_CARRY: f64 = 0.65;

/// Build a stroke sample from a world position and the device pressure.
pub fn to_stroke_point(world: Point, pressure: f64, kind: PointerKind, t: f64) -> StrokePoint {
    let fallback = match kind {
        PointerKind::Pen => PEN_FALLBACK_PRESSURE,
        PointerKind::Mouse | PointerKind::Touch => DEFAULT_FALLBACK_PRESSURE,
    };
    let pressure = if pressure > 0.0 { pressure } else { fallback };
    StrokePoint::new(world.x, world.y, t, pressure.clamp(MIN_PRESSURE, MAX_PRESSURE))
}

/// Blend `next` toward `last`.
pub fn smooth_stroke_point(last: &StrokePoint, next: &StrokePoint) -> StrokePoint {
    let step = distance(last.position(), next.position());
    let blend = if step < JITTER_STEP { JITTER_BLEND } else { STROKE_BLEND };
    StrokePoint::new(
        last.x + (next.x - last.x) * blend,
        last.y + (next.y - last.y) * blend,
        next.t,
        last.pressure * 0.3 + next.pressure * 0.7,
    )
}

/// Target width of the segment `previous -> current`.
///
/// Always within `[0.74, 1.16] * thickness`, whatever the pressure or speed.
pub fn segment_width(previous: &StrokePoint, current: &StrokePoint, thickness: f64) -> f64 {
    let elapsed = (current.t - previous.t).max(1.0);
    let speed = distance(previous.position(), current.position()) / elapsed;
    let speed_factor = (speed * 0.9).clamp(0.0, 1.0);
    let pressure_factor = (previous.pressure + current.pressure) * 0.5;
    let dynamic_factor = 0.8 + pressure_factor * 0.34 - speed_factor * 0.2;
    let width = thickness * PEN_BASE_THICKNESS_BOOST * dynamic_factor;
    let min = thickness * PEN_MIN_WIDTH_MULTIPLIER;
    let max = thickness * PEN_MAX_WIDTH_MULTIPLIER;
    if width.is_nan() { min } else { width.clamp(min, max) }
}

/// One quadratic piece of a rendered stroke.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeSegment {
    pub start: Point,
    pub control: Point,
    pub end: Point,
    pub width: f64,
}

/// Renderable geometry of a pen stroke.
#[derive(Debug, Clone, PartialEq)]
pub enum StrokeGeometry {
    Empty,
    /// A single sample draws as a filled dot.
    Dot { center: Point, radius: f64 },
    Segments(Vec<StrokeSegment>),
}

/// Radius of the dot drawn for a one-sample stroke.
pub fn dot_radius(thickness: f64) -> f64 {
    (thickness * 0.5).max(1.4)
}

/// Synthesize the segments of a pen stroke.
///
/// Each segment runs from the midpoint of `(previous, current)` to the
/// midpoint of `(current, next)` with `current` as the control point, so
/// joints between samples stay smooth. Widths are eased from one segment to
/// the next.
pub fn stroke_geometry(pen: &PenElement) -> StrokeGeometry {
    let points = &pen.points;
    match points.len() {
        0 => StrokeGeometry::Empty,
        1 => StrokeGeometry::Dot {
            center: points[0].position(),
            radius: dot_radius(pen.thickness),
        },
        _ => {
            let mut segments = Vec::with_capacity(points.len() - 1);
            let mut previous_width = pen.thickness * PEN_INITIAL_WIDTH_MULTIPLIER;
            for i in 1..points.len() {
                let previous = &points[i - 1];
                let current = &points[i];
                let next = points.get(i + 1).unwrap_or(current);

                let target = segment_width(previous, current, pen.thickness);
                let width = previous_width * WIDTH_CARRY + target * (1.0 - WIDTH_CARRY);
                previous_width = width;

                segments.push(StrokeSegment {
                    start: midpoint(previous.position(), current.position()),
                    control: current.position(),
                    end: midpoint(current.position(), next.position()),
                    width,
                });
            }
            StrokeGeometry::Segments(segments)
        }
    }
}
