//! Text box metrics.
//!
//! There is no wrapping: text is split on newlines, each line gets an equal
//! share of the box height, and lines wider than the box are compressed
//! horizontally by the renderer.

use kurbo::{Point, Rect, Size};

pub const TEXT_PADDING_X: f64 = 6.0;
pub const TEXT_PADDING_Y: f64 = 4.0;
/// Font size as a fraction of the line height.
pub const TEXT_FONT_RATIO: f64 = 0.82;
pub const MIN_FONT_SIZE: f64 = 10.0;
/// Line height as a multiple of the base font size.
pub const LINE_HEIGHT_RATIO: f64 = 1.28;
/// Empirical average glyph advance relative to the font size.
pub const CHAR_WIDTH_RATIO: f64 = 0.62;
/// Smallest box the renderer will draw text into.
pub const MIN_TEXT_BOX: f64 = 2.0;

const MIN_EDITOR_WIDTH: f64 = 140.0;
const EDITOR_EXTRA_WIDTH: f64 = 8.0;
const EDITOR_EXTRA_HEIGHT: f64 = 4.0;

/// Replace `\r\n` line endings with `\n`.
pub fn normalize_newlines(text: &str) -> String {
    text.replace("\r\n", "\n")
}

/// Split text into lines. Empty text is a single empty line.
pub fn split_text_lines(text: &str) -> Vec<&str> {
    text.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect()
}

fn max_line_chars(lines: &[&str]) -> usize {
    lines.iter().map(|l| l.chars().count()).max().unwrap_or(0).max(1)
}

/// Font size a text element starts with for a given thickness.
pub fn text_base_size(thickness: f64) -> f64 {
    (14.0 + thickness * 2.0).clamp(14.0, 42.0)
}

/// Estimated box size for freshly committed text.
pub fn estimate_text_bounds(text: &str, thickness: f64) -> Size {
    let lines = split_text_lines(text);
    let max_chars = max_line_chars(&lines) as f64;
    let base = text_base_size(thickness);
    let line_height = base * LINE_HEIGHT_RATIO;
    Size::new(
        (base * 1.2).max(max_chars * base * CHAR_WIDTH_RATIO) + TEXT_PADDING_X * 2.0,
        line_height.max(lines.len() as f64 * line_height) + TEXT_PADDING_Y * 2.0,
    )
}

/// Automatic size of the host text editor overlay.
pub fn editor_overlay_size(text: &str, thickness: f64) -> Size {
    let lines = split_text_lines(text);
    let max_chars = max_line_chars(&lines) as f64;
    let font_size = text_base_size(thickness);
    let line_height = font_size * LINE_HEIGHT_RATIO;
    Size::new(
        MIN_EDITOR_WIDTH
            .max(max_chars * font_size * CHAR_WIDTH_RATIO + TEXT_PADDING_X * 2.0 + EDITOR_EXTRA_WIDTH),
        (line_height + TEXT_PADDING_Y * 2.0).max(
            lines.len().max(1) as f64 * line_height + TEXT_PADDING_Y * 2.0 + EDITOR_EXTRA_HEIGHT,
        ),
    )
}

/// Layout of a text element inside its box.
#[derive(Debug, Clone, PartialEq)]
pub struct TextBoxLayout {
    pub origin: Point,
    pub content_width: f64,
    pub line_height: f64,
    pub font_size: f64,
    pub line_count: usize,
}

impl TextBoxLayout {
    /// `None` when the box is too small to draw into.
    pub fn new(bounds: Rect, text: &str) -> Option<Self> {
        if bounds.width() < MIN_TEXT_BOX || bounds.height() < MIN_TEXT_BOX {
            return None;
        }
        let line_count = split_text_lines(text).len().max(1);
        let content_width = (bounds.width() - TEXT_PADDING_X * 2.0).max(1.0);
        let content_height = (bounds.height() - TEXT_PADDING_Y * 2.0).max(1.0);
        let line_height = content_height / line_count as f64;
        Some(Self {
            origin: Point::new(bounds.x0 + TEXT_PADDING_X, bounds.y0 + TEXT_PADDING_Y),
            content_width,
            line_height,
            font_size: (line_height * TEXT_FONT_RATIO).max(MIN_FONT_SIZE),
            line_count,
        })
    }

    /// Top-left corner of line `index`.
    pub fn line_origin(&self, index: usize) -> Point {
        Point::new(self.origin.x, self.origin.y + index as f64 * self.line_height)
    }

    /// Horizontal scale for a line of the given measured width. Never above 1.
    pub fn compression_scale(&self, measured_width: f64) -> f64 {
        (self.content_width / measured_width.max(1.0)).min(1.0)
    }
}
