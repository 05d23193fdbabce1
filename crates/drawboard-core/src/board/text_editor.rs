//! In-progress text edits and the host overlay that displays them.

use crate::color::theme_aware_color;
use crate::element::{ElementId, TextElement};
use crate::text_layout::{LINE_HEIGHT_RATIO, editor_overlay_size, split_text_lines, text_base_size};
use crate::viewport::Viewport;
use kurbo::{Point, Size};

/// A text edit in progress. `element_id` is `None` when creating new text.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveTextEditor {
    /// Top-left corner in world space.
    pub anchor: Point,
    pub element_id: Option<ElementId>,
    /// Fixed box size when editing an existing element.
    pub size: Option<Size>,
    pub text: String,
    pub color: String,
    pub thickness: f64,
    pub font_family: String,
}

impl ActiveTextEditor {
    /// An empty editor for new text at `anchor`.
    pub fn new_at(anchor: Point, color: &str, thickness: f64, font_family: &str) -> Self {
        Self {
            anchor,
            element_id: None,
            size: None,
            text: String::new(),
            color: color.to_string(),
            thickness,
            font_family: font_family.to_string(),
        }
    }

    /// An editor over an existing text element, in place.
    pub fn for_element(element: &TextElement) -> Self {
        let rect = element.rect();
        Self {
            anchor: Point::new(rect.x0, rect.y0),
            element_id: Some(element.id),
            size: Some(rect.size()),
            text: element.text.clone(),
            color: element.color.clone(),
            thickness: element.thickness,
            font_family: element.font_family.clone(),
        }
    }

    /// Where and how the host should draw the text input.
    pub fn overlay(&self, viewport: &Viewport, is_dark: bool) -> TextEditorOverlay {
        let font_size = text_base_size(self.thickness);
        TextEditorOverlay {
            screen_position: viewport.world_to_screen(self.anchor),
            size: self
                .size
                .unwrap_or_else(|| editor_overlay_size(&self.text, self.thickness)),
            font_size,
            line_height: font_size * LINE_HEIGHT_RATIO,
            rows: split_text_lines(&self.text).len().max(1),
            font_family: self.font_family.clone(),
            color: theme_aware_color(&self.color, is_dark),
        }
    }
}

/// Placement and styling of the host text input.
#[derive(Debug, Clone, PartialEq)]
pub struct TextEditorOverlay {
    pub screen_position: Point,
    pub size: Size,
    pub font_size: f64,
    pub line_height: f64,
    pub rows: usize,
    pub font_family: String,
    /// Already remapped for the active theme.
    pub color: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::{Rect, Vec2};

    #[test]
    fn test_new_editor_auto_sizes() {
        let mut editor = ActiveTextEditor::new_at(Point::new(10.0, 20.0), "#111827", 3.0, "serif");
        let overlay = editor.overlay(&Viewport::new(), true);
        assert_eq!(overlay.screen_position, Point::new(10.0, 20.0));
        assert!((overlay.size.width - 140.0).abs() < f64::EPSILON);
        assert!((overlay.font_size - 20.0).abs() < f64::EPSILON);
        assert_eq!(overlay.color, "#ffffff");

        editor.text = "a\nb\nc".into();
        let overlay = editor.overlay(&Viewport::new(), false);
        assert_eq!(overlay.rows, 3);
        assert!((overlay.size.height - (3.0 * 25.6 + 12.0)).abs() < 1e-9);
    }

    #[test]
    fn test_existing_element_keeps_box() {
        let element = TextElement::new("hi", "#ef4444", 2.0, "mono", Rect::new(5.0, 5.0, 105.0, 45.0));
        let editor = ActiveTextEditor::for_element(&element);
        assert_eq!(editor.element_id, Some(element.id));
        let mut viewport = Viewport::new();
        viewport.pan = Vec2::new(10.0, 0.0);
        viewport.set_zoom(200.0);
        let overlay = editor.overlay(&viewport, false);
        assert_eq!(overlay.size, Size::new(100.0, 40.0));
        assert_eq!(overlay.screen_position, Point::new(30.0, 10.0));
    }
}
