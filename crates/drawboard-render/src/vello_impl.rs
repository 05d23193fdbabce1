//! Vello-based renderer implementation.

use crate::renderer::{RenderContext, RenderResult, Renderer, RendererError};
use drawboard_core::color::{resolve_color, theme_aware_color};
use drawboard_core::element::{DrawingElement, PenElement, ShapeElement, TextElement};
use drawboard_core::geometry::element_bounds;
use drawboard_core::stroke::{StrokeGeometry, stroke_geometry};
use drawboard_core::text_layout::{TextBoxLayout, split_text_lines};
use kurbo::{Affine, BezPath, Cap, Circle, Ellipse, Join, Line, QuadBez, RoundedRect, Stroke};
use parley::layout::PositionedLayoutItem;
use parley::{FontContext, LayoutContext, StyleProperty};
use peniko::{Brush, Color, Fill};
use std::sync::Arc;
use vello::Scene;

/// Stroke colors that fail to parse fall back to this.
const FALLBACK_INK: Color = Color::from_rgba8(17, 24, 39, 255);

/// Outward offset of the selection outline, in screen pixels.
const SELECTION_OFFSET: f64 = 6.0;
const SELECTION_RADIUS: f64 = 4.0;
const SELECTION_DASHES: [f64; 2] = [6.0, 4.0];

/// Vello-based renderer for GPU-accelerated 2D graphics.
pub struct VelloRenderer {
    /// The Vello scene being built.
    scene: Scene,
    /// Font context for text rendering (cached to avoid re-registering fonts).
    font_cx: FontContext,
    /// Layout context for text rendering.
    layout_cx: LayoutContext<Brush>,
    is_dark: bool,
}

impl Default for VelloRenderer {
    fn default() -> Self {
        Self::new()
    }
}

fn round_stroke(width: f64) -> Stroke {
    Stroke::new(width).with_caps(Cap::Round).with_join(Join::Round)
}

impl VelloRenderer {
    /// Create a new Vello renderer using the system font collection.
    pub fn new() -> Self {
        Self {
            scene: Scene::new(),
            font_cx: FontContext::new(),
            layout_cx: LayoutContext::new(),
            is_dark: false,
        }
    }

    /// Register font data so text can use families not installed on the system.
    pub fn register_font(&mut self, data: Vec<u8>) -> RenderResult<()> {
        let families = self
            .font_cx
            .collection
            .register_fonts(vello::peniko::Blob::new(Arc::new(data)), None);
        if families.is_empty() {
            return Err(RendererError::FontRegistration(
                "no usable font faces in data".to_string(),
            ));
        }
        log::debug!("Registered {} font families", families.len());
        Ok(())
    }

    /// Get the built scene for rendering.
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Take ownership of the scene (resets internal scene).
    pub fn take_scene(&mut self) -> Scene {
        std::mem::take(&mut self.scene)
    }

    fn ink(&self, color: &str) -> Color {
        resolve_color(&theme_aware_color(color, self.is_dark), FALLBACK_INK)
    }

    fn render_element(&mut self, element: &DrawingElement, transform: Affine) {
        match element {
            DrawingElement::Line(shape) => {
                let line = Line::new(shape.start(), shape.end());
                self.stroke_shape(shape, transform, &line);
            }
            DrawingElement::Arrow(shape) => self.render_arrow(shape, transform),
            DrawingElement::Rect(shape) => {
                let rect = shape.rect();
                self.fill_shape(shape, transform, &rect);
                self.stroke_shape(shape, transform, &rect);
            }
            DrawingElement::Ellipse(shape) => {
                let ellipse = Ellipse::from_rect(shape.rect());
                self.fill_shape(shape, transform, &ellipse);
                self.stroke_shape(shape, transform, &ellipse);
            }
            DrawingElement::Diamond(shape) => {
                let [top, right, bottom, left] = shape.diamond_vertices();
                let mut path = BezPath::new();
                path.move_to(top);
                path.line_to(right);
                path.line_to(bottom);
                path.line_to(left);
                path.close_path();
                self.fill_shape(shape, transform, &path);
                self.stroke_shape(shape, transform, &path);
            }
            DrawingElement::Pen(pen) => self.render_pen(pen, transform),
            DrawingElement::Text(text) => self.render_text(text, transform),
        }
    }

    fn fill_shape(&mut self, shape: &ShapeElement, transform: Affine, path: &impl kurbo::Shape) {
        let Some(fill) = shape.fill.as_deref() else {
            return;
        };
        let Some(color) = drawboard_core::color::CanvasColor::parse(fill) else {
            log::trace!("Skipping unparseable fill {:?}", fill);
            return;
        };
        self.scene
            .fill(Fill::NonZero, transform, Color::from(color), None, path);
    }

    fn stroke_shape(&mut self, shape: &ShapeElement, transform: Affine, path: &impl kurbo::Shape) {
        let color = self.ink(&shape.color);
        self.scene
            .stroke(&round_stroke(shape.thickness), transform, color, None, path);
    }

    fn render_arrow(&mut self, shape: &ShapeElement, transform: Affine) {
        let end = shape.end();
        let (left, right) = shape.arrow_head();
        let mut path = BezPath::new();
        path.move_to(shape.start());
        path.line_to(end);
        path.move_to(left);
        path.line_to(end);
        path.line_to(right);
        self.stroke_shape(shape, transform, &path);
    }

    /// Pen strokes are a chain of quadratic segments, each with its own width.
    fn render_pen(&mut self, pen: &PenElement, transform: Affine) {
        let color = self.ink(&pen.color);
        match stroke_geometry(pen) {
            StrokeGeometry::Empty => {}
            StrokeGeometry::Dot { center, radius } => {
                self.scene
                    .fill(Fill::NonZero, transform, color, None, &Circle::new(center, radius));
            }
            StrokeGeometry::Segments(segments) => {
                for segment in segments {
                    let curve = QuadBez::new(segment.start, segment.control, segment.end);
                    self.scene
                        .stroke(&round_stroke(segment.width), transform, color, None, &curve);
                }
            }
        }
    }

    /// Lines never wrap. Each line gets an equal slice of the box and is
    /// squeezed horizontally when it is wider than the content width.
    fn render_text(&mut self, text: &TextElement, transform: Affine) {
        let Some(layout_box) = TextBoxLayout::new(text.rect(), &text.text) else {
            return;
        };
        let brush = Brush::Solid(self.ink(&text.color));
        let font_size = layout_box.font_size as f32;

        for (index, line) in split_text_lines(&text.text).into_iter().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let mut builder = self
                .layout_cx
                .ranged_builder(&mut self.font_cx, line, 1.0, false);
            builder.push_default(StyleProperty::FontSize(font_size));
            builder.push_default(StyleProperty::Brush(brush.clone()));
            builder.push_default(StyleProperty::FontStack(parley::FontStack::Source(
                text.font_family.as_str().into(),
            )));
            let mut layout = builder.build(line);
            layout.break_all_lines(None);
            layout.align(None, parley::Alignment::Start, parley::AlignmentOptions::default());

            let scale_x = layout_box.compression_scale(layout.width() as f64);
            let vertical_slack = (layout_box.line_height - layout.height() as f64).max(0.0) * 0.5;
            let origin = layout_box.line_origin(index);
            let line_transform = transform
                * Affine::translate((origin.x, origin.y + vertical_slack))
                * Affine::scale_non_uniform(scale_x, 1.0);

            for layout_line in layout.lines() {
                for item in layout_line.items() {
                    let PositionedLayoutItem::GlyphRun(glyph_run) = item else {
                        continue;
                    };
                    let mut x = glyph_run.offset();
                    let y = glyph_run.baseline();
                    let run = glyph_run.run();
                    let font = run.font();
                    let run_font_size = run.font_size();
                    let synthesis = run.synthesis();
                    let glyph_xform = synthesis
                        .skew()
                        .map(|angle| Affine::skew(angle.to_radians().tan() as f64, 0.0));

                    let glyphs: Vec<vello::Glyph> = glyph_run
                        .glyphs()
                        .map(|glyph| {
                            let gx = x + glyph.x;
                            let gy = y - glyph.y;
                            x += glyph.advance;
                            vello::Glyph {
                                id: glyph.id,
                                x: gx,
                                y: gy,
                            }
                        })
                        .collect();

                    if !glyphs.is_empty() {
                        self.scene
                            .draw_glyphs(font)
                            .brush(&brush)
                            .hint(true)
                            .transform(line_transform)
                            .glyph_transform(glyph_xform)
                            .font_size(run_font_size)
                            .normalized_coords(run.normalized_coords())
                            .draw(Fill::NonZero, glyphs.into_iter());
                    }
                }
            }
        }
    }

    /// Dashed rounded outline around the selected element. Drawn in world
    /// space with the elements, so the offset and dashes scale with zoom.
    fn render_selection(&mut self, element: &DrawingElement, transform: Affine, color: Color) {
        let Some(outline) = selection_outline(element) else {
            return;
        };
        let stroke = Stroke::new(1.0).with_dashes(0.0, SELECTION_DASHES);
        self.scene.stroke(&stroke, transform, color, None, &outline);
    }
}

fn selection_outline(element: &DrawingElement) -> Option<RoundedRect> {
    let bounds = element_bounds(element)?.inflate(SELECTION_OFFSET, SELECTION_OFFSET);
    Some(RoundedRect::from_rect(bounds, SELECTION_RADIUS))
}

impl Renderer for VelloRenderer {
    fn build_scene(&mut self, ctx: &RenderContext) {
        self.scene.reset();
        self.is_dark = ctx.is_dark;

        let transform = Affine::scale(ctx.scale_factor) * ctx.board.viewport.transform();

        // The element under the text editor is drawn by the host overlay.
        for element in ctx.board.elements.iter() {
            if ctx.board.editing == Some(element.id()) {
                continue;
            }
            self.render_element(element, transform);
        }

        if let Some(draft) = ctx.board.draft {
            self.render_element(draft, transform);
        }

        if let Some(selected) = ctx.board.selected {
            self.render_selection(selected, transform, ctx.selection_color);
        }

        log::trace!("Built scene with {} elements", ctx.board.elements.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use drawboard_core::{MemoryStore, PointerInput, ToolKind, Whiteboard};
    use kurbo::{Point, Rect, Size};

    fn rect(x: f64) -> DrawingElement {
        DrawingElement::Rect(ShapeElement::new(
            "#111827",
            2.0,
            Point::new(x, 10.0),
            Point::new(x + 40.0, 50.0),
        ))
    }

    #[test]
    fn test_renderer_creation() {
        let renderer = VelloRenderer::new();
        assert!(renderer.scene().encoding().is_empty());
    }

    #[test]
    fn test_build_empty_scene() {
        let mut renderer = VelloRenderer::new();
        let board = Whiteboard::with_default_config(MemoryStore::new());
        let ctx = RenderContext::new(board.view(), Size::new(800.0, 600.0));
        renderer.build_scene(&ctx);
        assert!(renderer.scene().encoding().is_empty());
    }

    #[test]
    fn test_build_scene_with_elements() {
        let mut renderer = VelloRenderer::new();
        let mut pen = PenElement::new("#ef4444", 3.0);
        pen.points.push(drawboard_core::StrokePoint::new(5.0, 5.0, 0.0, 0.5));
        let elements = vec![rect(0.0), DrawingElement::Pen(pen)];
        let board = Whiteboard::with_default_config(MemoryStore::with_elements(elements.into()));
        let ctx = RenderContext::new(board.view(), Size::new(800.0, 600.0)).with_dark_mode(true);
        renderer.build_scene(&ctx);
        assert!(!renderer.scene().encoding().is_empty());
    }

    #[test]
    fn test_edited_element_is_skipped() {
        let text = TextElement::new("note", "#111827", 3.0, "sans-serif", Rect::new(0.0, 0.0, 80.0, 30.0));
        let mut board = Whiteboard::with_default_config(MemoryStore::with_elements(
            vec![DrawingElement::Text(text)].into(),
        ));
        assert!(board.double_click(Point::new(40.0, 15.0)));

        let mut renderer = VelloRenderer::new();
        let ctx = RenderContext::new(board.view(), Size::new(800.0, 600.0));
        renderer.build_scene(&ctx);
        // Only the text element exists and it is hidden behind the editor.
        assert!(renderer.scene().encoding().is_empty());
    }

    #[test]
    fn test_draft_and_selection_are_drawn() {
        let mut board = Whiteboard::with_default_config(MemoryStore::new());
        board.set_tool(ToolKind::Rect);
        board.pointer_down(PointerInput::mouse(1, Point::new(0.0, 0.0), 0.0));
        board.pointer_move(PointerInput::mouse(1, Point::new(30.0, 30.0), 0.0));

        let mut renderer = VelloRenderer::new();
        renderer.build_scene(&RenderContext::new(board.view(), Size::new(800.0, 600.0)));
        assert!(!renderer.scene().encoding().is_empty());

        board.pointer_up(PointerInput::mouse(1, Point::new(30.0, 30.0), 0.0));
        board.pointer_down(PointerInput::mouse(1, Point::new(15.0, 15.0), 0.0));
        board.pointer_up(PointerInput::mouse(1, Point::new(15.0, 15.0), 0.0));
        assert!(board.view().selected.is_some());
        renderer.build_scene(&RenderContext::new(board.view(), Size::new(800.0, 600.0)).with_scale_factor(2.0));
        assert!(!renderer.take_scene().encoding().is_empty());
    }

    #[test]
    fn test_selection_outline_is_in_world_space() {
        let outline = selection_outline(&rect(10.0)).unwrap();
        assert_eq!(outline.rect(), Rect::new(4.0, 4.0, 56.0, 56.0));
        assert!(selection_outline(&DrawingElement::Pen(PenElement::new("#111827", 2.0))).is_none());

        let mut board = Whiteboard::with_default_config(MemoryStore::with_elements(vec![rect(10.0)].into()));
        board.pointer_down(PointerInput::mouse(1, Point::new(30.0, 30.0), 0.0));
        board.pointer_up(PointerInput::mouse(1, Point::new(30.0, 30.0), 0.0));
        board.zoom_in();
        assert!(board.view().selected.is_some());
        let mut renderer = VelloRenderer::new();
        renderer.build_scene(&RenderContext::new(board.view(), Size::new(800.0, 600.0)));
        assert!(!renderer.scene().encoding().is_empty());
    }

    #[test]
    fn test_register_invalid_font_fails() {
        let mut renderer = VelloRenderer::new();
        assert!(matches!(
            renderer.register_font(vec![0, 1, 2, 3]),
            Err(RendererError::FontRegistration(_))
        ));
    }
}
