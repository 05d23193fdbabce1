//! Interaction state machine.
//!
//! [`Whiteboard`] owns the active tool, the per-gesture pointer state, the
//! draft element, the selection and the text editor. It turns host input into
//! element mutations and pushes them through a [`DocumentAdapter`].
//!
//! The element cache mirrors the store. During a move or resize the dragged
//! element is only changed in the cache (a live preview) and is written to the
//! store once, on release.

mod frame;
mod text_editor;

pub use frame::RedrawScheduler;
pub use text_editor::{ActiveTextEditor, TextEditorOverlay};

use crate::color::to_fill_color;
use crate::config::BoardConfig;
use crate::element::{DrawingElement, ElementId, PenElement, ShapeElement, TextElement};
use crate::hit_test::{CursorHint, HandleDescriptor, ResizeHandle, element_at_point, resize_handle_within};
use crate::input::{KeyFocus, PointerInput, PointerResponse, TextEditorKey};
use crate::resize::{move_element, resize_element_from_handle};
use crate::store::{DocumentAdapter, ElementMap, ElementStore, StoreResult};
use crate::stroke::to_stroke_point;
use crate::text_layout::{estimate_text_bounds, normalize_newlines};
use crate::tools::ToolKind;
use crate::viewport::Viewport;
use kurbo::{Point, Rect, Vec2};

/// Current drawing style.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleState {
    pub color: String,
    pub thickness: f64,
    pub font_family: String,
}

impl StyleState {
    fn from_config(config: &BoardConfig) -> Self {
        Self {
            color: config.default_color.clone(),
            thickness: config.clamp_thickness(config.default_thickness),
            font_family: config.default_font.clone(),
        }
    }
}

/// What the active pointer is doing.
#[derive(Debug, Clone, PartialEq)]
pub enum Gesture {
    Drawing,
    Panning,
    Moving {
        element_id: ElementId,
    },
    Resizing {
        element_id: ElementId,
        handle: ResizeHandle,
        /// The element as it was when the drag started.
        origin: DrawingElement,
    },
    Erasing,
}

/// Per-gesture pointer record. Lives from pointer down to up/cancel.
#[derive(Debug, Clone, PartialEq)]
pub struct PointerState {
    pub pointer_id: u32,
    pub last_world: Point,
    pub last_screen: Point,
    pub gesture: Gesture,
}

/// Borrowed view of everything a renderer needs.
#[derive(Debug, Clone, Copy)]
pub struct BoardView<'a> {
    /// Elements bottom to top, live previews applied.
    pub elements: &'a ElementMap,
    pub draft: Option<&'a DrawingElement>,
    /// Selected element, unless it is the one being edited as text.
    pub selected: Option<&'a DrawingElement>,
    /// Element hidden behind the text editor overlay.
    pub editing: Option<ElementId>,
    pub viewport: &'a Viewport,
}

/// A whiteboard bound to an element store.
pub struct Whiteboard<S: ElementStore> {
    adapter: DocumentAdapter<S>,
    elements: ElementMap,
    preview: Option<DrawingElement>,
    config: BoardConfig,
    tool: ToolKind,
    style: StyleState,
    fill_dropper: bool,
    draft: Option<DrawingElement>,
    pointer: Option<PointerState>,
    selected: Option<ElementId>,
    text_editor: Option<ActiveTextEditor>,
    hover_cursor: Option<CursorHint>,
    viewport: Viewport,
    redraw: RedrawScheduler,
}

impl<S: ElementStore> Whiteboard<S> {
    pub fn new(store: S, config: BoardConfig) -> Self {
        let adapter = DocumentAdapter::new(store);
        let elements = adapter.latest().clone();
        let viewport = Viewport::with_limits(
            config.min_zoom,
            config.max_zoom,
            config.zoom_step,
            config.default_zoom,
        );
        let mut redraw = RedrawScheduler::new();
        redraw.request();
        Self {
            adapter,
            elements,
            preview: None,
            style: StyleState::from_config(&config),
            config,
            tool: ToolKind::Select,
            fill_dropper: false,
            draft: None,
            pointer: None,
            selected: None,
            text_editor: None,
            hover_cursor: None,
            viewport,
            redraw,
        }
    }

    pub fn with_default_config(store: S) -> Self {
        Self::new(store, BoardConfig::default())
    }

    // --- Accessors ---

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        self.adapter.store()
    }

    pub fn store_mut(&mut self) -> &mut S {
        self.adapter.store_mut()
    }

    pub fn tool(&self) -> ToolKind {
        self.tool
    }

    pub fn style(&self) -> &StyleState {
        &self.style
    }

    pub fn fill_dropper_active(&self) -> bool {
        self.fill_dropper
    }

    pub fn selected_id(&self) -> Option<ElementId> {
        self.selected
    }

    pub fn selected_element(&self) -> Option<&DrawingElement> {
        self.selected.and_then(|id| self.elements.get(id))
    }

    /// Local element cache, including any live preview.
    pub fn elements(&self) -> &ElementMap {
        &self.elements
    }

    pub fn draft(&self) -> Option<&DrawingElement> {
        self.draft.as_ref()
    }

    pub fn pointer_state(&self) -> Option<&PointerState> {
        self.pointer.as_ref()
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn text_editor(&self) -> Option<&ActiveTextEditor> {
        self.text_editor.as_ref()
    }

    pub fn text_editor_overlay(&self, is_dark: bool) -> Option<TextEditorOverlay> {
        self.text_editor
            .as_ref()
            .map(|editor| editor.overlay(&self.viewport, is_dark))
    }

    pub fn view(&self) -> BoardView<'_> {
        let editing = self.text_editor.as_ref().and_then(|e| e.element_id);
        BoardView {
            elements: &self.elements,
            draft: self.draft.as_ref(),
            selected: self
                .selected_element()
                .filter(|element| Some(element.id()) != editing),
            editing,
            viewport: &self.viewport,
        }
    }

    /// Cursor the host should show over the canvas.
    pub fn cursor(&self) -> CursorHint {
        if self.tool == ToolKind::Hand {
            return CursorHint::Grab;
        }
        if self.fill_dropper {
            return CursorHint::Cell;
        }
        match self.tool {
            ToolKind::Select => self.hover_cursor.unwrap_or_default(),
            ToolKind::Text => CursorHint::Text,
            ToolKind::Eraser => CursorHint::Cell,
            _ => CursorHint::Crosshair,
        }
    }

    // --- Redraw scheduling ---

    pub fn request_redraw(&mut self) {
        self.redraw.request();
    }

    /// Consume the pending frame. The host renders only when this is `true`.
    pub fn take_redraw(&mut self) -> bool {
        self.redraw.take()
    }

    pub fn redraw_pending(&self) -> bool {
        self.redraw.is_pending()
    }

    /// Drop any pending frame, e.g. when the surface goes away.
    pub fn teardown(&mut self) {
        self.redraw.cancel();
    }

    /// Accept redraws again after [`Whiteboard::teardown`].
    pub fn resume(&mut self) {
        self.redraw.resume();
    }

    // --- Store synchronization ---

    /// Pull a pending store notification into the cache. Returns `true` when
    /// the store had changed.
    pub fn sync_from_store(&mut self) -> bool {
        let Some(latest) = self.adapter.poll() else {
            return false;
        };
        log::debug!("Store changed: {} elements", latest.len());
        self.reload();
        true
    }

    fn reload(&mut self) {
        self.elements = self.adapter.latest().clone();
        if let Some(preview) = &self.preview {
            if !self.elements.replace(preview.clone()) {
                log::debug!("Previewed element {} disappeared from the store", preview.id());
                self.preview = None;
            }
        }
        if let Some(id) = self.selected {
            if !self.elements.contains(id) {
                log::debug!("Selected element {} disappeared from the store", id);
                self.selected = None;
            }
        }
        self.redraw.request();
    }

    fn log_store_result(result: StoreResult<()>, action: &str) {
        if let Err(e) = result {
            log::warn!("Failed to {}: {}", action, e);
        }
    }

    fn store_upsert(&mut self, element: DrawingElement) {
        if self.adapter.latest().get(element.id()) == Some(&element) {
            return;
        }
        let result = self.adapter.update_element(element);
        Self::log_store_result(result, "update element");
        self.reload();
    }

    fn store_delete(&mut self, id: ElementId) {
        let result = self.adapter.delete_element(id);
        Self::log_store_result(result, "delete element");
        self.reload();
    }

    fn apply_preview(&mut self, element: DrawingElement) {
        if self.elements.replace(element.clone()) {
            self.preview = Some(element);
        }
    }

    // --- Style and tools ---

    pub fn set_tool(&mut self, tool: ToolKind) {
        self.sync_from_store();
        if tool != ToolKind::Text {
            self.commit_text_editor(false);
        }
        if self.tool != tool {
            log::debug!("Tool changed: {:?} -> {:?}", self.tool, tool);
        }
        self.tool = tool;
        self.fill_dropper = false;
        self.hover_cursor = None;
        self.redraw.request();
    }

    pub fn set_color(&mut self, color: &str) {
        self.style.color = color.to_string();
        if let Some(editor) = &mut self.text_editor {
            editor.color = color.to_string();
        }
        self.redraw.request();
    }

    pub fn set_thickness(&mut self, thickness: f64) {
        let thickness = self.config.clamp_thickness(thickness);
        self.style.thickness = thickness;
        if let Some(editor) = &mut self.text_editor {
            editor.thickness = thickness;
        }
        self.redraw.request();
    }

    /// Change the font. A selected text element is restyled in the store.
    pub fn set_font_family(&mut self, font_family: &str) {
        self.sync_from_store();
        self.style.font_family = font_family.to_string();
        if let Some(editor) = &mut self.text_editor {
            editor.font_family = font_family.to_string();
        }
        if let Some(DrawingElement::Text(text)) = self.selected_element().cloned() {
            let mut updated = text;
            updated.font_family = font_family.to_string();
            self.store_upsert(DrawingElement::Text(updated));
        }
        self.redraw.request();
    }

    /// Toggle the one-shot fill dropper. Switches back to the select tool.
    pub fn toggle_fill_dropper(&mut self) {
        self.sync_from_store();
        self.commit_text_editor(false);
        self.tool = ToolKind::Select;
        self.hover_cursor = None;
        self.fill_dropper = !self.fill_dropper;
        self.redraw.request();
    }

    // --- Viewport ---

    pub fn zoom_in(&mut self) {
        self.viewport.zoom_in();
        self.redraw.request();
    }

    pub fn zoom_out(&mut self) {
        self.viewport.zoom_out();
        self.redraw.request();
    }

    pub fn reset_zoom(&mut self) {
        self.viewport.reset_zoom();
        self.redraw.request();
    }

    pub fn pan_by(&mut self, delta: Vec2) {
        self.viewport.pan_by(delta);
        self.redraw.request();
    }

    // --- Pointer input ---

    fn select(&mut self, element: &DrawingElement) {
        self.selected = Some(element.id());
        self.style.color = element.color().to_string();
        self.style.thickness = element.thickness();
        if let DrawingElement::Text(text) = element {
            self.style.font_family = text.font_family.clone();
        }
    }

    fn erase_at(&mut self, world: Point) {
        let Some(id) = element_at_point(&self.elements, world, self.config.eraser_tolerance)
            .map(DrawingElement::id)
        else {
            return;
        };
        log::debug!("Erasing element {}", id);
        self.store_delete(id);
        if self.selected == Some(id) {
            self.selected = None;
        }
    }

    fn open_text_editor_for(&mut self, element: &TextElement) {
        self.text_editor = Some(ActiveTextEditor::for_element(element));
        self.selected = Some(element.id);
        self.style.font_family = element.font_family.clone();
        self.style.thickness = element.thickness;
        self.style.color = element.color.clone();
        self.hover_cursor = None;
        self.fill_dropper = false;
    }

    fn begin(&mut self, input: &PointerInput, world: Point, gesture: Gesture) {
        log::debug!("Begin {:?} with pointer {}", gesture, input.pointer_id);
        self.pointer = Some(PointerState {
            pointer_id: input.pointer_id,
            last_world: world,
            last_screen: input.position,
            gesture,
        });
    }

    pub fn pointer_down(&mut self, input: PointerInput) -> PointerResponse {
        self.sync_from_store();
        let screen = input.position;
        let world = self.viewport.screen_to_world(screen);

        if self.text_editor.is_some() && self.tool != ToolKind::Text {
            self.commit_text_editor(false);
        }

        if self.fill_dropper {
            let target = element_at_point(&self.elements, world, self.config.hit_tolerance)
                .filter(|element| element.is_fillable())
                .cloned();
            if let Some(mut target) = target {
                let fill = to_fill_color(&self.style.color, self.config.fill_alpha);
                if let Some(shape) = target.as_shape_mut() {
                    shape.fill = Some(fill);
                }
                let id = target.id();
                self.store_upsert(target);
                self.selected = Some(id);
                self.fill_dropper = false;
                self.redraw.request();
            }
            return PointerResponse::none();
        }

        match self.tool {
            ToolKind::Text => {
                self.commit_text_editor(false);
                self.pointer = None;
                self.hover_cursor = None;
                self.fill_dropper = false;

                let target = element_at_point(&self.elements, world, self.config.hit_tolerance)
                    .and_then(DrawingElement::as_text)
                    .cloned();
                if let Some(text) = target {
                    self.open_text_editor_for(&text);
                } else {
                    self.selected = None;
                    self.text_editor = Some(ActiveTextEditor::new_at(
                        world,
                        &self.style.color,
                        self.style.thickness,
                        &self.style.font_family,
                    ));
                }
                self.redraw.request();
                PointerResponse::none()
            }
            ToolKind::Hand => {
                self.begin(&input, world, Gesture::Panning);
                PointerResponse::capture(input.pointer_id)
            }
            ToolKind::Eraser => {
                self.erase_at(world);
                self.begin(&input, world, Gesture::Erasing);
                self.redraw.request();
                PointerResponse::capture(input.pointer_id)
            }
            ToolKind::Select => {
                let handle = self.selected_element().and_then(|selected| {
                    self.handle_at(world, selected).map(|handle| (selected.clone(), handle))
                });
                if let Some((origin, handle)) = handle {
                    self.hover_cursor = Some(handle.cursor);
                    self.begin(
                        &input,
                        world,
                        Gesture::Resizing {
                            element_id: origin.id(),
                            handle: handle.handle,
                            origin,
                        },
                    );
                } else if let Some(target) =
                    element_at_point(&self.elements, world, self.config.hit_tolerance).cloned()
                {
                    self.select(&target);
                    self.begin(&input, world, Gesture::Moving { element_id: target.id() });
                } else {
                    self.selected = None;
                    self.pointer = None;
                    self.hover_cursor = None;
                }
                self.redraw.request();
                PointerResponse::capture(input.pointer_id)
            }
            tool if tool.is_drawing_tool() => self.begin_drawing(&input, world),
            _ => PointerResponse::none(),
        }
    }

    /// Start a pen or shape draft at `world` for the active drawing tool.
    fn begin_drawing(&mut self, input: &PointerInput, world: Point) -> PointerResponse {
        self.draft = match self.tool.shape_kind() {
            Some(kind) => {
                let shape = ShapeElement::new(self.style.color.as_str(), self.style.thickness, world, world);
                Some(DrawingElement::from_shape(kind, shape))
            }
            None => {
                let first = to_stroke_point(world, input.pressure, input.kind, input.timestamp_ms);
                Some(DrawingElement::Pen(PenElement::starting_at(
                    self.style.color.as_str(),
                    self.style.thickness,
                    first,
                )))
            }
        };
        self.begin(input, world, Gesture::Drawing);
        self.selected = None;
        self.hover_cursor = None;
        self.fill_dropper = false;
        self.redraw.request();
        PointerResponse::capture(input.pointer_id)
    }

    pub fn pointer_move(&mut self, input: PointerInput) {
        self.sync_from_store();
        let screen = input.position;
        let world = self.viewport.screen_to_world(screen);

        let mut pointer = match self.pointer.take() {
            Some(pointer) if pointer.pointer_id == input.pointer_id => pointer,
            other => {
                self.pointer = other;
                self.update_hover(world);
                return;
            }
        };

        let mut advanced = true;
        match &pointer.gesture {
            Gesture::Panning => {
                self.viewport.pan_by(screen - pointer.last_screen);
            }
            Gesture::Erasing => {
                self.erase_at(world);
            }
            Gesture::Resizing { handle, origin, .. } => {
                let resized = resize_element_from_handle(origin, *handle, world);
                self.apply_preview(resized);
            }
            Gesture::Moving { element_id } => {
                let delta = world - pointer.last_world;
                if delta.x == 0.0 && delta.y == 0.0 {
                    advanced = false;
                } else if let Some(element) = self.elements.get(*element_id) {
                    let moved = move_element(element, delta.x, delta.y);
                    self.apply_preview(moved);
                }
            }
            Gesture::Drawing => match &mut self.draft {
                Some(DrawingElement::Pen(pen)) => {
                    let raw = to_stroke_point(world, input.pressure, input.kind, input.timestamp_ms);
                    advanced = pen.push_sample(raw);
                    if advanced {
                        log::trace!("Pen sample at ({:.1}, {:.1})", world.x, world.y);
                    }
                }
                Some(draft) => {
                    if let Some(shape) = draft.as_shape_mut() {
                        shape.x2 = world.x;
                        shape.y2 = world.y;
                    }
                }
                None => advanced = false,
            },
        }

        if advanced {
            pointer.last_world = world;
            pointer.last_screen = screen;
            self.redraw.request();
        }
        self.pointer = Some(pointer);
    }

    fn handle_at(&self, world: Point, element: &DrawingElement) -> Option<HandleDescriptor> {
        resize_handle_within(world, element, self.config.resize_handle_radius)
    }

    fn update_hover(&mut self, world: Point) {
        if self.tool != ToolKind::Select || self.fill_dropper {
            return;
        }
        let cursor = self
            .selected_element()
            .and_then(|selected| self.handle_at(world, selected))
            .map(|handle| handle.cursor);
        self.hover_cursor = cursor;
    }

    /// Finish the gesture owned by this pointer.
    pub fn pointer_up(&mut self, input: PointerInput) -> PointerResponse {
        self.sync_from_store();
        let pointer = match self.pointer.take() {
            Some(pointer) if pointer.pointer_id == input.pointer_id => pointer,
            other => {
                self.pointer = other;
                return PointerResponse::none();
            }
        };

        let mut completed_drawing = false;
        match pointer.gesture {
            Gesture::Drawing => {
                if let Some(draft) = self.draft.take() {
                    completed_drawing = self.commit_draft(draft);
                }
            }
            Gesture::Moving { element_id } | Gesture::Resizing { element_id, .. } => {
                self.preview = None;
                if let Some(element) = self.elements.get(element_id).cloned() {
                    log::debug!("Committing transformed element {}", element_id);
                    self.store_upsert(element);
                }
            }
            Gesture::Panning | Gesture::Erasing => {}
        }

        if completed_drawing {
            self.tool = ToolKind::Select;
            self.hover_cursor = None;
        }
        if self.tool == ToolKind::Select {
            self.hover_cursor = None;
        }
        self.redraw.request();
        PointerResponse::release(input.pointer_id)
    }

    /// Pointer cancel finalizes exactly like pointer up.
    pub fn pointer_cancel(&mut self, input: PointerInput) -> PointerResponse {
        self.pointer_up(input)
    }

    fn commit_draft(&mut self, draft: DrawingElement) -> bool {
        let keep = match &draft {
            DrawingElement::Pen(pen) => !pen.points.is_empty(),
            DrawingElement::Text(_) => false,
            _ => match draft.as_shape() {
                Some((_, shape)) => {
                    let min = self.config.min_drawable_size;
                    (shape.x2 - shape.x1).abs() >= min || (shape.y2 - shape.y1).abs() >= min
                }
                None => false,
            },
        };
        if !keep {
            log::debug!("Discarding {:?} draft below minimum size", draft.kind());
            return false;
        }
        log::debug!("Committing {:?} {}", draft.kind(), draft.id());
        self.store_upsert(draft);
        true
    }

    /// Open the editor for a text element under `screen`. Ignored while the
    /// fill dropper is active.
    pub fn double_click(&mut self, screen: Point) -> bool {
        self.sync_from_store();
        if self.fill_dropper {
            return false;
        }
        let world = self.viewport.screen_to_world(screen);
        let Some(target_id) = element_at_point(&self.elements, world, self.config.hit_tolerance)
            .and_then(DrawingElement::as_text)
            .map(|text| text.id)
        else {
            return false;
        };

        self.commit_text_editor(false);
        self.pointer = None;
        let Some(text) = self.elements.get(target_id).and_then(DrawingElement::as_text).cloned() else {
            return false;
        };
        self.open_text_editor_for(&text);
        self.redraw.request();
        true
    }

    // --- Keyboard ---

    /// Handle a key on the canvas. Returns `true` when the key was consumed.
    ///
    /// Keys typed while a text input has focus are never interpreted.
    pub fn key_down(&mut self, key: &str, focus: KeyFocus) -> bool {
        if focus == KeyFocus::TextInput {
            return false;
        }
        self.sync_from_store();
        if let Some(tool) = ToolKind::from_shortcut(key) {
            self.set_tool(tool);
            return true;
        }
        match key.to_ascii_lowercase().as_str() {
            "delete" | "backspace" => {
                if let Some(id) = self.selected.take() {
                    log::debug!("Deleting selected element {}", id);
                    self.store_delete(id);
                    self.redraw.request();
                }
                true
            }
            _ => false,
        }
    }

    // --- Text editing ---

    /// Live text change from the host input.
    pub fn set_text_editor_text(&mut self, text: &str) {
        if let Some(editor) = &mut self.text_editor {
            editor.text = normalize_newlines(text);
        }
    }

    /// Returns `true` when the key was consumed; Shift+Enter is left to the
    /// host so it inserts a newline.
    pub fn text_editor_key(&mut self, key: TextEditorKey) -> bool {
        match key {
            TextEditorKey::Enter { shift: false } => {
                self.commit_text_editor(true);
                true
            }
            TextEditorKey::Enter { shift: true } => false,
            TextEditorKey::Escape => {
                self.cancel_text_editor(true);
                true
            }
        }
    }

    pub fn text_editor_blur(&mut self) {
        self.commit_text_editor(false);
    }

    /// Write the editor contents to the store and close it.
    pub fn commit_text_editor(&mut self, switch_to_select: bool) {
        if let Some(editor) = self.text_editor.take() {
            self.sync_from_store();
            let normalized = normalize_newlines(&editor.text);
            let text = normalized.trim_end();
            let has_text = !text.trim().is_empty();

            match editor.element_id {
                Some(id) => {
                    if let Some(DrawingElement::Text(existing)) = self.elements.get(id).cloned() {
                        if has_text {
                            let size = editor.size.unwrap_or_else(|| existing.rect().size());
                            let mut updated = existing;
                            updated.text = text.to_string();
                            updated.color = editor.color.clone();
                            updated.thickness = editor.thickness;
                            updated.font_family = editor.font_family.clone();
                            updated.set_box(editor.anchor.x, editor.anchor.y, size.width, size.height);
                            self.store_upsert(DrawingElement::Text(updated));
                            self.selected = Some(id);
                        } else {
                            log::debug!("Deleting emptied text element {}", id);
                            self.store_delete(id);
                            if self.selected == Some(id) {
                                self.selected = None;
                            }
                        }
                    }
                }
                None if has_text => {
                    let size = estimate_text_bounds(text, editor.thickness);
                    let element = TextElement::new(
                        text,
                        editor.color.as_str(),
                        editor.thickness,
                        editor.font_family.as_str(),
                        Rect::from_origin_size(editor.anchor, size),
                    );
                    let id = element.id;
                    self.store_upsert(DrawingElement::Text(element));
                    self.selected = Some(id);
                }
                None => {}
            }
            self.redraw.request();
        }

        if switch_to_select {
            self.tool = ToolKind::Select;
            self.hover_cursor = None;
        }
    }

    /// Close the editor without writing anything.
    pub fn cancel_text_editor(&mut self, switch_to_select: bool) {
        if self.text_editor.take().is_some() {
            self.redraw.request();
        }
        if switch_to_select {
            self.tool = ToolKind::Select;
            self.hover_cursor = None;
        }
    }

    /// Remove every element and reset all transient state.
    pub fn clear_canvas(&mut self) {
        self.sync_from_store();
        let result = self.adapter.clear();
        Self::log_store_result(result, "clear canvas");
        self.draft = None;
        self.pointer = None;
        self.preview = None;
        self.selected = None;
        self.text_editor = None;
        self.fill_dropper = false;
        self.hover_cursor = None;
        self.reload();
    }
}
