use drawboard_core::element::{DrawingElement, ShapeElement, TextElement};
use drawboard_core::geometry::element_bounds;
use drawboard_core::text_layout::estimate_text_bounds;
use drawboard_core::{
    CrdtStore, CursorHint, ElementStore, KeyFocus, MemoryStore, PointerInput, PointerResponse,
    TextEditorKey, ToolKind, Whiteboard,
};
use kurbo::{Point, Rect};

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn mouse(x: f64, y: f64) -> PointerInput {
    PointerInput::mouse(1, Point::new(x, y), 0.0)
}

fn rect(x1: f64, y1: f64, x2: f64, y2: f64) -> DrawingElement {
    DrawingElement::Rect(ShapeElement::new(
        "#111827",
        2.0,
        Point::new(x1, y1),
        Point::new(x2, y2),
    ))
}

fn board_with(elements: Vec<DrawingElement>) -> Whiteboard<MemoryStore> {
    init();
    Whiteboard::with_default_config(MemoryStore::with_elements(elements.into()))
}

fn click(board: &mut Whiteboard<MemoryStore>, x: f64, y: f64) {
    board.pointer_down(mouse(x, y));
    board.pointer_up(mouse(x, y));
}

fn assert_rect_close(actual: Rect, expected: Rect) {
    for (a, e) in [
        (actual.x0, expected.x0),
        (actual.y0, expected.y0),
        (actual.x1, expected.x1),
        (actual.y1, expected.y1),
    ] {
        assert!((a - e).abs() < 1e-9, "{actual:?} != {expected:?}");
    }
}

#[test]
fn test_tiny_rect_is_discarded() {
    let mut board = board_with(vec![]);
    board.set_tool(ToolKind::Rect);
    board.pointer_down(mouse(5.0, 5.0));
    board.pointer_move(mouse(6.0, 6.0));
    board.pointer_up(mouse(6.0, 6.0));

    assert!(board.store().snapshot().is_empty());
    assert!(board.draft().is_none());
    assert_eq!(board.tool(), ToolKind::Rect);
}

#[test]
fn test_thin_line_above_threshold_is_kept() {
    let mut board = board_with(vec![]);
    board.set_tool(ToolKind::Line);
    board.pointer_down(mouse(5.0, 5.0));
    board.pointer_move(mouse(5.5, 9.0));
    board.pointer_up(mouse(5.5, 9.0));
    assert_eq!(board.store().snapshot().len(), 1);
    assert_eq!(board.tool(), ToolKind::Select);
}

#[test]
fn test_drawing_uses_world_coordinates() {
    let mut board = board_with(vec![]);
    for _ in 0..10 {
        board.zoom_in();
    }
    assert!((board.viewport().zoom - 200.0).abs() < f64::EPSILON);

    board.set_tool(ToolKind::Rect);
    board.pointer_down(mouse(100.0, 100.0));
    board.pointer_move(mouse(200.0, 160.0));
    board.pointer_up(mouse(200.0, 160.0));

    let snapshot = board.store().snapshot();
    let bounds = element_bounds(snapshot.iter().next().unwrap()).unwrap();
    assert_rect_close(bounds, Rect::new(50.0, 50.0, 100.0, 80.0));
}

#[test]
fn test_eraser_removes_only_topmost() {
    let bottom = rect(0.0, 0.0, 100.0, 100.0);
    let top = rect(50.0, 50.0, 150.0, 150.0);
    let mut board = board_with(vec![bottom.clone(), top.clone()]);

    board.set_tool(ToolKind::Eraser);
    let response = board.pointer_down(mouse(75.0, 75.0));
    assert_eq!(response, PointerResponse::capture(1));
    let snapshot = board.store().snapshot();
    assert_eq!(snapshot.len(), 1);
    assert!(snapshot.contains(bottom.id()));

    // Dragging keeps erasing.
    board.pointer_move(mouse(10.0, 10.0));
    assert!(board.store().snapshot().is_empty());
    board.pointer_up(mouse(10.0, 10.0));
    assert_eq!(board.tool(), ToolKind::Eraser);
}

#[test]
fn test_empty_new_text_is_noop() {
    let mut board = board_with(vec![]);
    board.set_tool(ToolKind::Text);
    assert_eq!(board.pointer_down(mouse(20.0, 20.0)), PointerResponse::none());
    assert!(board.text_editor().is_some());

    board.set_text_editor_text("   \n  ");
    assert!(board.text_editor_key(TextEditorKey::Enter { shift: false }));
    assert!(board.text_editor().is_none());
    assert!(board.store().snapshot().is_empty());
    assert_eq!(board.store().revision(), 0);
    assert_eq!(board.tool(), ToolKind::Select);
}

#[test]
fn test_new_text_is_created_with_estimated_bounds() {
    let mut board = board_with(vec![]);
    board.set_tool(ToolKind::Text);
    board.pointer_down(mouse(20.0, 30.0));
    board.set_text_editor_text("hi\r\nthere  ");
    assert!(!board.text_editor_key(TextEditorKey::Enter { shift: true }));
    assert!(board.text_editor_key(TextEditorKey::Enter { shift: false }));

    let snapshot = board.store().snapshot();
    let text = snapshot.iter().next().and_then(DrawingElement::as_text).unwrap();
    assert_eq!(text.text, "hi\nthere");
    let size = estimate_text_bounds("hi\nthere", text.thickness);
    assert_rect_close(text.rect(), Rect::from_origin_size(Point::new(20.0, 30.0), size));
    assert_eq!(board.selected_id(), Some(text.id));
}

#[test]
fn test_existing_text_is_updated_in_place() {
    let original = TextElement::new("hello", "#111827", 3.0, "serif", Rect::new(10.0, 10.0, 110.0, 40.0));
    let id = original.id;
    let mut board = board_with(vec![DrawingElement::Text(original)]);

    board.set_tool(ToolKind::Text);
    board.pointer_down(mouse(50.0, 25.0));
    assert_eq!(board.text_editor().and_then(|e| e.element_id), Some(id));
    assert_eq!(board.view().editing, Some(id));

    board.set_color("#ef4444");
    board.set_text_editor_text("hello world");
    board.text_editor_blur();

    let snapshot = board.store().snapshot();
    assert_eq!(snapshot.len(), 1);
    let text = snapshot.get(id).and_then(DrawingElement::as_text).unwrap();
    assert_eq!(text.text, "hello world");
    assert_eq!(text.color, "#ef4444");
    assert_rect_close(text.rect(), Rect::new(10.0, 10.0, 110.0, 40.0));
    // Blur does not change the tool.
    assert_eq!(board.tool(), ToolKind::Text);
}

#[test]
fn test_emptied_text_is_deleted() {
    let original = TextElement::new("bye", "#111827", 3.0, "serif", Rect::new(0.0, 0.0, 80.0, 30.0));
    let mut board = board_with(vec![DrawingElement::Text(original)]);

    assert!(board.double_click(Point::new(40.0, 15.0)));
    board.set_text_editor_text("  ");
    board.commit_text_editor(false);
    assert!(board.store().snapshot().is_empty());
    assert!(board.selected_id().is_none());
}

#[test]
fn test_escape_cancels_text_edit() {
    let original = TextElement::new("keep", "#111827", 3.0, "serif", Rect::new(0.0, 0.0, 80.0, 30.0));
    let mut board = board_with(vec![DrawingElement::Text(original.clone())]);
    board.set_tool(ToolKind::Text);
    board.pointer_down(mouse(40.0, 15.0));
    board.set_text_editor_text("changed");
    assert!(board.text_editor_key(TextEditorKey::Escape));

    assert!(board.text_editor().is_none());
    assert_eq!(board.tool(), ToolKind::Select);
    assert_eq!(
        board.store().snapshot().get(original.id),
        Some(&DrawingElement::Text(original))
    );
}

#[test]
fn test_double_click_ignored_while_dropper_active() {
    let original = TextElement::new("note", "#111827", 3.0, "serif", Rect::new(0.0, 0.0, 80.0, 30.0));
    let mut board = board_with(vec![DrawingElement::Text(original)]);
    board.toggle_fill_dropper();
    assert!(!board.double_click(Point::new(40.0, 15.0)));
    assert!(board.text_editor().is_none());
    // Empty space opens nothing either.
    board.toggle_fill_dropper();
    assert!(!board.double_click(Point::new(400.0, 400.0)));
}

#[test]
fn test_delete_respects_focus() {
    let target = rect(0.0, 0.0, 60.0, 60.0);
    let mut board = board_with(vec![target.clone()]);
    click(&mut board, 30.0, 30.0);
    assert_eq!(board.selected_id(), Some(target.id()));

    assert!(!board.key_down("Delete", KeyFocus::TextInput));
    assert!(!board.key_down("Backspace", KeyFocus::TextInput));
    assert_eq!(board.store().snapshot().len(), 1);

    assert!(board.key_down("Delete", KeyFocus::Canvas));
    assert!(board.store().snapshot().is_empty());
    assert!(board.selected_id().is_none());
}

#[test]
fn test_shortcuts_switch_tools() {
    let mut board = board_with(vec![]);
    assert!(board.key_down("R", KeyFocus::Canvas));
    assert_eq!(board.tool(), ToolKind::Rect);
    assert!(!board.key_down("p", KeyFocus::TextInput));
    assert_eq!(board.tool(), ToolKind::Rect);
    assert!(board.key_down("1", KeyFocus::Canvas));
    assert_eq!(board.tool(), ToolKind::Select);
    assert!(!board.key_down("z", KeyFocus::Canvas));
}

#[test]
fn test_selecting_adopts_element_style() {
    let element = ShapeElement::new("#10b981", 6.0, Point::new(0.0, 0.0), Point::new(40.0, 40.0));
    let mut board = board_with(vec![DrawingElement::Ellipse(element)]);
    click(&mut board, 20.0, 20.0);
    assert_eq!(board.style().color, "#10b981");
    assert!((board.style().thickness - 6.0).abs() < f64::EPSILON);
}

#[test]
fn test_resize_previews_then_commits() {
    let target = rect(10.0, 10.0, 50.0, 50.0);
    let mut board = board_with(vec![target.clone()]);
    click(&mut board, 30.0, 30.0);
    let revision = board.store().revision();

    board.pointer_down(mouse(50.0, 50.0));
    board.pointer_move(mouse(80.0, 80.0));

    // Live preview only.
    assert_eq!(board.store().revision(), revision);
    assert_rect_close(
        element_bounds(board.elements().get(target.id()).unwrap()).unwrap(),
        Rect::new(10.0, 10.0, 80.0, 80.0),
    );

    board.pointer_up(mouse(80.0, 80.0));
    assert_eq!(board.store().revision(), revision + 1);
    let stored = board.store().snapshot();
    assert_rect_close(
        element_bounds(stored.get(target.id()).unwrap()).unwrap(),
        Rect::new(10.0, 10.0, 80.0, 80.0),
    );
}

#[test]
fn test_resize_from_nw_handle() {
    let target = rect(10.0, 10.0, 50.0, 50.0);
    let mut board = board_with(vec![target.clone()]);
    click(&mut board, 30.0, 30.0);
    board.pointer_down(mouse(10.0, 10.0));
    board.pointer_move(mouse(0.0, 0.0));
    board.pointer_up(mouse(0.0, 0.0));
    assert_rect_close(
        element_bounds(board.store().snapshot().get(target.id()).unwrap()).unwrap(),
        Rect::new(0.0, 0.0, 50.0, 50.0),
    );
}

#[test]
fn test_move_commits_once_on_release() {
    let target = rect(0.0, 0.0, 40.0, 40.0);
    let mut board = board_with(vec![target.clone()]);
    board.pointer_down(mouse(20.0, 20.0));
    board.pointer_move(mouse(25.0, 20.0));
    board.pointer_move(mouse(30.0, 30.0));
    assert_eq!(board.store().revision(), 0);

    board.pointer_up(mouse(30.0, 30.0));
    assert_eq!(board.store().revision(), 1);
    assert_rect_close(
        element_bounds(board.store().snapshot().get(target.id()).unwrap()).unwrap(),
        Rect::new(10.0, 10.0, 50.0, 50.0),
    );
}

#[test]
fn test_pen_stroke_commits() {
    let mut board = board_with(vec![]);
    board.set_tool(ToolKind::Pen);
    board.pointer_down(PointerInput::pen(7, Point::new(0.0, 0.0), 0.5, 0.0));
    board.pointer_move(PointerInput::pen(7, Point::new(10.0, 0.0), 0.6, 16.0));
    board.pointer_move(PointerInput::pen(7, Point::new(20.0, 5.0), 0.7, 32.0));
    assert_eq!(board.pointer_up(PointerInput::pen(7, Point::new(20.0, 5.0), 0.0, 40.0)), PointerResponse::release(7));

    let snapshot = board.store().snapshot();
    let pen = snapshot.iter().next().and_then(DrawingElement::as_pen).unwrap();
    assert_eq!(pen.points.len(), 3);
    assert_eq!(board.tool(), ToolKind::Select);
}

#[test]
fn test_single_tap_pen_commits_a_dot() {
    let mut board = board_with(vec![]);
    board.set_tool(ToolKind::Pen);
    click(&mut board, 5.0, 5.0);
    let snapshot = board.store().snapshot();
    assert_eq!(snapshot.iter().next().and_then(DrawingElement::as_pen).map(|p| p.points.len()), Some(1));
}

#[test]
fn test_remote_delete_mid_drag() {
    init();
    let target = rect(0.0, 0.0, 40.0, 40.0);
    let store = MemoryStore::with_elements(vec![target.clone()].into());
    let mut remote = store.clone();
    let mut board = Whiteboard::with_default_config(store);

    board.pointer_down(mouse(20.0, 20.0));
    board.pointer_move(mouse(25.0, 25.0));

    let mut next = remote.snapshot();
    next.remove(target.id());
    remote.update(next).unwrap();

    board.pointer_move(mouse(30.0, 30.0));
    assert!(board.elements().is_empty());
    assert!(board.selected_id().is_none());
    assert_eq!(board.pointer_up(mouse(30.0, 30.0)), PointerResponse::release(1));
    assert!(board.store().snapshot().is_empty());
}

#[test]
fn test_remote_delete_clears_selection() {
    init();
    let target = rect(0.0, 0.0, 40.0, 40.0);
    let store = MemoryStore::with_elements(vec![target.clone()].into());
    let mut remote = store.clone();
    let mut board = Whiteboard::with_default_config(store);
    click(&mut board, 20.0, 20.0);

    remote.update(Default::default()).unwrap();
    assert!(board.sync_from_store());
    assert!(board.selected_id().is_none());
    // Nothing left to delete, so no further write reaches the store.
    assert!(board.key_down("Delete", KeyFocus::Canvas));
    assert_eq!(board.store().revision(), 1);
}

#[test]
fn test_fill_dropper_is_one_shot() {
    let target = rect(0.0, 0.0, 60.0, 60.0);
    let line = DrawingElement::Line(ShapeElement::new("#111827", 2.0, Point::new(100.0, 0.0), Point::new(200.0, 0.0)));
    let mut board = board_with(vec![target.clone(), line]);

    board.set_color("#ef4444");
    board.toggle_fill_dropper();
    assert!(board.fill_dropper_active());
    assert_eq!(board.cursor(), CursorHint::Cell);

    // Lines are not fillable; the dropper stays armed.
    assert_eq!(board.pointer_down(mouse(150.0, 0.0)), PointerResponse::none());
    assert!(board.fill_dropper_active());

    board.pointer_down(mouse(30.0, 30.0));
    assert!(!board.fill_dropper_active());
    assert_eq!(board.selected_id(), Some(target.id()));
    let snapshot = board.store().snapshot();
    let (_, shape) = snapshot.get(target.id()).and_then(DrawingElement::as_shape).unwrap();
    assert_eq!(shape.fill.as_deref(), Some("rgba(239, 68, 68, 0.2)"));
}

#[test]
fn test_clear_canvas() {
    let mut board = board_with(vec![rect(0.0, 0.0, 10.0, 10.0), rect(20.0, 20.0, 30.0, 30.0)]);
    click(&mut board, 5.0, 5.0);
    board.clear_canvas();
    assert!(board.store().snapshot().is_empty());
    assert!(board.elements().is_empty());
    assert!(board.selected_id().is_none());
}

#[test]
fn test_hover_shows_resize_cursor() {
    let target = rect(10.0, 10.0, 50.0, 50.0);
    let mut board = board_with(vec![target]);
    click(&mut board, 30.0, 30.0);

    board.pointer_move(mouse(51.0, 49.0));
    assert_eq!(board.cursor(), CursorHint::NwseResize);
    board.pointer_move(mouse(30.0, 11.0));
    assert_eq!(board.cursor(), CursorHint::NsResize);
    board.pointer_move(mouse(30.0, 30.0));
    assert_eq!(board.cursor(), CursorHint::Default);
}

#[test]
fn test_pointer_cancel_commits_like_up() {
    let mut board = board_with(vec![]);
    board.set_tool(ToolKind::Ellipse);
    board.pointer_down(mouse(0.0, 0.0));
    board.pointer_move(mouse(40.0, 30.0));
    assert_eq!(board.pointer_cancel(mouse(40.0, 30.0)), PointerResponse::release(1));
    assert_eq!(board.store().snapshot().len(), 1);
    assert!(board.pointer_state().is_none());
}

#[test]
fn test_crdt_peers_converge_through_boards() {
    init();
    let mut alice = Whiteboard::with_default_config(CrdtStore::new());
    alice.set_tool(ToolKind::Rect);
    alice.pointer_down(mouse(0.0, 0.0));
    alice.pointer_move(mouse(30.0, 30.0));
    alice.pointer_up(mouse(30.0, 30.0));
    assert_eq!(alice.elements().len(), 1);

    let snapshot = alice.store().export_snapshot().unwrap();
    let mut bob = Whiteboard::with_default_config(CrdtStore::from_snapshot(&snapshot).unwrap());
    assert_eq!(bob.elements(), alice.elements());

    let since = bob.store().version();
    bob.set_tool(ToolKind::Diamond);
    bob.pointer_down(mouse(100.0, 100.0));
    bob.pointer_move(mouse(140.0, 160.0));
    bob.pointer_up(mouse(140.0, 160.0));

    let updates = bob.store().export_updates(&since).unwrap();
    alice.store_mut().import(&updates).unwrap();
    assert!(alice.sync_from_store());
    assert_eq!(alice.elements().len(), 2);
    assert_eq!(alice.elements(), bob.elements());
}
