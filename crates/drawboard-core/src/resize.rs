//! Move and resize transforms applied to elements.

use crate::element::DrawingElement;
use crate::geometry::{element_bounds, scale_element_to_bounds};
use crate::hit_test::ResizeHandle;
use kurbo::{Point, Rect};

/// Translate every coordinate of an element.
pub fn move_element(element: &DrawingElement, dx: f64, dy: f64) -> DrawingElement {
    let mut moved = element.clone();
    match &mut moved {
        DrawingElement::Pen(pen) => {
            for point in &mut pen.points {
                point.x += dx;
                point.y += dy;
            }
        }
        DrawingElement::Text(text) => {
            text.x1 += dx;
            text.y1 += dy;
            text.x2 += dx;
            text.y2 += dy;
        }
        DrawingElement::Line(shape)
        | DrawingElement::Arrow(shape)
        | DrawingElement::Rect(shape)
        | DrawingElement::Ellipse(shape)
        | DrawingElement::Diamond(shape) => {
            shape.x1 += dx;
            shape.y1 += dy;
            shape.x2 += dx;
            shape.y2 += dy;
        }
    }
    moved
}

/// Recompute `origin` as if `handle` had been dragged to `pointer`.
///
/// `start`/`end` relocate one endpoint of a line or arrow. Compass handles
/// move the matching edges of the original bounds and remap every coordinate
/// into the new box, so strokes and shapes scale uniformly. Dragging past the
/// opposite edge mirrors the element. Handles that make no sense for the
/// element (or an empty stroke) leave it unchanged.
pub fn resize_element_from_handle(
    origin: &DrawingElement,
    handle: ResizeHandle,
    pointer: Point,
) -> DrawingElement {
    if matches!(handle, ResizeHandle::Start | ResizeHandle::End) {
        let mut resized = origin.clone();
        if let DrawingElement::Line(shape) | DrawingElement::Arrow(shape) = &mut resized {
            if handle == ResizeHandle::Start {
                shape.x1 = pointer.x;
                shape.y1 = pointer.y;
            } else {
                shape.x2 = pointer.x;
                shape.y2 = pointer.y;
            }
        }
        return resized;
    }

    let Some(from) = element_bounds(origin) else {
        return origin.clone();
    };
    let mut to = from;
    match handle {
        ResizeHandle::N => to.y0 = pointer.y,
        ResizeHandle::Ne => {
            to.y0 = pointer.y;
            to.x1 = pointer.x;
        }
        ResizeHandle::E => to.x1 = pointer.x,
        ResizeHandle::Se => {
            to.x1 = pointer.x;
            to.y1 = pointer.y;
        }
        ResizeHandle::S => to.y1 = pointer.y,
        ResizeHandle::Sw => {
            to.x0 = pointer.x;
            to.y1 = pointer.y;
        }
        ResizeHandle::W => to.x0 = pointer.x,
        ResizeHandle::Nw => {
            to.x0 = pointer.x;
            to.y0 = pointer.y;
        }
        ResizeHandle::Start | ResizeHandle::End => {}
    }
    scale_element_to_bounds(origin, from, Rect::new(to.x0, to.y0, to.x1, to.y1))
}
