//! Hit-testing against boxes and the selected box's corner handles.
//!
//! All tests run in image space. Handle squares are sized in screen pixels and
//! converted with the current scale, so they stay grabbable at any zoom.

#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::camera::Point;
use crate::consts::HANDLE_SIZE_PX;
use crate::doc::{Annotation, BoxId, BoxStore};
use crate::input::Cursor;

/// One of the four corner handles of a box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handle {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Handle {
    /// Evaluation order for handle tests.
    pub const ALL: [Handle; 4] = [Self::TopLeft, Self::TopRight, Self::BottomLeft, Self::BottomRight];

    /// Image-space position of this corner on `b`.
    #[must_use]
    pub fn position(self, b: &Annotation) -> Point {
        match self {
            Self::TopLeft => Point::new(b.x, b.y),
            Self::TopRight => Point::new(b.x + b.width, b.y),
            Self::BottomLeft => Point::new(b.x, b.y + b.height),
            Self::BottomRight => Point::new(b.x + b.width, b.y + b.height),
        }
    }

    /// Resize cursor shown while hovering this handle.
    #[must_use]
    pub fn cursor(self) -> Cursor {
        match self {
            Self::TopLeft | Self::BottomRight => Cursor::NwseResize,
            Self::TopRight | Self::BottomLeft => Cursor::NeswResize,
        }
    }
}

/// Which part of a box was hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitPart {
    Body,
    Handle(Handle),
}

/// Result of a hit test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hit {
    pub id: BoxId,
    pub part: HitPart,
}

/// First handle of `b` whose square contains `pt`, in [`Handle::ALL`] order.
#[must_use]
pub fn test_handle(pt: Point, b: &Annotation, scale: f64) -> Option<Handle> {
    let half = HANDLE_SIZE_PX / scale / 2.0;
    Handle::ALL.into_iter().find(|h| {
        let c = h.position(b);
        (pt.x - c.x).abs() <= half && (pt.y - c.y).abs() <= half
    })
}

/// Inclusive axis-aligned containment.
#[must_use]
pub fn test_box(pt: Point, b: &Annotation) -> bool {
    pt.x >= b.x && pt.x <= b.x + b.width && pt.y >= b.y && pt.y <= b.y + b.height
}

/// Test what is under `pt`.
///
/// Handles of the selected box win over everything, including other boxes
/// drawn on top of it. Otherwise the topmost box whose body contains the
/// point is returned.
#[must_use]
pub fn hit_test(pt: Point, boxes: &BoxStore, scale: f64, selected: Option<&BoxId>) -> Option<Hit> {
    if let Some(sel) = selected.and_then(|id| boxes.get(id)) {
        if let Some(handle) = test_handle(pt, sel, scale) {
            return Some(Hit { id: sel.id.clone(), part: HitPart::Handle(handle) });
        }
    }

    boxes
        .iter()
        .rev()
        .find(|b| test_box(pt, b))
        .map(|b| Hit { id: b.id.clone(), part: HitPart::Body })
}

/// Cursor hint for an idle pointer at `pt` in draw mode.
#[must_use]
pub fn hover_cursor(pt: Point, boxes: &BoxStore, scale: f64, selected: Option<&BoxId>) -> Cursor {
    if let Some(sel) = selected.and_then(|id| boxes.get(id)) {
        if let Some(handle) = test_handle(pt, sel, scale) {
            return handle.cursor();
        }
        if test_box(pt, sel) {
            return Cursor::Move;
        }
    }
    if boxes.iter().any(|b| test_box(pt, b)) {
        Cursor::Pointer
    } else {
        Cursor::Default
    }
}
