//! Input model: tools, modifier keys, mouse buttons, and the drag state machine.
//!
//! This module defines the types consumed by the editor session. `Tool` and
//! `Modifiers` capture the user's intent at the time of a pointer event.
//! `DragState` is the gesture being tracked between pointer-down and
//! pointer-up, carrying everything needed to recompute the live geometry on
//! every move and to finalize it on release.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use crate::camera::Point;
use crate::doc::{BoxId, Rect};
use crate::hit::Handle;

/// Which tool is currently active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tool {
    /// Create, select, move and resize boxes (default).
    #[default]
    Draw,
    /// Primary-button drags pan the view. Boxes are never touched.
    Pan,
}

/// Keyboard/mouse modifier keys held during an event.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default)]
pub struct Modifiers {
    /// Shift key is held.
    pub shift: bool,
    /// Ctrl key is held.
    pub ctrl: bool,
    /// Alt / Option key is held.
    pub alt: bool,
    /// Meta / Command key is held.
    pub meta: bool,
}

impl Modifiers {
    /// Ctrl or Meta: the wheel zooms instead of panning.
    #[must_use]
    pub fn zoom_chord(self) -> bool {
        self.ctrl || self.meta
    }
}

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    /// Left mouse button (or single-finger tap).
    Primary,
    /// Middle mouse button (scroll wheel click).
    Middle,
    /// Right mouse button (or two-finger tap).
    Secondary,
}

/// A keyboard key.
///
/// The inner string holds the key name as reported by the browser (e.g. `"Delete"`, `"ArrowLeft"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key(pub String);

impl Key {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The space bar, reported either by `key` (`" "`) or by `code` (`"Space"`).
    #[must_use]
    pub fn is_space(&self) -> bool {
        self.0 == " " || self.0 == "Space"
    }

    #[must_use]
    pub fn is_delete(&self) -> bool {
        self.0 == "Delete" || self.0 == "Backspace"
    }
}

/// Wheel / trackpad scroll delta.
#[derive(Debug, Clone, Copy)]
pub struct WheelDelta {
    /// Horizontal scroll amount in pixels.
    pub dx: f64,
    /// Vertical scroll amount in pixels (positive = down).
    pub dy: f64,
}

/// Pointer cursor the host should display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cursor {
    #[default]
    Default,
    Pointer,
    Move,
    NwseResize,
    NeswResize,
    Grab,
    Grabbing,
}

impl Cursor {
    /// CSS `cursor` keyword.
    #[must_use]
    pub fn as_css(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Pointer => "pointer",
            Self::Move => "move",
            Self::NwseResize => "nwse-resize",
            Self::NeswResize => "nesw-resize",
            Self::Grab => "grab",
            Self::Grabbing => "grabbing",
        }
    }
}

/// Direction of an image-list navigation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavDirection {
    Previous,
    Next,
}

/// Persistent UI state visible to the renderer.
#[derive(Debug, Clone, Default)]
pub struct UiState {
    /// Currently active tool.
    pub tool: Tool,
    /// Tool to restore when the space bar is released, if Space is held.
    pub held_tool: Option<Tool>,
    /// The id of the currently selected box, if any.
    pub selected_id: Option<BoxId>,
    /// Label applied to new boxes and shown for boxes without one.
    pub active_label: String,
}

/// The gesture in progress between pointer-down and pointer-up.
///
/// Each active variant carries the context needed to recompute the live
/// geometry and to finalize on release. Move and resize keep an immutable
/// snapshot of the box at drag start, so every frame is computed from the
/// snapshot plus the total pointer delta rather than accumulated.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum DragState {
    /// No gesture in progress; waiting for the next pointer-down.
    #[default]
    Idle,
    /// Panning the view. Never touches the box model.
    Panning {
        /// Screen-space position of the previous pointer event.
        last_screen: Point,
    },
    /// Drawing a new box from an anchor corner.
    Creating {
        /// Image-space pointer position at pointer-down.
        anchor: Point,
        /// Image-space pointer position at the latest move.
        current: Point,
    },
    /// Dragging an existing box.
    Moving {
        id: BoxId,
        /// Geometry of the box at drag start.
        anchor_box: Rect,
        /// Image-space pointer position at drag start.
        anchor: Point,
    },
    /// Dragging one corner of an existing box.
    Resizing {
        id: BoxId,
        handle: Handle,
        anchor_box: Rect,
        anchor: Point,
    },
}

impl DragState {
    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Live rectangle of an in-progress create, possibly with negative extents.
    #[must_use]
    pub fn preview(&self) -> Option<Rect> {
        match self {
            Self::Creating { anchor, current } => Some(Rect::spanning(*anchor, *current)),
            _ => None,
        }
    }
}
