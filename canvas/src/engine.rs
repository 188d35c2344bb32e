//! Editor session: the drag state machine and every operation that mutates
//! the box model or the view.
//!
//! DESIGN
//! ======
//! `EditorSession` bundles everything one loaded image needs (view, boxes,
//! selection, drag state) as a plain value. Nothing is global, so several
//! sessions can coexist in tests.
//!
//! Every operation is synchronous and returns a list of [`Action`]s for the
//! host. The session never performs I/O itself: a finalized mutation shows
//! up as [`Action::Persist`] carrying a full snapshot of the image's boxes,
//! and the host decides how to write it.
//!
//! Failures never escape. A lookup against a box that no longer exists, a
//! pointer event with no image loaded, or a sub-threshold create all resolve
//! to "no state change" plus a debug log line.

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use std::mem;

use tracing::debug;

use crate::camera::{Point, Size, View};
use crate::consts::{MIN_BOX_SIZE_PX, WHEEL_ZOOM_STEP, ZOOM_STEP};
use crate::doc::{Annotation, BoxId, BoxStore, ImageId, Rect};
use crate::hit::{self, Handle, HitPart};
use crate::input::{Button, Cursor, DragState, Key, Modifiers, NavDirection, Tool, UiState, WheelDelta};

/// Actions returned from session operations for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// The box overlay must be redrawn.
    RenderNeeded,
    /// The view transform changed; the host re-applies it to the viewport.
    ViewChanged(View),
    SetCursor(Cursor),
    SelectionChanged(Option<BoxId>),
    /// The active label changed (e.g. synced from a newly selected box).
    ActiveLabelChanged(String),
    /// Save the full box sequence for `image_id`.
    Persist { image_id: ImageId, boxes: Vec<Annotation> },
    /// The user asked for the adjacent image.
    Navigate(NavDirection),
}

/// The image currently shown in the session.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedImage {
    pub id: ImageId,
    /// Natural pixel size.
    pub size: Size,
}

/// All state for one annotation canvas.
#[derive(Debug, Clone, Default)]
pub struct EditorSession {
    pub image: Option<LoadedImage>,
    pub boxes: BoxStore,
    pub view: View,
    pub viewport: Size,
    pub ui: UiState,
    pub drag: DragState,
}

impl EditorSession {
    #[must_use]
    pub fn new(viewport: Size, active_label: impl Into<String>) -> Self {
        Self {
            viewport,
            ui: UiState { active_label: active_label.into(), ..UiState::default() },
            ..Self::default()
        }
    }

    // --- Image lifecycle ---

    /// Make `id` the active image.
    ///
    /// Any drag still in flight is dropped without persisting; callers that
    /// want it kept run [`Self::force_finalize`] first. Selection is cleared,
    /// the box model is replaced and the view is fitted to the viewport.
    pub fn load_image(&mut self, id: ImageId, size: Size, boxes: Vec<Annotation>) -> Vec<Action> {
        let mut actions = Vec::new();
        if !self.drag.is_idle() {
            debug!(image_id = %id, "dropping in-flight drag on image switch");
            self.drag = DragState::Idle;
        }
        if self.ui.selected_id.take().is_some() {
            actions.push(Action::SelectionChanged(None));
        }

        self.boxes.replace_all(boxes);
        self.image = Some(LoadedImage { id, size });
        self.view = View::fit(size, self.viewport);

        actions.push(Action::ViewChanged(self.view));
        actions.push(Action::RenderNeeded);
        actions
    }

    /// Update the viewport size. The view is not refitted.
    pub fn set_viewport(&mut self, viewport: Size) {
        self.viewport = viewport;
    }

    // --- View ---

    /// Fit the image to the viewport.
    pub fn reset_zoom(&mut self) -> Vec<Action> {
        let Some(image) = &self.image else {
            return Vec::new();
        };
        self.view = View::fit(image.size, self.viewport);
        vec![Action::ViewChanged(self.view), Action::RenderNeeded]
    }

    pub fn zoom_in(&mut self) -> Vec<Action> {
        self.zoom_step(ZOOM_STEP)
    }

    pub fn zoom_out(&mut self) -> Vec<Action> {
        self.zoom_step(-ZOOM_STEP)
    }

    /// Zoom by `delta` anchored at the viewport center.
    pub fn zoom_step(&mut self, delta: f64) -> Vec<Action> {
        if self.image.is_none() {
            return Vec::new();
        }
        self.view.zoom_at(self.viewport.center(), delta);
        vec![Action::ViewChanged(self.view), Action::RenderNeeded]
    }

    /// Wheel: zoom at the cursor with Ctrl/Meta held, otherwise pan.
    pub fn on_wheel(&mut self, screen_pt: Point, delta: WheelDelta, modifiers: Modifiers) -> Vec<Action> {
        if self.image.is_none() {
            return Vec::new();
        }
        if modifiers.zoom_chord() {
            let step = if delta.dy > 0.0 {
                -WHEEL_ZOOM_STEP
            } else if delta.dy < 0.0 {
                WHEEL_ZOOM_STEP
            } else {
                return Vec::new();
            };
            self.view.zoom_at(screen_pt, step);
        } else {
            self.view.pan_by(-delta.dx, -delta.dy);
        }
        vec![Action::ViewChanged(self.view), Action::RenderNeeded]
    }

    // --- Tool / label ---

    /// Switch tools. Entering pan mode clears the selection.
    pub fn set_tool(&mut self, tool: Tool) -> Vec<Action> {
        self.ui.tool = tool;
        match tool {
            Tool::Draw => vec![Action::SetCursor(Cursor::Default)],
            Tool::Pan => {
                let mut actions = vec![Action::SetCursor(Cursor::Grab)];
                if self.ui.selected_id.take().is_some() {
                    actions.push(Action::SelectionChanged(None));
                    actions.push(Action::RenderNeeded);
                }
                actions
            }
        }
    }

    /// Set the label for new boxes. A selected box is relabelled and persisted.
    pub fn set_active_label(&mut self, label: impl Into<String>) -> Vec<Action> {
        let label = label.into();
        self.ui.active_label.clone_from(&label);
        let mut actions = vec![Action::ActiveLabelChanged(label.clone())];

        let selected = self.ui.selected_id.as_ref().and_then(|id| self.boxes.get_mut(id));
        if let Some(b) = selected {
            b.label = label;
            actions.extend(self.persist());
            actions.push(Action::RenderNeeded);
        }
        actions
    }

    // --- Pointer input ---

    pub fn on_pointer_down(&mut self, screen_pt: Point, button: Button, _modifiers: Modifiers) -> Vec<Action> {
        if self.image.is_none() || !self.drag.is_idle() {
            return Vec::new();
        }

        if self.ui.tool == Tool::Pan || button == Button::Middle {
            self.drag = DragState::Panning { last_screen: screen_pt };
            return vec![Action::SetCursor(Cursor::Grabbing)];
        }
        if button != Button::Primary {
            return Vec::new();
        }

        let pos = self.view.screen_to_image(screen_pt);
        let hit = hit::hit_test(pos, &self.boxes, self.view.scale, self.ui.selected_id.as_ref());
        let mut actions = Vec::new();

        match hit {
            Some(hit::Hit { id, part: HitPart::Handle(handle) }) => {
                if let Some(b) = self.boxes.get(&id) {
                    debug!(box_id = %id, ?handle, "resize start");
                    self.drag = DragState::Resizing { anchor_box: b.rect(), id, handle, anchor: pos };
                }
            }
            Some(hit::Hit { id, part: HitPart::Body }) => {
                let Some(b) = self.boxes.get(&id) else {
                    return actions;
                };
                let anchor_box = b.rect();
                if !b.label.is_empty() && b.label != self.ui.active_label {
                    self.ui.active_label.clone_from(&b.label);
                    actions.push(Action::ActiveLabelChanged(b.label.clone()));
                }
                if self.ui.selected_id.as_ref() != Some(&id) {
                    self.ui.selected_id = Some(id.clone());
                    actions.push(Action::SelectionChanged(Some(id.clone())));
                }
                debug!(box_id = %id, "move start");
                self.drag = DragState::Moving { id, anchor_box, anchor: pos };
            }
            None => {
                if self.ui.selected_id.take().is_some() {
                    actions.push(Action::SelectionChanged(None));
                }
                self.drag = DragState::Creating { anchor: pos, current: pos };
            }
        }

        actions.push(Action::RenderNeeded);
        actions
    }

    pub fn on_pointer_move(&mut self, screen_pt: Point, _modifiers: Modifiers) -> Vec<Action> {
        if self.image.is_none() {
            return Vec::new();
        }
        let pos = self.view.screen_to_image(screen_pt);

        match &mut self.drag {
            DragState::Idle => {
                let cursor = match self.ui.tool {
                    Tool::Pan => Cursor::Grab,
                    Tool::Draw => hit::hover_cursor(pos, &self.boxes, self.view.scale, self.ui.selected_id.as_ref()),
                };
                vec![Action::SetCursor(cursor)]
            }
            DragState::Panning { last_screen } => {
                self.view.pan_by(screen_pt.x - last_screen.x, screen_pt.y - last_screen.y);
                *last_screen = screen_pt;
                vec![Action::ViewChanged(self.view)]
            }
            DragState::Creating { current, .. } => {
                *current = pos;
                vec![Action::RenderNeeded]
            }
            DragState::Moving { id, anchor_box, anchor } => {
                let Some(b) = self.boxes.get_mut(id) else {
                    debug!(box_id = %id, "move target missing; frame ignored");
                    return Vec::new();
                };
                b.x = anchor_box.x + (pos.x - anchor.x);
                b.y = anchor_box.y + (pos.y - anchor.y);
                vec![Action::RenderNeeded]
            }
            DragState::Resizing { id, handle, anchor_box, anchor } => {
                let Some(b) = self.boxes.get_mut(id) else {
                    debug!(box_id = %id, "resize target missing; frame ignored");
                    return Vec::new();
                };
                b.set_rect(resize_rect(*anchor_box, *handle, pos.x - anchor.x, pos.y - anchor.y));
                vec![Action::RenderNeeded]
            }
        }
    }

    /// Release always finalizes the current drag; there is no cancel path.
    pub fn on_pointer_up(&mut self, screen_pt: Point, _button: Button, _modifiers: Modifiers) -> Vec<Action> {
        if let DragState::Creating { current, .. } = &mut self.drag {
            *current = self.view.screen_to_image(screen_pt);
        }
        self.finalize_drag()
    }

    /// Finalize an in-flight drag as if the pointer were released at its
    /// last known position. No-op when idle.
    pub fn force_finalize(&mut self) -> Vec<Action> {
        self.finalize_drag()
    }

    fn finalize_drag(&mut self) -> Vec<Action> {
        match mem::take(&mut self.drag) {
            DragState::Idle => Vec::new(),
            DragState::Panning { .. } => {
                let cursor = if self.ui.tool == Tool::Pan { Cursor::Grab } else { Cursor::Default };
                vec![Action::SetCursor(cursor)]
            }
            DragState::Creating { anchor, current } => self.finish_create(Rect::spanning(anchor, current)),
            DragState::Moving { id, .. } | DragState::Resizing { id, .. } => {
                let Some(b) = self.boxes.get_mut(&id) else {
                    debug!(box_id = %id, "drag target missing at release");
                    return vec![Action::RenderNeeded];
                };
                b.normalize();
                debug!(box_id = %id, "drag finalized");
                let mut actions = self.persist().into_iter().collect::<Vec<_>>();
                actions.push(Action::RenderNeeded);
                actions
            }
        }
    }

    fn finish_create(&mut self, rect: Rect) -> Vec<Action> {
        let min = self.view.screen_dist_to_image(MIN_BOX_SIZE_PX);
        if rect.width.abs() <= min || rect.height.abs() <= min {
            debug!(width = rect.width, height = rect.height, "create below threshold; discarded");
            return vec![Action::RenderNeeded];
        }

        let annotation = Annotation::new(rect.normalized(), self.ui.active_label.clone());
        let id = annotation.id.clone();
        debug!(box_id = %id, "box created");
        self.boxes.push(annotation);
        self.ui.selected_id = Some(id.clone());

        let mut actions = vec![Action::SelectionChanged(Some(id))];
        actions.extend(self.persist());
        actions.push(Action::RenderNeeded);
        actions
    }

    // --- Keyboard ---

    pub fn on_key_down(&mut self, key: &Key, _modifiers: Modifiers) -> Vec<Action> {
        if key.is_delete() {
            return self.delete_selected();
        }
        if key.is_space() {
            if self.ui.tool == Tool::Pan {
                return Vec::new();
            }
            self.ui.held_tool = Some(self.ui.tool);
            return self.set_tool(Tool::Pan);
        }
        match key.0.as_str() {
            "ArrowLeft" => vec![Action::Navigate(NavDirection::Previous)],
            "ArrowRight" => vec![Action::Navigate(NavDirection::Next)],
            _ => Vec::new(),
        }
    }

    pub fn on_key_up(&mut self, key: &Key, _modifiers: Modifiers) -> Vec<Action> {
        if !key.is_space() {
            return Vec::new();
        }
        match self.ui.held_tool.take() {
            Some(tool) => self.set_tool(tool),
            None => Vec::new(),
        }
    }

    // --- Box model edits ---

    /// Remove the selected box. No-op without a selection or when the
    /// selected id is no longer present.
    pub fn delete_selected(&mut self) -> Vec<Action> {
        let Some(id) = self.ui.selected_id.clone() else {
            return Vec::new();
        };
        if self.boxes.remove(&id).is_none() {
            debug!(box_id = %id, "selected box missing; delete ignored");
            return Vec::new();
        }
        self.ui.selected_id = None;

        let mut actions = vec![Action::SelectionChanged(None)];
        actions.extend(self.persist());
        actions.push(Action::RenderNeeded);
        actions
    }

    /// Delete the selected box, or the topmost one when nothing is selected.
    pub fn delete_last_box(&mut self) -> Vec<Action> {
        if self.ui.selected_id.is_some() {
            return self.delete_selected();
        }
        if self.boxes.pop().is_none() {
            return Vec::new();
        }
        let mut actions = self.persist().into_iter().collect::<Vec<_>>();
        actions.push(Action::RenderNeeded);
        actions
    }

    /// Remove every box of the current image.
    pub fn clear_boxes(&mut self) -> Vec<Action> {
        if self.image.is_none() {
            return Vec::new();
        }
        self.boxes.clear();
        let mut actions = Vec::new();
        if self.ui.selected_id.take().is_some() {
            actions.push(Action::SelectionChanged(None));
        }
        actions.extend(self.persist());
        actions.push(Action::RenderNeeded);
        actions
    }

    /// Append externally detected boxes on top, each with a fresh id.
    pub fn append_detections(&mut self, detections: Vec<Annotation>) -> Vec<Action> {
        if self.image.is_none() || detections.is_empty() {
            return Vec::new();
        }
        for mut b in detections {
            b.id = BoxId::generate();
            b.normalize();
            self.boxes.push(b);
        }
        let mut actions = self.persist().into_iter().collect::<Vec<_>>();
        actions.push(Action::RenderNeeded);
        actions
    }

    fn persist(&self) -> Option<Action> {
        let image = self.image.as_ref()?;
        Some(Action::Persist { image_id: image.id.clone(), boxes: self.boxes.to_vec() })
    }

    // --- Queries ---

    #[must_use]
    pub fn selection(&self) -> Option<&BoxId> {
        self.ui.selected_id.as_ref()
    }

    #[must_use]
    pub fn selected_box(&self) -> Option<&Annotation> {
        self.selection().and_then(|id| self.boxes.get(id))
    }

    #[must_use]
    pub fn image_id(&self) -> Option<&ImageId> {
        self.image.as_ref().map(|i| &i.id)
    }

    #[must_use]
    pub fn active_label(&self) -> &str {
        &self.ui.active_label
    }
}

/// Geometry of a box whose `handle` corner has been dragged by `(dx, dy)`
/// from `anchor`. The opposite corner stays fixed. Extents may go negative.
#[must_use]
pub fn resize_rect(anchor: Rect, handle: Handle, dx: f64, dy: f64) -> Rect {
    let Rect { x, y, width, height } = anchor;
    match handle {
        Handle::TopLeft => Rect::new(x + dx, y + dy, width - dx, height - dy),
        Handle::TopRight => Rect::new(x, y + dy, width + dx, height - dy),
        Handle::BottomLeft => Rect::new(x + dx, y, width - dx, height + dy),
        Handle::BottomRight => Rect::new(x, y, width + dx, height + dy),
    }
}
