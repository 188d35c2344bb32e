//! Box model: annotation records, their identifiers, and the ordered store.
//!
//! This module defines what is drawn over the image (`Annotation`), the
//! canonical identifier types (`BoxId`, `ImageId`), and the runtime store
//! that owns the boxes of the currently loaded image (`BoxStore`).
//!
//! Store order is insertion order. It is also the z-order: the renderer draws
//! front-to-back in sequence and the hit tester scans it in reverse, so the
//! last box is on top.

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::camera::Point;

/// Unique identifier for a box.
///
/// Chosen once at creation and only ever compared as a whole string, so two
/// ids are equal exactly when their text is equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BoxId(String);

impl BoxId {
    /// Wrap an existing identifier (e.g. one read back from storage).
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Allocate a fresh, globally unique identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BoxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of an image as known to the annotation store (its file name).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageId(String);

impl ImageId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Geometry of a box, without identity. Used for drag-start snapshots.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    #[must_use]
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// The rectangle spanning two corners, in whatever order they are given.
    /// Extents may be negative.
    #[must_use]
    pub fn spanning(anchor: Point, corner: Point) -> Self {
        Self::new(anchor.x, anchor.y, corner.x - anchor.x, corner.y - anchor.y)
    }

    /// Same area with a non-negative width and height.
    #[must_use]
    pub fn normalized(self) -> Self {
        let (x, width) = flip_negative(self.x, self.width);
        let (y, height) = flip_negative(self.y, self.height);
        Self { x, y, width, height }
    }
}

fn flip_negative(origin: f64, extent: f64) -> (f64, f64) {
    if extent < 0.0 {
        (origin + extent, -extent)
    } else {
        (origin, extent)
    }
}

/// A labelled, axis-aligned bounding box in image-pixel coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    /// Unique identifier for this box.
    pub id: BoxId,
    /// Left edge in image pixels.
    pub x: f64,
    /// Top edge in image pixels.
    pub y: f64,
    /// Horizontal extent. Non-negative once a drag has been finalized.
    pub width: f64,
    /// Vertical extent. Non-negative once a drag has been finalized.
    pub height: f64,
    /// Class label. May be empty, in which case the active label is shown.
    pub label: String,
    /// Detector confidence, present only on boxes produced by auto-annotation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

impl Annotation {
    /// Create a hand-drawn box with a fresh id.
    #[must_use]
    pub fn new(rect: Rect, label: impl Into<String>) -> Self {
        Self {
            id: BoxId::generate(),
            x: rect.x,
            y: rect.y,
            width: rect.width,
            height: rect.height,
            label: label.into(),
            confidence: None,
        }
    }

    #[must_use]
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    pub fn set_rect(&mut self, rect: Rect) {
        self.x = rect.x;
        self.y = rect.y;
        self.width = rect.width;
        self.height = rect.height;
    }

    /// Flip a negative width or height by moving the origin to the other edge.
    pub fn normalize(&mut self) {
        self.set_rect(self.rect().normalized());
    }

    #[must_use]
    pub fn is_normalized(&self) -> bool {
        self.width >= 0.0 && self.height >= 0.0
    }
}

/// Ordered in-memory store of the boxes for one image.
#[derive(Debug, Clone, Default)]
pub struct BoxStore {
    boxes: Vec<Annotation>,
}

impl BoxStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self { boxes: Vec::new() }
    }

    /// Replace all boxes with a loaded sequence. Loaded boxes are normalized.
    pub fn replace_all(&mut self, boxes: Vec<Annotation>) {
        self.boxes = boxes;
        for b in &mut self.boxes {
            b.normalize();
        }
    }

    /// Append a box on top of all others.
    pub fn push(&mut self, annotation: Annotation) {
        self.boxes.push(annotation);
    }

    #[must_use]
    pub fn get(&self, id: &BoxId) -> Option<&Annotation> {
        self.boxes.iter().find(|b| &b.id == id)
    }

    pub fn get_mut(&mut self, id: &BoxId) -> Option<&mut Annotation> {
        self.boxes.iter_mut().find(|b| &b.id == id)
    }

    #[must_use]
    pub fn contains(&self, id: &BoxId) -> bool {
        self.get(id).is_some()
    }

    /// Remove the box with this id, returning it if it was present.
    pub fn remove(&mut self, id: &BoxId) -> Option<Annotation> {
        let index = self.boxes.iter().position(|b| &b.id == id)?;
        Some(self.boxes.remove(index))
    }

    /// Remove the topmost box.
    pub fn pop(&mut self) -> Option<Annotation> {
        self.boxes.pop()
    }

    pub fn clear(&mut self) {
        self.boxes.clear();
    }

    /// Boxes bottom-to-top.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Annotation> {
        self.boxes.iter()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Annotation] {
        &self.boxes
    }

    /// Owned snapshot of the full sequence, for persistence.
    #[must_use]
    pub fn to_vec(&self) -> Vec<Annotation> {
        self.boxes.clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }
}
