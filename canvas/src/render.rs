//! Rendering: draws the image and the box overlay onto a 2D surface.
//!
//! The renderer works in image space. The view transform is applied once by
//! the host at the container level, so everything here is drawn at 1:1 image
//! pixels and only screen-constant sizes (strokes, handles, label chips) are
//! divided by the current scale.
//!
//! It receives read-only access to the session and produces draw calls. It
//! never mutates state. Fallible surfaces propagate errors through
//! [`Surface::Error`]; the recording [`DisplayList`] cannot fail.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use std::convert::Infallible;

use crate::camera::Size;
use crate::consts::{
    HANDLE_BORDER_PX, HANDLE_SIZE_PX, LABEL_BASELINE_PX, LABEL_CHIP_HEIGHT_PX, LABEL_FONT_PX, LABEL_PADDING_PX,
    PREVIEW_STROKE_WIDTH_PX, SELECTED_STROKE_WIDTH_PX, STROKE_WIDTH_PX,
};
use crate::doc::{Annotation, Rect};
use crate::engine::EditorSession;
use crate::hit::Handle;

const STROKE: &str = "#5cb85c";
const FILL: &str = "rgba(92, 184, 92, 0.2)";
const SELECTED_STROKE: &str = "#ffcc00";
const SELECTED_FILL: &str = "rgba(255, 204, 0, 0.1)";
const HANDLE_FILL: &str = "#fff";
const HANDLE_BORDER: &str = "#000";
const LABEL_TEXT: &str = "#fff";
const SELECTED_LABEL_TEXT: &str = "#000";
const PREVIEW_STROKE: &str = "#007acc";

/// Average glyph advance as a fraction of the font size, for surfaces
/// without real text metrics.
const APPROX_CHAR_WIDTH_EM: f64 = 0.62;

/// A 2D drawing target in image-space coordinates.
pub trait Surface {
    type Error;

    /// Reset the surface to `size` and clear it.
    fn clear(&mut self, size: Size) -> Result<(), Self::Error>;

    /// Draw the loaded image at 1:1 covering `size`.
    fn draw_image(&mut self, size: Size) -> Result<(), Self::Error>;

    fn fill_rect(&mut self, rect: Rect, color: &str) -> Result<(), Self::Error>;

    fn stroke_rect(&mut self, rect: Rect, color: &str, line_width: f64) -> Result<(), Self::Error>;

    /// Advance width of `text` at `font_px`.
    fn measure_text(&mut self, text: &str, font_px: f64) -> Result<f64, Self::Error>;

    /// Draw `text` with its baseline starting at `(x, y)`.
    fn fill_text(&mut self, text: &str, x: f64, y: f64, font_px: f64, color: &str) -> Result<(), Self::Error>;
}

/// Draw the full frame: image, every box in z-order, then the create preview.
///
/// Draws nothing when no image is loaded.
///
/// # Errors
///
/// Returns the first error reported by `surface`.
pub fn draw<S: Surface>(surface: &mut S, session: &EditorSession) -> Result<(), S::Error> {
    let Some(image) = &session.image else {
        return Ok(());
    };
    let scale = session.view.scale;

    // Layer 1: image.
    surface.clear(image.size)?;
    surface.draw_image(image.size)?;

    // Layer 2: boxes, bottom first.
    let selected = session.selection();
    for b in session.boxes.iter() {
        draw_box(surface, b, selected == Some(&b.id), scale, session.active_label())?;
    }

    // Layer 3: live create rectangle.
    if let Some(preview) = session.drag.preview() {
        surface.stroke_rect(preview.normalized(), PREVIEW_STROKE, PREVIEW_STROKE_WIDTH_PX / scale)?;
    }

    Ok(())
}

fn draw_box<S: Surface>(
    surface: &mut S,
    b: &Annotation,
    is_selected: bool,
    scale: f64,
    active_label: &str,
) -> Result<(), S::Error> {
    let (stroke, fill, line_px) = if is_selected {
        (SELECTED_STROKE, SELECTED_FILL, SELECTED_STROKE_WIDTH_PX)
    } else {
        (STROKE, FILL, STROKE_WIDTH_PX)
    };
    let rect = b.rect();
    surface.stroke_rect(rect, stroke, line_px / scale)?;
    surface.fill_rect(rect, fill)?;

    if is_selected {
        draw_handles(surface, b, scale)?;
    }

    draw_label(surface, b, is_selected, scale, active_label)
}

fn draw_handles<S: Surface>(surface: &mut S, b: &Annotation, scale: f64) -> Result<(), S::Error> {
    let side = HANDLE_SIZE_PX / scale;
    let squares = Handle::ALL.map(|h| {
        let c = h.position(b);
        Rect::new(c.x - side / 2.0, c.y - side / 2.0, side, side)
    });
    for sq in squares {
        surface.fill_rect(sq, HANDLE_FILL)?;
    }
    for sq in squares {
        surface.stroke_rect(sq, HANDLE_BORDER, HANDLE_BORDER_PX / scale)?;
    }
    Ok(())
}

fn draw_label<S: Surface>(
    surface: &mut S,
    b: &Annotation,
    is_selected: bool,
    scale: f64,
    active_label: &str,
) -> Result<(), S::Error> {
    let text = if b.label.is_empty() { active_label } else { b.label.as_str() };
    let font_px = LABEL_FONT_PX / scale;
    let pad = LABEL_PADDING_PX / scale;
    let chip_h = LABEL_CHIP_HEIGHT_PX / scale;

    let chip_w = surface.measure_text(text, font_px)? + 2.0 * pad;
    let chip = Rect::new(b.x, b.y - chip_h, chip_w, chip_h);
    let (chip_fill, text_color) = if is_selected {
        (SELECTED_STROKE, SELECTED_LABEL_TEXT)
    } else {
        (STROKE, LABEL_TEXT)
    };

    surface.fill_rect(chip, chip_fill)?;
    surface.fill_text(text, chip.x + pad, chip.y + LABEL_BASELINE_PX / scale, font_px, text_color)
}

/// One recorded draw call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Clear { size: Size },
    Image { size: Size },
    FillRect { rect: Rect, color: String },
    StrokeRect { rect: Rect, color: String, line_width: f64 },
    FillText { text: String, x: f64, y: f64, font_px: f64, color: String },
}

/// Surface that records draw calls instead of rasterizing them.
///
/// Used for headless rendering and for asserting on frame contents.
#[derive(Debug, Clone, Default)]
pub struct DisplayList {
    ops: Vec<DrawOp>,
}

impl DisplayList {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one full frame of `session`.
    #[must_use]
    pub fn record(session: &EditorSession) -> Self {
        let mut list = Self::new();
        match draw(&mut list, session) {
            Ok(()) => list,
            Err(never) => match never {},
        }
    }

    #[must_use]
    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Text of every label drawn, in draw order.
    #[must_use]
    pub fn texts(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::FillText { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl Surface for DisplayList {
    type Error = Infallible;

    fn clear(&mut self, size: Size) -> Result<(), Infallible> {
        self.ops.clear();
        self.ops.push(DrawOp::Clear { size });
        Ok(())
    }

    fn draw_image(&mut self, size: Size) -> Result<(), Infallible> {
        self.ops.push(DrawOp::Image { size });
        Ok(())
    }

    fn fill_rect(&mut self, rect: Rect, color: &str) -> Result<(), Infallible> {
        self.ops.push(DrawOp::FillRect { rect, color: color.to_owned() });
        Ok(())
    }

    fn stroke_rect(&mut self, rect: Rect, color: &str, line_width: f64) -> Result<(), Infallible> {
        self.ops.push(DrawOp::StrokeRect { rect, color: color.to_owned(), line_width });
        Ok(())
    }

    #[allow(clippy::cast_precision_loss)]
    fn measure_text(&mut self, text: &str, font_px: f64) -> Result<f64, Infallible> {
        Ok(text.chars().count() as f64 * APPROX_CHAR_WIDTH_EM * font_px)
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64, font_px: f64, color: &str) -> Result<(), Infallible> {
        self.ops.push(DrawOp::FillText { text: text.to_owned(), x, y, font_px, color: color.to_owned() });
        Ok(())
    }
}
