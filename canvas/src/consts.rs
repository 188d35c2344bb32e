//! Shared numeric constants for the canvas crate.
//!
//! Everything suffixed `_PX` is a screen-space size. Divide by the view scale
//! to get the image-space size that keeps it constant on screen.

// ── View ────────────────────────────────────────────────────────

/// Smallest allowed zoom factor.
pub const MIN_SCALE: f64 = 0.1;

/// Largest allowed zoom factor.
pub const MAX_SCALE: f64 = 50.0;

/// Total margin (both sides combined) left around an image on fit-to-window.
pub const FIT_PADDING_PX: f64 = 40.0;

/// Scale delta applied by the zoom-in / zoom-out controls.
pub const ZOOM_STEP: f64 = 0.2;

/// Scale delta applied per wheel notch while Ctrl/Meta is held.
pub const WHEEL_ZOOM_STEP: f64 = 0.1;

// ── Interaction ─────────────────────────────────────────────────

/// Side length of a corner handle square.
pub const HANDLE_SIZE_PX: f64 = 8.0;

/// A created box must be strictly larger than this on both axes.
pub const MIN_BOX_SIZE_PX: f64 = 5.0;

// ── Rendering ───────────────────────────────────────────────────

pub const STROKE_WIDTH_PX: f64 = 2.0;
pub const SELECTED_STROKE_WIDTH_PX: f64 = 3.0;
pub const HANDLE_BORDER_PX: f64 = 1.0;
pub const PREVIEW_STROKE_WIDTH_PX: f64 = 2.0;

/// Label chip font size.
pub const LABEL_FONT_PX: f64 = 14.0;

/// Label chip height; the chip sits this far above the box's top edge.
pub const LABEL_CHIP_HEIGHT_PX: f64 = 20.0;

/// Horizontal text inset inside the label chip (applied on both sides).
pub const LABEL_PADDING_PX: f64 = 5.0;

/// Baseline offset of the label text from the chip's top edge.
pub const LABEL_BASELINE_PX: f64 = 15.0;
