//! View transform: pan/zoom state and screen ↔ image coordinate mapping.

#[cfg(test)]
#[path = "camera_test.rs"]
mod camera_test;

use crate::consts::{FIT_PADDING_PX, MAX_SCALE, MIN_SCALE};

/// A point in either screen or image space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Width and height in pixels (natural image size or viewport size).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Center point of a rectangle of this size anchored at the origin.
    #[must_use]
    pub fn center(self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }
}

/// Affine image → screen transform.
///
/// `x` / `y` are the screen position of the image origin, in viewport pixels.
/// `scale` is the uniform zoom factor, always within `[MIN_SCALE, MAX_SCALE]`
/// when changed through the methods below.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct View {
    pub x: f64,
    pub y: f64,
    pub scale: f64,
}

impl Default for View {
    fn default() -> Self {
        Self { x: 0.0, y: 0.0, scale: 1.0 }
    }
}

impl View {
    /// Convert a screen-space point to image coordinates.
    #[must_use]
    pub fn screen_to_image(&self, screen: Point) -> Point {
        Point {
            x: (screen.x - self.x) / self.scale,
            y: (screen.y - self.y) / self.scale,
        }
    }

    /// Convert an image-space point to screen coordinates.
    #[must_use]
    pub fn image_to_screen(&self, image: Point) -> Point {
        Point {
            x: image.x * self.scale + self.x,
            y: image.y * self.scale + self.y,
        }
    }

    /// Image-space length that displays as `screen_px` pixels at the current zoom.
    ///
    /// Every stroke, handle, font and padding size goes through this so that
    /// it stays the same physical size on screen regardless of magnification.
    #[must_use]
    pub fn screen_dist_to_image(&self, screen_px: f64) -> f64 {
        screen_px / self.scale
    }

    /// Change the scale by `delta`, keeping the image point under `anchor` fixed.
    ///
    /// The new scale is clamped to `[MIN_SCALE, MAX_SCALE]`; out-of-range
    /// requests are never rejected.
    pub fn zoom_at(&mut self, anchor: Point, delta: f64) {
        let focus = self.screen_to_image(anchor);
        let scale = clamp_scale(self.scale + delta);
        self.x = anchor.x - focus.x * scale;
        self.y = anchor.y - focus.y * scale;
        self.scale = scale;
    }

    /// Translate by a raw screen-space delta. Scale is unaffected.
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.x += dx;
        self.y += dy;
    }

    /// Fit `image` inside `viewport` (never upscaling past 1:1) and center it.
    #[must_use]
    pub fn fit(image: Size, viewport: Size) -> Self {
        let fit_w = (viewport.width - FIT_PADDING_PX) / image.width;
        let fit_h = (viewport.height - FIT_PADDING_PX) / image.height;
        let scale = clamp_scale(fit_w.min(fit_h).min(1.0));
        Self {
            x: (viewport.width - image.width * scale) / 2.0,
            y: (viewport.height - image.height * scale) / 2.0,
            scale,
        }
    }
}

/// Clamp a zoom factor into the allowed range. NaN collapses to `MIN_SCALE`.
#[must_use]
pub fn clamp_scale(scale: f64) -> f64 {
    if scale.is_nan() {
        return MIN_SCALE;
    }
    scale.clamp(MIN_SCALE, MAX_SCALE)
}
