//! Browser backend: a [`Surface`] over `CanvasRenderingContext2d`.
//!
//! The host sizes the canvas element to the image's natural dimensions and
//! applies the view transform with CSS, so this surface draws in image pixels.

use wasm_bindgen::JsValue;
use web_sys::{CanvasRenderingContext2d, HtmlImageElement};

use crate::camera::Size;
use crate::doc::Rect;
use crate::render::Surface;

/// Label font family.
const FONT_FAMILY: &str = "Inter";

pub struct WebSurface<'a> {
    ctx: &'a CanvasRenderingContext2d,
    image: &'a HtmlImageElement,
}

impl<'a> WebSurface<'a> {
    #[must_use]
    pub fn new(ctx: &'a CanvasRenderingContext2d, image: &'a HtmlImageElement) -> Self {
        Self { ctx, image }
    }

    fn set_font(&self, font_px: f64) {
        self.ctx.set_font(&format!("{font_px}px {FONT_FAMILY}"));
    }
}

impl Surface for WebSurface<'_> {
    type Error = JsValue;

    fn clear(&mut self, size: Size) -> Result<(), JsValue> {
        self.ctx.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)?;
        self.ctx.clear_rect(0.0, 0.0, size.width, size.height);
        Ok(())
    }

    fn draw_image(&mut self, size: Size) -> Result<(), JsValue> {
        self.ctx
            .draw_image_with_html_image_element_and_dw_and_dh(self.image, 0.0, 0.0, size.width, size.height)
    }

    fn fill_rect(&mut self, rect: Rect, color: &str) -> Result<(), JsValue> {
        self.ctx.set_fill_style_str(color);
        self.ctx.fill_rect(rect.x, rect.y, rect.width, rect.height);
        Ok(())
    }

    fn stroke_rect(&mut self, rect: Rect, color: &str, line_width: f64) -> Result<(), JsValue> {
        self.ctx.set_stroke_style_str(color);
        self.ctx.set_line_width(line_width);
        self.ctx.stroke_rect(rect.x, rect.y, rect.width, rect.height);
        Ok(())
    }

    fn measure_text(&mut self, text: &str, font_px: f64) -> Result<f64, JsValue> {
        self.set_font(font_px);
        Ok(self.ctx.measure_text(text)?.width())
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64, font_px: f64, color: &str) -> Result<(), JsValue> {
        self.set_font(font_px);
        self.ctx.set_fill_style_str(color);
        self.ctx.fill_text(text, x, y)
    }
}
