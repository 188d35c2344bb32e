//! Collaborator contract: the annotation store and detector the editor talks to.
//!
//! DESIGN
//! ======
//! The editor core never performs I/O. Everything it needs from outside
//! (the image list, stored boxes, image dimensions, detections) and every
//! save it emits goes through [`AnnotationApi`]. The production
//! implementation is [`http::HttpApi`]; tests use an in-memory mock.

pub mod http;
#[cfg(test)]
pub(crate) mod mock;

use canvas::camera::Size;
use canvas::doc::{Annotation, ImageId};
use serde::Serialize;

/// Default detector confidence threshold.
pub const DEFAULT_CONFIDENCE_THRESH: f64 = 0.35;

/// Prompt sent to closed-vocabulary detectors, which ignore it.
const CLOSED_SET_PROMPT: &str = "detected_object";

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Network-level failure (connect, timeout, body read).
    #[error("request failed: {0}")]
    Request(String),

    /// Non-2xx response. `detail` is the server's message when it sent one.
    #[error("server returned {status}: {detail}")]
    Status { status: u16, detail: String },

    /// Response body did not match the expected shape.
    #[error("failed to parse response: {0}")]
    Parse(String),

    /// Image bytes could not be decoded to read their dimensions.
    #[error("failed to decode image: {0}")]
    ImageDecode(String),

    /// Detection parameters rejected before any request was sent.
    #[error("invalid detection parameters: {0}")]
    InvalidParams(String),

    /// HTTP client construction failed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

/// Detector family run by the collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelType {
    /// Open-vocabulary counting model driven by a text prompt.
    #[default]
    CountGd,
    Yolo,
    RfDetr,
}

impl ModelType {
    fn needs_prompt(self) -> bool {
        matches!(self, Self::CountGd)
    }
}

/// Parameters for one auto-annotation request.
#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
#[serde(default)]
pub struct DetectParams {
    pub model_type: ModelType,
    pub text_prompt: Option<String>,
    pub confidence_thresh: f64,
    /// Uploaded weights file; required by every model except `countgd`.
    pub model_filename: Option<String>,
    pub selected_classes: Option<Vec<u32>>,
    /// Overrides the detector's class name on every returned box.
    pub custom_label: Option<String>,
    /// Sliced inference for small objects in large images.
    pub tiled: bool,
}

impl Default for DetectParams {
    fn default() -> Self {
        Self {
            model_type: ModelType::default(),
            text_prompt: None,
            confidence_thresh: DEFAULT_CONFIDENCE_THRESH,
            model_filename: None,
            selected_classes: None,
            custom_label: None,
            tiled: false,
        }
    }
}

impl DetectParams {
    /// Check the parameters and return the prompt to send.
    ///
    /// # Errors
    ///
    /// `countgd` needs a non-blank prompt; every other model needs a model file.
    pub fn validate(&self) -> Result<String, ApiError> {
        if self.model_type.needs_prompt() {
            return match self.text_prompt.as_deref().map(str::trim) {
                Some(p) if !p.is_empty() => Ok(p.to_owned()),
                _ => Err(ApiError::InvalidParams("countgd requires a text prompt".into())),
            };
        }
        match self.model_filename.as_deref() {
            Some(f) if !f.is_empty() => Ok(CLOSED_SET_PROMPT.to_owned()),
            _ => Err(ApiError::InvalidParams("a model file must be selected".into())),
        }
    }
}

/// Everything the editor needs from the annotation store and detector.
#[async_trait::async_trait]
pub trait AnnotationApi: Send + Sync {
    /// Image identifiers in display order.
    async fn list_images(&self) -> Result<Vec<ImageId>, ApiError>;

    /// Stored boxes for `image`. Unknown images have no boxes.
    async fn load_annotations(&self, image: &ImageId) -> Result<Vec<Annotation>, ApiError>;

    /// Replace the stored boxes for `image` with `boxes`.
    async fn save_annotations(&self, image: &ImageId, boxes: &[Annotation]) -> Result<(), ApiError>;

    /// Natural pixel size of `image`.
    async fn image_size(&self, image: &ImageId) -> Result<Size, ApiError>;

    /// Run the detector on `image`. Returned boxes carry detector ids.
    async fn auto_annotate(&self, image: &ImageId, params: &DetectParams) -> Result<Vec<Annotation>, ApiError>;
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
