//! HTTP client for the annotation server.
//!
//! Thin wrapper over the server's JSON endpoints. Response parsing lives in
//! pure `parse_*` functions so it can be tested without a server.

use std::io::Cursor;
use std::time::Duration;

use async_trait::async_trait;
use canvas::camera::Size;
use canvas::doc::{Annotation, ImageId};
use reqwest::Url;
use tracing::debug;

use super::{AnnotationApi, ApiError, DetectParams, ModelType};
use crate::config::Timeouts;

// =============================================================================
// CLIENT
// =============================================================================

pub struct HttpApi {
    http: reqwest::Client,
    base: Url,
}

impl HttpApi {
    /// # Errors
    ///
    /// Fails when `base_url` is not an absolute URL or the client cannot be built.
    pub fn new(base_url: &str, timeouts: Timeouts) -> Result<Self, ApiError> {
        let base = Url::parse(base_url).map_err(|e| ApiError::HttpClientBuild(format!("{base_url}: {e}")))?;
        if base.cannot_be_a_base() {
            return Err(ApiError::HttpClientBuild(format!("{base_url}: not a base URL")));
        }
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeouts.request_secs))
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .build()
            .map_err(|e| ApiError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, base })
    }

    /// Base URL joined with percent-encoded path `segments`.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, ApiError> {
        let response = request.send().await.map_err(|e| ApiError::Request(e.to_string()))?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(parse_error(status.as_u16(), &body))
    }

    async fn send_text(&self, request: reqwest::RequestBuilder) -> Result<String, ApiError> {
        self.send(request)
            .await?
            .text()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))
    }
}

#[async_trait]
impl AnnotationApi for HttpApi {
    async fn list_images(&self) -> Result<Vec<ImageId>, ApiError> {
        let text = self.send_text(self.http.get(self.endpoint(&["api", "images"]))).await?;
        parse_image_list(&text)
    }

    async fn load_annotations(&self, image: &ImageId) -> Result<Vec<Annotation>, ApiError> {
        let url = self.endpoint(&["api", "annotations", image.as_str()]);
        let text = self.send_text(self.http.get(url)).await?;
        parse_annotations(&text)
    }

    async fn save_annotations(&self, image: &ImageId, boxes: &[Annotation]) -> Result<(), ApiError> {
        let body = SaveRequest { image_name: image, boxes };
        self.send(self.http.post(self.endpoint(&["api", "annotations"])).json(&body)).await?;
        debug!(image_id = %image, count = boxes.len(), "annotations saved");
        Ok(())
    }

    async fn image_size(&self, image: &ImageId) -> Result<Size, ApiError> {
        let url = self.endpoint(&["images", image.as_str()]);
        let bytes = self
            .send(self.http.get(url))
            .await?
            .bytes()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;
        decode_image_size(&bytes)
    }

    async fn auto_annotate(&self, image: &ImageId, params: &DetectParams) -> Result<Vec<Annotation>, ApiError> {
        let prompt = params.validate()?;
        let body = AutoAnnotateRequest {
            image_name: image,
            text_prompt: &prompt,
            confidence_thresh: params.confidence_thresh,
            model_type: params.model_type,
            model_filename: params.model_filename.as_deref(),
            selected_classes: params.selected_classes.as_deref(),
            custom_label: params.custom_label.as_deref().map(str::trim).filter(|l| !l.is_empty()),
            tiled: params.tiled,
        };
        let text = self
            .send_text(self.http.post(self.endpoint(&["api", "auto_annotate"])).json(&body))
            .await?;
        parse_detections(&text)
    }
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(serde::Serialize)]
struct SaveRequest<'a> {
    image_name: &'a ImageId,
    boxes: &'a [Annotation],
}

#[derive(serde::Serialize)]
struct AutoAnnotateRequest<'a> {
    image_name: &'a ImageId,
    text_prompt: &'a str,
    confidence_thresh: f64,
    model_type: ModelType,
    #[serde(skip_serializing_if = "Option::is_none")]
    model_filename: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    selected_classes: Option<&'a [u32]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    custom_label: Option<&'a str>,
    tiled: bool,
}

#[derive(serde::Deserialize)]
struct ImageList {
    images: Vec<ImageId>,
}

#[derive(serde::Deserialize)]
struct DetectResponse {
    boxes: Vec<Annotation>,
}

#[derive(serde::Deserialize)]
struct ErrorBody {
    detail: serde_json::Value,
}

// =============================================================================
// PARSING
// =============================================================================

fn parse_image_list(json: &str) -> Result<Vec<ImageId>, ApiError> {
    let list: ImageList = serde_json::from_str(json).map_err(|e| ApiError::Parse(e.to_string()))?;
    Ok(list.images)
}

/// A `null` body means the image has never been annotated.
fn parse_annotations(json: &str) -> Result<Vec<Annotation>, ApiError> {
    let boxes: Option<Vec<Annotation>> = serde_json::from_str(json).map_err(|e| ApiError::Parse(e.to_string()))?;
    Ok(boxes.unwrap_or_default())
}

fn parse_detections(json: &str) -> Result<Vec<Annotation>, ApiError> {
    let resp: DetectResponse = serde_json::from_str(json).map_err(|e| ApiError::Parse(e.to_string()))?;
    Ok(resp.boxes)
}

/// Build a status error, preferring the server's `detail` message over the raw body.
fn parse_error(status: u16, body: &str) -> ApiError {
    let detail = match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody { detail: serde_json::Value::String(s) }) => s,
        Ok(ErrorBody { detail }) => detail.to_string(),
        Err(_) if body.trim().is_empty() => "no response body".to_owned(),
        Err(_) => body.trim().to_owned(),
    };
    ApiError::Status { status, detail }
}

fn decode_image_size(bytes: &[u8]) -> Result<Size, ApiError> {
    let (width, height) = image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| ApiError::ImageDecode(e.to_string()))?
        .into_dimensions()
        .map_err(|e| ApiError::ImageDecode(e.to_string()))?;
    Ok(Size::new(f64::from(width), f64::from(height)))
}

#[cfg(test)]
#[path = "http_test.rs"]
mod tests;
