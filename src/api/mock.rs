//! In-memory [`AnnotationApi`] for host tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use canvas::camera::Size;
use canvas::doc::{Annotation, ImageId};

use super::{AnnotationApi, ApiError, DetectParams};

#[derive(Default)]
pub(crate) struct MockApi {
    pub images: Vec<(ImageId, Size)>,
    /// Listed images whose bytes cannot be read.
    pub broken: Vec<ImageId>,
    pub stored: Mutex<HashMap<ImageId, Vec<Annotation>>>,
    /// Every save in completion order.
    pub saves: Mutex<Vec<(ImageId, Vec<Annotation>)>>,
    /// Per-call save latency, consumed front to back.
    pub save_delays: Mutex<VecDeque<Duration>>,
    pub detections: Mutex<Vec<Annotation>>,
    pub detect_calls: Mutex<Vec<(ImageId, DetectParams)>>,
    pub fail_saves: bool,
    pub fail_loads: bool,
    pub fail_detect: bool,
}

impl MockApi {
    pub fn with_images(images: &[(&str, f64, f64)]) -> Self {
        Self {
            images: images.iter().map(|&(id, w, h)| (ImageId::new(id), Size::new(w, h))).collect(),
            ..Self::default()
        }
    }

    pub fn store(&self, image: &str, boxes: Vec<Annotation>) {
        self.stored.lock().unwrap().insert(ImageId::new(image), boxes);
    }

    pub fn stored(&self, image: &str) -> Vec<Annotation> {
        self.stored.lock().unwrap().get(&ImageId::new(image)).cloned().unwrap_or_default()
    }

    pub fn save_count(&self) -> usize {
        self.saves.lock().unwrap().len()
    }
}

#[async_trait]
impl AnnotationApi for MockApi {
    async fn list_images(&self) -> Result<Vec<ImageId>, ApiError> {
        Ok(self.images.iter().map(|(id, _)| id.clone()).chain(self.broken.iter().cloned()).collect())
    }

    async fn load_annotations(&self, image: &ImageId) -> Result<Vec<Annotation>, ApiError> {
        if self.fail_loads {
            return Err(ApiError::Request("connection refused".into()));
        }
        Ok(self.stored.lock().unwrap().get(image).cloned().unwrap_or_default())
    }

    async fn save_annotations(&self, image: &ImageId, boxes: &[Annotation]) -> Result<(), ApiError> {
        let delay = self.save_delays.lock().unwrap().pop_front();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_saves {
            return Err(ApiError::Status { status: 500, detail: "disk full".into() });
        }
        self.stored.lock().unwrap().insert(image.clone(), boxes.to_vec());
        self.saves.lock().unwrap().push((image.clone(), boxes.to_vec()));
        Ok(())
    }

    async fn image_size(&self, image: &ImageId) -> Result<Size, ApiError> {
        self.images
            .iter()
            .find(|(id, _)| id == image)
            .map(|(_, size)| *size)
            .ok_or_else(|| ApiError::Status { status: 404, detail: "Image not found".into() })
    }

    async fn auto_annotate(&self, image: &ImageId, params: &DetectParams) -> Result<Vec<Annotation>, ApiError> {
        params.validate()?;
        self.detect_calls.lock().unwrap().push((image.clone(), params.clone()));
        if self.fail_detect {
            return Err(ApiError::Status { status: 500, detail: "model crashed".into() });
        }
        Ok(self.detections.lock().unwrap().clone())
    }
}
