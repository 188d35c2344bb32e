//! Auto-annotation service: detector results merged into the open image.
//!
//! DESIGN
//! ======
//! The detector runs on the collaborator. Its boxes are appended to the
//! session in one step, which yields a single persist of the merged set,
//! and a per-label summary is produced for the operator.

use canvas::doc::{Annotation, ImageId};
use canvas::engine::{Action, EditorSession};
use tracing::info;

use crate::api::{AnnotationApi, ApiError, DetectParams};

/// Result of one detector run.
#[derive(Debug)]
pub struct Outcome {
    /// Actions from appending the detections, for the host to dispatch.
    pub actions: Vec<Action>,
    pub found: usize,
    /// Human-readable counts, e.g. `"3 car, 1 person"`.
    pub summary: String,
}

/// Run the detector on `image` and append its boxes to `session`.
///
/// # Errors
///
/// Returns the collaborator's error unchanged; the session is untouched.
pub async fn run(
    api: &dyn AnnotationApi,
    session: &mut EditorSession,
    image: &ImageId,
    params: &DetectParams,
) -> Result<Outcome, ApiError> {
    info!(%image, model = ?params.model_type, tiled = params.tiled, "auto-annotate: running detector");
    let detections = api.auto_annotate(image, params).await?;

    let found = detections.len();
    let summary = summarize(&detections);
    let actions = session.append_detections(detections);
    info!(%image, found, %summary, "auto-annotate: complete");

    Ok(Outcome { actions, found, summary })
}

/// Count boxes per label in first-seen order.
#[must_use]
pub fn summarize(boxes: &[Annotation]) -> String {
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for b in boxes {
        match counts.iter_mut().find(|(label, _)| *label == b.label.as_str()) {
            Some((_, n)) => *n += 1,
            None => counts.push((b.label.as_str(), 1)),
        }
    }
    if counts.is_empty() {
        return "no objects found".to_owned();
    }
    counts.iter().map(|(label, n)| format!("{n} {label}")).collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
#[path = "autoannotate_test.rs"]
mod tests;
