//! Workspace: the image list, the open editor session and its plumbing.
//!
//! DESIGN
//! ======
//! The editor core is synchronous and returns [`Action`]s. The workspace is
//! the host side of that contract: it runs a session operation, then
//! dispatches the resulting actions. Snapshots go to the persistence
//! queue, render requests re-record the display list, and navigation
//! requests open the adjacent image.
//!
//! Switching images always finalizes any in-flight drag on the old image
//! and flushes pending saves before the new image's boxes are loaded, so a
//! reload never observes a stale store.

use std::mem;
use std::sync::Arc;

use canvas::camera::Size;
use canvas::doc::ImageId;
use canvas::engine::{Action, EditorSession};
use canvas::input::{Cursor, NavDirection};
use canvas::render::DisplayList;
use tracing::{debug, info, warn};

use crate::api::{AnnotationApi, ApiError, DetectParams};
use crate::config::Config;
use crate::services::autoannotate::{self, Outcome};
use crate::services::persistence::PersistQueue;

#[derive(Debug, thiserror::Error)]
pub enum WorkspaceError {
    /// The collaborator could not list images.
    #[error("failed to list images: {0}")]
    ListImages(#[source] ApiError),

    /// The image could not be opened; the previous image stays open.
    #[error("failed to open {image}: {source}")]
    Open {
        image: ImageId,
        #[source]
        source: ApiError,
    },

    /// An operation needed an open image.
    #[error("no image is open")]
    NoImage,

    /// The detector run failed; no boxes were added.
    #[error("auto-annotation failed: {0}")]
    Detect(#[source] ApiError),
}

pub struct Workspace {
    api: Arc<dyn AnnotationApi>,
    images: Vec<ImageId>,
    current: Option<usize>,
    session: EditorSession,
    queue: PersistQueue,
    frame: DisplayList,
    cursor: Cursor,
    renders: usize,
}

impl Workspace {
    /// Fetch the image list and start with no image open.
    ///
    /// # Errors
    ///
    /// Returns [`WorkspaceError::ListImages`] when the collaborator is unreachable.
    pub async fn connect(api: Arc<dyn AnnotationApi>, config: &Config) -> Result<Self, WorkspaceError> {
        let images = api.list_images().await.map_err(WorkspaceError::ListImages)?;
        info!(count = images.len(), "workspace: image list loaded");
        Ok(Self {
            queue: PersistQueue::new(Arc::clone(&api)),
            api,
            images,
            current: None,
            session: EditorSession::new(config.viewport, config.default_label.clone()),
            frame: DisplayList::new(),
            cursor: Cursor::Default,
            renders: 0,
        })
    }

    // --- Navigation ---

    /// Open the image at `index`. Out-of-range indices are ignored.
    ///
    /// # Errors
    ///
    /// Fails when the image's dimensions cannot be read. Missing or
    /// unreadable annotations are not an error; the image opens empty.
    pub async fn open(&mut self, index: usize) -> Result<(), WorkspaceError> {
        let Some(image) = self.images.get(index).cloned() else {
            debug!(index, count = self.images.len(), "workspace: open index out of range");
            return Ok(());
        };

        let finalized = self.session.force_finalize();
        self.dispatch(finalized);
        self.queue.flush().await;

        let boxes = self.api.load_annotations(&image).await.unwrap_or_else(|e| {
            warn!(error = %e, %image, "workspace: failed to load annotations; starting empty");
            Vec::new()
        });
        let size = self
            .api
            .image_size(&image)
            .await
            .map_err(|source| WorkspaceError::Open { image: image.clone(), source })?;

        let count = boxes.len();
        let actions = self.session.load_image(image.clone(), size, boxes);
        self.current = Some(index);
        self.dispatch(actions);
        info!(%image, index, boxes = count, "workspace: image opened");
        Ok(())
    }

    /// Open the next image, or the first one when none is open.
    ///
    /// # Errors
    ///
    /// See [`Self::open`].
    pub async fn next(&mut self) -> Result<(), WorkspaceError> {
        self.navigate(NavDirection::Next).await
    }

    /// # Errors
    ///
    /// See [`Self::open`].
    pub async fn previous(&mut self) -> Result<(), WorkspaceError> {
        self.navigate(NavDirection::Previous).await
    }

    async fn navigate(&mut self, direction: NavDirection) -> Result<(), WorkspaceError> {
        let target = match (direction, self.current) {
            (NavDirection::Next, None) => Some(0),
            (NavDirection::Next, Some(i)) => Some(i + 1),
            (NavDirection::Previous, Some(i)) => i.checked_sub(1),
            (NavDirection::Previous, None) => None,
        };
        match target {
            Some(index) => self.open(index).await,
            None => Ok(()),
        }
    }

    // --- Editing ---

    /// Run one session operation and dispatch its actions.
    ///
    /// # Errors
    ///
    /// Only navigation requested by the operation can fail.
    pub async fn apply<F>(&mut self, op: F) -> Result<(), WorkspaceError>
    where
        F: FnOnce(&mut EditorSession) -> Vec<Action>,
    {
        let actions = op(&mut self.session);
        match self.dispatch(actions) {
            Some(direction) => self.navigate(direction).await,
            None => Ok(()),
        }
    }

    /// Resize the headless viewport. The view is not refitted.
    pub fn set_viewport(&mut self, viewport: Size) {
        self.session.set_viewport(viewport);
        self.render();
    }

    /// Run the detector on the open image and merge its boxes.
    ///
    /// # Errors
    ///
    /// [`WorkspaceError::NoImage`] without an open image, otherwise
    /// [`WorkspaceError::Detect`] when the detector call fails.
    pub async fn auto_annotate(&mut self, params: &DetectParams) -> Result<Outcome, WorkspaceError> {
        let image = self.session.image_id().cloned().ok_or(WorkspaceError::NoImage)?;
        let mut outcome = autoannotate::run(self.api.as_ref(), &mut self.session, &image, params)
            .await
            .map_err(|e| {
                warn!(error = %e, %image, "workspace: auto-annotation failed");
                WorkspaceError::Detect(e)
            })?;
        self.dispatch(mem::take(&mut outcome.actions));
        Ok(outcome)
    }

    /// Finalize any drag and wait for every pending save.
    pub async fn flush(&mut self) {
        let finalized = self.session.force_finalize();
        self.dispatch(finalized);
        debug!(pending = self.queue.pending(), "workspace: flushing saves");
        self.queue.flush().await;
    }

    // --- Action dispatch ---

    /// Handle actions in order. Returns the last navigation request, if any,
    /// for the caller to perform once the session borrow is released.
    fn dispatch(&mut self, actions: Vec<Action>) -> Option<NavDirection> {
        let mut navigate = None;
        for action in actions {
            match action {
                Action::Persist { image_id, boxes } => {
                    debug!(%image_id, count = boxes.len(), "workspace: persist queued");
                    self.queue.enqueue(image_id, boxes);
                }
                Action::RenderNeeded => self.render(),
                Action::SetCursor(cursor) => self.cursor = cursor,
                Action::ViewChanged(view) => debug!(x = view.x, y = view.y, scale = view.scale, "workspace: view"),
                Action::SelectionChanged(selected) => {
                    debug!(selected = selected.as_ref().map_or("none", |id| id.as_str()), "workspace: selection");
                }
                Action::ActiveLabelChanged(label) => debug!(%label, "workspace: active label"),
                Action::Navigate(direction) => navigate = Some(direction),
            }
        }
        navigate
    }

    fn render(&mut self) {
        self.frame = DisplayList::record(&self.session);
        self.renders += 1;
    }

    // --- Queries ---

    #[must_use]
    pub fn images(&self) -> &[ImageId] {
        &self.images
    }

    #[must_use]
    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    #[must_use]
    pub fn session(&self) -> &EditorSession {
        &self.session
    }

    /// Display list from the most recent render.
    #[must_use]
    pub fn frame(&self) -> &DisplayList {
        &self.frame
    }

    #[must_use]
    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    #[must_use]
    pub fn render_count(&self) -> usize {
        self.renders
    }
}

#[cfg(test)]
#[path = "workspace_test.rs"]
mod tests;
