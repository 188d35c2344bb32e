//! Persistence service: fire-and-forget saves of box snapshots.
//!
//! DESIGN
//! ======
//! Every finalized mutation hands the queue a full snapshot of one image's
//! boxes. Each snapshot is written by its own spawned task so editing never
//! waits on the network. Tasks are tracked in a `JoinSet` so the host can
//! [`PersistQueue::flush`] before switching images or exiting.
//!
//! ORDERING
//! ========
//! Snapshots get a per-image sequence number at enqueue time. Writes are
//! serialized through one async lock that also guards the ledger of the
//! highest sequence attempted per image. A task whose snapshot is older
//! than one already attempted skips its write, so the stored state for an
//! image is always the most recent snapshot regardless of task scheduling.
//!
//! ERROR HANDLING
//! ==============
//! A failed save is logged and dropped. It is not retried and is not
//! reported back to the editor; the next mutation writes a fresh snapshot.

use std::collections::HashMap;
use std::sync::Arc;

use canvas::doc::{Annotation, ImageId};
use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tracing::{debug, error};

use crate::api::AnnotationApi;

/// Highest sequence number attempted per image.
type Ledger = HashMap<ImageId, u64>;

pub struct PersistQueue {
    api: Arc<dyn AnnotationApi>,
    tasks: JoinSet<()>,
    next_seq: HashMap<ImageId, u64>,
    ledger: Arc<Mutex<Ledger>>,
}

impl PersistQueue {
    #[must_use]
    pub fn new(api: Arc<dyn AnnotationApi>) -> Self {
        Self { api, tasks: JoinSet::new(), next_seq: HashMap::new(), ledger: Arc::new(Mutex::new(Ledger::new())) }
    }

    /// Spawn a save of `boxes` as the new state of `image_id`.
    ///
    /// Must be called from within a tokio runtime. Dropping the queue aborts
    /// saves still in flight; call [`Self::flush`] first.
    pub fn enqueue(&mut self, image_id: ImageId, boxes: Vec<Annotation>) {
        self.reap();

        let seq = self.next_seq.entry(image_id.clone()).or_insert(0);
        *seq += 1;
        let seq = *seq;

        let api = Arc::clone(&self.api);
        let ledger = Arc::clone(&self.ledger);
        self.tasks.spawn(async move {
            // Held across the write: one save in flight at a time.
            let mut attempted = ledger.lock().await;
            if attempted.get(&image_id).is_some_and(|&last| last >= seq) {
                debug!(%image_id, seq, "skipping superseded snapshot");
                return;
            }
            attempted.insert(image_id.clone(), seq);

            if let Err(e) = api.save_annotations(&image_id, &boxes).await {
                error!(error = %e, %image_id, count = boxes.len(), "annotation save failed");
            }
        });
    }

    /// Wait for every outstanding save to finish.
    pub async fn flush(&mut self) {
        while let Some(result) = self.tasks.join_next().await {
            if let Err(e) = result {
                error!(error = %e, "persistence task did not complete");
            }
        }
    }

    /// Saves spawned but not yet joined.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.tasks.len()
    }

    fn reap(&mut self) {
        while let Some(result) = self.tasks.try_join_next() {
            if let Err(e) = result {
                error!(error = %e, "persistence task did not complete");
            }
        }
    }
}

#[cfg(test)]
#[path = "persistence_test.rs"]
mod tests;
