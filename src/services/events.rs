//! Event channel between the uploader and the gallery.

use crate::models::photo::PhotoRecord;
use tokio::sync::broadcast;
use tracing::debug;

const DEFAULT_CAPACITY: usize = 64;

#[derive(Clone, Debug)]
pub enum GalleryEvent {
    /// Records that were just committed to storage, one call per file.
    PhotosCommitted(Vec<PhotoRecord>),
}

/// Publish/subscribe bus. Publishing with no subscribers is fine.
#[derive(Clone, Debug)]
pub struct EventBus {
    tx: broadcast::Sender<GalleryEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn publish(&self, event: GalleryEvent) {
        match self.tx.send(event) {
            Ok(receivers) => debug!("published gallery event to {} subscriber(s)", receivers),
            Err(_) => debug!("published gallery event with no subscribers"),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<GalleryEvent> {
        self.tx.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
