//! src/services/gallery.rs
//!
//! Gallery: the merged, sorted view over seed and persisted photos plus the
//! per-session browsing state (likes, lightbox focus).
//!
//! The working set is recomputed on every `load`; nothing here mutates a
//! record. Storage read failures degrade to "no persisted photos" so the
//! gallery always has something to show.

use crate::{
    models::{
        photo::{PhotoRecord, seed_photos},
        resource::{Resource, ResourceHandle},
    },
    services::{
        clock::Clock,
        events::EventBus,
        photo_repository::{PhotoRepository, RepositoryError},
        resources::{ResourceError, ResourceStore},
    },
};
use serde::{Deserialize, Serialize};
use std::{collections::HashSet, sync::Arc, time::Duration};
use thiserror::Error;
use tokio::{
    sync::{
        Mutex,
        broadcast::error::{RecvError, TryRecvError},
    },
    task::JoinHandle,
};
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum GalleryError {
    #[error("photo `{0}` not found")]
    PhotoNotFound(String),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Resource(#[from] ResourceError),
}

pub type GalleryResult<T> = Result<T, GalleryError>;

#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GalleryPhase {
    Loading,
    Loaded,
}

#[derive(Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Prev,
    Next,
}

/// A photo as shown in the grid.
#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct PhotoCard {
    #[serde(flatten)]
    pub photo: PhotoRecord,
    pub liked: bool,
}

#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct GallerySnapshot {
    pub phase: GalleryPhase,
    pub count: usize,
    pub photos: Vec<PhotoCard>,
    pub lightbox: Option<PhotoRecord>,
}

/// What a download resolves to.
#[derive(Clone, Debug)]
pub enum Download {
    /// Bytes held by the resource store.
    Resource { file_name: String, resource: Resource },
    /// A static path the client fetches itself.
    Redirect { file_name: String, location: String },
}

struct GalleryState {
    phase: GalleryPhase,
    photos: Vec<PhotoRecord>,
    liked: HashSet<String>,
    focused: Option<PhotoRecord>,
    generation: u64,
}

struct GalleryInner {
    state: Mutex<GalleryState>,
    repository: PhotoRepository,
    resources: Arc<dyn ResourceStore>,
    clock: Arc<dyn Clock>,
    seed: Vec<PhotoRecord>,
    load_delay: Duration,
}

#[derive(Clone)]
pub struct Gallery {
    inner: Arc<GalleryInner>,
}

impl Gallery {
    pub fn new(
        repository: PhotoRepository,
        resources: Arc<dyn ResourceStore>,
        clock: Arc<dyn Clock>,
        load_delay: Duration,
    ) -> Self {
        Self::with_seed(repository, resources, clock, load_delay, seed_photos())
    }

    pub fn with_seed(
        repository: PhotoRepository,
        resources: Arc<dyn ResourceStore>,
        clock: Arc<dyn Clock>,
        load_delay: Duration,
        seed: Vec<PhotoRecord>,
    ) -> Self {
        Self {
            inner: Arc::new(GalleryInner {
                state: Mutex::new(GalleryState {
                    phase: GalleryPhase::Loading,
                    photos: Vec::new(),
                    liked: HashSet::new(),
                    focused: None,
                    generation: 0,
                }),
                repository,
                resources,
                clock,
                seed,
                load_delay,
            }),
        }
    }

    /// Rebuild the working set: seed + persisted, newest first.
    ///
    /// Only the most recently started load publishes its result; an older one
    /// finishing late is discarded.
    pub async fn load(&self) -> Vec<PhotoRecord> {
        let generation = {
            let mut state = self.inner.state.lock().await;
            state.phase = GalleryPhase::Loading;
            state.generation += 1;
            state.generation
        };

        let persisted = match self.inner.repository.read_all().await {
            Ok(records) => records,
            Err(err) => {
                warn!("could not read persisted photos, showing seed only: {}", err);
                Vec::new()
            }
        };
        let photos = merge_newest_first(&self.inner.seed, persisted);

        self.inner.clock.sleep(self.inner.load_delay).await;

        let mut state = self.inner.state.lock().await;
        if state.generation == generation {
            state.photos = photos.clone();
            state.phase = GalleryPhase::Loaded;
            info!("gallery loaded {} photo(s)", photos.len());
        } else {
            debug!("discarding superseded gallery load {}", generation);
        }
        photos
    }

    pub async fn snapshot(&self) -> GallerySnapshot {
        let state = self.inner.state.lock().await;
        GallerySnapshot {
            phase: state.phase,
            count: state.photos.len(),
            photos: state
                .photos
                .iter()
                .map(|photo| PhotoCard {
                    liked: state.liked.contains(&photo.id),
                    photo: photo.clone(),
                })
                .collect(),
            lightbox: state.focused.clone(),
        }
    }

    /// Flip the like state of `photo_id` and return the new state.
    pub async fn toggle_like(&self, photo_id: &str) -> bool {
        let mut state = self.inner.state.lock().await;
        if state.liked.remove(photo_id) {
            false
        } else {
            state.liked.insert(photo_id.to_string());
            true
        }
    }

    pub async fn is_liked(&self, photo_id: &str) -> bool {
        self.inner.state.lock().await.liked.contains(photo_id)
    }

    pub async fn open_lightbox(&self, photo_id: &str) -> GalleryResult<PhotoRecord> {
        let mut state = self.inner.state.lock().await;
        let photo = state
            .photos
            .iter()
            .find(|p| p.id == photo_id)
            .cloned()
            .ok_or_else(|| GalleryError::PhotoNotFound(photo_id.to_string()))?;
        state.focused = Some(photo.clone());
        Ok(photo)
    }

    pub async fn close_lightbox(&self) {
        self.inner.state.lock().await.focused = None;
    }

    pub async fn focused(&self) -> Option<PhotoRecord> {
        self.inner.state.lock().await.focused.clone()
    }

    /// Move the lightbox to the neighbouring photo, wrapping at both ends.
    ///
    /// No-op when the lightbox is closed. A focused photo that is no longer in
    /// the working set behaves as if it sat just outside it.
    pub async fn navigate(&self, direction: Direction) -> Option<PhotoRecord> {
        let mut state = self.inner.state.lock().await;
        let current_id = state.focused.as_ref()?.id.clone();
        if state.photos.is_empty() {
            state.focused = None;
            return None;
        }

        let position = state.photos.iter().position(|p| p.id == current_id);
        let index = adjacent_index(state.photos.len(), position, direction);
        let next = state.photos[index].clone();
        state.focused = Some(next.clone());
        Some(next)
    }

    /// Erase every persisted photo, release their resources and reload.
    /// Seed photos come back with the reload.
    pub async fn clear_all(&self) -> GalleryResult<Vec<PhotoRecord>> {
        let removed = self.inner.repository.clear().await?;
        info!("cleared {} persisted photo(s)", removed.len());

        for handle in removed
            .iter()
            .filter_map(|photo| ResourceHandle::from_locator(&photo.path))
        {
            if let Err(err) = self.inner.resources.release(&handle).await {
                warn!("failed to release resource {}: {}", handle, err);
            }
        }

        Ok(self.load().await)
    }

    /// Resolve a photo in the working set for saving under its `fileName`.
    pub async fn download(&self, photo_id: &str) -> GalleryResult<Download> {
        let photo = {
            let state = self.inner.state.lock().await;
            state
                .photos
                .iter()
                .find(|p| p.id == photo_id)
                .cloned()
                .ok_or_else(|| GalleryError::PhotoNotFound(photo_id.to_string()))?
        };

        match ResourceHandle::from_locator(&photo.path) {
            Some(handle) => {
                let resource = self.inner.resources.resolve(&handle).await?;
                Ok(Download::Resource {
                    file_name: photo.file_name,
                    resource,
                })
            }
            None => Ok(Download::Redirect {
                file_name: photo.file_name,
                location: photo.path,
            }),
        }
    }

    /// Reload whenever the uploader commits something. Bursts of events
    /// collapse into a single reload.
    pub fn spawn_refresh_listener(&self, events: &EventBus) -> JoinHandle<()> {
        let gallery = self.clone();
        let mut rx = events.subscribe();
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(_) | Err(RecvError::Lagged(_)) => {
                        while let Ok(_) | Err(TryRecvError::Lagged(_)) = rx.try_recv() {}
                        debug!("refresh signal received, reloading gallery");
                        gallery.load().await;
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }
}

/// Seed followed by persisted records, ordered by `uploadedAt` descending.
/// Equal timestamps keep their relative order.
pub fn merge_newest_first(seed: &[PhotoRecord], persisted: Vec<PhotoRecord>) -> Vec<PhotoRecord> {
    let mut photos: Vec<PhotoRecord> = seed.iter().cloned().chain(persisted).collect();
    photos.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at));
    photos
}

/// Index reached from `current` in a set of `len` photos. `current == None`
/// means "not in the set": prev lands on the last photo, next on the first.
pub fn adjacent_index(len: usize, current: Option<usize>, direction: Direction) -> usize {
    match (direction, current) {
        (Direction::Prev, Some(i)) if i > 0 => i - 1,
        (Direction::Prev, _) => len.saturating_sub(1),
        (Direction::Next, Some(i)) if i + 1 < len => i + 1,
        (Direction::Next, _) => 0,
    }
}
