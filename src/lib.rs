//! Wedding photo gallery.
//!
//! Guests select photos, the [`Uploader`] walks each file through a simulated
//! transfer and commits it to a single persisted slot, and the [`Gallery`]
//! reloads the merged seed + persisted set whenever a commit event arrives.
//! The HTTP layer exposes one such session.

pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

use axum::{Router, extract::DefaultBodyLimit};
use config::GalleryTimings;
use services::{
    clock::Clock,
    events::EventBus,
    gallery::Gallery,
    photo_repository::PhotoRepository,
    resources::ResourceStore,
    slot_store::SlotStore,
    transport::{SimulatedTransport, UploadTransport},
    uploader::Uploader,
};
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Everything a request handler can reach.
#[derive(Clone)]
pub struct AppState {
    pub repository: PhotoRepository,
    pub resources: Arc<dyn ResourceStore>,
    pub events: EventBus,
    pub gallery: Gallery,
    pub uploader: Uploader,
}

impl AppState {
    /// Wire the uploader and gallery over shared storage with the simulated transport.
    pub fn new(
        slots: Arc<dyn SlotStore>,
        resources: Arc<dyn ResourceStore>,
        clock: Arc<dyn Clock>,
        timings: GalleryTimings,
    ) -> Self {
        let transport: Arc<dyn UploadTransport> =
            Arc::new(SimulatedTransport::new(clock.clone(), timings.step_delay));
        Self::with_transport(slots, resources, clock, transport, timings)
    }

    pub fn with_transport(
        slots: Arc<dyn SlotStore>,
        resources: Arc<dyn ResourceStore>,
        clock: Arc<dyn Clock>,
        transport: Arc<dyn UploadTransport>,
        timings: GalleryTimings,
    ) -> Self {
        let repository = PhotoRepository::new(slots);
        let events = EventBus::new();
        let gallery = Gallery::new(
            repository.clone(),
            resources.clone(),
            clock.clone(),
            timings.load_delay,
        );
        let uploader = Uploader::new(
            repository.clone(),
            resources.clone(),
            transport,
            clock,
            events.clone(),
            timings.clear_delay,
        );
        Self {
            repository,
            resources,
            events,
            gallery,
            uploader,
        }
    }

    /// Subscribe the gallery to commit events and kick off the first load.
    pub fn start(&self) -> JoinHandle<()> {
        let listener = self.gallery.spawn_refresh_listener(&self.events);
        let gallery = self.gallery.clone();
        tokio::spawn(async move {
            gallery.load().await;
        });
        listener
    }
}

/// The full HTTP application for `state`.
pub fn app(state: AppState, max_upload_bytes: usize) -> Router {
    routes::routes::routes()
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(state)
}
