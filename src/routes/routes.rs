//! Defines routes for the gallery session.
//!
//! ## Structure
//! - **Gallery endpoints**
//!   - `GET    /photos`: grid snapshot (photos, likes, lightbox)
//!   - `POST   /photos/refresh`: reload seed + persisted photos
//!   - `DELETE /photos`: clear persisted photos
//!   - `POST   /photos/{id}/like`: toggle like
//!   - `GET    /photos/{id}/download`: download as `fileName`
//!
//! - **Lightbox endpoints**
//!   - `PUT    /lightbox/{id}`: open on a photo
//!   - `POST   /lightbox/{direction}`: `prev` / `next`
//!   - `DELETE /lightbox`: close
//!
//! - **Upload endpoints**
//!   - `GET    /uploads`: pending uploads + aggregate progress
//!   - `POST   /uploads`: select files (multipart `files`)
//!   - `POST   /uploads/submit`: upload everything pending
//!   - `DELETE /uploads/{key}`: remove a pending upload
//!
//! - **Resources**
//!   - `GET    /resources/{handle}`: transient image bytes
//!   - `GET    /placeholder.svg`: demo photo image

use crate::{
    AppState,
    handlers::{
        gallery_handlers::{
            clear_photos, close_lightbox, download_photo, get_resource, list_photos,
            navigate_lightbox, open_lightbox, placeholder, refresh_photos, toggle_like,
        },
        health_handlers::{healthz, readyz},
        upload_handlers::{list_uploads, remove_upload, select_files, submit_uploads},
    },
};
use axum::{
    Router,
    routing::{delete, get, post, put},
};

/// Build and return the router for the gallery session.
///
/// The router carries shared state (`AppState`) to all handlers.
pub fn routes() -> Router<AppState> {
    Router::new()
        // health endpoints (mounted at root)
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Gallery
        .route("/photos", get(list_photos).delete(clear_photos))
        .route("/photos/refresh", post(refresh_photos))
        .route("/photos/{id}/like", post(toggle_like))
        .route("/photos/{id}/download", get(download_photo))
        // Lightbox
        .route("/lightbox", delete(close_lightbox))
        .route("/lightbox/{target}", put(open_lightbox).post(navigate_lightbox))
        // Uploads
        .route("/uploads", get(list_uploads).post(select_files))
        .route("/uploads/submit", post(submit_uploads))
        .route("/uploads/{key}", delete(remove_upload))
        // Resources
        .route("/resources/{handle}", get(get_resource))
        .route("/placeholder.svg", get(placeholder))
}
