//! HTTP handlers for the gallery: grid, likes, lightbox, downloads and the
//! transient resources photos point at.

use crate::{
    AppState,
    errors::AppError,
    models::{photo::PhotoRecord, resource::ResourceHandle},
    services::gallery::{Direction, Download, GallerySnapshot},
};
use axum::{
    Json,
    body::Body,
    extract::{Path, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use uuid::Uuid;

const PLACEHOLDER_SVG: &str = concat!(
    r#"<svg xmlns="http://www.w3.org/2000/svg" width="400" height="400" viewBox="0 0 400 400">"#,
    r##"<rect width="400" height="400" fill="#e5e7eb"/>"##,
    r##"<path d="M120 280l60-80 45 55 30-35 45 60z" fill="#9ca3af"/>"##,
    r##"<circle cx="250" cy="150" r="22" fill="#9ca3af"/>"##,
    r#"</svg>"#
);

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeResponse {
    pub id: String,
    pub liked: bool,
}

#[derive(Serialize)]
pub struct LightboxResponse {
    pub lightbox: Option<PhotoRecord>,
}

/// GET `/photos`: current grid, like flags and lightbox focus.
pub async fn list_photos(State(state): State<AppState>) -> Json<GallerySnapshot> {
    Json(state.gallery.snapshot().await)
}

/// POST `/photos/refresh`: reload seed + persisted photos.
pub async fn refresh_photos(State(state): State<AppState>) -> Json<GallerySnapshot> {
    state.gallery.load().await;
    Json(state.gallery.snapshot().await)
}

/// DELETE `/photos`: erase all persisted photos; the seed set remains.
pub async fn clear_photos(State(state): State<AppState>) -> Result<Json<GallerySnapshot>, AppError> {
    state.gallery.clear_all().await?;
    Ok(Json(state.gallery.snapshot().await))
}

/// POST `/photos/{id}/like`: toggle the like flag.
pub async fn toggle_like(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Json<LikeResponse> {
    let liked = state.gallery.toggle_like(&id).await;
    Json(LikeResponse { id, liked })
}

/// GET `/photos/{id}/download`: the photo as an attachment named after `fileName`.
pub async fn download_photo(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    match state.gallery.download(&id).await? {
        Download::Resource {
            file_name,
            resource,
        } => {
            let mut response = Response::new(Body::from(resource.bytes));
            *response.status_mut() = StatusCode::OK;
            set_content_type(response.headers_mut(), &resource.media_type);
            if let Ok(value) = HeaderValue::from_str(&content_disposition(&file_name)) {
                response
                    .headers_mut()
                    .insert(header::CONTENT_DISPOSITION, value);
            }
            Ok(response)
        }
        Download::Redirect { location, .. } => {
            let location = HeaderValue::from_str(&location)
                .map_err(|_| AppError::internal("photo path is not a valid location"))?;
            let mut response = Response::new(Body::empty());
            *response.status_mut() = StatusCode::SEE_OTHER;
            response.headers_mut().insert(header::LOCATION, location);
            Ok(response)
        }
    }
}

/// PUT `/lightbox/{id}`: focus a photo.
pub async fn open_lightbox(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<LightboxResponse>, AppError> {
    let photo = state.gallery.open_lightbox(&id).await?;
    Ok(Json(LightboxResponse {
        lightbox: Some(photo),
    }))
}

/// POST `/lightbox/{direction}`: `prev` or `next`, wrapping around.
pub async fn navigate_lightbox(
    State(state): State<AppState>,
    Path(direction): Path<Direction>,
) -> Json<LightboxResponse> {
    let lightbox = state.gallery.navigate(direction).await;
    Json(LightboxResponse { lightbox })
}

/// DELETE `/lightbox`
pub async fn close_lightbox(State(state): State<AppState>) -> impl IntoResponse {
    state.gallery.close_lightbox().await;
    StatusCode::NO_CONTENT
}

/// GET `/resources/{handle}`: bytes behind a transient resource handle.
pub async fn get_resource(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let resource = state
        .resources
        .resolve(&ResourceHandle::from_uuid(id))
        .await?;

    let mut response = Response::new(Body::from(resource.bytes));
    set_content_type(response.headers_mut(), &resource.media_type);
    Ok(response)
}

/// GET `/placeholder.svg`: image used by the demo photos.
pub async fn placeholder() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, HeaderValue::from_static("image/svg+xml"))],
        PLACEHOLDER_SVG,
    )
}

fn set_content_type(headers: &mut HeaderMap, media_type: &str) {
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_str(media_type)
            .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream")),
    );
}

/// `attachment` disposition with an ASCII fallback name plus the RFC 5987
/// encoded original name.
fn content_disposition(file_name: &str) -> String {
    let fallback: String = file_name
        .chars()
        .map(|c| {
            if (c.is_ascii_graphic() && c != '"' && c != '\\') || c == ' ' {
                c
            } else {
                '_'
            }
        })
        .collect();

    let mut encoded = String::with_capacity(file_name.len() * 3);
    for byte in file_name.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                encoded.push(byte as char)
            }
            _ => encoded.push_str(&format!("%{:02X}", byte)),
        }
    }

    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback, encoded
    )
}
