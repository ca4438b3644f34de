//! HTTP handlers for the uploader: selection, removal and submission.

use crate::{
    AppState,
    errors::AppError,
    models::upload::{SelectedFile, UploadSummary},
    services::uploader::{SubmitReport, UploaderSnapshot},
};
use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

/// Multipart field carrying selected files.
const FILES_FIELD: &str = "files";

/// Body of `POST /uploads/submit`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitReq {
    #[serde(default)]
    pub uploader_name: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectResponse {
    pub accepted: Vec<UploadSummary>,
    pub discarded: usize,
    pub uploader: UploaderSnapshot,
}

/// GET `/uploads`: pending uploads and aggregate progress.
pub async fn list_uploads(State(state): State<AppState>) -> Json<UploaderSnapshot> {
    Json(state.uploader.snapshot().await)
}

/// POST `/uploads`: add files from a multipart `files` field.
///
/// Parts without a declared content type get one guessed from the file name.
pub async fn select_files(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let mut files = Vec::new();
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILES_FIELD) {
            debug!("skipping multipart field {:?}", field.name());
            continue;
        }
        let name = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| AppError::bad_request("file part is missing a file name"))?;
        let media_type = field
            .content_type()
            .map(str::to_string)
            .unwrap_or_else(|| {
                mime_guess::from_path(&name)
                    .first_or_octet_stream()
                    .essence_str()
                    .to_string()
            });
        let bytes = field.bytes().await?;
        files.push(SelectedFile::new(name, media_type, bytes));
    }

    let offered = files.len();
    let accepted = state.uploader.select_files(files).await?;
    let response = SelectResponse {
        discarded: offered - accepted.len(),
        accepted,
        uploader: state.uploader.snapshot().await,
    };
    Ok((StatusCode::CREATED, Json(response)))
}

/// DELETE `/uploads/{key}`: drop a pending or failed upload.
pub async fn remove_upload(
    State(state): State<AppState>,
    Path(key): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    state.uploader.remove_file(key).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST `/uploads/submit`: upload everything pending as `uploaderName`.
///
/// Responds once every claimed file has settled.
pub async fn submit_uploads(
    State(state): State<AppState>,
    Json(payload): Json<SubmitReq>,
) -> Result<Json<SubmitReport>, AppError> {
    let report = state.uploader.submit(&payload.uploader_name).await?;
    Ok(Json(report))
}
