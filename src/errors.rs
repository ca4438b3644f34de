use crate::services::{
    gallery::GalleryError, photo_repository::RepositoryError, resources::ResourceError,
    uploader::UploadError,
};
use axum::{
    Json,
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

/// A lightweight wrapper for general errors that keeps the message local.
#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    /// Create a new AppError with a specific status and message.
    pub fn new(status: StatusCode, msg: impl Into<String>) -> Self {
        Self {
            status,
            message: msg.into(),
        }
    }

    /// Shortcut for a 500 Internal Server Error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, msg)
    }

    /// Shortcut for 404 Not Found
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, msg)
    }

    /// Shortcut for 400 Bad Request
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, msg)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.message,
            "status": self.status.as_u16()
        }));

        (self.status, body).into_response()
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::internal(err.to_string())
    }
}

impl From<UploadError> for AppError {
    fn from(err: UploadError) -> Self {
        let status = match &err {
            // Surfaced to the guest as a warning, not a failure.
            UploadError::NothingSelected => StatusCode::UNPROCESSABLE_ENTITY,
            UploadError::NotFound(_) => StatusCode::NOT_FOUND,
            UploadError::InFlight(_) | UploadError::AlreadyCommitted(_) => StatusCode::CONFLICT,
            UploadError::Transfer(_)
            | UploadError::Repository(_)
            | UploadError::Resource(_)
            | UploadError::Batch(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        AppError::new(status, err.to_string())
    }
}

impl From<GalleryError> for AppError {
    fn from(err: GalleryError) -> Self {
        match err {
            GalleryError::PhotoNotFound(_) => AppError::not_found(err.to_string()),
            GalleryError::Resource(inner) => inner.into(),
            GalleryError::Repository(inner) => inner.into(),
        }
    }
}

impl From<ResourceError> for AppError {
    fn from(err: ResourceError) -> Self {
        match err {
            ResourceError::NotFound(_) => AppError::not_found(err.to_string()),
            ResourceError::Io(_) => AppError::internal(err.to_string()),
        }
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        AppError::internal(err.to_string())
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        AppError::new(err.status(), err.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn upload_errors_map_to_client_statuses() {
        assert_eq!(
            AppError::from(UploadError::NothingSelected).status,
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            AppError::from(UploadError::InFlight(Uuid::new_v4())).status,
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::from(UploadError::NotFound(Uuid::new_v4())).status,
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn missing_photo_is_not_found() {
        let err = AppError::from(GalleryError::PhotoNotFound("demo9".into()));
        assert_eq!(err.status, StatusCode::NOT_FOUND);
        assert!(err.message.contains("demo9"));
    }
}
