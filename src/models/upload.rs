//! Pending uploads and their lifecycle.
//!
//! A [`PendingUpload`] never reaches storage itself; it wraps a selected file
//! until the uploader either commits it as a
//! [`PhotoRecord`](crate::models::photo::PhotoRecord) or marks it failed.
//! Every state change goes through [`PendingUpload::apply`].

use crate::models::resource::ResourceHandle;
use bytes::Bytes;
use serde::Serialize;
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// A file handed over by the picker or the drop surface.
#[derive(Clone, Debug)]
pub struct SelectedFile {
    pub name: String,
    pub media_type: String,
    pub bytes: Bytes,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, media_type: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            bytes: bytes.into(),
        }
    }

    /// True when the declared media type is `image/*`.
    pub fn is_image(&self) -> bool {
        self.media_type
            .trim()
            .to_ascii_lowercase()
            .starts_with("image/")
    }
}

#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UploadStatus {
    Pending,
    Uploading,
    Success,
    Error,
}

/// Discrete lifecycle events.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UploadEvent {
    Claimed,
    Progressed(u8),
    Succeeded,
    Failed(String),
}

impl fmt::Display for UploadEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadEvent::Claimed => write!(f, "claimed"),
            UploadEvent::Progressed(p) => write!(f, "progressed to {}%", p),
            UploadEvent::Succeeded => write!(f, "succeeded"),
            UploadEvent::Failed(_) => write!(f, "failed"),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("upload in state {status:?} cannot be {event}")]
pub struct LifecycleError {
    pub status: UploadStatus,
    pub event: UploadEvent,
}

/// A selected file tracked through pending -> uploading -> success | error.
#[derive(Clone, Debug)]
pub struct PendingUpload {
    /// Identity of this entry inside the uploader.
    pub key: Uuid,
    pub file: SelectedFile,
    /// Transient handle used for the preview and, on success, as the photo path.
    pub preview: ResourceHandle,
    /// 0..=100
    pub progress: u8,
    pub status: UploadStatus,
    pub error_message: Option<String>,
}

impl PendingUpload {
    pub fn new(file: SelectedFile, preview: ResourceHandle) -> Self {
        Self {
            key: Uuid::new_v4(),
            file,
            preview,
            progress: 0,
            status: UploadStatus::Pending,
            error_message: None,
        }
    }

    /// Entries a submit may pick up: never-tried or previously failed ones.
    pub fn is_claimable(&self) -> bool {
        matches!(self.status, UploadStatus::Pending | UploadStatus::Error)
    }

    pub fn apply(&mut self, event: UploadEvent) -> Result<(), LifecycleError> {
        match (self.status, event) {
            (UploadStatus::Pending | UploadStatus::Error, UploadEvent::Claimed) => {
                self.status = UploadStatus::Uploading;
                self.error_message = None;
            }
            (UploadStatus::Uploading, UploadEvent::Progressed(progress)) => {
                self.progress = progress.min(100);
            }
            (UploadStatus::Uploading, UploadEvent::Succeeded) => {
                self.status = UploadStatus::Success;
                self.progress = 100;
            }
            (UploadStatus::Uploading, UploadEvent::Failed(message)) => {
                self.status = UploadStatus::Error;
                self.error_message = Some(message);
            }
            (status, event) => return Err(LifecycleError { status, event }),
        }
        Ok(())
    }
}

/// Wire view of a pending upload.
#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct UploadSummary {
    pub key: Uuid,
    pub file_name: String,
    pub media_type: String,
    pub size_bytes: usize,
    pub preview: String,
    pub progress: u8,
    pub status: UploadStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl From<&PendingUpload> for UploadSummary {
    fn from(entry: &PendingUpload) -> Self {
        Self {
            key: entry.key,
            file_name: entry.file.name.clone(),
            media_type: entry.file.media_type.clone(),
            size_bytes: entry.file.bytes.len(),
            preview: entry.preview.locator(),
            progress: entry.progress,
            status: entry.status,
            error_message: entry.error_message.clone(),
        }
    }
}
