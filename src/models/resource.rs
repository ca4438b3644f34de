//! Handles to transient resources (previews and uploaded image bytes).

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

const LOCATOR_PREFIX: &str = "/resources/";

/// Opaque reference to bytes held by a [`ResourceStore`](crate::services::resources::ResourceStore).
///
/// A handle is only meaningful for the lifetime of the store that issued it.
/// Its locator (`/resources/{uuid}`) is what ends up in a photo's `path`.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct ResourceHandle(Uuid);

impl ResourceHandle {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    pub fn id(&self) -> Uuid {
        self.0
    }

    /// Path under which the handle's bytes can be fetched.
    pub fn locator(&self) -> String {
        format!("{}{}", LOCATOR_PREFIX, self.0)
    }

    /// Recover a handle from a photo path. Static paths yield `None`.
    pub fn from_locator(path: &str) -> Option<Self> {
        path.strip_prefix(LOCATOR_PREFIX)
            .and_then(|rest| Uuid::parse_str(rest).ok())
            .map(Self)
    }
}

impl Default for ResourceHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ResourceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Resolved resource content.
#[derive(Clone, Debug)]
pub struct Resource {
    pub media_type: String,
    pub bytes: Bytes,
}
