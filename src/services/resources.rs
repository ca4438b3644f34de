//! src/services/resources.rs
//!
//! Transient resource storage for previews and uploaded image bytes. Handles
//! are created on selection, resolved for display or download, and released
//! explicitly once nothing refers to them anymore.
//!
//! `DiskResources` shards payloads beneath `base_path/{shard}/{shard}/{handle}`.

use crate::models::resource::{Resource, ResourceHandle};
use async_trait::async_trait;
use bytes::Bytes;
use std::{
    collections::HashMap,
    io::{self, ErrorKind},
    path::{Path, PathBuf},
};
use thiserror::Error;
use tokio::{
    fs::{self, File},
    io::AsyncWriteExt,
    sync::Mutex,
};
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("resource `{0}` not found")]
    NotFound(ResourceHandle),
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type ResourceResult<T> = Result<T, ResourceError>;

#[async_trait]
pub trait ResourceStore: Send + Sync {
    async fn create(&self, media_type: &str, bytes: Bytes) -> ResourceResult<ResourceHandle>;

    async fn resolve(&self, handle: &ResourceHandle) -> ResourceResult<Resource>;

    /// Drop the bytes behind `handle`. Releasing twice is not an error.
    async fn release(&self, handle: &ResourceHandle) -> ResourceResult<()>;
}

/// Resources held in memory for the lifetime of the process.
#[derive(Default)]
pub struct MemoryResources {
    entries: Mutex<HashMap<ResourceHandle, Resource>>,
}

impl MemoryResources {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl ResourceStore for MemoryResources {
    async fn create(&self, media_type: &str, bytes: Bytes) -> ResourceResult<ResourceHandle> {
        let handle = ResourceHandle::new();
        let resource = Resource {
            media_type: media_type.to_string(),
            bytes,
        };
        self.entries.lock().await.insert(handle, resource);
        Ok(handle)
    }

    async fn resolve(&self, handle: &ResourceHandle) -> ResourceResult<Resource> {
        self.entries
            .lock()
            .await
            .get(handle)
            .cloned()
            .ok_or(ResourceError::NotFound(*handle))
    }

    async fn release(&self, handle: &ResourceHandle) -> ResourceResult<()> {
        self.entries.lock().await.remove(handle);
        Ok(())
    }
}

/// Resources written to local disk.
///
/// Media types are tracked in memory only, so handles from a previous run no
/// longer resolve even if their file is still on disk.
pub struct DiskResources {
    base_path: PathBuf,
    media_types: Mutex<HashMap<ResourceHandle, String>>,
}

impl DiskResources {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            media_types: Mutex::new(HashMap::new()),
        }
    }

    /// Two-level shard identifiers from MD5(handle), as lowercase hex (00–ff).
    fn shards(handle: &ResourceHandle) -> (String, String) {
        let digest = md5::compute(handle.id().as_bytes());
        (format!("{:02x}", digest[0]), format!("{:02x}", digest[1]))
    }

    fn resource_path(&self, handle: &ResourceHandle) -> PathBuf {
        let (shard_a, shard_b) = Self::shards(handle);
        let mut path = self.base_path.clone();
        path.push(shard_a);
        path.push(shard_b);
        path.push(handle.to_string());
        path
    }

    /// Write through a temp file, fsync, then rename into place.
    async fn write_payload(&self, path: &Path, bytes: &[u8]) -> ResourceResult<()> {
        let parent = path.parent().map(Path::to_path_buf).ok_or_else(|| {
            ResourceError::Io(io::Error::new(
                ErrorKind::Other,
                "resource path missing parent directory",
            ))
        })?;
        fs::create_dir_all(&parent).await?;
        let tmp_path = parent.join(format!(".tmp-{}", Uuid::new_v4()));

        let result = async {
            let mut file = File::create(&tmp_path).await?;
            file.write_all(bytes).await?;
            file.flush().await?;
            file.sync_all().await?;
            fs::rename(&tmp_path, path).await
        }
        .await;

        if let Err(err) = result {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(ResourceError::Io(err));
        }
        Ok(())
    }

    /// Remove empty shard directories up to (not including) `base_path`.
    async fn prune_empty_dirs(&self, start: &Path) {
        let mut current = start.to_path_buf();
        while current.starts_with(&self.base_path) && current != self.base_path {
            match fs::remove_dir(&current).await {
                Ok(_) => match current.parent() {
                    Some(parent) => current = parent.to_path_buf(),
                    None => break,
                },
                Err(err) if err.kind() == ErrorKind::NotFound => break,
                Err(err) if err.kind() == ErrorKind::DirectoryNotEmpty => break,
                Err(err) => {
                    debug!("failed to prune directory {}: {}", current.display(), err);
                    break;
                }
            }
        }
    }
}

#[async_trait]
impl ResourceStore for DiskResources {
    async fn create(&self, media_type: &str, bytes: Bytes) -> ResourceResult<ResourceHandle> {
        let handle = ResourceHandle::new();
        let path = self.resource_path(&handle);
        self.write_payload(&path, &bytes).await?;
        self.media_types
            .lock()
            .await
            .insert(handle, media_type.to_string());
        debug!("stored resource {} ({} bytes)", handle, bytes.len());
        Ok(handle)
    }

    async fn resolve(&self, handle: &ResourceHandle) -> ResourceResult<Resource> {
        let media_type = self
            .media_types
            .lock()
            .await
            .get(handle)
            .cloned()
            .ok_or(ResourceError::NotFound(*handle))?;

        let bytes = fs::read(self.resource_path(handle))
            .await
            .map_err(|err| match err.kind() {
                ErrorKind::NotFound => ResourceError::NotFound(*handle),
                _ => ResourceError::Io(err),
            })?;

        Ok(Resource {
            media_type,
            bytes: Bytes::from(bytes),
        })
    }

    async fn release(&self, handle: &ResourceHandle) -> ResourceResult<()> {
        self.media_types.lock().await.remove(handle);

        let path = self.resource_path(handle);
        match fs::remove_file(&path).await {
            Ok(_) => debug!("released resource {}", handle),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!("resource {} already missing", handle);
            }
            Err(err) => return Err(ResourceError::Io(err)),
        }

        if let Some(parent) = path.parent() {
            self.prune_empty_dirs(parent).await;
        }
        Ok(())
    }
}
