//! src/services/uploader.rs
//!
//! Uploader: turns selected files into committed photo records.
//!
//! - `select_files` adds image files as pending entries with a preview handle
//! - `remove_file` drops a pending or failed entry
//! - `submit` claims every pending/failed entry, then runs all transfers
//!   concurrently on a spawned task and commits each file on completion.
//!   Dropping the caller's future does not stop the batch.
//!
//! Every entry change is an [`UploadEvent`] applied to the shared state.
//! The state lock is never held across an await.

use crate::{
    models::{
        photo::{PhotoRecord, generate_id},
        resource::ResourceHandle,
        upload::{PendingUpload, SelectedFile, UploadEvent, UploadStatus, UploadSummary},
    },
    services::{
        clock::Clock,
        events::{EventBus, GalleryEvent},
        photo_repository::{PhotoRepository, RepositoryError},
        resources::{ResourceError, ResourceStore},
        transport::{TransferError, UploadTransport, progress_steps},
    },
};
use futures::future::join_all;
use serde::Serialize;
use std::{
    collections::HashSet,
    sync::Arc,
    time::Duration,
};
use thiserror::Error;
use tokio::{sync::Mutex, task::JoinError};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Message shown next to a file whose upload failed.
pub const UPLOAD_FAILED_MESSAGE: &str = "Upload failed";

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("please select at least one photo to upload")]
    NothingSelected,
    #[error("no pending upload with key `{0}`")]
    NotFound(Uuid),
    #[error("upload `{0}` is in progress and cannot be removed")]
    InFlight(Uuid),
    #[error("upload `{0}` is already committed")]
    AlreadyCommitted(Uuid),
    #[error(transparent)]
    Transfer(#[from] TransferError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Resource(#[from] ResourceError),
    #[error("upload batch task failed: {0}")]
    Batch(#[from] JoinError),
}

pub type UploadResult<T> = Result<T, UploadError>;

#[derive(Default)]
struct UploaderState {
    entries: Vec<PendingUpload>,
    batches_in_flight: usize,
    /// Files claimed by the batches since the uploader was last idle.
    claimed: usize,
    /// How many of those have been committed.
    committed: usize,
}

impl UploaderState {
    fn overall_progress(&self) -> u8 {
        if self.claimed == 0 {
            0
        } else {
            (self.committed * 100 / self.claimed) as u8
        }
    }
}

/// Serializable view of the uploader.
#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct UploaderSnapshot {
    pub uploads: Vec<UploadSummary>,
    pub busy: bool,
    /// Share of the files claimed by the in-flight batches that has been
    /// committed, in percent.
    pub overall_progress: u8,
}

#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct FailedUpload {
    pub key: Uuid,
    pub file_name: String,
    pub message: String,
}

/// Outcome of one `submit` once every claimed file has settled.
#[derive(Serialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct SubmitReport {
    pub claimed: usize,
    pub committed: Vec<PhotoRecord>,
    pub failed: Vec<FailedUpload>,
}

struct Claim {
    index: usize,
    key: Uuid,
    file: SelectedFile,
    preview: ResourceHandle,
}

enum Outcome {
    Committed(PhotoRecord),
    Failed(FailedUpload),
}

struct UploaderInner {
    state: Mutex<UploaderState>,
    repository: PhotoRepository,
    resources: Arc<dyn ResourceStore>,
    transport: Arc<dyn UploadTransport>,
    clock: Arc<dyn Clock>,
    events: EventBus,
    clear_delay: Duration,
}

#[derive(Clone)]
pub struct Uploader {
    inner: Arc<UploaderInner>,
}

impl Uploader {
    pub fn new(
        repository: PhotoRepository,
        resources: Arc<dyn ResourceStore>,
        transport: Arc<dyn UploadTransport>,
        clock: Arc<dyn Clock>,
        events: EventBus,
        clear_delay: Duration,
    ) -> Self {
        Self {
            inner: Arc::new(UploaderInner {
                state: Mutex::new(UploaderState::default()),
                repository,
                resources,
                transport,
                clock,
                events,
                clear_delay,
            }),
        }
    }

    pub async fn snapshot(&self) -> UploaderSnapshot {
        let state = self.inner.state.lock().await;
        UploaderSnapshot {
            uploads: state.entries.iter().map(UploadSummary::from).collect(),
            busy: state.batches_in_flight > 0,
            overall_progress: state.overall_progress(),
        }
    }

    /// Add the image files among `files` as pending uploads.
    ///
    /// Anything whose media type is not `image/*` is discarded silently,
    /// whichever surface it came from.
    pub async fn select_files(&self, files: Vec<SelectedFile>) -> UploadResult<Vec<UploadSummary>> {
        let mut accepted = Vec::new();
        for file in files {
            if !file.is_image() {
                debug!(
                    "discarding `{}`: media type `{}` is not an image",
                    file.name, file.media_type
                );
                continue;
            }
            let preview = self
                .inner
                .resources
                .create(&file.media_type, file.bytes.clone())
                .await?;
            accepted.push(PendingUpload::new(file, preview));
        }

        let summaries: Vec<UploadSummary> = accepted.iter().map(UploadSummary::from).collect();
        self.inner.state.lock().await.entries.extend(accepted);
        info!("selected {} photo(s) for upload", summaries.len());
        Ok(summaries)
    }

    /// Remove a pending or failed entry and release its preview.
    pub async fn remove_file(&self, key: Uuid) -> UploadResult<()> {
        let removed = {
            let mut state = self.inner.state.lock().await;
            let position = state
                .entries
                .iter()
                .position(|e| e.key == key)
                .ok_or(UploadError::NotFound(key))?;
            match state.entries[position].status {
                UploadStatus::Uploading => return Err(UploadError::InFlight(key)),
                UploadStatus::Success => return Err(UploadError::AlreadyCommitted(key)),
                UploadStatus::Pending | UploadStatus::Error => state.entries.remove(position),
            }
        };

        self.release_preview(&removed.preview).await;
        debug!("removed `{}` from pending uploads", removed.file.name);
        Ok(())
    }

    /// Upload every pending or failed entry under `uploader_name`.
    ///
    /// Fails only when nothing is selected at all. Individual transfer or
    /// storage failures land on their entry; the report lists both sides.
    /// The settled entries are cleared after the configured delay.
    ///
    /// The batch runs on its own task: if the returned future is dropped, every
    /// claimed entry still settles and the clear still happens.
    pub async fn submit(&self, uploader_name: &str) -> UploadResult<SubmitReport> {
        let claims = {
            let mut state = self.inner.state.lock().await;
            if state.entries.is_empty() {
                warn!("submit with no photos selected");
                return Err(UploadError::NothingSelected);
            }

            let mut claims = Vec::new();
            for (index, entry) in state.entries.iter_mut().enumerate() {
                if entry.is_claimable() && entry.apply(UploadEvent::Claimed).is_ok() {
                    claims.push(Claim {
                        index,
                        key: entry.key,
                        file: entry.file.clone(),
                        preview: entry.preview,
                    });
                }
            }
            if !claims.is_empty() {
                if state.batches_in_flight == 0 {
                    state.claimed = 0;
                    state.committed = 0;
                }
                state.batches_in_flight += 1;
                state.claimed += claims.len();
            }
            claims
        };

        if claims.is_empty() {
            debug!("submit found nothing left to claim");
            return Ok(SubmitReport::default());
        }

        let this = self.clone();
        let uploader_name = uploader_name.to_string();
        let batch = tokio::spawn(async move { this.run_batch(claims, uploader_name).await });
        Ok(batch.await?)
    }

    async fn run_batch(self, claims: Vec<Claim>, uploader_name: String) -> SubmitReport {
        let total = claims.len();
        let batch: Vec<Uuid> = claims.iter().map(|c| c.key).collect();
        info!("uploading {} photo(s) as `{}`", total, uploader_name);

        let outcomes = join_all(
            claims
                .into_iter()
                .map(|claim| self.upload_one(claim, &uploader_name)),
        )
        .await;

        let mut report = SubmitReport {
            claimed: total,
            ..SubmitReport::default()
        };
        for outcome in outcomes {
            match outcome {
                Outcome::Committed(record) => report.committed.push(record),
                Outcome::Failed(failed) => report.failed.push(failed),
            }
        }

        self.inner.state.lock().await.batches_in_flight -= 1;
        info!(
            "upload batch settled: {} committed, {} failed",
            report.committed.len(),
            report.failed.len()
        );

        self.schedule_clear(batch);
        report
    }

    async fn upload_one(&self, claim: Claim, uploader_name: &str) -> Outcome {
        match self.transfer_and_commit(&claim, uploader_name).await {
            Ok(record) => {
                self.apply(claim.key, UploadEvent::Succeeded).await;
                self.inner.state.lock().await.committed += 1;
                info!("committed photo {} ({})", record.id, record.file_name);

                self.inner
                    .events
                    .publish(GalleryEvent::PhotosCommitted(vec![record.clone()]));
                Outcome::Committed(record)
            }
            Err(err) => {
                warn!("upload of `{}` failed: {}", claim.file.name, err);
                self.apply(claim.key, UploadEvent::Failed(UPLOAD_FAILED_MESSAGE.to_string()))
                    .await;
                Outcome::Failed(FailedUpload {
                    key: claim.key,
                    file_name: claim.file.name,
                    message: UPLOAD_FAILED_MESSAGE.to_string(),
                })
            }
        }
    }

    async fn transfer_and_commit(
        &self,
        claim: &Claim,
        uploader_name: &str,
    ) -> UploadResult<PhotoRecord> {
        for progress in progress_steps() {
            self.inner
                .transport
                .transfer_step(&claim.file, progress)
                .await?;
            self.apply(claim.key, UploadEvent::Progressed(progress)).await;
        }

        let now = self.inner.clock.now();
        let record = PhotoRecord::committed(
            generate_id(now, claim.index),
            claim.file.name.clone(),
            uploader_name,
            now,
            claim.preview.locator(),
        );
        Ok(self.inner.repository.append_one(record).await?)
    }

    async fn apply(&self, key: Uuid, event: UploadEvent) {
        let mut state = self.inner.state.lock().await;
        let Some(entry) = state.entries.iter_mut().find(|e| e.key == key) else {
            debug!("dropping event for unknown upload {}", key);
            return;
        };
        if let UploadEvent::Progressed(progress) = event {
            debug!("`{}` at {}%", entry.file.name, progress);
        }
        if let Err(err) = entry.apply(event) {
            warn!("ignoring event for `{}`: {}", entry.file.name, err);
        }
    }

    fn schedule_clear(&self, batch: Vec<Uuid>) {
        let this = self.clone();
        tokio::spawn(async move {
            this.inner.clock.sleep(this.inner.clear_delay).await;
            this.clear_batch(batch).await;
        });
    }

    /// Drop the entries of a settled batch. Failed entries' previews are
    /// released; successful ones now back persisted photos.
    async fn clear_batch(&self, batch: Vec<Uuid>) {
        let batch: HashSet<Uuid> = batch.into_iter().collect();
        let released = {
            let mut state = self.inner.state.lock().await;
            let (cleared, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut state.entries)
                .into_iter()
                .partition(|e| batch.contains(&e.key) && e.status != UploadStatus::Uploading);
            state.entries = kept;
            if state.batches_in_flight == 0 {
                state.claimed = 0;
                state.committed = 0;
            }
            cleared
                .into_iter()
                .filter(|e| e.status != UploadStatus::Success)
                .map(|e| e.preview)
                .collect::<Vec<_>>()
        };

        for handle in &released {
            self.release_preview(handle).await;
        }
        debug!("cleared settled batch of {} upload(s)", batch.len());
    }

    async fn release_preview(&self, handle: &ResourceHandle) {
        if let Err(err) = self.inner.resources.release(handle).await {
            warn!("failed to release preview {}: {}", handle, err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{
        clock::FixedClock,
        photo_repository::PHOTOS_SLOT,
        resources::MemoryResources,
        slot_store::{MemorySlotStore, SlotStore},
        transport::SimulatedTransport,
    };
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};

    const STEP: Duration = Duration::from_millis(200);
    const CLEAR: Duration = Duration::from_millis(2000);

    /// Fails the step at `progress` for files named `file_name`.
    struct FlakyTransport {
        inner: SimulatedTransport,
        file_name: &'static str,
        progress: u8,
    }

    #[async_trait]
    impl UploadTransport for FlakyTransport {
        async fn transfer_step(&self, file: &SelectedFile, progress: u8) -> Result<(), TransferError> {
            self.inner.transfer_step(file, progress).await?;
            if file.name == self.file_name && progress == self.progress {
                return Err(TransferError {
                    file_name: file.name.clone(),
                    progress,
                    reason: "connection reset".into(),
                });
            }
            Ok(())
        }
    }

    struct Fixture {
        uploader: Uploader,
        repository: PhotoRepository,
        resources: Arc<MemoryResources>,
        events: EventBus,
    }

    fn fixture_with(transport: impl FnOnce(Arc<dyn Clock>) -> Arc<dyn UploadTransport>) -> Fixture {
        let clock: Arc<dyn Clock> = Arc::new(FixedClock::new(
            Utc.with_ymd_and_hms(2025, 6, 1, 18, 0, 0).unwrap(),
        ));
        let repository = PhotoRepository::new(Arc::new(MemorySlotStore::new()));
        let resources = Arc::new(MemoryResources::new());
        let events = EventBus::new();
        let uploader = Uploader::new(
            repository.clone(),
            resources.clone(),
            transport(clock.clone()),
            clock,
            events.clone(),
            CLEAR,
        );
        Fixture {
            uploader,
            repository,
            resources,
            events,
        }
    }

    fn fixture() -> Fixture {
        fixture_with(|clock| Arc::new(SimulatedTransport::new(clock, STEP)))
    }

    fn jpeg(name: &str) -> SelectedFile {
        SelectedFile::new(name, "image/jpeg", vec![0xFF, 0xD8, 0xFF])
    }

    #[tokio::test(start_paused = true)]
    async fn selection_keeps_only_images() {
        let fx = fixture();
        let accepted = fx
            .uploader
            .select_files(vec![
                jpeg("a.jpg"),
                SelectedFile::new("notes.txt", "text/plain", b"hi".to_vec()),
                SelectedFile::new("b.png", "image/png", vec![0x89]),
            ])
            .await
            .unwrap();

        assert_eq!(accepted.len(), 2);
        let snapshot = fx.uploader.snapshot().await;
        assert_eq!(snapshot.uploads.len(), 2);
        assert!(snapshot.uploads.iter().all(|u| u.status == UploadStatus::Pending && u.progress == 0));
        assert_eq!(fx.resources.len().await, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn submit_with_nothing_selected_writes_nothing() {
        let fx = fixture();
        let err = fx.uploader.submit("Ada").await.unwrap_err();
        assert!(matches!(err, UploadError::NothingSelected));
        assert!(fx.repository.read_all().await.unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn submit_commits_every_file_and_notifies_once_per_file() {
        let fx = fixture();
        let mut rx = fx.events.subscribe();
        fx.uploader
            .select_files(vec![jpeg("a.jpg"), jpeg("b.jpg")])
            .await
            .unwrap();

        let report = fx.uploader.submit("Ada").await.unwrap();
        assert_eq!(report.claimed, 2);
        assert_eq!(report.committed.len(), 2);
        assert!(report.failed.is_empty());

        let stored = fx.repository.read_all().await.unwrap();
        assert_eq!(stored.len(), 2);
        assert!(stored.iter().all(|p| p.uploader_name == "Ada"));
        assert_ne!(stored[0].id, stored[1].id);

        for _ in 0..2 {
            let GalleryEvent::PhotosCommitted(records) = rx.recv().await.unwrap();
            assert_eq!(records.len(), 1);
        }

        let snapshot = fx.uploader.snapshot().await;
        assert!(snapshot.uploads.iter().all(|u| u.status == UploadStatus::Success && u.progress == 100));
        assert_eq!(snapshot.overall_progress, 100);
        assert!(!snapshot.busy);
    }

    #[tokio::test(start_paused = true)]
    async fn committed_record_points_at_the_preview() {
        let fx = fixture();
        let selected = fx.uploader.select_files(vec![jpeg("a.jpg")]).await.unwrap();
        let report = fx.uploader.submit("   ").await.unwrap();

        let record = &report.committed[0];
        assert_eq!(record.uploader_name, "Guest");
        assert_eq!(record.file_name, "a.jpg");
        assert_eq!(record.path, selected[0].preview);
        assert_eq!(record.id, format!("{}0", record.uploaded_at.timestamp_millis()));
    }

    #[tokio::test(start_paused = true)]
    async fn progress_advances_in_steps_while_uploading() {
        let fx = fixture();
        fx.uploader.select_files(vec![jpeg("a.jpg")]).await.unwrap();

        let uploader = fx.uploader.clone();
        let submit = tokio::spawn(async move { uploader.submit("Ada").await });

        tokio::time::sleep(Duration::from_millis(450)).await;
        let snapshot = fx.uploader.snapshot().await;
        assert!(snapshot.busy);
        assert_eq!(snapshot.uploads[0].status, UploadStatus::Uploading);
        assert_eq!(snapshot.uploads[0].progress, 20);

        submit.await.unwrap().unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn one_failure_does_not_stop_siblings() {
        let fx = fixture_with(|clock| {
            Arc::new(FlakyTransport {
                inner: SimulatedTransport::new(clock, STEP),
                file_name: "bad.jpg",
                progress: 60,
            })
        });
        fx.uploader
            .select_files(vec![jpeg("good.jpg"), jpeg("bad.jpg")])
            .await
            .unwrap();

        let report = fx.uploader.submit("Ada").await.unwrap();
        assert_eq!(report.committed.len(), 1);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].message, UPLOAD_FAILED_MESSAGE);
        assert_eq!(fx.repository.read_all().await.unwrap().len(), 1);

        let snapshot = fx.uploader.snapshot().await;
        let bad = snapshot.uploads.iter().find(|u| u.file_name == "bad.jpg").unwrap();
        assert_eq!(bad.status, UploadStatus::Error);
        assert_eq!(bad.progress, 40);
        assert_eq!(bad.error_message.as_deref(), Some(UPLOAD_FAILED_MESSAGE));
        assert_eq!(snapshot.overall_progress, 50);
        assert!(snapshot
            .uploads
            .iter()
            .all(|u| u.status != UploadStatus::Uploading));
    }

    #[tokio::test(start_paused = true)]
    async fn settled_batch_is_cleared_after_the_delay() {
        let fx = fixture_with(|clock| {
            Arc::new(FlakyTransport {
                inner: SimulatedTransport::new(clock, STEP),
                file_name: "bad.jpg",
                progress: 0,
            })
        });
        fx.uploader
            .select_files(vec![jpeg("good.jpg"), jpeg("bad.jpg")])
            .await
            .unwrap();
        fx.uploader.submit("Ada").await.unwrap();

        assert_eq!(fx.uploader.snapshot().await.uploads.len(), 2);
        tokio::time::sleep(CLEAR + Duration::from_millis(10)).await;

        let snapshot = fx.uploader.snapshot().await;
        assert!(snapshot.uploads.is_empty());
        assert_eq!(snapshot.overall_progress, 0);
        // Only the committed photo's bytes survive.
        assert_eq!(fx.resources.len().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn remove_rules_follow_the_lifecycle() {
        let fx = fixture();
        let selected = fx
            .uploader
            .select_files(vec![jpeg("a.jpg"), jpeg("b.jpg")])
            .await
            .unwrap();

        fx.uploader.remove_file(selected[0].key).await.unwrap();
        assert_eq!(fx.resources.len().await, 1);
        assert!(matches!(
            fx.uploader.remove_file(selected[0].key).await,
            Err(UploadError::NotFound(_))
        ));

        let uploader = fx.uploader.clone();
        let submit = tokio::spawn(async move { uploader.submit("Ada").await });
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(matches!(
            fx.uploader.remove_file(selected[1].key).await,
            Err(UploadError::InFlight(_))
        ));

        submit.await.unwrap().unwrap();
        assert!(matches!(
            fx.uploader.remove_file(selected[1].key).await,
            Err(UploadError::AlreadyCommitted(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn second_submit_only_claims_what_is_left() {
        let fx = fixture();
        fx.uploader.select_files(vec![jpeg("a.jpg")]).await.unwrap();
        fx.uploader.submit("Ada").await.unwrap();

        let report = fx.uploader.submit("Ada").await.unwrap();
        assert_eq!(report.claimed, 0);
        assert_eq!(fx.repository.read_all().await.unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_submit_still_settles_its_batch() {
        let fx = fixture();
        fx.uploader.select_files(vec![jpeg("a.jpg")]).await.unwrap();

        let uploader = fx.uploader.clone();
        let submit = tokio::spawn(async move { uploader.submit("Ada").await });
        tokio::time::sleep(Duration::from_millis(300)).await;
        submit.abort();
        assert!(submit.await.unwrap_err().is_cancelled());

        tokio::time::sleep(Duration::from_millis(1200)).await;
        let snapshot = fx.uploader.snapshot().await;
        assert!(!snapshot.busy);
        assert_eq!(snapshot.uploads[0].status, UploadStatus::Success);
        assert_eq!(fx.repository.read_all().await.unwrap().len(), 1);

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert!(fx.uploader.snapshot().await.uploads.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn overlapping_batches_share_one_progress_figure() {
        let fx = fixture();
        fx.uploader.select_files(vec![jpeg("a.jpg")]).await.unwrap();
        let uploader = fx.uploader.clone();
        let first = tokio::spawn(async move { uploader.submit("Ada").await });

        tokio::time::sleep(Duration::from_millis(100)).await;
        fx.uploader
            .select_files(vec![jpeg("b.jpg"), jpeg("c.jpg")])
            .await
            .unwrap();
        let uploader = fx.uploader.clone();
        let second = tokio::spawn(async move { uploader.submit("Grace").await });

        // First batch has committed its only file; the second is still running.
        tokio::time::sleep(Duration::from_millis(1150)).await;
        let snapshot = fx.uploader.snapshot().await;
        assert!(snapshot.busy);
        assert_eq!(snapshot.overall_progress, 33);

        assert_eq!(first.await.unwrap().unwrap().claimed, 1);
        assert_eq!(second.await.unwrap().unwrap().claimed, 2);
        let snapshot = fx.uploader.snapshot().await;
        assert!(!snapshot.busy);
        assert_eq!(snapshot.overall_progress, 100);
    }

    #[tokio::test(start_paused = true)]
    async fn unreadable_slot_fails_the_file_and_is_left_alone() {
        const CORRUPT: &str = r#"{"not":"an array"}"#;
        let slots = Arc::new(MemorySlotStore::new());
        slots.set(PHOTOS_SLOT, CORRUPT).await.unwrap();
        let clock: Arc<dyn Clock> = Arc::new(FixedClock::new(
            Utc.with_ymd_and_hms(2025, 6, 1, 18, 0, 0).unwrap(),
        ));
        let uploader = Uploader::new(
            PhotoRepository::new(slots.clone()),
            Arc::new(MemoryResources::new()),
            Arc::new(SimulatedTransport::new(clock.clone(), STEP)),
            clock,
            EventBus::new(),
            CLEAR,
        );
        uploader.select_files(vec![jpeg("a.jpg")]).await.unwrap();

        let report = uploader.submit("Ada").await.unwrap();
        assert!(report.committed.is_empty());
        assert_eq!(report.failed.len(), 1);
        assert_eq!(
            uploader.snapshot().await.uploads[0].status,
            UploadStatus::Error
        );
        assert_eq!(slots.get(PHOTOS_SLOT).await.unwrap().as_deref(), Some(CORRUPT));
    }
}
