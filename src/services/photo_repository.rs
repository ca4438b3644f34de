//! src/services/photo_repository.rs
//!
//! PhotoRepository: the only owner of the `wedding-photos` slot. The whole
//! collection is stored as one JSON array; every append is a read-modify-write
//! of that array, serialized inside this process by `write_lock`. Writers in
//! other processes are not coordinated: the last full write wins.
//!
//! Entries that do not decode as a [`PhotoRecord`] are skipped on read but kept
//! verbatim on write. A slot that is not a JSON array at all is never
//! overwritten by an append.

use crate::{
    models::photo::PhotoRecord,
    services::slot_store::{SlotError, SlotStore},
};
use serde_json::Value;
use std::{collections::HashSet, sync::Arc};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, warn};

pub const PHOTOS_SLOT: &str = "wedding-photos";

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error(transparent)]
    Slot(#[from] SlotError),
    #[error("failed to serialize photo collection: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("slot `{0}` does not hold a photo array; refusing to overwrite it")]
    Malformed(String),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Raw slot content as last read.
enum SlotContent {
    Missing,
    Entries(Vec<Value>),
    NotAnArray,
}

#[derive(Clone)]
pub struct PhotoRepository {
    slots: Arc<dyn SlotStore>,
    key: String,
    write_lock: Arc<Mutex<()>>,
}

impl PhotoRepository {
    pub fn new(slots: Arc<dyn SlotStore>) -> Self {
        Self::with_slot(slots, PHOTOS_SLOT)
    }

    pub fn with_slot(slots: Arc<dyn SlotStore>, key: impl Into<String>) -> Self {
        Self {
            slots,
            key: key.into(),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// All decodable persisted records in insertion order.
    ///
    /// An absent or unparseable slot reads as an empty collection, and single
    /// entries that fail to decode are skipped. Only a failure of the slot
    /// backend itself is reported.
    pub async fn read_all(&self) -> RepositoryResult<Vec<PhotoRecord>> {
        let entries = match self.read_slot().await? {
            SlotContent::Entries(entries) => entries,
            SlotContent::Missing | SlotContent::NotAnArray => return Ok(Vec::new()),
        };

        let mut records = Vec::with_capacity(entries.len());
        for (position, entry) in entries.into_iter().enumerate() {
            match serde_json::from_value::<PhotoRecord>(entry) {
                Ok(record) => records.push(record),
                Err(err) => warn!(
                    "skipping malformed entry {} in slot `{}`: {}",
                    position, self.key, err
                ),
            }
        }
        Ok(records)
    }

    /// Append `records` and return them as committed.
    ///
    /// An id that already exists (or repeats within `records`) gets a numeric
    /// suffix so ids stay unique across the collection.
    pub async fn append(&self, records: Vec<PhotoRecord>) -> RepositoryResult<Vec<PhotoRecord>> {
        let committed = self
            .modify(|entries, taken| {
                records
                    .into_iter()
                    .map(|record| stage(record, entries, taken))
                    .collect::<RepositoryResult<Vec<_>>>()
            })
            .await?;
        debug!("appended {} photo(s)", committed.len());
        Ok(committed)
    }

    /// Single-record [`append`](Self::append).
    pub async fn append_one(&self, record: PhotoRecord) -> RepositoryResult<PhotoRecord> {
        let committed = self
            .modify(|entries, taken| stage(record, entries, taken))
            .await?;
        debug!("appended photo {}", committed.id);
        Ok(committed)
    }

    /// Erase the collection and return the decodable records that were removed.
    pub async fn clear(&self) -> RepositoryResult<Vec<PhotoRecord>> {
        let _guard = self.write_lock.lock().await;
        let removed = self.read_all().await?;
        self.slots.remove(&self.key).await?;
        Ok(removed)
    }

    async fn read_slot(&self) -> RepositoryResult<SlotContent> {
        let Some(raw) = self.slots.get(&self.key).await? else {
            return Ok(SlotContent::Missing);
        };
        match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Array(entries)) => Ok(SlotContent::Entries(entries)),
            Ok(_) => {
                warn!("slot `{}` is not a JSON array", self.key);
                Ok(SlotContent::NotAnArray)
            }
            Err(err) => {
                warn!("slot `{}` holds malformed data: {}", self.key, err);
                Ok(SlotContent::NotAnArray)
            }
        }
    }

    /// Current entries to extend, refusing a slot an append would destroy.
    async fn entries_for_write(&self) -> RepositoryResult<Vec<Value>> {
        match self.read_slot().await? {
            SlotContent::Missing => Ok(Vec::new()),
            SlotContent::Entries(entries) => Ok(entries),
            SlotContent::NotAnArray => Err(RepositoryError::Malformed(self.key.clone())),
        }
    }

    /// Read-modify-write of the slot under the write lock. `change` sees the
    /// current entries and the ids they already use.
    async fn modify<T, F>(&self, change: F) -> RepositoryResult<T>
    where
        F: FnOnce(&mut Vec<Value>, &mut HashSet<String>) -> RepositoryResult<T>,
    {
        let _guard = self.write_lock.lock().await;
        let mut entries = self.entries_for_write().await?;
        let mut taken = taken_ids(&entries);
        let result = change(&mut entries, &mut taken)?;
        self.write(&entries).await?;
        Ok(result)
    }

    async fn write(&self, entries: &[Value]) -> RepositoryResult<()> {
        let raw = serde_json::to_string(entries)?;
        self.slots.set(&self.key, &raw).await?;
        Ok(())
    }
}

/// Ids already present, including those of entries that no longer decode.
fn taken_ids(entries: &[Value]) -> HashSet<String> {
    entries
        .iter()
        .filter_map(|entry| entry.get("id").and_then(Value::as_str))
        .map(str::to_string)
        .collect()
}

/// Give `record` a free id and add it to `entries`.
fn stage(
    mut record: PhotoRecord,
    entries: &mut Vec<Value>,
    taken: &mut HashSet<String>,
) -> RepositoryResult<PhotoRecord> {
    record.id = unique_id(&record.id, taken);
    entries.push(serde_json::to_value(&record)?);
    Ok(record)
}

fn unique_id(candidate: &str, taken: &mut HashSet<String>) -> String {
    let mut id = candidate.to_string();
    let mut suffix = 1;
    while taken.contains(&id) {
        id = format!("{}-{}", candidate, suffix);
        suffix += 1;
    }
    taken.insert(id.clone());
    id
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::slot_store::MemorySlotStore;
    use chrono::{TimeZone, Utc};

    fn record(id: &str) -> PhotoRecord {
        PhotoRecord::committed(
            id.to_string(),
            format!("{}.jpg", id),
            "Ada",
            Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap(),
            "/resources/x",
        )
    }

    fn repository() -> (Arc<MemorySlotStore>, PhotoRepository) {
        let slots = Arc::new(MemorySlotStore::new());
        let repository = PhotoRepository::new(slots.clone());
        (slots, repository)
    }

    #[tokio::test]
    async fn missing_slot_reads_as_empty() {
        let (_, repository) = repository();
        assert!(repository.read_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn malformed_slot_reads_as_empty() {
        let (slots, repository) = repository();
        slots.set(PHOTOS_SLOT, "{not json").await.unwrap();
        assert!(repository.read_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn append_grows_collection_by_exactly_n() {
        let (_, repository) = repository();
        repository.append(vec![record("1")]).await.unwrap();
        let committed = repository
            .append(vec![record("2"), record("3")])
            .await
            .unwrap();
        assert_eq!(committed.len(), 2);
        assert_eq!(repository.read_all().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn colliding_ids_get_a_suffix() {
        let (_, repository) = repository();
        repository.append_one(record("170")).await.unwrap();
        let second = repository.append_one(record("170")).await.unwrap();
        let batch = repository
            .append(vec![record("170"), record("170")])
            .await
            .unwrap();

        assert_eq!(second.id, "170-1");
        assert_eq!(batch[0].id, "170-2");
        assert_eq!(batch[1].id, "170-3");

        let ids: HashSet<String> = repository
            .read_all()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids.len(), 4);
    }

    #[tokio::test]
    async fn clear_returns_removed_records() {
        let (slots, repository) = repository();
        repository.append(vec![record("1"), record("2")]).await.unwrap();
        let removed = repository.clear().await.unwrap();
        assert_eq!(removed.len(), 2);
        assert_eq!(slots.get(PHOTOS_SLOT).await.unwrap(), None);
        assert!(repository.read_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn malformed_entry_is_skipped_but_kept_on_append() {
        let (slots, repository) = repository();
        let valid = serde_json::to_value(record("1")).unwrap();
        let missing_path = serde_json::json!({
            "id": "2",
            "fileName": "2.jpg",
            "uploaderName": "Ada",
            "uploadedAt": "2025-06-01T12:00:00.000Z"
        });
        slots
            .set(PHOTOS_SLOT, &serde_json::json!([valid, missing_path]).to_string())
            .await
            .unwrap();

        let records = repository.read_all().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "1");

        // The undecodable entry still reserves its id.
        let committed = repository.append_one(record("2")).await.unwrap();
        assert_eq!(committed.id, "2-1");

        let raw = slots.get(PHOTOS_SLOT).await.unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value.as_array().map(Vec::len), Some(3));
        assert_eq!(repository.read_all().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn append_refuses_a_slot_that_is_not_an_array() {
        let (slots, repository) = repository();
        slots.set(PHOTOS_SLOT, "{not json").await.unwrap();

        let err = repository.append(vec![record("1")]).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Malformed(_)));
        assert!(matches!(
            repository.append_one(record("1")).await,
            Err(RepositoryError::Malformed(_))
        ));
        assert_eq!(
            slots.get(PHOTOS_SLOT).await.unwrap().as_deref(),
            Some("{not json")
        );
    }

    #[tokio::test]
    async fn writes_replace_the_slot_with_a_json_array() {
        let (slots, repository) = repository();
        repository.append_one(record("1")).await.unwrap();
        let raw = slots.get(PHOTOS_SLOT).await.unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value.as_array().map(Vec::len), Some(1));
        assert_eq!(value[0]["uploaderName"], "Ada");
    }
}
