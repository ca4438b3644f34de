//! src/services/slot_store.rs
//!
//! Flat key-value slots. The gallery only ever uses one slot, but the backends
//! stay generic so the repository above them owns the slot name and format.

use async_trait::async_trait;
use sqlx::SqlitePool;
use std::{collections::HashMap, sync::Arc};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::debug;

const SCHEMA: &str = include_str!("../../migrations/0001_init.sql");

#[derive(Debug, Error)]
pub enum SlotError {
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
    #[error("slot backend unavailable: {0}")]
    Unavailable(String),
}

pub type SlotResult<T> = Result<T, SlotError>;

/// Whole-value string storage addressed by key.
#[async_trait]
pub trait SlotStore: Send + Sync {
    async fn get(&self, key: &str) -> SlotResult<Option<String>>;

    /// Replace the slot's entire value.
    async fn set(&self, key: &str, value: &str) -> SlotResult<()>;

    /// Remove the slot. Missing slots are not an error.
    async fn remove(&self, key: &str) -> SlotResult<()>;
}

/// In-process slots, lost on restart.
#[derive(Default)]
pub struct MemorySlotStore {
    slots: Mutex<HashMap<String, String>>,
}

impl MemorySlotStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SlotStore for MemorySlotStore {
    async fn get(&self, key: &str) -> SlotResult<Option<String>> {
        Ok(self.slots.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> SlotResult<()> {
        self.slots
            .lock()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> SlotResult<()> {
        self.slots.lock().await.remove(key);
        Ok(())
    }
}

/// Slots kept in the `slots` table of a SQLite database.
#[derive(Clone)]
pub struct SqliteSlotStore {
    pub db: Arc<SqlitePool>,
}

impl SqliteSlotStore {
    pub fn new(db: Arc<SqlitePool>) -> Self {
        Self { db }
    }

    /// Create the `slots` table if it does not exist yet.
    pub async fn migrate(&self) -> SlotResult<()> {
        let statements = SCHEMA
            .split(';')
            .map(str::trim)
            .filter(|s| !s.is_empty() && !s.lines().all(|l| l.trim_start().starts_with("--")));

        for stmt in statements {
            debug!("Executing migration SQL: {}", stmt);
            sqlx::query(stmt).execute(&*self.db).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl SlotStore for SqliteSlotStore {
    async fn get(&self, key: &str) -> SlotResult<Option<String>> {
        let value = sqlx::query_scalar::<_, String>("SELECT value FROM slots WHERE key = ?")
            .bind(key)
            .fetch_optional(&*self.db)
            .await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> SlotResult<()> {
        sqlx::query(
            "INSERT INTO slots (key, value) VALUES (?, ?)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        )
        .bind(key)
        .bind(value)
        .execute(&*self.db)
        .await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> SlotResult<()> {
        let result = sqlx::query("DELETE FROM slots WHERE key = ?")
            .bind(key)
            .execute(&*self.db)
            .await?;
        debug!("removed slot {} ({} rows)", key, result.rows_affected());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn sqlite_store() -> SqliteSlotStore {
        // One connection: every `sqlite::memory:` connection is its own database.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        let store = SqliteSlotStore::new(Arc::new(pool));
        store.migrate().await.unwrap();
        store
    }

    #[tokio::test]
    async fn memory_store_replaces_whole_values() {
        let store = MemorySlotStore::new();
        assert_eq!(store.get("k").await.unwrap(), None);
        store.set("k", "one").await.unwrap();
        store.set("k", "two").await.unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("two"));
        store.remove("k").await.unwrap();
        store.remove("k").await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn sqlite_store_upserts_and_removes() {
        let store = sqlite_store().await;
        assert_eq!(store.get("wedding-photos").await.unwrap(), None);
        store.set("wedding-photos", "[]").await.unwrap();
        store.set("wedding-photos", "[1]").await.unwrap();
        assert_eq!(
            store.get("wedding-photos").await.unwrap().as_deref(),
            Some("[1]")
        );
        store.remove("wedding-photos").await.unwrap();
        assert_eq!(store.get("wedding-photos").await.unwrap(), None);
    }

    #[tokio::test]
    async fn migration_is_idempotent() {
        let store = sqlite_store().await;
        store.migrate().await.unwrap();
    }
}
