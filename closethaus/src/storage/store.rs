//! Collection-scoped key/value store
//!
//! Durable, asynchronous storage for whole JSON records, partitioned into
//! named collections. Backed by the local SQLite database; each collection
//! is one table keyed by text.
//!
//! The database handle is opened lazily on first use and shared by every
//! clone of [`Store`]. Concurrent first callers all wait on the same open.

use crate::config::{
    CLOTHING_ITEMS_COLLECTION, ITEMS_KEY, SAVED_OUTFITS_COLLECTION, USER_IMAGES_COLLECTION,
    USER_IMAGES_KEY,
};
use crate::database::create_pool;
use crate::error::{AppError, Result};
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::SqlitePool;
use std::fmt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::OnceCell;

/// The three independently keyed partitions of the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Collection {
    UserImages,
    ClothingItems,
    SavedOutfits,
}

impl Collection {
    pub const ALL: [Collection; 3] = [
        Collection::UserImages,
        Collection::ClothingItems,
        Collection::SavedOutfits,
    ];

    /// Public collection name
    pub fn name(&self) -> &'static str {
        match self {
            Collection::UserImages => USER_IMAGES_COLLECTION,
            Collection::ClothingItems => CLOTHING_ITEMS_COLLECTION,
            Collection::SavedOutfits => SAVED_OUTFITS_COLLECTION,
        }
    }

    /// Fixed key the collection's record is stored under
    pub fn key(&self) -> &'static str {
        match self {
            Collection::UserImages => USER_IMAGES_KEY,
            Collection::ClothingItems | Collection::SavedOutfits => ITEMS_KEY,
        }
    }

    fn table(&self) -> &'static str {
        match self {
            Collection::UserImages => "user_images",
            Collection::ClothingItems => "clothing_items",
            Collection::SavedOutfits => "saved_outfits",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

struct StoreInner {
    db_path: PathBuf,
    pool: OnceCell<SqlitePool>,
    open_attempts: AtomicUsize,
}

/// Embedded store adapter
#[derive(Clone)]
pub struct Store {
    inner: Arc<StoreInner>,
}

impl Store {
    /// Create an adapter for the database at `db_path`. Nothing is opened yet.
    pub fn new(db_path: PathBuf) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                db_path,
                pool: OnceCell::new(),
                open_attempts: AtomicUsize::new(0),
            }),
        }
    }

    /// Open the database, creating the collections if absent.
    ///
    /// Idempotent. The first caller performs the open; concurrent and later
    /// callers receive the same handle. A failed open is not cached.
    pub async fn open(&self) -> Result<&SqlitePool> {
        self.inner
            .pool
            .get_or_try_init(|| async {
                self.inner.open_attempts.fetch_add(1, Ordering::SeqCst);
                create_pool(&self.inner.db_path).await.map_err(|e| {
                    tracing::error!("Failed to open wardrobe store: {}", e);
                    AppError::StorageUnavailable(e.to_string())
                })
            })
            .await
    }

    /// Read the record stored under `key`, or `None` if it was never written.
    pub async fn get<T: DeserializeOwned>(&self, collection: Collection, key: &str) -> Result<Option<T>> {
        let pool = self.open().await?;

        let sql = format!("SELECT value FROM {} WHERE key = ?", collection.table());
        let raw: Option<String> = sqlx::query_scalar(&sql)
            .bind(key)
            .fetch_optional(pool)
            .await
            .map_err(|e| AppError::StorageUnavailable(e.to_string()))?;

        match raw {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    /// Replace the record stored under `key`. Last write wins.
    ///
    /// The write is committed durably before this returns.
    pub async fn put<T: Serialize + ?Sized>(&self, collection: Collection, key: &str, value: &T) -> Result<()> {
        let json = serde_json::to_string(value)?;
        let pool = self.open().await?;

        let sql = format!(
            r#"
            INSERT INTO {} (key, value, updated_at) VALUES (?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            "#,
            collection.table()
        );

        let mut tx = pool.begin().await.map_err(write_error)?;

        sqlx::query(&sql)
            .bind(key)
            .bind(&json)
            .bind(Utc::now())
            .execute(&mut *tx)
            .await
            .map_err(write_error)?;

        tx.commit().await.map_err(write_error)?;

        tracing::debug!("Put {}/{} ({} bytes)", collection, key, json.len());
        Ok(())
    }

    /// Number of real open attempts made so far
    pub fn open_attempts(&self) -> usize {
        self.inner.open_attempts.load(Ordering::SeqCst)
    }

    pub fn is_open(&self) -> bool {
        self.inner.pool.initialized()
    }
}

fn write_error(e: sqlx::Error) -> AppError {
    AppError::StorageWriteError(e.to_string())
}
