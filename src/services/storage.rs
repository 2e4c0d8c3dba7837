//! Storage adapter for BookmarkPro.
//!
//! Persists the entire library state as JSON blobs under named keys in a
//! single SQLite key-value table, plus the `lastBackup` and
//! `preferredView` scalars that live outside the settings blob. Every
//! mutation in the app core ends with a full-blob write through here.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rusqlite::params;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::database::connection::Database;
use crate::types::bookmark::Bookmark;
use crate::types::collection::Collection;
use crate::types::errors::StorageError;
use crate::types::settings::AppSettings;
use crate::types::view::ViewMode;

pub const KEY_BOOKMARKS: &str = "bookmarks";
pub const KEY_COLLECTIONS: &str = "collections";
pub const KEY_TAGS: &str = "tags";
pub const KEY_SETTINGS: &str = "settings";
pub const KEY_LAST_BACKUP: &str = "lastBackup";
pub const KEY_PREFERRED_VIEW: &str = "preferredView";

/// Days between automatic backups.
const BACKUP_INTERVAL_DAYS: i64 = 7;

/// Trait defining raw blob-store operations.
pub trait StorageAdapterTrait {
    fn read_blob(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn write_blob(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn delete_blob(&self, key: &str) -> Result<(), StorageError>;
    fn clear_all(&self) -> Result<(), StorageError>;
    /// Total size of all stored blob values, in bytes.
    fn usage_bytes(&self) -> Result<u64, StorageError>;
}

/// Blob-store persistence backed by a SQLite connection.
pub struct StorageAdapter {
    db: Arc<Database>,
}

impl StorageAdapter {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    fn load_section<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        match self.read_blob(key)? {
            Some(json) => serde_json::from_str(&json)
                .map(Some)
                .map_err(|e| StorageError::Serialization(format!("{}: {}", key, e))),
            None => Ok(None),
        }
    }

    fn save_section<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let json = serde_json::to_string(value)
            .map_err(|e| StorageError::Serialization(format!("{}: {}", key, e)))?;
        self.write_blob(key, &json)
    }

    /// Loads the bookmark blob. `None` means the blob was never written.
    pub fn load_bookmarks(&self) -> Result<Option<Vec<Bookmark>>, StorageError> {
        self.load_section(KEY_BOOKMARKS)
    }

    pub fn save_bookmarks(&self, bookmarks: &[Bookmark]) -> Result<(), StorageError> {
        self.save_section(KEY_BOOKMARKS, &bookmarks)
    }

    /// Loads the collection blob. `None` means first run — the caller
    /// decides whether to seed the starter collections. A persisted empty
    /// array comes back as `Some(vec![])` and is respected.
    pub fn load_collections(&self) -> Result<Option<Vec<Collection>>, StorageError> {
        self.load_section(KEY_COLLECTIONS)
    }

    pub fn save_collections(&self, collections: &[Collection]) -> Result<(), StorageError> {
        self.save_section(KEY_COLLECTIONS, &collections)
    }

    pub fn load_tags(&self) -> Result<Option<Vec<String>>, StorageError> {
        self.load_section(KEY_TAGS)
    }

    pub fn save_tags(&self, tags: &[String]) -> Result<(), StorageError> {
        self.save_section(KEY_TAGS, &tags)
    }

    /// Loads settings. Missing keys in the blob fall back to defaults
    /// key-by-key; unknown keys are preserved (see `AppSettings`).
    pub fn load_settings(&self) -> Result<Option<AppSettings>, StorageError> {
        self.load_section(KEY_SETTINGS)
    }

    pub fn save_settings(&self, settings: &AppSettings) -> Result<(), StorageError> {
        self.save_section(KEY_SETTINGS, settings)
    }

    /// Timestamp of the last automatic backup, if any. An unparseable
    /// stored value is treated as absent.
    pub fn last_backup(&self) -> Result<Option<DateTime<Utc>>, StorageError> {
        let raw = match self.read_blob(KEY_LAST_BACKUP)? {
            Some(raw) => raw,
            None => return Ok(None),
        };
        match DateTime::parse_from_rfc3339(&raw) {
            Ok(ts) => Ok(Some(ts.with_timezone(&Utc))),
            Err(e) => {
                log::warn!("ignoring unparseable lastBackup value {:?}: {}", raw, e);
                Ok(None)
            }
        }
    }

    pub fn set_last_backup(&self, ts: DateTime<Utc>) -> Result<(), StorageError> {
        self.write_blob(KEY_LAST_BACKUP, &ts.to_rfc3339())
    }

    /// The saved view mode, if one was persisted and is still recognized.
    pub fn preferred_view(&self) -> Result<Option<ViewMode>, StorageError> {
        Ok(self
            .read_blob(KEY_PREFERRED_VIEW)?
            .and_then(|raw| ViewMode::parse(&raw)))
    }

    pub fn set_preferred_view(&self, view: ViewMode) -> Result<(), StorageError> {
        self.write_blob(KEY_PREFERRED_VIEW, view.as_str())
    }

    /// Whether an automatic backup is due: never backed up, or at least
    /// `BACKUP_INTERVAL_DAYS` whole days since the last one.
    pub fn backup_due(&self, now: DateTime<Utc>) -> Result<bool, StorageError> {
        match self.last_backup()? {
            Some(last) => Ok((now - last).num_days() >= BACKUP_INTERVAL_DAYS),
            None => Ok(true),
        }
    }
}

impl StorageAdapterTrait for StorageAdapter {
    fn read_blob(&self, key: &str) -> Result<Option<String>, StorageError> {
        let conn = self.db.connection();
        let mut stmt = conn
            .prepare("SELECT value FROM blobs WHERE key = ?1")
            .map_err(|e| StorageError::Database(e.to_string()))?;
        let mut rows = stmt
            .query(params![key])
            .map_err(|e| StorageError::Database(e.to_string()))?;
        match rows.next().map_err(|e| StorageError::Database(e.to_string()))? {
            Some(row) => {
                let value: String = row
                    .get(0)
                    .map_err(|e| StorageError::Database(e.to_string()))?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    fn write_blob(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let now = Utc::now().timestamp();
        self.db
            .connection()
            .execute(
                "INSERT INTO blobs (key, value, updated_at) VALUES (?1, ?2, ?3) \
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
                params![key, value, now],
            )
            .map_err(|e| StorageError::Database(e.to_string()))?;
        Ok(())
    }

    fn delete_blob(&self, key: &str) -> Result<(), StorageError> {
        self.db
            .connection()
            .execute("DELETE FROM blobs WHERE key = ?1", params![key])
            .map_err(|e| StorageError::Database(e.to_string()))?;
        Ok(())
    }

    fn clear_all(&self) -> Result<(), StorageError> {
        self.db
            .connection()
            .execute("DELETE FROM blobs", [])
            .map_err(|e| StorageError::Database(e.to_string()))?;
        Ok(())
    }

    fn usage_bytes(&self) -> Result<u64, StorageError> {
        let total: i64 = self
            .db
            .connection()
            .query_row("SELECT COALESCE(SUM(LENGTH(value)), 0) FROM blobs", [], |row| {
                row.get(0)
            })
            .map_err(|e| StorageError::Database(e.to_string()))?;
        Ok(total as u64)
    }
}
