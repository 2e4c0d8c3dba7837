//! App core for BookmarkPro.
//!
//! Wires the storage adapter, library manager, and engines together and
//! holds the view state the presentation layer drives (active collection,
//! view mode, sort key, search query). Lifecycle: construct (open + load +
//! first-run seeding) → mutate via methods → every mutation ends with a
//! full save through the blob store.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;

use crate::database::connection::Database;
use crate::managers::library_manager::{LibraryManager, LibraryManagerTrait};
use crate::services::bulk_ops;
use crate::services::export_engine::{ExportEngine, ExportEngineTrait, ExportFile};
use crate::services::import_engine::{self, ImportMode, ImportReport};
use crate::services::query_engine::{self, CollectionSelector, SortKey};
use crate::services::storage::{StorageAdapter, StorageAdapterTrait};
use crate::types::bookmark::{Bookmark, BookmarkDraft};
use crate::types::collection::{Collection, CollectionDraft};
use crate::types::errors::{AppError, StorageError};
use crate::types::product::ProductInfo;
use crate::types::settings::AppSettings;
use crate::types::view::ViewMode;
use serde::Serialize;

/// Tags shown in the tag cloud, most used first.
const TAG_CLOUD_LIMIT: usize = 20;

/// Result of deleting a collection through the app core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectionDeletion {
    /// Bookmarks moved to uncategorized.
    pub reassigned: usize,
    /// True when the deleted collection was the active view and the app
    /// switched back to `all`; the presentation layer must follow.
    pub view_reset: bool,
}

/// Outcome of a JSON import request.
#[derive(Debug, Clone, PartialEq)]
pub enum JsonImportOutcome {
    Applied(ImportReport),
    /// The payload declares a newer schema version; nothing was applied.
    /// Retry with `accept_newer = true` once the user confirms.
    ConfirmationRequired { declared_version: String },
}

/// Diagnostic snapshot surfaced by the debug panel.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugInfo {
    pub version: String,
    pub bookmarks_count: usize,
    pub collections_count: usize,
    pub tags_count: usize,
    pub current_view: ViewMode,
    pub current_collection: String,
    pub storage_bytes: u64,
}

/// Central application struct owning the model and its persistence.
pub struct App {
    db: Arc<Database>,
    db_path: String,
    storage: StorageAdapter,
    exporter: ExportEngine,
    product: ProductInfo,
    pub library: LibraryManager,
    current_collection: CollectionSelector,
    current_view: ViewMode,
    current_sort: Option<SortKey>,
    search_query: String,
    pending_backup: Option<ExportFile>,
}

impl App {
    /// Opens (or creates) the database at `db_path` and loads the library.
    /// Seeds the starter collections when no collections blob exists.
    pub fn new(db_path: &str) -> Result<Self, StorageError> {
        let db = Database::open(db_path).map_err(|e| StorageError::Database(e.to_string()))?;
        Self::from_database(db, db_path)
    }

    /// In-memory app, used by tests and the demo.
    pub fn open_in_memory() -> Result<Self, StorageError> {
        let db = Database::open_in_memory().map_err(|e| StorageError::Database(e.to_string()))?;
        Self::from_database(db, ":memory:")
    }

    fn from_database(db: Database, db_path: &str) -> Result<Self, StorageError> {
        let db = Arc::new(db);
        let storage = StorageAdapter::new(db.clone());

        let bookmarks = storage.load_bookmarks()?.unwrap_or_default();
        let collections = storage
            .load_collections()?
            .unwrap_or_else(|| Collection::seed_set(Utc::now()));
        let tags = storage.load_tags()?.unwrap_or_default();
        let settings = storage.load_settings()?.unwrap_or_default();
        let current_view = storage.preferred_view()?.unwrap_or_default();

        let library = LibraryManager::from_parts(bookmarks, collections, tags, settings);
        let product = ProductInfo::default();

        Ok(Self {
            db,
            db_path: db_path.to_string(),
            storage,
            exporter: ExportEngine::new(product.clone()),
            product,
            library,
            current_collection: CollectionSelector::All,
            current_view,
            current_sort: Some(SortKey::DateDesc),
            search_query: String::new(),
            pending_backup: None,
        })
    }

    pub fn database(&self) -> &Arc<Database> {
        &self.db
    }

    pub fn product(&self) -> &ProductInfo {
        &self.product
    }

    pub fn current_view(&self) -> ViewMode {
        self.current_view
    }

    pub fn current_collection(&self) -> &CollectionSelector {
        &self.current_collection
    }

    pub fn sort_key(&self) -> Option<SortKey> {
        self.current_sort
    }

    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    /// String identifying the exporting environment, stamped into backups.
    fn environment(&self) -> String {
        format!(
            "{} v{} ({})",
            self.product.name,
            self.product.version,
            std::env::consts::OS
        )
    }

    /// Persists the full library state. When auto-backup is enabled and
    /// due, also builds the backup file (fetch it with
    /// [`App::take_pending_backup`]) and stamps `lastBackup`.
    ///
    /// On failure the in-memory state is NOT rolled back; the caller must
    /// surface the error so the user knows disk may be stale.
    pub fn save(&mut self) -> Result<(), StorageError> {
        self.storage.save_bookmarks(self.library.bookmarks())?;
        self.storage.save_collections(self.library.collections())?;
        self.storage.save_tags(self.library.tags())?;
        self.storage.save_settings(self.library.settings())?;

        if self.library.settings().auto_backup {
            let now = Utc::now();
            if self.storage.backup_due(now)? {
                let environment = self.environment();
                let file =
                    self.exporter
                        .export_backup(&self.library, now, &environment, &self.db_path)?;
                self.storage.set_last_backup(now)?;
                log::debug!("automatic backup created: {}", file.filename);
                self.pending_backup = Some(file);
            }
        }
        Ok(())
    }

    /// The automatic backup produced by the most recent save, if any.
    /// Writing it out is the presentation layer's job.
    pub fn take_pending_backup(&mut self) -> Option<ExportFile> {
        self.pending_backup.take()
    }

    // === View state ===

    /// The visible bookmark set: active collection, narrowed by the search
    /// query, ordered by the current sort key.
    pub fn filtered_bookmarks(&self) -> Vec<Bookmark> {
        query_engine::filtered_view(
            self.library.bookmarks(),
            &self.current_collection,
            &self.search_query,
            self.current_sort,
            Utc::now(),
        )
    }

    pub fn select_collection(&mut self, raw: &str) {
        self.current_collection = CollectionSelector::parse(raw);
    }

    pub fn set_search_query(&mut self, query: &str) {
        self.search_query = query.to_string();
    }

    /// Unknown sort keys clear the key, leaving the order untouched.
    pub fn set_sort_key(&mut self, raw: &str) {
        self.current_sort = SortKey::parse(raw);
    }

    /// Switches the view mode and persists it as `preferredView`.
    pub fn set_view(&mut self, view: ViewMode) -> Result<(), StorageError> {
        self.current_view = view;
        self.storage.set_preferred_view(view)
    }

    // === Record CRUD ===

    pub fn add_bookmark(&mut self, draft: BookmarkDraft) -> Result<Bookmark, AppError> {
        let bookmark = self.library.create_bookmark(draft)?;
        self.save()?;
        Ok(bookmark)
    }

    pub fn edit_bookmark(&mut self, id: &str, draft: BookmarkDraft) -> Result<Bookmark, AppError> {
        let bookmark = self.library.update_bookmark(id, draft)?;
        self.save()?;
        Ok(bookmark)
    }

    pub fn remove_bookmark(&mut self, id: &str) -> Result<(), AppError> {
        self.library.delete_bookmark(id)?;
        self.save()?;
        Ok(())
    }

    /// Records a visit and returns the updated bookmark; actually opening
    /// the URL (and honoring `openInNewTab`) is up to the caller.
    pub fn open_bookmark(&mut self, id: &str) -> Result<Bookmark, AppError> {
        let bookmark = self.library.record_visit(id)?;
        self.save()?;
        Ok(bookmark)
    }

    pub fn toggle_favorite(&mut self, id: &str) -> Result<u8, AppError> {
        let rating = self.library.toggle_favorite(id)?;
        self.save()?;
        Ok(rating)
    }

    pub fn add_collection(&mut self, draft: CollectionDraft) -> Result<Collection, AppError> {
        let collection = self.library.create_collection(draft)?;
        self.save()?;
        Ok(collection)
    }

    pub fn edit_collection(
        &mut self,
        id: &str,
        draft: CollectionDraft,
    ) -> Result<Collection, AppError> {
        let collection = self.library.update_collection(id, draft)?;
        self.save()?;
        Ok(collection)
    }

    /// Deletes a collection, moving its members to uncategorized. When the
    /// deleted collection was the active view, switches back to `all` and
    /// reports it so the presentation layer can follow.
    pub fn remove_collection(&mut self, id: &str) -> Result<CollectionDeletion, AppError> {
        let reassigned = self.library.delete_collection(id)?;
        let view_reset = self.current_collection == CollectionSelector::Stored(id.to_string());
        if view_reset {
            self.current_collection = CollectionSelector::All;
        }
        self.save()?;
        Ok(CollectionDeletion {
            reassigned,
            view_reset,
        })
    }

    pub fn update_setting(&mut self, key: &str, value: serde_json::Value) -> Result<(), AppError> {
        self.library.update_setting(key, value)?;
        self.save()?;
        Ok(())
    }

    // === Import ===

    /// JSON import with caller-supplied reconciliation mode and
    /// version-skew policy. A payload declaring a newer schema version is
    /// only applied when `accept_newer` is set; otherwise nothing changes
    /// and the caller is asked to confirm.
    pub fn import_json(
        &mut self,
        text: &str,
        mode: ImportMode,
        accept_newer: bool,
    ) -> Result<JsonImportOutcome, AppError> {
        let payload = import_engine::parse_json(text)?;
        if payload.requires_confirmation(&self.product.version) && !accept_newer {
            return Ok(JsonImportOutcome::ConfirmationRequired {
                declared_version: payload.version.clone().unwrap_or_default(),
            });
        }
        let report = import_engine::apply_json(&mut self.library, &payload, mode, Utc::now());
        self.save()?;
        Ok(JsonImportOutcome::Applied(report))
    }

    /// Netscape-HTML import; always appends as new records.
    pub fn import_html(&mut self, text: &str) -> Result<ImportReport, AppError> {
        let records = import_engine::parse_netscape(text)?;
        let report = import_engine::append_parsed(&mut self.library, records, Utc::now());
        self.save()?;
        Ok(report)
    }

    /// CSV import; always appends as new records.
    pub fn import_csv(&mut self, text: &str) -> Result<ImportReport, AppError> {
        let records = import_engine::parse_csv(text)?;
        let report = import_engine::append_parsed(&mut self.library, records, Utc::now());
        self.save()?;
        Ok(report)
    }

    // === Export ===

    pub fn export_json(&self) -> Result<ExportFile, StorageError> {
        self.exporter.export_json(&self.library, None, Utc::now())
    }

    pub fn export_html(&self) -> ExportFile {
        self.exporter.export_html(&self.library, Utc::now())
    }

    pub fn export_csv(&self) -> ExportFile {
        self.exporter.export_csv(&self.library, Utc::now())
    }

    /// Manual backup. Unlike the automatic cadence this does not advance
    /// `lastBackup`.
    pub fn create_backup(&self) -> Result<ExportFile, StorageError> {
        let environment = self.environment();
        self.exporter
            .export_backup(&self.library, Utc::now(), &environment, &self.db_path)
    }

    // === Bulk operations ===

    pub fn bulk_delete(&mut self, selection: &HashSet<String>) -> Result<usize, AppError> {
        let removed = bulk_ops::bulk_delete(&mut self.library, selection);
        self.save()?;
        Ok(removed)
    }

    pub fn bulk_move(
        &mut self,
        selection: &HashSet<String>,
        target_collection: &str,
    ) -> Result<usize, AppError> {
        let moved = bulk_ops::bulk_move(&mut self.library, selection, target_collection)?;
        self.save()?;
        Ok(moved)
    }

    pub fn bulk_tag(
        &mut self,
        selection: &HashSet<String>,
        tags: &[String],
    ) -> Result<usize, AppError> {
        let tagged = bulk_ops::bulk_tag(&mut self.library, selection, tags);
        self.save()?;
        Ok(tagged)
    }

    /// JSON export restricted to the selected bookmarks. Read-only.
    pub fn bulk_export(&self, selection: &HashSet<String>) -> Result<ExportFile, StorageError> {
        let selected = bulk_ops::selected_bookmarks(&self.library, selection);
        self.exporter
            .export_json(&self.library, Some(&selected), Utc::now())
    }

    // === Maintenance ===

    pub fn storage_usage(&self) -> Result<u64, StorageError> {
        self.storage.usage_bytes()
    }

    /// Tag usage histogram capped at the tag-cloud size.
    pub fn tag_cloud(&self) -> Vec<(String, usize)> {
        let mut counts = self.library.tag_counts();
        counts.truncate(TAG_CLOUD_LIMIT);
        counts
    }

    /// Wipes all persisted blobs and resets the in-memory model to the
    /// first-run state (seeded collections, default settings).
    pub fn clear_all_data(&mut self) -> Result<(), StorageError> {
        self.storage.clear_all()?;
        self.library = LibraryManager::from_parts(
            Vec::new(),
            Collection::seed_set(Utc::now()),
            Vec::new(),
            AppSettings::default(),
        );
        self.current_collection = CollectionSelector::All;
        self.current_view = ViewMode::default();
        self.current_sort = Some(SortKey::DateDesc);
        self.search_query.clear();
        self.pending_backup = None;
        Ok(())
    }

    pub fn debug_info(&self) -> Result<DebugInfo, StorageError> {
        Ok(DebugInfo {
            version: self.product.version.clone(),
            bookmarks_count: self.library.bookmarks().len(),
            collections_count: self.library.collections().len(),
            tags_count: self.library.tags().len(),
            current_view: self.current_view,
            current_collection: self.current_collection.as_str().to_string(),
            storage_bytes: self.storage.usage_bytes()?,
        })
    }
}
