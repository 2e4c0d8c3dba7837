//! Library Manager for BookmarkPro.
//!
//! The single in-process owner of all bookmark state: bookmarks,
//! collections, the tag registry, and settings. Mutations happen through
//! the methods here; the query, import, and bulk engines receive the
//! manager explicitly rather than reaching for a global.
//!
//! No internal synchronization is performed — concurrent mutation from
//! multiple threads requires external locking.

use chrono::Utc;
use uuid::Uuid;

use crate::types::bookmark::{dedup_tags, Bookmark, BookmarkDraft};
use crate::types::collection::{Collection, CollectionDraft};
use crate::types::errors::{AppError, NotFoundError, ValidationError};
use crate::types::settings::AppSettings;

/// Rating assigned when a bookmark is marked as favorite.
const FAVORITE_RATING: u8 = 5;
/// Ratings at or above this count as favorite.
const FAVORITE_THRESHOLD: u8 = 4;

/// Trait defining the domain-model operations.
pub trait LibraryManagerTrait {
    fn create_bookmark(&mut self, draft: BookmarkDraft) -> Result<Bookmark, ValidationError>;
    fn update_bookmark(&mut self, id: &str, draft: BookmarkDraft) -> Result<Bookmark, AppError>;
    fn delete_bookmark(&mut self, id: &str) -> Result<(), NotFoundError>;
    fn get_bookmark(&self, id: &str) -> Option<&Bookmark>;
    /// Two-state toggle: rating below the favorite threshold jumps to 5,
    /// anything at or above it resets to 0. Returns the new rating.
    fn toggle_favorite(&mut self, id: &str) -> Result<u8, NotFoundError>;
    /// Bumps the visit counter and stamps `lastVisited`.
    fn record_visit(&mut self, id: &str) -> Result<Bookmark, NotFoundError>;
    fn create_collection(&mut self, draft: CollectionDraft) -> Result<Collection, ValidationError>;
    fn update_collection(&mut self, id: &str, draft: CollectionDraft) -> Result<Collection, AppError>;
    /// Resets every member bookmark to uncategorized, then removes the
    /// collection. Returns the number of bookmarks reassigned.
    fn delete_collection(&mut self, id: &str) -> Result<usize, NotFoundError>;
    fn get_collection(&self, id: &str) -> Option<&Collection>;
    /// Unions tags into the registry. The registry only ever grows; unused
    /// tags are never garbage-collected.
    fn register_tags(&mut self, tags: &[String]);
    /// Tag usage histogram over the current bookmarks, most-used first.
    fn tag_counts(&self) -> Vec<(String, usize)>;
}

/// In-memory domain model holding the full library state.
pub struct LibraryManager {
    bookmarks: Vec<Bookmark>,
    collections: Vec<Collection>,
    tags: Vec<String>,
    settings: AppSettings,
}

impl LibraryManager {
    /// Creates an empty library with default settings.
    pub fn new() -> Self {
        Self {
            bookmarks: Vec::new(),
            collections: Vec::new(),
            tags: Vec::new(),
            settings: AppSettings::default(),
        }
    }

    /// Reassembles a library from persisted state.
    pub fn from_parts(
        bookmarks: Vec<Bookmark>,
        collections: Vec<Collection>,
        tags: Vec<String>,
        settings: AppSettings,
    ) -> Self {
        Self {
            bookmarks,
            collections,
            tags,
            settings,
        }
    }

    pub fn bookmarks(&self) -> &[Bookmark] {
        &self.bookmarks
    }

    pub fn collections(&self) -> &[Collection] {
        &self.collections
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn settings(&self) -> &AppSettings {
        &self.settings
    }

    /// Sets a single option by its camelCase key. Unknown keys are
    /// accepted and preserved alongside the schema.
    pub fn update_setting(
        &mut self,
        key: &str,
        value: serde_json::Value,
    ) -> Result<(), ValidationError> {
        self.settings
            .set_value(key, value)
            .map_err(|e| ValidationError::InvalidSetting(format!("{}: {}", key, e)))
    }

    // Mutable access for the import and bulk engines. Callers are expected
    // to re-establish record invariants (`Bookmark::normalize`) and keep
    // the tag registry in sync via `register_tags`.

    pub fn bookmarks_mut(&mut self) -> &mut Vec<Bookmark> {
        &mut self.bookmarks
    }

    pub fn collections_mut(&mut self) -> &mut Vec<Collection> {
        &mut self.collections
    }

    pub fn replace_bookmarks(&mut self, bookmarks: Vec<Bookmark>) {
        self.bookmarks = bookmarks;
        for bookmark in &mut self.bookmarks {
            bookmark.normalize();
        }
    }

    pub fn replace_collections(&mut self, collections: Vec<Collection>) {
        self.collections = collections;
    }

    pub fn replace_tags(&mut self, tags: Vec<String>) {
        self.tags = dedup_tags(tags);
    }

    pub fn replace_settings(&mut self, settings: AppSettings) {
        self.settings = settings;
    }

    fn bookmark_mut(&mut self, id: &str) -> Result<&mut Bookmark, NotFoundError> {
        self.bookmarks
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or_else(|| NotFoundError::Bookmark(id.to_string()))
    }

    fn validate_bookmark_draft(draft: &BookmarkDraft) -> Result<(), ValidationError> {
        if draft.title.trim().is_empty() {
            return Err(ValidationError::MissingField("title"));
        }
        if draft.url.trim().is_empty() {
            return Err(ValidationError::MissingField("url"));
        }
        Ok(())
    }

    /// Generates a fresh entity id. UUID v4 keeps collisions negligible
    /// even across rapid same-millisecond calls.
    pub fn generate_id() -> String {
        Uuid::new_v4().to_string()
    }
}

impl Default for LibraryManager {
    fn default() -> Self {
        Self::new()
    }
}

impl LibraryManagerTrait for LibraryManager {
    /// Creates a bookmark from a draft. Requires non-empty title and url.
    fn create_bookmark(&mut self, draft: BookmarkDraft) -> Result<Bookmark, ValidationError> {
        Self::validate_bookmark_draft(&draft)?;

        let mut bookmark = Bookmark {
            id: Self::generate_id(),
            title: draft.title.trim().to_string(),
            url: draft.url.trim().to_string(),
            description: draft.description,
            collection: draft.collection,
            tags: draft.tags,
            rating: draft.rating,
            is_read: draft.is_read,
            is_broken: false,
            priority: draft.priority,
            notes: draft.notes,
            created_at: Utc::now(),
            updated_at: None,
            last_visited: None,
            visit_count: 0,
        };
        bookmark.normalize();

        self.register_tags(&bookmark.tags);
        self.bookmarks.push(bookmark.clone());
        Ok(bookmark)
    }

    /// Overwrites a bookmark's user-editable fields and stamps `updatedAt`.
    fn update_bookmark(&mut self, id: &str, draft: BookmarkDraft) -> Result<Bookmark, AppError> {
        Self::validate_bookmark_draft(&draft)?;

        let bookmark = self.bookmark_mut(id)?;
        bookmark.title = draft.title.trim().to_string();
        bookmark.url = draft.url.trim().to_string();
        bookmark.description = draft.description;
        bookmark.collection = draft.collection;
        bookmark.tags = draft.tags;
        bookmark.rating = draft.rating;
        bookmark.is_read = draft.is_read;
        bookmark.priority = draft.priority;
        bookmark.notes = draft.notes;
        bookmark.updated_at = Some(Utc::now());
        bookmark.normalize();

        let updated = bookmark.clone();
        self.register_tags(&updated.tags);
        Ok(updated)
    }

    fn delete_bookmark(&mut self, id: &str) -> Result<(), NotFoundError> {
        let before = self.bookmarks.len();
        self.bookmarks.retain(|b| b.id != id);
        if self.bookmarks.len() == before {
            return Err(NotFoundError::Bookmark(id.to_string()));
        }
        Ok(())
    }

    fn get_bookmark(&self, id: &str) -> Option<&Bookmark> {
        self.bookmarks.iter().find(|b| b.id == id)
    }

    fn toggle_favorite(&mut self, id: &str) -> Result<u8, NotFoundError> {
        let bookmark = self.bookmark_mut(id)?;
        bookmark.rating = if bookmark.rating >= FAVORITE_THRESHOLD {
            0
        } else {
            FAVORITE_RATING
        };
        Ok(bookmark.rating)
    }

    fn record_visit(&mut self, id: &str) -> Result<Bookmark, NotFoundError> {
        let bookmark = self.bookmark_mut(id)?;
        bookmark.visit_count += 1;
        bookmark.last_visited = Some(Utc::now());
        Ok(bookmark.clone())
    }

    /// Creates a collection from a draft. Requires a non-empty name.
    fn create_collection(&mut self, draft: CollectionDraft) -> Result<Collection, ValidationError> {
        if draft.name.trim().is_empty() {
            return Err(ValidationError::MissingField("name"));
        }

        let collection = Collection {
            id: Self::generate_id(),
            name: draft.name.trim().to_string(),
            description: draft.description,
            color: draft.color,
            icon: draft.icon,
            created_at: Utc::now(),
            updated_at: None,
        };
        self.collections.push(collection.clone());
        Ok(collection)
    }

    fn update_collection(&mut self, id: &str, draft: CollectionDraft) -> Result<Collection, AppError> {
        if draft.name.trim().is_empty() {
            return Err(ValidationError::MissingField("name").into());
        }

        let collection = self
            .collections
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| NotFoundError::Collection(id.to_string()))?;
        collection.name = draft.name.trim().to_string();
        collection.description = draft.description;
        collection.color = draft.color;
        collection.icon = draft.icon;
        collection.updated_at = Some(Utc::now());
        Ok(collection.clone())
    }

    fn delete_collection(&mut self, id: &str) -> Result<usize, NotFoundError> {
        if !self.collections.iter().any(|c| c.id == id) {
            return Err(NotFoundError::Collection(id.to_string()));
        }

        // Move member bookmarks to uncategorized before dropping the collection
        let mut reassigned = 0;
        for bookmark in &mut self.bookmarks {
            if bookmark.collection == id {
                bookmark.collection.clear();
                reassigned += 1;
            }
        }
        self.collections.retain(|c| c.id != id);
        Ok(reassigned)
    }

    fn get_collection(&self, id: &str) -> Option<&Collection> {
        self.collections.iter().find(|c| c.id == id)
    }

    fn register_tags(&mut self, tags: &[String]) {
        for tag in tags {
            let tag = tag.trim();
            if tag.is_empty() || self.tags.iter().any(|t| t == tag) {
                continue;
            }
            self.tags.push(tag.to_string());
        }
    }

    fn tag_counts(&self) -> Vec<(String, usize)> {
        let mut counts: Vec<(String, usize)> = Vec::new();
        for bookmark in &self.bookmarks {
            for tag in &bookmark.tags {
                match counts.iter_mut().find(|(t, _)| t == tag) {
                    Some((_, n)) => *n += 1,
                    None => counts.push((tag.clone(), 1)),
                }
            }
        }
        counts.sort_by(|a, b| b.1.cmp(&a.1));
        counts
    }
}
