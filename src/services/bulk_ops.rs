//! Bulk operations for BookmarkPro.
//!
//! Every operation takes the library and an explicit selection set of
//! bookmark ids. Validation happens strictly before any mutation, so a
//! failed operation leaves the model untouched; there is no rollback
//! across a later persistence failure.

use std::collections::HashSet;

use crate::managers::library_manager::{LibraryManager, LibraryManagerTrait};
use crate::types::bookmark::{dedup_tags, Bookmark};
use crate::types::errors::NotFoundError;

/// Removes every selected bookmark. No-op on an empty selection.
/// Returns the number of bookmarks removed.
pub fn bulk_delete(library: &mut LibraryManager, selection: &HashSet<String>) -> usize {
    if selection.is_empty() {
        return 0;
    }
    let before = library.bookmarks().len();
    library.bookmarks_mut().retain(|b| !selection.contains(&b.id));
    before - library.bookmarks().len()
}

/// Moves every selected bookmark into the target collection.
///
/// The target must exist; otherwise the whole operation fails and no
/// bookmark changes. Returns the number of bookmarks moved.
pub fn bulk_move(
    library: &mut LibraryManager,
    selection: &HashSet<String>,
    target_collection: &str,
) -> Result<usize, NotFoundError> {
    if selection.is_empty() {
        return Ok(0);
    }
    if library.get_collection(target_collection).is_none() {
        return Err(NotFoundError::Collection(target_collection.to_string()));
    }

    let mut moved = 0;
    for bookmark in library.bookmarks_mut() {
        if selection.contains(&bookmark.id) {
            bookmark.collection = target_collection.to_string();
            moved += 1;
        }
    }
    Ok(moved)
}

/// Unions the given tags into every selected bookmark and into the global
/// tag registry. Returns the number of bookmarks touched.
pub fn bulk_tag(
    library: &mut LibraryManager,
    selection: &HashSet<String>,
    tags: &[String],
) -> usize {
    let clean = dedup_tags(tags.to_vec());
    if selection.is_empty() || clean.is_empty() {
        return 0;
    }

    let mut tagged = 0;
    for bookmark in library.bookmarks_mut() {
        if !selection.contains(&bookmark.id) {
            continue;
        }
        for tag in &clean {
            if !bookmark.tags.contains(tag) {
                bookmark.tags.push(tag.clone());
            }
        }
        tagged += 1;
    }
    library.register_tags(&clean);
    tagged
}

/// Extracts the selected bookmarks in insertion order, e.g. to feed the
/// JSON exporter for a selection export.
pub fn selected_bookmarks(library: &LibraryManager, selection: &HashSet<String>) -> Vec<Bookmark> {
    library
        .bookmarks()
        .iter()
        .filter(|b| selection.contains(&b.id))
        .cloned()
        .collect()
}
