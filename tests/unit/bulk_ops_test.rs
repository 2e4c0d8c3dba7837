//! Unit tests for bulk operations over a selection set.

use std::collections::HashSet;

use bookmarkpro::managers::library_manager::{LibraryManager, LibraryManagerTrait};
use bookmarkpro::services::bulk_ops::{bulk_delete, bulk_move, bulk_tag, selected_bookmarks};
use bookmarkpro::types::bookmark::BookmarkDraft;
use bookmarkpro::types::collection::CollectionDraft;
use bookmarkpro::types::errors::NotFoundError;

/// Builds a library with three bookmarks and returns the ids of the first
/// two as the selection.
fn setup() -> (LibraryManager, HashSet<String>) {
    let mut library = LibraryManager::new();
    let mut selection = HashSet::new();
    for i in 1..=3 {
        let bookmark = library
            .create_bookmark(BookmarkDraft {
                title: format!("Bookmark {}", i),
                url: format!("https://example.com/{}", i),
                ..Default::default()
            })
            .unwrap();
        if i < 3 {
            selection.insert(bookmark.id);
        }
    }
    (library, selection)
}

#[test]
fn test_bulk_delete_removes_selected_only() {
    let (mut library, selection) = setup();
    let removed = bulk_delete(&mut library, &selection);

    assert_eq!(removed, 2);
    assert_eq!(library.bookmarks().len(), 1);
    assert_eq!(library.bookmarks()[0].title, "Bookmark 3");
}

#[test]
fn test_bulk_delete_empty_selection_is_noop() {
    let (mut library, _) = setup();
    let removed = bulk_delete(&mut library, &HashSet::new());
    assert_eq!(removed, 0);
    assert_eq!(library.bookmarks().len(), 3);
}

#[test]
fn test_bulk_move_sets_collection_on_selection() {
    let (mut library, selection) = setup();
    let target = library
        .create_collection(CollectionDraft {
            name: "Target".to_string(),
            ..Default::default()
        })
        .unwrap();

    let moved = bulk_move(&mut library, &selection, &target.id).unwrap();
    assert_eq!(moved, 2);

    for bookmark in library.bookmarks() {
        if selection.contains(&bookmark.id) {
            assert_eq!(bookmark.collection, target.id);
        } else {
            assert_eq!(bookmark.collection, "");
        }
    }
}

#[test]
fn test_bulk_move_to_missing_collection_changes_nothing() {
    let (mut library, selection) = setup();
    let err = bulk_move(&mut library, &selection, "no-such-id").unwrap_err();
    assert!(matches!(err, NotFoundError::Collection(_)));

    // the whole operation aborted before any mutation
    assert!(library.bookmarks().iter().all(|b| b.collection.is_empty()));
}

#[test]
fn test_bulk_tag_unions_per_bookmark_and_registry() {
    let (mut library, selection) = setup();

    // give one selected bookmark an overlapping tag up front
    let pre_tagged = selection.iter().next().unwrap().clone();
    let draft = BookmarkDraft {
        title: "Bookmark 1".to_string(),
        url: "https://example.com/1".to_string(),
        tags: vec!["shared".to_string()],
        ..Default::default()
    };
    library.update_bookmark(&pre_tagged, draft).unwrap();

    let tagged = bulk_tag(
        &mut library,
        &selection,
        &["shared".to_string(), "new".to_string(), "".to_string()],
    );
    assert_eq!(tagged, 2);

    for bookmark in library.bookmarks() {
        if selection.contains(&bookmark.id) {
            assert!(bookmark.tags.contains(&"shared".to_string()));
            assert!(bookmark.tags.contains(&"new".to_string()));
            // no duplicates even where the tag already existed
            assert_eq!(
                bookmark.tags.iter().filter(|t| *t == "shared").count(),
                1
            );
        } else {
            assert!(bookmark.tags.is_empty());
        }
    }
    assert!(library.tags().contains(&"shared".to_string()));
    assert!(library.tags().contains(&"new".to_string()));
}

#[test]
fn test_bulk_tag_empty_inputs_are_noops() {
    let (mut library, selection) = setup();
    assert_eq!(bulk_tag(&mut library, &HashSet::new(), &["x".to_string()]), 0);
    assert_eq!(bulk_tag(&mut library, &selection, &[]), 0);
    assert_eq!(bulk_tag(&mut library, &selection, &["  ".to_string()]), 0);
    assert!(library.tags().is_empty());
}

#[test]
fn test_selected_bookmarks_preserves_insertion_order() {
    let (library, selection) = setup();
    let selected = selected_bookmarks(&library, &selection);
    assert_eq!(selected.len(), 2);
    assert_eq!(selected[0].title, "Bookmark 1");
    assert_eq!(selected[1].title, "Bookmark 2");
}
