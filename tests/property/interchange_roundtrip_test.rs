//! Property-based round-trip tests for the interchange formats.
//!
//! A JSON export applied back with "replace" must reproduce an equivalent
//! bookmark/collection/tag set, and a CSV export must re-import with the
//! same record count even for fields full of commas and quotes.

use bookmarkpro::managers::library_manager::LibraryManager;
use bookmarkpro::services::export_engine::{ExportEngine, ExportEngineTrait};
use bookmarkpro::services::import_engine::{apply_json, parse_csv, parse_json, ImportMode};
use bookmarkpro::types::bookmark::{Bookmark, Priority};
use bookmarkpro::types::collection::Collection;
use bookmarkpro::types::settings::AppSettings;
use chrono::Utc;
use proptest::prelude::*;

fn arb_priority() -> impl Strategy<Value = Priority> {
    prop_oneof![
        Just(Priority::Low),
        Just(Priority::Medium),
        Just(Priority::High),
    ]
}

/// Bookmark with printable single-line fields, including CSV-hostile
/// characters (commas, quotes, semicolons).
fn arb_bookmark(index: usize) -> impl Strategy<Value = Bookmark> {
    (
        "[A-Za-z0-9][A-Za-z0-9 ,\"';&<>]{0,24}",
        "https://[a-z]{3,12}\\.(com|org|dev)(/[a-z0-9]{0,8})?",
        "[A-Za-z0-9 ,\"]{0,20}",
        proptest::collection::vec("[a-z]{1,8}", 0..4),
        0u8..=5,
        any::<bool>(),
        any::<bool>(),
        arb_priority(),
        0u32..1000,
    )
        .prop_map(
            move |(title, url, description, tags, rating, is_read, is_broken, priority, visit_count)| {
                let mut bookmark = Bookmark {
                    id: format!("id-{}", index),
                    title,
                    url,
                    description,
                    collection: String::new(),
                    tags,
                    rating,
                    is_read,
                    is_broken,
                    priority,
                    notes: String::new(),
                    created_at: Utc::now(),
                    updated_at: None,
                    last_visited: None,
                    visit_count,
                };
                bookmark.normalize();
                bookmark
            },
        )
}

fn arb_bookmarks() -> impl Strategy<Value = Vec<Bookmark>> {
    proptest::collection::vec(any::<u8>(), 1..12).prop_flat_map(|seeds| {
        seeds
            .into_iter()
            .enumerate()
            .map(|(i, _)| arb_bookmark(i).boxed())
            .collect::<Vec<_>>()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    // Export to JSON, import with "replace" into an empty library:
    // bookmarks, collections, and tags come back equivalent, ids included.
    #[test]
    fn json_replace_roundtrip_reproduces_state(bookmarks in arb_bookmarks()) {
        let collections = Collection::seed_set(Utc::now());
        let tags = vec!["alpha".to_string(), "beta".to_string()];
        let library = LibraryManager::from_parts(
            bookmarks.clone(),
            collections.clone(),
            tags.clone(),
            AppSettings::default(),
        );

        let exported = ExportEngine::default()
            .export_json(&library, None, Utc::now())
            .expect("export should serialize");

        let payload = parse_json(&exported.contents).expect("export must re-parse");
        let mut restored = LibraryManager::new();
        let report = apply_json(&mut restored, &payload, ImportMode::Replace, Utc::now());

        prop_assert_eq!(report.bookmarks, bookmarks.len());
        prop_assert_eq!(restored.bookmarks(), bookmarks.as_slice());
        prop_assert_eq!(restored.collections(), collections.as_slice());
        prop_assert_eq!(restored.tags(), tags.as_slice());
    }

    // Export to CSV, re-import: every exported row parses back, so the
    // append-mode count equals the original bookmark count.
    #[test]
    fn csv_roundtrip_preserves_record_count(bookmarks in arb_bookmarks()) {
        let count = bookmarks.len();
        let library = LibraryManager::from_parts(
            bookmarks,
            Vec::new(),
            Vec::new(),
            AppSettings::default(),
        );

        let exported = ExportEngine::default().export_csv(&library, Utc::now());
        let records = parse_csv(&exported.contents).expect("export must re-parse");
        prop_assert_eq!(records.len(), count);
    }

    // Titles and tags survive the CSV round trip (modulo the trimming the
    // importer applies to every cell).
    #[test]
    fn csv_roundtrip_preserves_title_and_tags(bookmarks in arb_bookmarks()) {
        let library = LibraryManager::from_parts(
            bookmarks.clone(),
            Vec::new(),
            Vec::new(),
            AppSettings::default(),
        );

        let exported = ExportEngine::default().export_csv(&library, Utc::now());
        let records = parse_csv(&exported.contents).expect("export must re-parse");

        for (original, record) in bookmarks.iter().zip(&records) {
            prop_assert_eq!(original.title.trim(), record.title.as_str());
            prop_assert_eq!(&original.tags, &record.tags);
            prop_assert_eq!(original.rating, record.rating);
            prop_assert_eq!(original.visit_count, record.visit_count);
            prop_assert_eq!(original.is_read, record.is_read);
        }
    }
}
