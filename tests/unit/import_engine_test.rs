//! Unit tests for the import engine: JSON validation and reconciliation,
//! Netscape HTML parsing, and CSV parsing.

use bookmarkpro::managers::library_manager::{LibraryManager, LibraryManagerTrait};
use bookmarkpro::services::import_engine::{
    append_parsed, apply_json, parse_csv, parse_json, parse_netscape, ImportMode,
};
use bookmarkpro::types::bookmark::BookmarkDraft;
use bookmarkpro::types::collection::CollectionDraft;
use bookmarkpro::types::errors::FormatError;
use chrono::Utc;

fn library_with(title: &str, url: &str) -> LibraryManager {
    let mut library = LibraryManager::new();
    library
        .create_bookmark(BookmarkDraft {
            title: title.to_string(),
            url: url.to_string(),
            ..Default::default()
        })
        .unwrap();
    library
}

// === JSON validation ===

#[test]
fn test_json_without_bookmarks_array_is_rejected() {
    assert!(matches!(
        parse_json(r#"{"collections": []}"#),
        Err(FormatError::MissingBookmarks)
    ));
    assert!(matches!(
        parse_json(r#"{"bookmarks": "not-an-array"}"#),
        Err(FormatError::MissingBookmarks)
    ));
    assert!(matches!(
        parse_json(r#"[1, 2, 3]"#),
        Err(FormatError::MissingBookmarks)
    ));
}

#[test]
fn test_malformed_json_is_rejected() {
    assert!(matches!(
        parse_json("{ not json"),
        Err(FormatError::InvalidJson(_))
    ));
}

#[test]
fn test_version_skew_requires_confirmation() {
    let payload = parse_json(r#"{"version": "3.0.0", "bookmarks": []}"#).unwrap();
    assert!(payload.requires_confirmation("2.1.0"));

    let payload = parse_json(r#"{"version": "2.1.0", "bookmarks": []}"#).unwrap();
    assert!(!payload.requires_confirmation("2.1.0"));

    let payload = parse_json(r#"{"version": "1.9.9", "bookmarks": []}"#).unwrap();
    assert!(!payload.requires_confirmation("2.1.0"));

    // undeclared version is accepted silently
    let payload = parse_json(r#"{"bookmarks": []}"#).unwrap();
    assert!(!payload.requires_confirmation("2.1.0"));
}

// === JSON merge ===

#[test]
fn test_merge_patches_matching_url_without_duplicating() {
    let mut library = library_with("Old title", "https://example.com");
    let original_id = library.bookmarks()[0].id.clone();

    let payload = parse_json(
        r#"{"bookmarks": [
            {"id": "foreign-id", "title": "New title", "url": "https://example.com", "rating": 4}
        ]}"#,
    )
    .unwrap();
    let report = apply_json(&mut library, &payload, ImportMode::Merge, Utc::now());

    assert_eq!(report.bookmarks, 1);
    assert_eq!(library.bookmarks().len(), 1);
    let merged = &library.bookmarks()[0];
    // identity is kept, supplied fields win, absent fields are retained
    assert_eq!(merged.id, original_id);
    assert_eq!(merged.title, "New title");
    assert_eq!(merged.rating, 4);
}

#[test]
fn test_merge_appends_unknown_url_with_fresh_id() {
    let mut library = library_with("Existing", "https://example.com");

    let payload = parse_json(
        r#"{"bookmarks": [
            {"id": "imported-id", "title": "Newcomer", "url": "https://new.example"}
        ]}"#,
    )
    .unwrap();
    apply_json(&mut library, &payload, ImportMode::Merge, Utc::now());

    assert_eq!(library.bookmarks().len(), 2);
    let appended = &library.bookmarks()[1];
    assert_eq!(appended.title, "Newcomer");
    assert_ne!(appended.id, "imported-id");
    assert!(!appended.id.is_empty());
}

#[test]
fn test_merge_collections_key_on_name_and_tags_union() {
    let mut library = LibraryManager::new();
    let work = library
        .create_collection(CollectionDraft {
            name: "Work".to_string(),
            ..Default::default()
        })
        .unwrap();
    library.register_tags(&["rust".to_string()]);

    let payload = parse_json(
        r##"{
            "bookmarks": [],
            "collections": [
                {"name": "Work", "color": "#000000"},
                {"name": "Travel"}
            ],
            "tags": ["rust", "maps"]
        }"##,
    )
    .unwrap();
    let report = apply_json(&mut library, &payload, ImportMode::Merge, Utc::now());

    assert_eq!(report.collections, 2);
    assert_eq!(library.collections().len(), 2);
    // matched by name: same id, patched color
    assert_eq!(library.collections()[0].id, work.id);
    assert_eq!(library.collections()[0].color, "#000000");
    assert_eq!(library.collections()[1].name, "Travel");

    // only genuinely new tags count
    assert_eq!(report.tags, 1);
    assert_eq!(library.tags(), &["rust".to_string(), "maps".to_string()]);
}

// === JSON replace ===

#[test]
fn test_replace_substitutes_records_and_merges_settings() {
    let mut library = library_with("Doomed", "https://doomed.example");
    library
        .update_setting("darkMode", serde_json::Value::Bool(true))
        .unwrap();

    let payload = parse_json(
        r#"{
            "bookmarks": [
                {"id": "kept-id", "title": "Imported", "url": "https://imported.example"}
            ],
            "collections": [{"id": "c1", "name": "Imported collection"}],
            "tags": ["fresh"],
            "settings": {"darkMode": false, "futureKey": "kept"}
        }"#,
    )
    .unwrap();
    let report = apply_json(&mut library, &payload, ImportMode::Replace, Utc::now());

    assert_eq!(report.bookmarks, 1);
    assert_eq!(library.bookmarks().len(), 1);
    // replace keeps imported ids
    assert_eq!(library.bookmarks()[0].id, "kept-id");
    assert_eq!(library.collections()[0].id, "c1");
    assert_eq!(library.tags(), &["fresh".to_string()]);

    // settings merged key-by-key: imported keys override, unknown keys kept
    assert!(!library.settings().dark_mode);
    assert!(library.settings().compact_view); // untouched default
    assert_eq!(
        library.settings().extra.get("futureKey"),
        Some(&serde_json::json!("kept"))
    );
}

#[test]
fn test_replace_without_optional_sections_keeps_them() {
    let mut library = LibraryManager::new();
    library
        .create_collection(CollectionDraft {
            name: "Survivor".to_string(),
            ..Default::default()
        })
        .unwrap();
    library.register_tags(&["survivor".to_string()]);

    let payload = parse_json(r#"{"bookmarks": []}"#).unwrap();
    apply_json(&mut library, &payload, ImportMode::Replace, Utc::now());

    assert!(library.bookmarks().is_empty());
    assert_eq!(library.collections().len(), 1);
    assert_eq!(library.tags(), &["survivor".to_string()]);
}

// === Netscape HTML ===

#[test]
fn test_html_import_parses_anchors() {
    let html = r#"<!DOCTYPE NETSCAPE-Bookmark-file-1>
<TITLE>Bookmarks</TITLE>
<DL><p>
    <DT><H3 FOLDED>Dev</H3>
    <DL><p>
        <DT><A HREF="https://github.com" ADD_DATE="1700000000" TAGS="git,dev">GitHub</A>
        <DD>Code hosting
        <DT><a href="https://rust-lang.org">  Rust  </a>
    </DL><p>
</DL><p>"#;

    let records = parse_netscape(html).unwrap();
    assert_eq!(records.len(), 2);

    assert_eq!(records[0].title, "GitHub");
    assert_eq!(records[0].url, "https://github.com");
    assert_eq!(records[0].tags, vec!["git".to_string(), "dev".to_string()]);

    // lowercase markup and surrounding whitespace are fine
    assert_eq!(records[1].title, "Rust");
    assert_eq!(records[1].url, "https://rust-lang.org");
    assert!(records[1].tags.is_empty());
}

#[test]
fn test_html_import_title_falls_back_to_url() {
    let records = parse_netscape(r#"<A HREF="https://no-text.example">   </A>"#).unwrap();
    assert_eq!(records[0].title, "https://no-text.example");
}

#[test]
fn test_html_import_skips_anchors_without_href_and_unescapes() {
    let html = r#"
        <A NAME="just-an-anchor">skip me</A>
        <A HREF="https://example.com/?a=1&amp;b=2">Fish &amp; Chips</A>
    "#;
    let records = parse_netscape(html).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].url, "https://example.com/?a=1&b=2");
    assert_eq!(records[0].title, "Fish & Chips");
}

#[test]
fn test_html_import_without_anchors_is_rejected() {
    assert!(matches!(
        parse_netscape("<html><body>nothing here</body></html>"),
        Err(FormatError::NoRecords)
    ));
}

#[test]
fn test_html_records_append_as_new_bookmarks() {
    let mut library = library_with("Existing", "https://github.com");
    let records = parse_netscape(r#"<A HREF="https://github.com">GitHub again</A>"#).unwrap();
    let report = append_parsed(&mut library, records, Utc::now());

    // appends even when the url already exists; never merges
    assert_eq!(report.bookmarks, 1);
    assert_eq!(library.bookmarks().len(), 2);
    assert_eq!(library.bookmarks()[1].collection, "");
    assert_eq!(library.bookmarks()[1].rating, 0);
    assert!(!library.bookmarks()[1].is_read);
}

// === CSV ===

#[test]
fn test_csv_import_full_row() {
    let csv = "# Exported from BookmarkPro v2.1.0\n\
               # Export Date: 2026-08-07T00:00:00Z\n\
               \n\
               \"Title\",\"URL\",\"Description\",\"Collection\",\"Tags\",\"Rating\",\"Created\",\"Visits\",\"Is Read\"\n\
               \"GitHub\",\"https://github.com\",\"Code hosting\",\"Work\",\"git; dev\",\"5\",\"2026-01-01T00:00:00Z\",\"12\",\"Yes\"";

    let records = parse_csv(csv).unwrap();
    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record.title, "GitHub");
    assert_eq!(record.url, "https://github.com");
    assert_eq!(record.description, "Code hosting");
    assert_eq!(record.tags, vec!["git".to_string(), "dev".to_string()]);
    assert_eq!(record.rating, 5);
    assert_eq!(record.visit_count, 12);
    assert!(record.is_read);
}

#[test]
fn test_csv_header_matching_is_case_insensitive_and_order_independent() {
    let csv = "\"url\",\"IS READ\",\"title\",\"RATING\"\n\
               \"https://example.com\",\"yes\",\"Example\",\"3\"";

    let records = parse_csv(csv).unwrap();
    assert_eq!(records[0].title, "Example");
    assert_eq!(records[0].url, "https://example.com");
    assert_eq!(records[0].rating, 3);
    assert!(records[0].is_read);
}

#[test]
fn test_csv_positional_fallback_without_recognized_headers() {
    let csv = "first,second\n\
               \"My title\",\"https://example.com\"";
    let records = parse_csv(csv).unwrap();
    assert_eq!(records[0].title, "My title");
    assert_eq!(records[0].url, "https://example.com");
}

#[test]
fn test_csv_quoted_fields_keep_commas_and_quotes() {
    let csv = "\"Title\",\"URL\",\"Description\"\n\
               \"Hello, world\",\"https://example.com\",\"He said \"\"hi\"\"\"";
    let records = parse_csv(csv).unwrap();
    assert_eq!(records[0].title, "Hello, world");
    assert_eq!(records[0].description, "He said \"hi\"");
}

#[test]
fn test_csv_lenient_numbers_and_read_flag() {
    let csv = "\"Title\",\"URL\",\"Rating\",\"Visits\",\"Is Read\"\n\
               \"A\",\"https://a.example\",\"banana\",\"-3\",\"no\"\n\
               \"B\",\"https://b.example\",\"4\",\"7\",\"YES\"";
    let records = parse_csv(csv).unwrap();
    assert_eq!(records[0].rating, 0);
    assert_eq!(records[0].visit_count, 0);
    assert!(!records[0].is_read);
    assert_eq!(records[1].rating, 4);
    assert_eq!(records[1].visit_count, 7);
    assert!(records[1].is_read);
}

#[test]
fn test_csv_skips_comments_blanks_and_short_rows() {
    let csv = "# preamble\n\
               \n\
               \"Title\",\"URL\"\n\
               # stray comment between rows\n\
               \"OnlyOneValue\"\n\
               \"Valid\",\"https://valid.example\"\n\
               \n";
    let records = parse_csv(csv).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].title, "Valid");
}

#[test]
fn test_csv_without_data_rows_is_rejected() {
    assert!(matches!(
        parse_csv("\"Title\",\"URL\"\n"),
        Err(FormatError::InvalidCsv(_))
    ));
    assert!(matches!(parse_csv(""), Err(FormatError::InvalidCsv(_))));
}

#[test]
fn test_csv_records_append_with_defaults_and_register_tags() {
    let mut library = LibraryManager::new();
    let csv = "\"Title\",\"URL\",\"Tags\"\n\
               \"A\",\"https://a.example\",\"alpha; beta\"";
    let records = parse_csv(csv).unwrap();
    let report = append_parsed(&mut library, records, Utc::now());

    assert_eq!(report.bookmarks, 1);
    assert_eq!(report.tags, 2);
    assert_eq!(library.tags(), &["alpha".to_string(), "beta".to_string()]);
    let appended = &library.bookmarks()[0];
    assert!(!appended.id.is_empty());
    assert_eq!(appended.visit_count, 0);
    assert_eq!(appended.collection, "");
}
