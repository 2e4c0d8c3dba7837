use bookmarkpro::types::errors::*;

// === ValidationError Tests ===

#[test]
fn validation_error_missing_field_display() {
    let err = ValidationError::MissingField("title");
    assert_eq!(err.to_string(), "Missing required field: title");
}

#[test]
fn validation_error_invalid_setting_display() {
    let err = ValidationError::InvalidSetting("darkMode: expected a boolean".to_string());
    assert_eq!(
        err.to_string(),
        "Invalid setting value: darkMode: expected a boolean"
    );
}

#[test]
fn validation_error_implements_error_trait() {
    let err: Box<dyn std::error::Error> = Box::new(ValidationError::MissingField("url"));
    assert!(err.source().is_none());
}

// === NotFoundError Tests ===

#[test]
fn not_found_error_display_variants() {
    assert_eq!(
        NotFoundError::Bookmark("bm-1".to_string()).to_string(),
        "Bookmark not found: bm-1"
    );
    assert_eq!(
        NotFoundError::Collection("col-9".to_string()).to_string(),
        "Collection not found: col-9"
    );
}

// === FormatError Tests ===

#[test]
fn format_error_display_variants() {
    assert_eq!(
        FormatError::InvalidJson("unexpected EOF".to_string()).to_string(),
        "Invalid JSON: unexpected EOF"
    );
    assert_eq!(
        FormatError::MissingBookmarks.to_string(),
        "Import payload has no bookmarks array"
    );
    assert_eq!(
        FormatError::InvalidCsv("no data rows".to_string()).to_string(),
        "Invalid CSV: no data rows"
    );
    assert_eq!(
        FormatError::NoRecords.to_string(),
        "No importable records found"
    );
}

// === StorageError Tests ===

#[test]
fn storage_error_display_variants() {
    assert_eq!(
        StorageError::Database("disk full".to_string()).to_string(),
        "Storage database error: disk full"
    );
    assert_eq!(
        StorageError::Serialization("bad blob".to_string()).to_string(),
        "Storage serialization error: bad blob"
    );
}

// === AppError Tests ===

#[test]
fn app_error_delegates_display_and_converts() {
    let err: AppError = ValidationError::MissingField("name").into();
    assert_eq!(err.to_string(), "Missing required field: name");

    let err: AppError = NotFoundError::Bookmark("x".to_string()).into();
    assert_eq!(err.to_string(), "Bookmark not found: x");

    let err: AppError = FormatError::MissingBookmarks.into();
    assert_eq!(err.to_string(), "Import payload has no bookmarks array");

    let err: AppError = StorageError::Database("locked".to_string()).into();
    assert_eq!(err.to_string(), "Storage database error: locked");
}
