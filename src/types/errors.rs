use std::fmt;

// === ValidationError ===

/// A record failed validation; nothing was mutated.
#[derive(Debug)]
pub enum ValidationError {
    /// A required field was missing or empty.
    MissingField(&'static str),
    /// A settings value did not match the option's type.
    InvalidSetting(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::MissingField(field) => {
                write!(f, "Missing required field: {}", field)
            }
            ValidationError::InvalidSetting(msg) => write!(f, "Invalid setting value: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

// === NotFoundError ===

/// A referenced entity does not exist; the operation was aborted.
#[derive(Debug)]
pub enum NotFoundError {
    /// Bookmark with the given ID was not found.
    Bookmark(String),
    /// Collection with the given ID was not found.
    Collection(String),
}

impl fmt::Display for NotFoundError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotFoundError::Bookmark(id) => write!(f, "Bookmark not found: {}", id),
            NotFoundError::Collection(id) => write!(f, "Collection not found: {}", id),
        }
    }
}

impl std::error::Error for NotFoundError {}

// === FormatError ===

/// An import payload was malformed; existing state is untouched.
#[derive(Debug)]
pub enum FormatError {
    /// The payload is not valid JSON.
    InvalidJson(String),
    /// The JSON payload has no `bookmarks` array.
    MissingBookmarks,
    /// The CSV payload is structurally unusable.
    InvalidCsv(String),
    /// Parsing succeeded but produced no importable records.
    NoRecords,
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatError::InvalidJson(msg) => write!(f, "Invalid JSON: {}", msg),
            FormatError::MissingBookmarks => {
                write!(f, "Import payload has no bookmarks array")
            }
            FormatError::InvalidCsv(msg) => write!(f, "Invalid CSV: {}", msg),
            FormatError::NoRecords => write!(f, "No importable records found"),
        }
    }
}

impl std::error::Error for FormatError {}

// === StorageError ===

/// Persistence failed. The in-memory mutation has already happened and is
/// NOT rolled back; callers must surface this so the user knows memory may
/// diverge from disk until the next successful save.
#[derive(Debug)]
pub enum StorageError {
    /// The underlying database operation failed.
    Database(String),
    /// Serializing or deserializing a blob failed.
    Serialization(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Database(msg) => write!(f, "Storage database error: {}", msg),
            StorageError::Serialization(msg) => {
                write!(f, "Storage serialization error: {}", msg)
            }
        }
    }
}

impl std::error::Error for StorageError {}

// === AppError ===

/// Umbrella error for app-core operations that can fail in more than one
/// domain (e.g. validate, then persist).
#[derive(Debug)]
pub enum AppError {
    Validation(ValidationError),
    NotFound(NotFoundError),
    Format(FormatError),
    Storage(StorageError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Validation(err) => err.fmt(f),
            AppError::NotFound(err) => err.fmt(f),
            AppError::Format(err) => err.fmt(f),
            AppError::Storage(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for AppError {}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::Validation(err)
    }
}

impl From<NotFoundError> for AppError {
    fn from(err: NotFoundError) -> Self {
        AppError::NotFound(err)
    }
}

impl From<FormatError> for AppError {
    fn from(err: FormatError) -> Self {
        AppError::Format(err)
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        AppError::Storage(err)
    }
}
