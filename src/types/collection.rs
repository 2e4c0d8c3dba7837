use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user-defined grouping of bookmarks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Display color as a hex string, e.g. "#3b82f6".
    #[serde(default)]
    pub color: String,
    /// Symbolic icon name, e.g. "ri-briefcase-line".
    #[serde(default)]
    pub icon: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Collection {
    /// The three starter collections seeded on first run, when no
    /// `collections` blob has ever been persisted.
    pub fn seed_set(now: DateTime<Utc>) -> Vec<Collection> {
        let seed = |id: &str, name: &str, description: &str, color: &str, icon: &str| Collection {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            color: color.to_string(),
            icon: icon.to_string(),
            created_at: now,
            updated_at: None,
        };
        vec![
            seed("work", "Work", "Work-related bookmarks", "#3b82f6", "ri-briefcase-line"),
            seed("personal", "Personal", "Personal bookmarks", "#10b981", "ri-heart-line"),
            seed("learning", "Learning", "Educational resources", "#f59e0b", "ri-book-line"),
        ]
    }
}

/// User-supplied fields for creating or editing a collection.
#[derive(Debug, Clone, Default)]
pub struct CollectionDraft {
    pub name: String,
    pub description: String,
    pub color: String,
    pub icon: String,
}
