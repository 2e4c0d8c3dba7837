use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Highest rating a bookmark can carry.
pub const MAX_RATING: u8 = 5;

/// Importance level a user can assign to a bookmark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Medium
    }
}

/// A saved bookmark.
///
/// Field names serialize in camelCase so persisted blobs and the JSON
/// interchange format line up with existing BookmarkPro export files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bookmark {
    pub id: String,
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub description: String,
    /// Owning collection id; empty string means uncategorized.
    #[serde(default)]
    pub collection: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub rating: u8,
    #[serde(default)]
    pub is_read: bool,
    #[serde(default)]
    pub is_broken: bool,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub notes: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_visited: Option<DateTime<Utc>>,
    #[serde(default)]
    pub visit_count: u32,
}

impl Bookmark {
    /// Restores the record invariants: rating clamped to [0, MAX_RATING],
    /// tags free of empty strings and duplicates.
    pub fn normalize(&mut self) {
        if self.rating > MAX_RATING {
            self.rating = MAX_RATING;
        }
        self.tags = dedup_tags(std::mem::take(&mut self.tags));
    }
}

/// User-supplied fields for creating or editing a bookmark.
///
/// `is_broken` is intentionally absent: link health is flagged by a
/// separate check, never entered by hand.
#[derive(Debug, Clone, Default)]
pub struct BookmarkDraft {
    pub title: String,
    pub url: String,
    pub description: String,
    pub collection: String,
    pub tags: Vec<String>,
    pub rating: u8,
    pub is_read: bool,
    pub priority: Priority,
    pub notes: String,
}

/// Trims tags, drops empty ones, and removes duplicates while keeping
/// first-occurrence order.
pub fn dedup_tags(tags: Vec<String>) -> Vec<String> {
    let mut clean: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim();
        if tag.is_empty() || clean.iter().any(|t| t == tag) {
            continue;
        }
        clean.push(tag.to_string());
    }
    clean
}
