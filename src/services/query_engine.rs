//! Query engine for BookmarkPro.
//!
//! Collection membership (including the virtual collections), free-text
//! search, and multi-key sorting. Everything here is a pure function over
//! bookmark slices — the model instance is passed in explicitly and
//! nothing is cached, so virtual collections always reflect live state.
//!
//! The pipeline order is fixed: resolve → search → sort. Search narrows
//! the set before sorting pays its cost, and resolution must run first so
//! virtual predicates apply to the full live set.

use chrono::{DateTime, Utc};

use crate::types::bookmark::Bookmark;

/// Rating at or above which a bookmark counts as favorite.
const FAVORITE_THRESHOLD: u8 = 4;
/// Age window of the `recent` virtual collection, in ceiling-days.
const RECENT_WINDOW_DAYS: i64 = 7;

const SECONDS_PER_DAY: i64 = 86_400;

/// A stored collection id or one of the computed virtual collections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectionSelector {
    All,
    Favorites,
    Recent,
    Unread,
    Broken,
    Stored(String),
}

impl CollectionSelector {
    /// Parses a selector string. The virtual names are reserved; anything
    /// else is treated as a stored collection id.
    pub fn parse(raw: &str) -> CollectionSelector {
        match raw {
            "all" => CollectionSelector::All,
            "favorites" => CollectionSelector::Favorites,
            "recent" => CollectionSelector::Recent,
            "unread" => CollectionSelector::Unread,
            "broken" => CollectionSelector::Broken,
            other => CollectionSelector::Stored(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            CollectionSelector::All => "all",
            CollectionSelector::Favorites => "favorites",
            CollectionSelector::Recent => "recent",
            CollectionSelector::Unread => "unread",
            CollectionSelector::Broken => "broken",
            CollectionSelector::Stored(id) => id,
        }
    }
}

/// Sort orders the presentation layer can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    /// Title ascending, case-insensitive.
    Title,
    /// Newest first.
    DateDesc,
    /// Oldest first.
    DateAsc,
    /// Highest rating first.
    Rating,
    /// Most visited first.
    Visits,
}

impl SortKey {
    /// Parses a sort-key string. Unknown keys yield `None`, which the
    /// sort treats as "leave the order alone".
    pub fn parse(raw: &str) -> Option<SortKey> {
        match raw {
            "title" => Some(SortKey::Title),
            "date-desc" => Some(SortKey::DateDesc),
            "date-asc" => Some(SortKey::DateAsc),
            "rating" => Some(SortKey::Rating),
            "visits" => Some(SortKey::Visits),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Title => "title",
            SortKey::DateDesc => "date-desc",
            SortKey::DateAsc => "date-asc",
            SortKey::Rating => "rating",
            SortKey::Visits => "visits",
        }
    }
}

/// Whether a creation timestamp falls inside the `recent` window.
///
/// Ceiling-day arithmetic on the absolute difference: a bookmark created
/// exactly seven days ago is still recent, one second older is not.
pub fn is_recent(created_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    let elapsed = (now - created_at).num_seconds().abs();
    let days = (elapsed + SECONDS_PER_DAY - 1) / SECONDS_PER_DAY;
    days <= RECENT_WINDOW_DAYS
}

/// Resolves a selector to its member bookmarks in insertion order.
pub fn resolve_collection(
    bookmarks: &[Bookmark],
    selector: &CollectionSelector,
    now: DateTime<Utc>,
) -> Vec<Bookmark> {
    bookmarks
        .iter()
        .filter(|b| match selector {
            CollectionSelector::All => true,
            CollectionSelector::Favorites => b.rating >= FAVORITE_THRESHOLD,
            CollectionSelector::Recent => is_recent(b.created_at, now),
            CollectionSelector::Unread => !b.is_read,
            CollectionSelector::Broken => b.is_broken,
            CollectionSelector::Stored(id) => &b.collection == id,
        })
        .cloned()
        .collect()
}

/// Case-insensitive substring search over title, description, url, and
/// tags. A blank query passes the input through untouched.
pub fn search(bookmarks: Vec<Bookmark>, query: &str) -> Vec<Bookmark> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return bookmarks;
    }
    bookmarks
        .into_iter()
        .filter(|b| {
            b.title.to_lowercase().contains(&query)
                || b.description.to_lowercase().contains(&query)
                || b.url.to_lowercase().contains(&query)
                || b.tags.iter().any(|t| t.to_lowercase().contains(&query))
        })
        .collect()
}

/// Sorts bookmarks by the given key. Stable for equal keys; `None` (an
/// unknown key) leaves the order untouched.
pub fn sort_bookmarks(mut bookmarks: Vec<Bookmark>, key: Option<SortKey>) -> Vec<Bookmark> {
    match key {
        None => {}
        Some(SortKey::Title) => {
            bookmarks.sort_by(|a, b| a.title.to_lowercase().cmp(&b.title.to_lowercase()))
        }
        Some(SortKey::DateDesc) => bookmarks.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        Some(SortKey::DateAsc) => bookmarks.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
        Some(SortKey::Rating) => bookmarks.sort_by(|a, b| b.rating.cmp(&a.rating)),
        Some(SortKey::Visits) => bookmarks.sort_by(|a, b| b.visit_count.cmp(&a.visit_count)),
    }
    bookmarks
}

/// The full view pipeline: resolve the collection, narrow by search, then
/// sort. The order is significant and must not be rearranged.
pub fn filtered_view(
    bookmarks: &[Bookmark],
    selector: &CollectionSelector,
    query: &str,
    key: Option<SortKey>,
    now: DateTime<Utc>,
) -> Vec<Bookmark> {
    sort_bookmarks(search(resolve_collection(bookmarks, selector, now), query), key)
}
