//! Import engine for BookmarkPro.
//!
//! Decoders for JSON snapshots, Netscape-style bookmark HTML, and CSV,
//! plus the merge/replace reconciliation that folds a JSON snapshot into
//! existing state.
//!
//! The flow is confirm-then-commit: `parse_*` functions validate and build
//! records without touching the library, so a caller can show counts (or a
//! version-skew warning) and only then call `apply_json` / `append_parsed`.
//! A declined confirmation simply never commits.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::managers::library_manager::LibraryManager;
use crate::types::bookmark::{Bookmark, Priority};
use crate::types::collection::Collection;
use crate::types::errors::FormatError;

/// How a JSON payload is reconciled against existing state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportMode {
    /// Bookmarks keyed by url, collections by name; matches are patched in
    /// place, everything else is appended with a fresh id. Tags union.
    Merge,
    /// Wholesale substitution of bookmarks/collections/tags; settings are
    /// merged key-by-key instead of replaced.
    Replace,
}

/// Counts of records ingested by an import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub bookmarks: usize,
    pub collections: usize,
    pub tags: usize,
}

/// A bookmark as it appears in a foreign JSON payload: every field
/// optional, so a merge can tell "absent" (retain the existing value)
/// from "present" (imported value wins).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BookmarkPatch {
    pub id: Option<String>,
    pub title: Option<String>,
    pub url: Option<String>,
    pub description: Option<String>,
    pub collection: Option<String>,
    pub tags: Option<Vec<String>>,
    pub rating: Option<u8>,
    pub is_read: Option<bool>,
    pub is_broken: Option<bool>,
    pub priority: Option<Priority>,
    pub notes: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub last_visited: Option<DateTime<Utc>>,
    pub visit_count: Option<u32>,
}

impl BookmarkPatch {
    /// Copies every supplied field onto `target`. The target keeps its id:
    /// identity is not importable data.
    fn apply_to(&self, target: &mut Bookmark) {
        if let Some(v) = &self.title {
            target.title = v.clone();
        }
        if let Some(v) = &self.url {
            target.url = v.clone();
        }
        if let Some(v) = &self.description {
            target.description = v.clone();
        }
        if let Some(v) = &self.collection {
            target.collection = v.clone();
        }
        if let Some(v) = &self.tags {
            target.tags = v.clone();
        }
        if let Some(v) = self.rating {
            target.rating = v;
        }
        if let Some(v) = self.is_read {
            target.is_read = v;
        }
        if let Some(v) = self.is_broken {
            target.is_broken = v;
        }
        if let Some(v) = self.priority {
            target.priority = v;
        }
        if let Some(v) = &self.notes {
            target.notes = v.clone();
        }
        if let Some(v) = self.created_at {
            target.created_at = v;
        }
        if let Some(v) = self.updated_at {
            target.updated_at = Some(v);
        }
        if let Some(v) = self.last_visited {
            target.last_visited = Some(v);
        }
        if let Some(v) = self.visit_count {
            target.visit_count = v;
        }
        target.normalize();
    }

    /// Builds a complete bookmark under the given id, filling absent
    /// fields with defaults.
    fn materialize(&self, id: String, now: DateTime<Utc>) -> Bookmark {
        let mut bookmark = Bookmark {
            id,
            title: self.title.clone().unwrap_or_default(),
            url: self.url.clone().unwrap_or_default(),
            description: self.description.clone().unwrap_or_default(),
            collection: self.collection.clone().unwrap_or_default(),
            tags: self.tags.clone().unwrap_or_default(),
            rating: self.rating.unwrap_or(0),
            is_read: self.is_read.unwrap_or(false),
            is_broken: self.is_broken.unwrap_or(false),
            priority: self.priority.unwrap_or_default(),
            notes: self.notes.clone().unwrap_or_default(),
            created_at: self.created_at.unwrap_or(now),
            updated_at: self.updated_at,
            last_visited: self.last_visited,
            visit_count: self.visit_count.unwrap_or(0),
        };
        bookmark.normalize();
        bookmark
    }
}

/// A collection as it appears in a foreign JSON payload.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CollectionPatch {
    pub id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
    pub icon: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl CollectionPatch {
    fn apply_to(&self, target: &mut Collection) {
        if let Some(v) = &self.name {
            target.name = v.clone();
        }
        if let Some(v) = &self.description {
            target.description = v.clone();
        }
        if let Some(v) = &self.color {
            target.color = v.clone();
        }
        if let Some(v) = &self.icon {
            target.icon = v.clone();
        }
        if let Some(v) = self.created_at {
            target.created_at = v;
        }
        if let Some(v) = self.updated_at {
            target.updated_at = Some(v);
        }
    }

    fn materialize(&self, id: String, now: DateTime<Utc>) -> Collection {
        Collection {
            id,
            name: self.name.clone().unwrap_or_default(),
            description: self.description.clone().unwrap_or_default(),
            color: self.color.clone().unwrap_or_default(),
            icon: self.icon.clone().unwrap_or_default(),
            created_at: self.created_at.unwrap_or(now),
            updated_at: self.updated_at,
        }
    }
}

/// A validated JSON import payload, not yet applied.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonPayload {
    #[serde(default)]
    pub version: Option<String>,
    pub bookmarks: Vec<BookmarkPatch>,
    #[serde(default)]
    pub collections: Option<Vec<CollectionPatch>>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub settings: Option<Value>,
}

impl JsonPayload {
    /// True when the payload declares a schema version newer than
    /// `current`, in which case the caller must obtain explicit
    /// confirmation before applying. This is a policy gate, not an error.
    pub fn requires_confirmation(&self, current: &str) -> bool {
        match &self.version {
            Some(declared) => version_segments(declared) > version_segments(current),
            None => false,
        }
    }
}

/// Numeric dotted-segment version parse; non-numeric segments are skipped.
fn version_segments(v: &str) -> Vec<u32> {
    v.trim_start_matches('v')
        .split('.')
        .filter_map(|s| s.parse().ok())
        .collect()
}

/// Parses and validates a JSON snapshot. Rejects payloads that are not an
/// object carrying a `bookmarks` array.
pub fn parse_json(text: &str) -> Result<JsonPayload, FormatError> {
    let value: Value =
        serde_json::from_str(text).map_err(|e| FormatError::InvalidJson(e.to_string()))?;

    let is_valid = value
        .as_object()
        .and_then(|obj| obj.get("bookmarks"))
        .map(Value::is_array)
        .unwrap_or(false);
    if !is_valid {
        return Err(FormatError::MissingBookmarks);
    }

    serde_json::from_value(value).map_err(|e| FormatError::InvalidJson(e.to_string()))
}

/// Applies a parsed JSON payload to the library. Returns the ingest
/// counts; the caller persists afterwards.
pub fn apply_json(
    library: &mut LibraryManager,
    payload: &JsonPayload,
    mode: ImportMode,
    now: DateTime<Utc>,
) -> ImportReport {
    match mode {
        ImportMode::Merge => apply_merge(library, payload, now),
        ImportMode::Replace => apply_replace(library, payload, now),
    }
}

fn apply_merge(library: &mut LibraryManager, payload: &JsonPayload, now: DateTime<Utc>) -> ImportReport {
    use crate::managers::library_manager::LibraryManagerTrait;

    let mut report = ImportReport::default();

    for patch in &payload.bookmarks {
        let existing = patch
            .url
            .as_ref()
            .and_then(|url| library.bookmarks().iter().position(|b| &b.url == url));
        match existing {
            Some(index) => patch.apply_to(&mut library.bookmarks_mut()[index]),
            None => {
                let bookmark = patch.materialize(LibraryManager::generate_id(), now);
                library.bookmarks_mut().push(bookmark);
            }
        }
        report.bookmarks += 1;
    }

    if let Some(collections) = &payload.collections {
        for patch in collections {
            let existing = patch
                .name
                .as_ref()
                .and_then(|name| library.collections().iter().position(|c| &c.name == name));
            match existing {
                Some(index) => patch.apply_to(&mut library.collections_mut()[index]),
                None => {
                    let collection = patch.materialize(LibraryManager::generate_id(), now);
                    library.collections_mut().push(collection);
                }
            }
            report.collections += 1;
        }
    }

    if let Some(tags) = &payload.tags {
        let before = library.tags().len();
        library.register_tags(tags);
        report.tags = library.tags().len() - before;
    }

    log::debug!(
        "merged import: {} bookmarks, {} collections, {} new tags",
        report.bookmarks,
        report.collections,
        report.tags
    );
    report
}

fn apply_replace(library: &mut LibraryManager, payload: &JsonPayload, now: DateTime<Utc>) -> ImportReport {
    let mut report = ImportReport::default();

    let bookmarks: Vec<Bookmark> = payload
        .bookmarks
        .iter()
        .map(|p| {
            let id = p.id.clone().unwrap_or_else(LibraryManager::generate_id);
            p.materialize(id, now)
        })
        .collect();
    report.bookmarks = bookmarks.len();
    library.replace_bookmarks(bookmarks);

    if let Some(patches) = &payload.collections {
        let collections: Vec<Collection> = patches
            .iter()
            .map(|p| {
                let id = p.id.clone().unwrap_or_else(LibraryManager::generate_id);
                p.materialize(id, now)
            })
            .collect();
        report.collections = collections.len();
        library.replace_collections(collections);
    }

    if let Some(tags) = &payload.tags {
        report.tags = tags.len();
        library.replace_tags(tags.clone());
    }

    if let Some(settings) = &payload.settings {
        match library.settings().merged(settings) {
            Some(merged) => library.replace_settings(merged),
            None => log::warn!("imported settings ignored: incompatible with the settings schema"),
        }
    }

    log::debug!(
        "replaced state from import: {} bookmarks, {} collections, {} tags",
        report.bookmarks,
        report.collections,
        report.tags
    );
    report
}

/// A record parsed out of a foreign HTML or CSV file, not yet added to the
/// library. Ids are only assigned at append time.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedBookmark {
    pub title: String,
    pub url: String,
    pub description: String,
    pub tags: Vec<String>,
    pub rating: u8,
    pub is_read: bool,
    pub visit_count: u32,
}

/// Appends parsed records as brand-new bookmarks. HTML and CSV imports
/// never merge against existing records.
pub fn append_parsed(
    library: &mut LibraryManager,
    records: Vec<ParsedBookmark>,
    now: DateTime<Utc>,
) -> ImportReport {
    use crate::managers::library_manager::LibraryManagerTrait;

    let mut report = ImportReport::default();
    for record in records {
        let mut bookmark = Bookmark {
            id: LibraryManager::generate_id(),
            title: record.title,
            url: record.url,
            description: record.description,
            collection: String::new(),
            tags: record.tags,
            rating: record.rating,
            is_read: record.is_read,
            is_broken: false,
            priority: Priority::default(),
            notes: String::new(),
            created_at: now,
            updated_at: None,
            last_visited: None,
            visit_count: record.visit_count,
        };
        bookmark.normalize();

        let before = library.tags().len();
        let tags = bookmark.tags.clone();
        library.register_tags(&tags);
        report.tags += library.tags().len() - before;

        library.bookmarks_mut().push(bookmark);
        report.bookmarks += 1;
    }
    report
}

// === Netscape HTML ===

/// Parses anchor elements out of a Netscape-style bookmark document.
///
/// Title is the link text, falling back to the href when empty; tags come
/// from a non-standard comma-separated `tags` attribute. Anchors without
/// an href are skipped.
pub fn parse_netscape(html: &str) -> Result<Vec<ParsedBookmark>, FormatError> {
    let mut records = Vec::new();

    for (attrs, text) in scan_anchors(html) {
        let attrs = parse_attrs(&attrs);
        let href = match attr_value(&attrs, "href") {
            Some(href) if !href.trim().is_empty() => unescape_html(href.trim()),
            _ => continue,
        };

        let title_text = unescape_html(text.trim());
        let title = if title_text.is_empty() {
            href.clone()
        } else {
            title_text
        };

        let tags = attr_value(&attrs, "tags")
            .map(|raw| {
                raw.split(',')
                    .map(|t| unescape_html(t.trim()))
                    .filter(|t| !t.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        records.push(ParsedBookmark {
            title,
            url: href,
            description: String::new(),
            tags,
            rating: 0,
            is_read: false,
            visit_count: 0,
        });
    }

    if records.is_empty() {
        return Err(FormatError::NoRecords);
    }
    log::debug!("parsed {} anchors from HTML import", records.len());
    Ok(records)
}

/// Finds `needle` in `haystack` at or after `from`, comparing ASCII
/// case-insensitively. The needle must be ASCII.
fn find_ci(haystack: &str, needle: &str, from: usize) -> Option<usize> {
    let hay = haystack.as_bytes();
    let ned = needle.as_bytes();
    if ned.is_empty() || from + ned.len() > hay.len() {
        return None;
    }
    (from..=hay.len() - ned.len()).find(|&i| hay[i..i + ned.len()].eq_ignore_ascii_case(ned))
}

/// Scans for anchor tags and yields (attribute text, inner text) pairs.
fn scan_anchors(html: &str) -> Vec<(String, String)> {
    let bytes = html.as_bytes();
    let mut anchors = Vec::new();
    let mut pos = 0;

    while let Some(start) = find_ci(html, "<a", pos) {
        let after = start + 2;
        // "<a" must actually open a tag
        match bytes.get(after) {
            Some(b) if b.is_ascii_whitespace() || *b == b'>' => {}
            _ => {
                pos = after;
                continue;
            }
        }
        let tag_end = match html[after..].find('>') {
            Some(rel) => after + rel,
            None => break,
        };
        let text_start = tag_end + 1;
        let text_end = find_ci(html, "</a", text_start).unwrap_or(html.len());
        anchors.push((
            html[after..tag_end].to_string(),
            html[text_start..text_end].to_string(),
        ));
        pos = text_end;
    }
    anchors
}

/// Tokenizes an attribute string into lowercase-name/value pairs. Values
/// may be double-quoted, single-quoted, or bare.
fn parse_attrs(attrs: &str) -> Vec<(String, String)> {
    let mut out = Vec::new();
    let mut rest = attrs.trim_start();

    while !rest.is_empty() {
        let name_end = rest
            .find(|c: char| c == '=' || c.is_whitespace())
            .unwrap_or(rest.len());
        if name_end == 0 {
            // stray '=' or similar; skip one char
            let mut chars = rest.chars();
            chars.next();
            rest = chars.as_str().trim_start();
            continue;
        }
        let name = rest[..name_end].to_lowercase();
        rest = rest[name_end..].trim_start();

        if let Some(stripped) = rest.strip_prefix('=') {
            let value_part = stripped.trim_start();
            match value_part.chars().next() {
                Some(quote) if quote == '"' || quote == '\'' => {
                    let inner = &value_part[1..];
                    match inner.find(quote) {
                        Some(end) => {
                            out.push((name, inner[..end].to_string()));
                            rest = inner[end + 1..].trim_start();
                        }
                        None => {
                            out.push((name, inner.to_string()));
                            rest = "";
                        }
                    }
                }
                _ => {
                    let value_end = value_part
                        .find(|c: char| c.is_whitespace())
                        .unwrap_or(value_part.len());
                    out.push((name, value_part[..value_end].to_string()));
                    rest = value_part[value_end..].trim_start();
                }
            }
        } else {
            // bare attribute, e.g. FOLDED
            out.push((name, String::new()));
        }
    }
    out
}

fn attr_value(attrs: &[(String, String)], name: &str) -> Option<String> {
    attrs
        .iter()
        .find(|(n, _)| n == name)
        .map(|(_, v)| v.clone())
}

/// Reverses the entity escaping applied on export.
pub fn unescape_html(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

// === CSV ===

/// Parses a CSV export. Lines starting with `#` and blank lines are
/// skipped; the first remaining line is the header. Columns are located by
/// header name, case-insensitively and order-independently, falling back
/// to positions 0/1 for title/url. Rows with fewer than two resolved
/// values are skipped.
pub fn parse_csv(text: &str) -> Result<Vec<ParsedBookmark>, FormatError> {
    let lines: Vec<&str> = text
        .lines()
        .filter(|line| {
            let trimmed = line.trim();
            !trimmed.is_empty() && !trimmed.starts_with('#')
        })
        .collect();

    if lines.len() < 2 {
        return Err(FormatError::InvalidCsv(
            "expected a header row and at least one data row".to_string(),
        ));
    }

    let header = split_csv_line(lines[0]);
    let column = |name: &str| header.iter().position(|h| h.eq_ignore_ascii_case(name));
    let title_col = column("title");
    let url_col = column("url");
    let description_col = column("description");
    let tags_col = column("tags");
    let rating_col = column("rating");
    let visits_col = column("visits");
    let read_col = column("is read");

    let mut records = Vec::new();
    for line in &lines[1..] {
        let values = split_csv_line(line);
        if values.len() < 2 {
            continue;
        }

        let cell = |idx: Option<usize>| idx.and_then(|i| values.get(i)).map(|s| s.as_str());
        // header lookup first, positional fallback for the two required columns
        let title = cell(title_col)
            .filter(|s| !s.is_empty())
            .or_else(|| values.first().map(|s| s.as_str()))
            .unwrap_or_default()
            .to_string();
        let url = cell(url_col)
            .filter(|s| !s.is_empty())
            .or_else(|| values.get(1).map(|s| s.as_str()))
            .unwrap_or_default()
            .to_string();

        let description = cell(description_col).unwrap_or_default().to_string();
        let tags = cell(tags_col)
            .map(|raw| {
                raw.split(';')
                    .map(|t| t.trim().to_string())
                    .filter(|t| !t.is_empty())
                    .collect()
            })
            .unwrap_or_default();
        let rating = cell(rating_col)
            .and_then(|v| v.parse::<u8>().ok())
            .unwrap_or(0);
        let visit_count = cell(visits_col)
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(0);
        let is_read = cell(read_col)
            .map(|v| v.eq_ignore_ascii_case("yes"))
            .unwrap_or(false);

        records.push(ParsedBookmark {
            title,
            url,
            description,
            tags,
            rating,
            is_read,
            visit_count,
        });
    }

    if records.is_empty() {
        return Err(FormatError::NoRecords);
    }
    log::debug!("parsed {} rows from CSV import", records.len());
    Ok(records)
}

/// Splits one CSV line into trimmed fields, honoring quoted fields with
/// doubled-quote escapes and embedded commas.
fn split_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    current.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            } else {
                current.push(c);
            }
        } else {
            match c {
                '"' => in_quotes = true,
                ',' => fields.push(std::mem::take(&mut current).trim().to_string()),
                _ => current.push(c),
            }
        }
    }
    fields.push(current.trim().to_string());
    fields
}
