//! Export engine for BookmarkPro.
//!
//! Encodes the full in-memory snapshot (or a selected subset) as JSON,
//! Netscape-style bookmark HTML, or CSV, and builds the backup payload.
//! Every encoder returns an [`ExportFile`]; writing the bytes somewhere is
//! the presentation layer's job.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::managers::library_manager::LibraryManager;
use crate::types::bookmark::Bookmark;
use crate::types::collection::Collection;
use crate::types::errors::StorageError;
use crate::types::product::ProductInfo;
use crate::types::settings::AppSettings;

/// Format tag stamped into JSON exports.
pub const JSON_FORMAT_TAG: &str = "BookmarkPro JSON Export v2.1";

/// Name shown for bookmarks without a collection.
const UNCATEGORIZED: &str = "Uncategorized";

/// CSV column set, in export order.
const CSV_HEADERS: [&str; 9] = [
    "Title", "URL", "Description", "Collection", "Tags", "Rating", "Created", "Visits", "Is Read",
];

/// A rendered export: filename plus file contents.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportFile {
    pub filename: String,
    pub contents: String,
}

/// The JSON export snapshot: full state plus provenance metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportPayload {
    pub website: ProductInfo,
    pub bookmarks: Vec<Bookmark>,
    pub collections: Vec<Collection>,
    pub tags: Vec<String>,
    pub settings: AppSettings,
    pub export_date: DateTime<Utc>,
    pub version: String,
    pub format: String,
}

/// The backup snapshot. The `backup` marker, environment string, and
/// originating location distinguish it from a plain export at read time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupPayload {
    pub website: ProductInfo,
    pub backup: bool,
    pub bookmarks: Vec<Bookmark>,
    pub collections: Vec<Collection>,
    pub tags: Vec<String>,
    pub settings: AppSettings,
    pub version: String,
    pub backup_date: DateTime<Utc>,
    pub user_agent: String,
    pub url: String,
}

/// Trait defining the export-engine interface.
pub trait ExportEngineTrait {
    /// JSON export of the snapshot; `subset` restricts the bookmark list
    /// (bulk/selection export) while collections, tags, and settings are
    /// always complete.
    fn export_json(
        &self,
        library: &LibraryManager,
        subset: Option<&[Bookmark]>,
        now: DateTime<Utc>,
    ) -> Result<ExportFile, StorageError>;
    /// Netscape-bookmark-file export, grouped by collection.
    fn export_html(&self, library: &LibraryManager, now: DateTime<Utc>) -> ExportFile;
    /// CSV export with a `#`-prefixed provenance preamble.
    fn export_csv(&self, library: &LibraryManager, now: DateTime<Utc>) -> ExportFile;
    /// Backup payload; `environment` and `origin` identify where it was made.
    fn export_backup(
        &self,
        library: &LibraryManager,
        now: DateTime<Utc>,
        environment: &str,
        origin: &str,
    ) -> Result<ExportFile, StorageError>;
}

/// Export engine carrying the product identity stamped into every file.
pub struct ExportEngine {
    product: ProductInfo,
}

impl ExportEngine {
    pub fn new(product: ProductInfo) -> Self {
        Self { product }
    }

    pub fn product(&self) -> &ProductInfo {
        &self.product
    }

    /// `<product>-export-<ISO-date>.<ext>`
    pub fn export_filename(&self, ext: &str, now: DateTime<Utc>) -> String {
        format!(
            "{}-export-{}.{}",
            self.product.name.to_lowercase(),
            now.format("%Y-%m-%d"),
            ext
        )
    }

    /// `<product>-backup-<ISO-date>.json`
    pub fn backup_filename(&self, now: DateTime<Utc>) -> String {
        format!(
            "{}-backup-{}.json",
            self.product.name.to_lowercase(),
            now.format("%Y-%m-%d")
        )
    }

    /// Resolves a collection id to its display name, falling back to
    /// "Uncategorized" for empty or dangling references.
    fn collection_name<'a>(collections: &'a [Collection], id: &str) -> &'a str {
        collections
            .iter()
            .find(|c| c.id == id)
            .map(|c| c.name.as_str())
            .unwrap_or(UNCATEGORIZED)
    }

    /// Groups bookmarks by collection id, preserving bookmark order and
    /// first-appearance group order.
    fn group_by_collection(bookmarks: &[Bookmark]) -> Vec<(String, Vec<&Bookmark>)> {
        let mut groups: Vec<(String, Vec<&Bookmark>)> = Vec::new();
        for bookmark in bookmarks {
            match groups.iter_mut().find(|(id, _)| *id == bookmark.collection) {
                Some((_, members)) => members.push(bookmark),
                None => groups.push((bookmark.collection.clone(), vec![bookmark])),
            }
        }
        groups
    }
}

impl Default for ExportEngine {
    fn default() -> Self {
        Self::new(ProductInfo::default())
    }
}

impl ExportEngineTrait for ExportEngine {
    fn export_json(
        &self,
        library: &LibraryManager,
        subset: Option<&[Bookmark]>,
        now: DateTime<Utc>,
    ) -> Result<ExportFile, StorageError> {
        let payload = ExportPayload {
            website: self.product.clone(),
            bookmarks: subset.unwrap_or_else(|| library.bookmarks()).to_vec(),
            collections: library.collections().to_vec(),
            tags: library.tags().to_vec(),
            settings: library.settings().clone(),
            export_date: now,
            version: self.product.version.clone(),
            format: JSON_FORMAT_TAG.to_string(),
        };

        let contents = serde_json::to_string_pretty(&payload)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        Ok(ExportFile {
            filename: self.export_filename("json", now),
            contents,
        })
    }

    fn export_html(&self, library: &LibraryManager, now: DateTime<Utc>) -> ExportFile {
        let mut html = format!(
            "<!DOCTYPE NETSCAPE-Bookmark-file-1>\n\
             <!--This is an automatically generated file.\n\
             It will be read and overwritten.\n\
             Do NOT edit!-->\n\
             <!-- Export from {} v{} on {} -->\n\
             <META HTTP-EQUIV=\"Content-Type\" CONTENT=\"text/html; charset=UTF-8\">\n\
             <TITLE>Bookmarks</TITLE>\n\
             <H1>Bookmarks</H1>\n\
             <DL><p>",
            self.product.name,
            self.product.version,
            now.to_rfc3339_opts(SecondsFormat::Secs, true)
        );

        for (collection_id, members) in Self::group_by_collection(library.bookmarks()) {
            let name = if collection_id.is_empty() {
                UNCATEGORIZED
            } else {
                Self::collection_name(library.collections(), &collection_id)
            };
            html.push_str(&format!(
                "\n    <DT><H3 FOLDED>{}</H3>\n    <DL><p>",
                escape_html(name)
            ));
            for bookmark in members {
                let add_date = bookmark.created_at.timestamp();
                let tags_attr = if bookmark.tags.is_empty() {
                    String::new()
                } else {
                    format!(" TAGS=\"{}\"", escape_html(&bookmark.tags.join(",")))
                };
                html.push_str(&format!(
                    "\n        <DT><A HREF=\"{}\" ADD_DATE=\"{}\"{}>{}</A>",
                    escape_html(&bookmark.url),
                    add_date,
                    tags_attr,
                    escape_html(&bookmark.title)
                ));
                if !bookmark.description.is_empty() {
                    html.push_str(&format!("\n        <DD>{}", escape_html(&bookmark.description)));
                }
            }
            html.push_str("\n    </DL><p>");
        }
        html.push_str("\n</DL><p>\n");

        ExportFile {
            filename: self.export_filename("html", now),
            contents: html,
        }
    }

    fn export_csv(&self, library: &LibraryManager, now: DateTime<Utc>) -> ExportFile {
        let mut lines: Vec<String> = vec![
            format!("# Exported from {} v{}", self.product.name, self.product.version),
            format!(
                "# Export Date: {}",
                now.to_rfc3339_opts(SecondsFormat::Secs, true)
            ),
            format!("# Website: {}", self.product.url),
            String::new(),
            CSV_HEADERS.iter().map(|h| csv_quote(h)).collect::<Vec<_>>().join(","),
        ];

        for bookmark in library.bookmarks() {
            let collection = if bookmark.collection.is_empty() {
                UNCATEGORIZED
            } else {
                Self::collection_name(library.collections(), &bookmark.collection)
            };
            let row = [
                bookmark.title.clone(),
                bookmark.url.clone(),
                bookmark.description.clone(),
                collection.to_string(),
                bookmark.tags.join("; "),
                bookmark.rating.to_string(),
                bookmark
                    .created_at
                    .to_rfc3339_opts(SecondsFormat::Secs, true),
                bookmark.visit_count.to_string(),
                if bookmark.is_read { "Yes" } else { "No" }.to_string(),
            ];
            lines.push(row.iter().map(|cell| csv_quote(cell)).collect::<Vec<_>>().join(","));
        }

        ExportFile {
            filename: self.export_filename("csv", now),
            contents: lines.join("\n"),
        }
    }

    fn export_backup(
        &self,
        library: &LibraryManager,
        now: DateTime<Utc>,
        environment: &str,
        origin: &str,
    ) -> Result<ExportFile, StorageError> {
        let payload = BackupPayload {
            website: self.product.clone(),
            backup: true,
            bookmarks: library.bookmarks().to_vec(),
            collections: library.collections().to_vec(),
            tags: library.tags().to_vec(),
            settings: library.settings().clone(),
            version: self.product.version.clone(),
            backup_date: now,
            user_agent: environment.to_string(),
            url: origin.to_string(),
        };

        let contents = serde_json::to_string_pretty(&payload)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        Ok(ExportFile {
            filename: self.backup_filename(now),
            contents,
        })
    }
}

/// Escapes text for HTML attribute and element content.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Quotes a CSV field, doubling embedded quotes.
pub fn csv_quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}
