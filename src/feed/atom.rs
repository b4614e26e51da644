use std::path::Path;

use serde::{Deserialize, Serialize};

use super::tree::{self, Element};
use super::FeedError;

/// Namespace of generic Atom elements (`entry`, `title`, `published`, ...).
pub const ATOM_NS: &str = "http://www.w3.org/2005/Atom";
/// Namespace of Blogger's extension elements (`status`, `type`, `filename`).
pub const BLOGGER_NS: &str = "http://schemas.google.com/blogger/2018";
/// Status marking an entry as published and publicly visible.
pub const LIVE_STATUS: &str = "LIVE";

const UNTITLED: &str = "Untitled";
const UNKNOWN_AUTHOR: &str = "Unknown";

/// A live post or page pulled from the export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// `Untitled` only when the element is missing; an empty title stays empty.
    pub title: String,
    pub slug: String,
    /// Blogger entry type, usually `POST` or `PAGE`.
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// Post body, markup left untouched.
    pub content: String,
    pub published: String,
    pub updated: String,
    pub author: String,
    /// Original path inside the blog, e.g. `/2023/05/my-post.html`.
    pub filename: String,
}

/// Reads a feed file from disk and extracts its live entries.
///
/// # Errors
///
/// - [`FeedError::SourceUnavailable`] if the file cannot be read
/// - [`FeedError::MalformedSource`] if it is not UTF-8 or not well-formed XML
pub fn read_entries(path: &Path) -> Result<Vec<Entry>, FeedError> {
    let bytes = std::fs::read(path).map_err(|source| FeedError::SourceUnavailable {
        path: path.to_path_buf(),
        source,
    })?;
    let content = String::from_utf8(bytes).map_err(|e| {
        FeedError::malformed(
            e.utf8_error().valid_up_to() as u64,
            "document is not valid UTF-8",
        )
    })?;
    tracing::info!(path = %path.display(), bytes = content.len(), "Loaded feed document");

    parse_entries(&content)
}

/// Extracts live entries from feed XML, in document order.
///
/// Only `atom:entry` elements directly under the root are considered.
/// Entries whose `blogger:status` is missing or not exactly `LIVE` are
/// skipped. Everything else (missing fields, unknown types) is data,
/// not an error.
pub fn parse_entries(content: &str) -> Result<Vec<Entry>, FeedError> {
    let root = tree::parse_document(content)?;
    if !root.is_named(ATOM_NS, "feed") {
        tracing::warn!(
            root = %root.local_name,
            namespace = root.namespace.as_deref().unwrap_or(""),
            "Document root is not an Atom feed, scanning it anyway"
        );
    }

    let mut entries = Vec::new();
    let mut skipped = 0usize;
    for node in root.children_named(ATOM_NS, "entry") {
        let status = node.child_text(BLOGGER_NS, "status");
        if status != Some(LIVE_STATUS) {
            tracing::debug!(
                status = status.unwrap_or("<missing>"),
                title = node.child_text(ATOM_NS, "title").unwrap_or(UNTITLED),
                "Skipping entry that is not live"
            );
            skipped += 1;
            continue;
        }
        entries.push(extract_entry(node));
    }

    tracing::info!(live = entries.len(), skipped, "Extracted feed entries");
    Ok(entries)
}

fn extract_entry(node: &Element) -> Entry {
    let filename = field(node, BLOGGER_NS, "filename", "");
    // First `atom:name` found under any `atom:author`
    let author = node
        .children_named(ATOM_NS, "author")
        .find_map(|author| author.child_text(ATOM_NS, "name"))
        .unwrap_or(UNKNOWN_AUTHOR)
        .to_string();

    Entry {
        title: field(node, ATOM_NS, "title", UNTITLED),
        slug: slug_from_filename(&filename),
        kind: node.child_text(BLOGGER_NS, "type").map(str::to_string),
        content: field(node, ATOM_NS, "content", ""),
        published: field(node, ATOM_NS, "published", ""),
        updated: field(node, ATOM_NS, "updated", ""),
        author,
        filename,
    }
}

fn field(node: &Element, namespace: &str, local_name: &str, default: &str) -> String {
    node.child_text(namespace, local_name)
        .unwrap_or(default)
        .to_string()
}

/// Derives a URL slug from a Blogger filename.
///
/// Takes the last `/`-separated segment and strips one trailing `.html`.
///
/// ```
/// use blogport::feed::slug_from_filename;
///
/// assert_eq!(slug_from_filename("blog/2023/05/my-post.html"), "my-post");
/// assert_eq!(slug_from_filename(""), "");
/// ```
pub fn slug_from_filename(filename: &str) -> String {
    let last = filename.rsplit('/').next().unwrap_or(filename);
    last.strip_suffix(".html").unwrap_or(last).to_string()
}
