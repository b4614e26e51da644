//! JSON document assembly and export.
//!
//! Live entries are split into posts and pages, posts are ordered newest
//! first, and the result is written as pretty-printed UTF-8 JSON.
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::feed::Entry;

const POST_TYPE: &str = "POST";
const PAGE_TYPE: &str = "PAGE";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Failed to serialize blog document: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to write blog document to '{}'", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// The JSON document handed to the site generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlogDocument {
    pub blog_title: String,
    /// Entries of type `POST`, newest `published` first.
    pub posts: Vec<Entry>,
    /// Entries of type `PAGE`, in feed order.
    pub pages: Vec<Entry>,
    pub total_posts: usize,
    pub total_pages: usize,
}

impl BlogDocument {
    /// Partitions entries into posts and pages and orders the posts.
    ///
    /// Entries of any other type are dropped. Posts are sorted by their
    /// `published` string, descending; the sort is stable so equal
    /// timestamps keep feed order.
    pub fn from_entries(blog_title: impl Into<String>, entries: Vec<Entry>) -> Self {
        let mut posts = Vec::new();
        let mut pages = Vec::new();
        let mut dropped = 0usize;

        for entry in entries {
            match entry.kind.as_deref() {
                Some(POST_TYPE) => posts.push(entry),
                Some(PAGE_TYPE) => pages.push(entry),
                other => {
                    tracing::debug!(
                        kind = other.unwrap_or("<missing>"),
                        title = %entry.title,
                        "Dropping entry that is neither a post nor a page"
                    );
                    dropped += 1;
                }
            }
        }

        posts.sort_by(|a, b| b.published.cmp(&a.published));
        tracing::debug!(posts = posts.len(), pages = pages.len(), dropped, "Partitioned entries");

        Self {
            blog_title: blog_title.into(),
            total_posts: posts.len(),
            total_pages: pages.len(),
            posts,
            pages,
        }
    }

    /// Pretty JSON with two-space indentation; non-ASCII stays literal.
    pub fn to_json(&self) -> Result<String, ExportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Returns non-empty slugs used by more than one entry, sorted.
///
/// Slugs become route keys downstream, so duplicates shadow each other.
pub fn find_duplicate_slugs<'a, I>(entries: I) -> Vec<&'a str>
where
    I: IntoIterator<Item = &'a Entry>,
{
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for entry in entries {
        if !entry.slug.is_empty() {
            *counts.entry(entry.slug.as_str()).or_default() += 1;
        }
    }
    counts
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|(slug, _)| slug)
        .collect()
}

/// Writes the document to `path` atomically, replacing any existing file.
///
/// Content goes to a temporary sibling file which is synced and then
/// renamed over the destination, so readers never see a partial document.
/// The rename replaces the destination entry itself: a symlink at `path`
/// becomes a regular file and the old file's permissions are not kept.
pub fn write_document(document: &BlogDocument, path: &Path) -> Result<(), ExportError> {
    use std::time::{SystemTime, UNIX_EPOCH};

    let content = document.to_json()?;
    let write_error = |source: std::io::Error| ExportError::Write {
        path: path.to_path_buf(),
        source,
    };

    // SEC-009: Unique temp filename; `create_new` refuses anything already there
    let unique_suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    let temp_path = path.with_extension(format!("tmp.{:016x}", unique_suffix));

    let mut file = std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&temp_path)
        .map_err(write_error)?;

    let written = file
        .write_all(content.as_bytes())
        .and_then(|()| file.sync_all());
    drop(file);
    if let Err(e) = written {
        let _ = std::fs::remove_file(&temp_path);
        return Err(write_error(e));
    }

    if let Err(e) = std::fs::rename(&temp_path, path) {
        let _ = std::fs::remove_file(&temp_path);
        return Err(write_error(e));
    }

    tracing::info!(path = %path.display(), bytes = content.len(), "Wrote blog document");
    Ok(())
}
