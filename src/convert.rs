//! The one-shot conversion pipeline.
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::config::Config;
use crate::export::{find_duplicate_slugs, write_document, BlogDocument};
use crate::feed::read_entries;
use crate::util::audit_sort_keys;

/// A single feed-to-JSON run.
#[derive(Debug, Clone)]
pub struct Conversion {
    pub input: PathBuf,
    pub output: PathBuf,
    pub blog_title: String,
}

impl From<Config> for Conversion {
    fn from(config: Config) -> Self {
        Self {
            input: config.input,
            output: config.output,
            blog_title: config.blog_title,
        }
    }
}

impl Conversion {
    /// Reads the feed, builds the document and writes it to `output`.
    ///
    /// Returns the written document so the caller can report on it.
    /// Nothing is written when reading or parsing the feed fails.
    pub fn run(&self) -> Result<BlogDocument> {
        let entries = read_entries(&self.input)
            .with_context(|| format!("Failed to load feed from {}", self.input.display()))?;

        let document = BlogDocument::from_entries(self.blog_title.as_str(), entries);

        let audit = audit_sort_keys(document.posts.iter().map(|post| post.published.as_str()));
        if !audit.is_clean() {
            tracing::warn!(
                checked = audit.checked,
                missing = audit.missing,
                unparseable = audit.unparseable.len(),
                inversions = audit.inversions.len(),
                "Post order by published string may differ from chronological order"
            );
            for (earlier, later) in &audit.inversions {
                tracing::debug!(%earlier, %later, "Out of chronological order");
            }
        }

        for slug in find_duplicate_slugs(&document.posts) {
            tracing::warn!(slug, "Slug shared by more than one post");
        }
        for slug in find_duplicate_slugs(&document.pages) {
            tracing::warn!(slug, "Slug shared by more than one page");
        }

        write_document(&document, &self.output)
            .with_context(|| format!("Failed to export to {}", self.output.display()))?;

        Ok(document)
    }
}
