//! Feed module for reading Blogger Atom exports.
//!
//! - [`tree`] - Namespace-aware XML parsing into an owned element tree
//! - `atom` - Live entry extraction with field defaulting and slug derivation
//!
//! # Example
//!
//! ```ignore
//! use blogport::feed::read_entries;
//!
//! let entries = read_entries(Path::new("feed.atom"))?;
//! ```

mod atom;
pub mod tree;

use std::path::PathBuf;

use thiserror::Error;

pub use atom::{
    parse_entries, read_entries, slug_from_filename, Entry, ATOM_NS, BLOGGER_NS, LIVE_STATUS,
};

/// Errors that stop a conversion before any output is produced.
#[derive(Debug, Error)]
pub enum FeedError {
    /// The feed file does not exist or cannot be read.
    #[error("Failed to read feed file '{}'", .path.display())]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The feed file is not a well-formed XML document.
    #[error("Malformed feed document near byte {position}: {message}")]
    MalformedSource { position: u64, message: String },
}

impl FeedError {
    pub(crate) fn malformed(position: u64, message: impl Into<String>) -> Self {
        FeedError::MalformedSource {
            position,
            message: message.into(),
        }
    }
}
