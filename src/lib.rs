//! Converts a Blogger Atom export into a simplified JSON document.
//!
//! - [`feed`] - XML parsing and live entry extraction
//! - [`export`] - Post/page partitioning, ordering and JSON output
//! - [`report`] - Console summary
//! - [`convert`] - The end-to-end run tying the pieces together
//! - [`config`] - Optional TOML settings

pub mod config;
pub mod convert;
pub mod export;
pub mod feed;
pub mod report;
pub mod util;
