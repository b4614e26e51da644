//! Utility functions for common operations.
//!
//! - **Timestamp audit**: checks that string-ordered `published` values are
//!   also chronologically ordered
//!
//! # Examples
//!
//! ```
//! use blogport::util::audit_sort_keys;
//!
//! let audit = audit_sort_keys(["2024-01-01T00:00:00Z", "2023-01-01T00:00:00Z"]);
//! assert!(audit.is_clean());
//! ```

mod timestamp;

pub use timestamp::{audit_sort_keys, SortKeyAudit};
