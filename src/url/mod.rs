//! URL handling module for Tumblr-Mirror
//!
//! Canonicalization turns every spelling of a page URL into the stable
//! string key used for deduplication and storage.

mod canonical;

pub use canonical::canonicalize;
