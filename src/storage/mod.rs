//! Storage module for persisted page content
//!
//! The store is a single SQLite-backed table mapping canonical URL to the
//! raw bytes fetched for that URL. Re-running a mirror against the same
//! database file overwrites content in place, which is what makes re-runs
//! idempotent.

mod schema;
mod sqlite;

pub use sqlite::SqliteStore;

use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Consistency violation: {0}")]
    ConsistencyViolation(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for content store backends.
///
/// The schema is fixed: one content blob per URL, with `set_content`
/// providing atomic insert-or-replace semantics. A failing operation is a
/// retryable I/O problem for the caller, never a reason to stop the crawl.
pub trait ContentStore {
    /// Returns true iff a record exists for the URL.
    fn has_content(&self, url: &str) -> StorageResult<bool>;

    /// Returns the stored content for the URL, if any.
    fn get_content(&self, url: &str) -> StorageResult<Option<Vec<u8>>>;

    /// Inserts content for the URL, replacing any existing record.
    ///
    /// Must execute as a single atomic upsert so that concurrent writers
    /// cannot race past an existence check. Affecting anything other than
    /// exactly one row is a consistency violation.
    fn set_content(&mut self, url: &str, content: &[u8]) -> StorageResult<()>;

    /// Total number of stored pages.
    fn count_pages(&self) -> StorageResult<u64>;
}
