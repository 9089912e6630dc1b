//! SQLite implementation of the content store

use crate::storage::schema::initialize_schema;
use crate::storage::{ContentStore, StorageError, StorageResult};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

/// SQLite content store backend
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Opens (or creates) the content store at the given path.
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        // Configure SQLite for better performance
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory store (for testing)
    #[cfg(test)]
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

impl ContentStore for SqliteStore {
    fn has_content(&self, url: &str) -> StorageResult<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT count(*) FROM pages WHERE url = ?1",
            params![url],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    fn get_content(&self, url: &str) -> StorageResult<Option<Vec<u8>>> {
        let content = self
            .conn
            .query_row(
                "SELECT content FROM pages WHERE url = ?1",
                params![url],
                |row| row.get(0),
            )
            .optional()?;
        Ok(content)
    }

    fn set_content(&mut self, url: &str, content: &[u8]) -> StorageResult<()> {
        // Single-statement upsert keyed on the url uniqueness constraint.
        let affected = self.conn.execute(
            "INSERT INTO pages (url, content) VALUES (?1, ?2)
             ON CONFLICT(url) DO UPDATE SET content = excluded.content",
            params![url, content],
        )?;

        if affected != 1 {
            return Err(StorageError::ConsistencyViolation(format!(
                "set_content for {} affected {} rows",
                url, affected
            )));
        }

        Ok(())
    }

    fn count_pages(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT count(*) FROM pages", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_url_has_no_content() {
        let store = SqliteStore::new_in_memory().unwrap();
        assert!(!store.has_content("http://x.tumblr.com/post/1").unwrap());
        assert_eq!(store.get_content("http://x.tumblr.com/post/1").unwrap(), None);
    }

    #[test]
    fn test_set_then_get_roundtrip() {
        let mut store = SqliteStore::new_in_memory().unwrap();
        store
            .set_content("http://x.tumblr.com/post/1", b"hello")
            .unwrap();

        assert!(store.has_content("http://x.tumblr.com/post/1").unwrap());
        assert_eq!(
            store.get_content("http://x.tumblr.com/post/1").unwrap(),
            Some(b"hello".to_vec())
        );
    }

    #[test]
    fn test_set_content_idempotent() {
        let mut store = SqliteStore::new_in_memory().unwrap();
        store
            .set_content("http://x.tumblr.com/post/1", b"hello")
            .unwrap();
        store
            .set_content("http://x.tumblr.com/post/1", b"hello")
            .unwrap();

        assert_eq!(store.count_pages().unwrap(), 1);
        assert_eq!(
            store.get_content("http://x.tumblr.com/post/1").unwrap(),
            Some(b"hello".to_vec())
        );
    }

    #[test]
    fn test_set_content_replaces_without_duplicate_row() {
        let mut store = SqliteStore::new_in_memory().unwrap();
        store
            .set_content("http://x.tumblr.com/post/1", b"first")
            .unwrap();
        store
            .set_content("http://x.tumblr.com/post/1", b"second")
            .unwrap();

        assert_eq!(store.count_pages().unwrap(), 1);
        assert_eq!(
            store.get_content("http://x.tumblr.com/post/1").unwrap(),
            Some(b"second".to_vec())
        );
    }

    #[test]
    fn test_distinct_urls_get_distinct_rows() {
        let mut store = SqliteStore::new_in_memory().unwrap();
        store
            .set_content("http://x.tumblr.com/post/1", b"one")
            .unwrap();
        store
            .set_content("http://x.tumblr.com/post/2", b"two")
            .unwrap();

        assert_eq!(store.count_pages().unwrap(), 2);
    }

    #[test]
    fn test_empty_content_is_stored() {
        let mut store = SqliteStore::new_in_memory().unwrap();
        store.set_content("http://x.tumblr.com/empty", b"").unwrap();
        assert_eq!(
            store.get_content("http://x.tumblr.com/empty").unwrap(),
            Some(Vec::new())
        );
    }

    #[test]
    fn test_binary_content_preserved() {
        let mut store = SqliteStore::new_in_memory().unwrap();
        let bytes = vec![0x89, 0x50, 0x4e, 0x47, 0x00, 0xff];
        store
            .set_content("http://x.tumblr.com/image.png", &bytes)
            .unwrap();
        assert_eq!(
            store.get_content("http://x.tumblr.com/image.png").unwrap(),
            Some(bytes)
        );
    }
}
