//! Database schema for the content store

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Fetched page content, one blob per canonical URL
CREATE TABLE IF NOT EXISTS pages (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    url TEXT NOT NULL UNIQUE,
    content BLOB
);

CREATE UNIQUE INDEX IF NOT EXISTS idx_pages_url ON pages(url);
"#;

/// Initializes the database schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn test_schema_initializes() {
        let conn = Connection::open_in_memory().unwrap();
        assert!(initialize_schema(&conn).is_ok());
    }

    #[test]
    fn test_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn).unwrap();
        assert!(initialize_schema(&conn).is_ok());
    }

    #[test]
    fn test_url_uniqueness_enforced() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn).unwrap();

        conn.execute(
            "INSERT INTO pages (url, content) VALUES (?1, ?2)",
            rusqlite::params!["http://x.tumblr.com/", b"one".as_slice()],
        )
        .unwrap();

        let duplicate = conn.execute(
            "INSERT INTO pages (url, content) VALUES (?1, ?2)",
            rusqlite::params!["http://x.tumblr.com/", b"two".as_slice()],
        );
        assert!(duplicate.is_err());
    }
}
