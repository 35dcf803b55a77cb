//! SQLite-backed store for idempotent API responses.
//!
//! Keys are raw endpoint path strings, embedded path parameters included,
//! so distinct resource instances land under distinct keys without any
//! extra namespacing. One `ResponseCache` belongs to one execution
//! context; the connection is not shared across concurrent contexts.

use std::path::Path;

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;

use crate::error::ClimateError;

/// Persistent key-to-document cache over one SQLite connection.
pub struct ResponseCache {
    conn: Connection,
}

impl ResponseCache {
    /// Open (or create) the cache database at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ClimateError> {
        let conn = Connection::open(path)?;
        let cache = Self { conn };
        cache.init_schema()?;
        Ok(cache)
    }

    /// Open the cache at the location named by the config, creating parent
    /// directories as needed.
    pub fn from_config(config: &climata_core::Config) -> Result<Self, ClimateError> {
        if let Some(parent) = config.cache_db.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Self::open(&config.cache_db)
    }

    /// In-memory cache (for testing).
    #[cfg(test)]
    pub fn in_memory() -> Result<Self, ClimateError> {
        let conn = Connection::open_in_memory()?;
        let cache = Self { conn };
        cache.init_schema()?;
        Ok(cache)
    }

    fn init_schema(&self) -> Result<(), ClimateError> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS responses (
                id TEXT PRIMARY KEY,
                data TEXT NOT NULL,
                cached_at INTEGER NOT NULL
            );
            "#,
        )?;
        Ok(())
    }

    /// Look up a document by exact key. A miss is `None`, never an empty
    /// document.
    pub fn get(&self, key: &str) -> Result<Option<Value>, ClimateError> {
        let data: Option<String> = self
            .conn
            .query_row("SELECT data FROM responses WHERE id = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()?;

        match data {
            Some(text) => Ok(Some(serde_json::from_str(&text)?)),
            None => Ok(None),
        }
    }

    /// Store a document under a new key.
    ///
    /// Plain INSERT: re-inserting an existing key fails with the
    /// uniqueness violation rather than silently overwriting.
    pub fn insert(&self, key: &str, document: &Value) -> Result<(), ClimateError> {
        let now = Utc::now().timestamp_millis();
        self.conn.execute(
            "INSERT INTO responses (id, data, cached_at) VALUES (?1, ?2, ?3)",
            params![key, serde_json::to_string(document)?, now],
        )?;
        Ok(())
    }

    /// Close the underlying connection, surfacing any close-time error.
    /// Dropping the cache also closes it.
    pub fn close(self) -> Result<(), ClimateError> {
        self.conn.close().map_err(|(_, e)| ClimateError::Cache(e))
    }
}
