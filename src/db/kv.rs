use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};

use crate::error::{Result, ShelfError};

use super::connection::{ensure_schema, ensure_schema_in_memory};
use super::KeyValueStore;

/// Durable key-value storage backed by a single SQLite table.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open the database at `path`. Failure here means the host has no
    /// durable storage for us.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = ensure_schema(path).map_err(|err| ShelfError::StorageUnavailable {
            reason: format!("{err:#}"),
        })?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = ensure_schema_in_memory().map_err(|err| ShelfError::StorageUnavailable {
            reason: format!("{err:#}"),
        })?;
        Ok(Self { conn })
    }
}

impl KeyValueStore for SqliteStore {
    fn is_available(&self) -> bool {
        true
    }

    fn get(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    /// Upsert so repeated saves under the same key replace the payload.
    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }
}
