use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::Connection;

/// Folder name used beneath the user's home directory for application data.
pub const DATA_DIR_NAME: &str = ".bookshelf-manager";

/// Open (or create) the database file and make sure the key-value table
/// exists. Parent directories are created on demand.
pub fn ensure_schema(db_path: &Path) -> Result<Connection> {
    if let Some(parent) = db_path.parent() {
        fs::create_dir_all(parent).context("failed to create data directory")?;
    }

    let conn = Connection::open(db_path).context("failed to open SQLite database")?;
    create_kv_table(&conn)?;
    Ok(conn)
}

/// Same schema on a throwaway in-memory database.
pub fn ensure_schema_in_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory().context("failed to open in-memory database")?;
    create_kv_table(&conn)?;
    Ok(conn)
}

fn create_kv_table(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS kv (
            key TEXT PRIMARY KEY NOT NULL,
            value TEXT NOT NULL
        )",
        [],
    )
    .context("failed to create kv table")?;
    Ok(())
}
