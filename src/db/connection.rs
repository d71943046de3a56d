use std::fs;
use std::path::Path;
use std::time::Duration;

use rusqlite::Connection;
use tracing::info;

use crate::error::Result;

/// How long a writer waits for another connection's write lock.
pub const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Open (or create) the catalog database at `path` and make sure both tables
/// exist. Foreign keys are switched on per connection, so every handle that
/// touches the catalog has to come through here or `open_in_memory`.
pub fn open_catalog(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let conn = Connection::open(path)?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    ensure_schema(&conn)?;
    info!(path = %path.display(), "opened catalog database");
    Ok(conn)
}

/// Private in-memory catalog, used by tests.
pub fn open_in_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory()?;
    ensure_schema(&conn)?;
    Ok(conn)
}

/// Close the connection explicitly so a failed final flush is reported
/// instead of being dropped silently.
pub fn close_catalog(conn: Connection) -> Result<()> {
    conn.close().map_err(|(_, err)| err)?;
    info!("closed catalog database");
    Ok(())
}

fn ensure_schema(conn: &Connection) -> Result<()> {
    conn.execute("PRAGMA foreign_keys = ON", [])?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS author (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT,
            birth_date TEXT,
            date_of_death TEXT
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS book (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            isbn TEXT,
            title TEXT,
            publication_year INTEGER,
            author_id INTEGER NOT NULL REFERENCES author(id)
        )",
        [],
    )?;

    Ok(())
}
