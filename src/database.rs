use std::path::Path;

use crate::error::TodoResult;
use rusqlite::{params, Connection};
use tracing::debug;

pub fn open_db(path: &Path) -> TodoResult<Connection> {
    debug!(path = %path.display(), "opening database");
    let conn = Connection::open(path)?;
    init_db(&conn)?;
    Ok(conn)
}

pub fn open_in_memory() -> TodoResult<Connection> {
    let conn = Connection::open_in_memory()?;
    init_db(&conn)?;
    Ok(conn)
}

fn init_db(conn: &Connection) -> TodoResult<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS todolists (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            done_count INTEGER NOT NULL DEFAULT 0,
            total_count INTEGER NOT NULL DEFAULT 0,
            deleted_at TEXT
        )",
        params![],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS items (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            text TEXT NOT NULL,
            is_done BOOLEAN NOT NULL DEFAULT 0,
            todolist_id INTEGER NOT NULL REFERENCES todolists(id),
            deleted_at TEXT
        )",
        params![],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS items_todolist_id ON items (todolist_id)",
        params![],
    )?;

    Ok(())
}
