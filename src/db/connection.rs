use super::error::StoreError;
use rusqlite::Connection;
use std::path::Path;

pub const DEFAULT_DB_PATH: &str = "expenses.db";

pub fn establish_connection(path: &Path) -> Result<Connection, StoreError> {
    let conn = Connection::open(path).map_err(StoreError::Unavailable)?;
    ensure_initialized(&conn)?;
    Ok(conn)
}

pub fn establish_in_memory_connection() -> Result<Connection, StoreError> {
    let conn = Connection::open_in_memory().map_err(StoreError::Unavailable)?;
    ensure_initialized(&conn)?;
    Ok(conn)
}

/// Creates the `expenses` collection if it is missing. Safe to run on every open.
pub fn ensure_initialized(conn: &Connection) -> Result<(), StoreError> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS expenses (
            day_key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        )",
        [],
    )
    .map_err(StoreError::Unavailable)?;
    Ok(())
}

#[cfg(test)]
pub fn establish_test_connection() -> Result<Connection, StoreError> {
    establish_in_memory_connection()
}
