use super::error::StoreError;
use crate::models::expense::Expense;
use rusqlite::{Connection, OptionalExtension};
use tracing::warn;

/// Reads the bucket stored under `key`. A missing row is an empty bucket.
pub fn get_bucket(conn: &Connection, key: &str) -> Result<Vec<Expense>, StoreError> {
    let value: Option<String> = conn
        .query_row("SELECT value FROM expenses WHERE day_key = ?1", [key], |row| row.get(0))
        .optional()
        .map_err(StoreError::Read)?;

    match value {
        Some(json) => decode_bucket(key, &json),
        None => Ok(Vec::new()),
    }
}

/// Replaces the bucket stored under `key`. Writing an empty bucket deletes the row.
pub fn put_bucket(conn: &Connection, key: &str, expenses: &[Expense]) -> Result<(), StoreError> {
    if expenses.is_empty() {
        delete_bucket(conn, key)?;
        return Ok(());
    }

    let json = serde_json::to_string(expenses).map_err(|source| StoreError::Encode {
        key: key.to_string(),
        source,
    })?;

    conn.execute(
        "INSERT INTO expenses (day_key, value) VALUES (?1, ?2)
         ON CONFLICT(day_key) DO UPDATE SET value = excluded.value",
        rusqlite::params![key, json],
    )
    .map_err(StoreError::Write)?;

    Ok(())
}

pub fn delete_bucket(conn: &Connection, key: &str) -> Result<bool, StoreError> {
    let rows_affected = conn
        .execute("DELETE FROM expenses WHERE day_key = ?1", [key])
        .map_err(StoreError::Write)?;
    Ok(rows_affected > 0)
}

/// Every stored bucket in storage iteration order.
pub fn get_all_buckets(conn: &Connection) -> Result<Vec<(String, Vec<Expense>)>, StoreError> {
    let mut stmt = conn
        .prepare("SELECT day_key, value FROM expenses")
        .map_err(StoreError::Read)?;

    let rows = stmt
        .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))
        .map_err(StoreError::Read)?;

    let mut buckets = Vec::new();
    for row in rows {
        let (key, json) = row.map_err(StoreError::Read)?;
        let expenses = decode_bucket(&key, &json)?;
        buckets.push((key, expenses));
    }

    Ok(buckets)
}

fn decode_bucket(key: &str, json: &str) -> Result<Vec<Expense>, StoreError> {
    serde_json::from_str(json).map_err(|source| {
        warn!(day = key, error = %source, "stored bucket could not be decoded");
        StoreError::Corrupt {
            key: key.to_string(),
            source,
        }
    })
}
