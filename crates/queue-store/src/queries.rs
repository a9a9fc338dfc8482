//! Query functions over a queue connection.
//!
//! Each function takes a `&Connection` and is meant to run inside
//! [`QueueDatabase::call`](crate::QueueDatabase::call).

use crate::{DatabaseResult, NewQueuedMessage, QueuedMessage};
use chrono::{DateTime, NaiveDateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use tracing::debug;

/// Ids per `DELETE ... IN (...)` statement, well under SQLite's variable limit.
const DELETE_CHUNK_SIZE: usize = 500;

/// Insert a message and return its id.
///
/// `payload` is the already-encoded JSON text of `message.payload`.
pub fn insert_message(
    conn: &Connection,
    message: &NewQueuedMessage,
    payload: &str,
    timestamp: DateTime<Utc>,
) -> DatabaseResult<i64> {
    conn.execute(
        "INSERT INTO queued_messages (topic, payload, qos, retain, timestamp)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            message.topic,
            payload,
            message.qos,
            message.retain,
            timestamp.to_rfc3339(),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Count pending messages.
pub fn count_messages(conn: &Connection) -> DatabaseResult<u64> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM queued_messages", [], |row| {
        row.get(0)
    })?;
    Ok(count.max(0) as u64)
}

/// List up to `limit` messages, oldest first.
pub fn list_messages(conn: &Connection, limit: usize) -> DatabaseResult<Vec<QueuedMessage>> {
    let mut stmt = conn.prepare_cached(
        "SELECT id, topic, payload, qos, retain, timestamp
         FROM queued_messages
         ORDER BY id ASC
         LIMIT ?1",
    )?;

    let limit = i64::try_from(limit).unwrap_or(i64::MAX);
    let messages = stmt
        .query_map(params![limit], |row| {
            Ok(QueuedMessage {
                id: row.get(0)?,
                topic: row.get(1)?,
                payload: decode_payload(2, row.get::<_, String>(2)?)?,
                qos: row.get(3)?,
                retain: row.get(4)?,
                timestamp: parse_datetime(5, row.get::<_, String>(5)?)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(messages)
}

/// Delete the message with the smallest id, returning that id.
pub fn delete_oldest(conn: &Connection) -> DatabaseResult<Option<i64>> {
    let removed = conn
        .query_row(
            "DELETE FROM queued_messages
             WHERE id = (SELECT MIN(id) FROM queued_messages)
             RETURNING id",
            [],
            |row| row.get(0),
        )
        .optional()?;
    Ok(removed)
}

/// Delete one message by id. Returns whether a row was removed.
pub fn delete_by_id(conn: &Connection, id: i64) -> DatabaseResult<bool> {
    let count = conn.execute("DELETE FROM queued_messages WHERE id = ?1", params![id])?;
    Ok(count > 0)
}

/// Delete every message whose id is in `ids` in a single transaction.
///
/// Unknown ids are ignored. Returns the number of rows removed.
pub fn delete_by_ids(conn: &Connection, ids: &[i64]) -> DatabaseResult<usize> {
    if ids.is_empty() {
        return Ok(0);
    }

    let tx = conn.unchecked_transaction()?;
    let mut removed = 0;
    for chunk in ids.chunks(DELETE_CHUNK_SIZE) {
        let placeholders = std::iter::repeat("?")
            .take(chunk.len())
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!("DELETE FROM queued_messages WHERE id IN ({})", placeholders);
        removed += tx.execute(&sql, params_from_iter(chunk.iter()))?;
    }
    tx.commit()?;

    debug!(requested = ids.len(), removed, "Deleted messages by id");
    Ok(removed)
}

fn decode_payload(idx: usize, raw: String) -> rusqlite::Result<serde_json::Value> {
    serde_json::from_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Parse a stored timestamp: RFC 3339 as written by `insert_message`, or
/// SQLite's `datetime('now')` default for rows inserted without one.
fn parse_datetime(idx: usize, s: String) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            NaiveDateTime::parse_from_str(&s, "%Y-%m-%d %H:%M:%S").map(|naive| naive.and_utc())
        })
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}
