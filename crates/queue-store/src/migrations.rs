//! Database migrations.
//!
//! Migrations only ever create what is missing. Existing rows are never
//! dropped or rewritten, so reopening a queue file keeps its messages.

use crate::DatabaseResult;
use rusqlite::Connection;
use tracing::{debug, info};

/// Current schema version.
pub const CURRENT_VERSION: i32 = 1;

/// Run all pending migrations.
pub fn run_migrations(conn: &Connection) -> DatabaseResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS migrations (
            version INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
        [],
    )?;

    let current_version: i32 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM migrations",
        [],
        |row| row.get(0),
    )?;

    if current_version > CURRENT_VERSION {
        return Err(crate::DatabaseError::Migration(format!(
            "queue file has schema version {current_version}, newest known is {CURRENT_VERSION}"
        )));
    }

    debug!(current_version, target_version = CURRENT_VERSION, "Running migrations");

    if current_version < 1 {
        migrate_v1_queued_messages(conn)?;
    }

    Ok(())
}

fn record_migration(conn: &Connection, version: i32, name: &str) -> DatabaseResult<()> {
    conn.execute(
        "INSERT INTO migrations (version, name) VALUES (?1, ?2)",
        rusqlite::params![version, name],
    )?;
    debug!(version, name, "Migration applied");
    Ok(())
}

/// V1: queued_messages table.
///
/// AUTOINCREMENT keeps ids from being reused after the newest row is
/// deleted, including across restarts.
fn migrate_v1_queued_messages(conn: &Connection) -> DatabaseResult<()> {
    info!("Applying migration v1: queued_messages");

    let tx = conn.unchecked_transaction()?;
    tx.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS queued_messages (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            topic TEXT NOT NULL CHECK (length(topic) > 0),
            payload TEXT NOT NULL,
            qos INTEGER NOT NULL DEFAULT 0,
            retain INTEGER NOT NULL DEFAULT 0,
            timestamp TEXT NOT NULL DEFAULT (datetime('now'))
        );
        ",
    )?;
    record_migration(&tx, 1, "queued_messages")?;
    tx.commit()?;

    Ok(())
}
