//! Async SQLite executor using a dedicated background thread.
//!
//! Every queue file gets one `tokio_rusqlite::Connection`, which owns a
//! single thread. Queries are sent to it through a channel and run in FIFO
//! order, so:
//! - writes to one queue are serialized (id assignment cannot race)
//! - callers await results without blocking a Tokio worker
//!
//! Only SQL and light row mapping belong inside [`QueueDatabase::call`].
//! Payload encoding happens before the call.

use crate::{migrations, DatabaseError, DatabaseResult};
use std::path::{Path, PathBuf};
use tokio_rusqlite::Connection;
use tracing::{debug, info};

/// Convert a tokio_rusqlite::Error to DatabaseError.
fn from_tokio_rusqlite(e: tokio_rusqlite::Error) -> DatabaseError {
    match e {
        tokio_rusqlite::Error::Rusqlite(e) => DatabaseError::Sqlite(e),
        tokio_rusqlite::Error::ConnectionClosed => {
            DatabaseError::Connection("Connection closed".to_string())
        }
        tokio_rusqlite::Error::Close((_, e)) => DatabaseError::Sqlite(e),
        other => DatabaseError::Connection(other.to_string()),
    }
}

/// Async handle to one queue database file.
#[derive(Clone)]
pub struct QueueDatabase {
    conn: Connection,
    path: PathBuf,
}

impl QueueDatabase {
    /// Open a queue database at the given path.
    ///
    /// This will:
    /// - Create the parent directory and the file if they don't exist
    /// - Enable WAL mode with full fsync on commit
    /// - Run any pending migrations
    ///
    /// Migration failures come back as [`DatabaseError::Migration`].
    pub async fn open(path: &Path) -> DatabaseResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        info!(path = %path.display(), "Opening queue database");

        let conn = Connection::open(path.to_path_buf())
            .await
            .map_err(|e| DatabaseError::Connection(e.to_string()))?;

        conn.call(|conn| {
            conn.execute_batch(
                "
                PRAGMA journal_mode = WAL;
                PRAGMA synchronous = FULL;
                PRAGMA busy_timeout = 5000;
                ",
            )?;
            Ok(())
        })
        .await
        .map_err(from_tokio_rusqlite)?;

        let db = Self {
            conn,
            path: path.to_path_buf(),
        };

        db.call(|conn| migrations::run_migrations(conn))
            .await
            .map_err(|e| match e {
                migration @ DatabaseError::Migration(_) => migration,
                other => DatabaseError::Migration(other.to_string()),
            })?;

        info!(path = %db.path.display(), "Queue database ready");
        Ok(db)
    }

    /// Execute a closure on the database connection.
    ///
    /// The closure runs on the dedicated SQLite thread; the caller's task is
    /// parked until the result is ready.
    pub async fn call<F, T>(&self, f: F) -> DatabaseResult<T>
    where
        F: FnOnce(&rusqlite::Connection) -> DatabaseResult<T> + Send + 'static,
        T: Send + 'static,
    {
        // Carry our own result inside tokio_rusqlite's Ok so domain errors
        // are not squeezed through rusqlite::Error.
        let outer = self.conn.call(move |conn| Ok(f(conn))).await;

        match outer {
            Ok(inner) => inner,
            Err(e) => Err(from_tokio_rusqlite(e)),
        }
    }

    /// Get the database file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check that the connection answers a trivial query.
    pub async fn health_check(&self) -> DatabaseResult<()> {
        self.call(|conn| {
            conn.execute_batch("SELECT 1")?;
            Ok(())
        })
        .await?;
        debug!(path = %self.path.display(), "Queue database health check passed");
        Ok(())
    }

    /// Close the connection.
    ///
    /// Waits for queued operations to finish, then stops the executor thread.
    pub async fn close(self) -> DatabaseResult<()> {
        self.conn.close().await.map_err(from_tokio_rusqlite)?;
        info!(path = %self.path.display(), "Queue database closed");
        Ok(())
    }
}
