//! Queue store error types.

use thiserror::Error;

/// Low-level database error produced by the executor and query helpers.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// SQLite error
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Executor connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Migration error
    #[error("Migration error: {0}")]
    Migration(String),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using DatabaseError.
pub type DatabaseResult<T> = Result<T, DatabaseError>;

/// Error returned by [`QueueStore`](crate::QueueStore) operations.
#[derive(Error, Debug)]
pub enum QueueStoreError {
    /// Operation needs an open store; call `initialize()` first.
    #[error("Queue store is not initialized")]
    NotInitialized,

    /// Data directory or database file could not be created or opened.
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    /// Schema could not be created or verified.
    #[error("Schema error: {0}")]
    Schema(String),

    /// Write failed; the message must be assumed not stored.
    #[error("Storage write failed: {0}")]
    StorageWrite(#[source] DatabaseError),

    /// Read failed.
    #[error("Storage read failed: {0}")]
    StorageRead(#[source] DatabaseError),

    /// Releasing the database handle failed. The store is closed regardless.
    #[error("Storage close failed: {0}")]
    StorageClose(String),

    /// Topic was empty.
    #[error("Topic must not be empty")]
    InvalidTopic,
}

/// Result type alias using QueueStoreError.
pub type QueueStoreResult<T> = Result<T, QueueStoreError>;
