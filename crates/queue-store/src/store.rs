//! Durable per-broker message queue.

use crate::executor::QueueDatabase;
use crate::registry::FileLease;
use crate::{
    queries, DatabaseError, NewQueuedMessage, QueueStoreError, QueueStoreResult, QueuedMessage,
};
use chrono::Utc;
use queue_config_and_utils::{Paths, DEFAULT_LIST_LIMIT};
use std::path::PathBuf;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// An open database plus the process-wide claim on its file.
struct OpenQueue {
    db: QueueDatabase,
    _lease: FileLease,
}

/// Durable FIFO of pending messages for one broker.
///
/// Starts uninitialized. [`initialize`](Self::initialize) opens
/// `<data_dir>/queue-<broker>.sqlite`; [`close`](Self::close) releases it.
/// Read queries and [`remove_by_ids`](Self::remove_by_ids) on a closed store
/// return empty defaults; other writes fail with
/// [`QueueStoreError::NotInitialized`].
///
/// Share across tasks with `Arc<QueueStore>`. Operations hold a read guard
/// on the lifecycle state, so `close` waits for in-flight calls.
pub struct QueueStore {
    broker_id: String,
    paths: Paths,
    state: RwLock<Option<OpenQueue>>,
}

impl QueueStore {
    /// Create an uninitialized store for `broker_id`.
    pub fn new(broker_id: impl Into<String>, paths: Paths) -> Self {
        Self {
            broker_id: broker_id.into(),
            paths,
            state: RwLock::new(None),
        }
    }

    pub fn broker_id(&self) -> &str {
        &self.broker_id
    }

    /// Path of the backing file for this broker.
    pub fn database_path(&self) -> QueueStoreResult<PathBuf> {
        self.paths
            .queue_file(&self.broker_id)
            .map_err(|e| QueueStoreError::StorageUnavailable(e.to_string()))
    }

    pub async fn is_initialized(&self) -> bool {
        self.state.read().await.is_some()
    }

    /// Open the backing file, creating the directory and schema if needed.
    ///
    /// Does nothing if already initialized.
    pub async fn initialize(&self) -> QueueStoreResult<()> {
        let mut state = self.state.write().await;
        if state.is_some() {
            return Ok(());
        }

        let path = self.database_path()?;
        self.paths.ensure_dirs().map_err(|e| {
            QueueStoreError::StorageUnavailable(format!(
                "cannot create {}: {}",
                self.paths.data_dir().display(),
                e
            ))
        })?;

        let lease = FileLease::acquire(&path)?;
        let db = QueueDatabase::open(&path).await.map_err(|e| match e {
            DatabaseError::Migration(msg) => QueueStoreError::Schema(msg),
            other => QueueStoreError::StorageUnavailable(other.to_string()),
        })?;

        *state = Some(OpenQueue { db, _lease: lease });
        info!(broker_id = %self.broker_id, path = %path.display(), "Queue store initialized");
        Ok(())
    }

    /// Number of pending messages; 0 when not initialized.
    pub async fn len(&self) -> QueueStoreResult<u64> {
        let state = self.state.read().await;
        let Some(open) = state.as_ref() else {
            return Ok(0);
        };

        open.db
            .call(queries::count_messages)
            .await
            .map_err(QueueStoreError::StorageRead)
    }

    pub async fn is_empty(&self) -> QueueStoreResult<bool> {
        Ok(self.len().await? == 0)
    }

    /// Persist a message and return its id.
    ///
    /// On error the message must be assumed not stored.
    pub async fn enqueue(&self, message: NewQueuedMessage) -> QueueStoreResult<i64> {
        let state = self.state.read().await;
        let open = state.as_ref().ok_or(QueueStoreError::NotInitialized)?;

        if message.topic.is_empty() {
            return Err(QueueStoreError::InvalidTopic);
        }

        let payload = serde_json::to_string(&message.payload)
            .map_err(|e| QueueStoreError::StorageWrite(e.into()))?;
        let timestamp = Utc::now();

        let id = open
            .db
            .call(move |conn| queries::insert_message(conn, &message, &payload, timestamp))
            .await
            .map_err(QueueStoreError::StorageWrite)?;

        debug!(broker_id = %self.broker_id, id, "Enqueued message");
        Ok(id)
    }

    /// Delete the oldest message. Returns its id, or `None` if the queue was empty.
    pub async fn remove_oldest(&self) -> QueueStoreResult<Option<i64>> {
        let state = self.state.read().await;
        let open = state.as_ref().ok_or(QueueStoreError::NotInitialized)?;

        let removed = open
            .db
            .call(queries::delete_oldest)
            .await
            .map_err(QueueStoreError::StorageWrite)?;

        if let Some(id) = removed {
            debug!(broker_id = %self.broker_id, id, "Removed oldest message");
        }
        Ok(removed)
    }

    /// Up to `limit` messages, oldest first, without removing them.
    ///
    /// `limit == 0` means [`DEFAULT_LIST_LIMIT`]. Empty when not initialized.
    pub async fn list(&self, limit: usize) -> QueueStoreResult<Vec<QueuedMessage>> {
        let limit = if limit == 0 { DEFAULT_LIST_LIMIT } else { limit };

        let state = self.state.read().await;
        let Some(open) = state.as_ref() else {
            return Ok(Vec::new());
        };

        open.db
            .call(move |conn| queries::list_messages(conn, limit))
            .await
            .map_err(QueueStoreError::StorageRead)
    }

    /// The oldest pending message, if any.
    pub async fn peek(&self) -> QueueStoreResult<Option<QueuedMessage>> {
        Ok(self.list(1).await?.into_iter().next())
    }

    /// Delete every present message whose id is in `ids`.
    ///
    /// Unknown ids are ignored and the delete is all-or-nothing. An empty
    /// set or a closed store is a no-op. Returns rows removed.
    pub async fn remove_by_ids(&self, ids: &[i64]) -> QueueStoreResult<usize> {
        if ids.is_empty() {
            return Ok(0);
        }

        let state = self.state.read().await;
        let Some(open) = state.as_ref() else {
            return Ok(0);
        };

        let ids = ids.to_vec();
        let removed = open
            .db
            .call(move |conn| queries::delete_by_ids(conn, &ids))
            .await
            .map_err(QueueStoreError::StorageWrite)?;

        debug!(broker_id = %self.broker_id, count = removed, "Removed messages by id");
        Ok(removed)
    }

    /// Delete one message. Returns whether it was present.
    pub async fn remove_by_id(&self, id: i64) -> QueueStoreResult<bool> {
        let state = self.state.read().await;
        let open = state.as_ref().ok_or(QueueStoreError::NotInitialized)?;

        let removed = open
            .db
            .call(move |conn| queries::delete_by_id(conn, id))
            .await
            .map_err(QueueStoreError::StorageWrite)?;

        debug!(broker_id = %self.broker_id, id, removed, "Removed message by id");
        Ok(removed)
    }

    /// Release the backing file. Does nothing if not initialized.
    ///
    /// On error the store is still closed and can be initialized again.
    pub async fn close(&self) -> QueueStoreResult<()> {
        let mut state = self.state.write().await;
        let Some(OpenQueue { db, _lease }) = state.take() else {
            return Ok(());
        };

        db.close().await.map_err(|e| {
            warn!(broker_id = %self.broker_id, error = %e, "Failed to close queue store");
            QueueStoreError::StorageClose(e.to_string())
        })?;

        info!(broker_id = %self.broker_id, "Queue store closed");
        Ok(())
    }
}

impl std::fmt::Debug for QueueStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueueStore")
            .field("broker_id", &self.broker_id)
            .field("data_dir", self.paths.data_dir())
            .finish_non_exhaustive()
    }
}
