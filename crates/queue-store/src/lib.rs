//! Durable, at-least-once message queue for one broker, backed by SQLite.
//!
//! This crate provides:
//! - `QueueStore`: lifecycle plus enqueue / list / remove operations
//! - `QueueDatabase`: async SQLite executor with a dedicated thread
//! - Schema migrations and query helpers
//!
//! Each broker id gets its own database file, so a damaged file only
//! affects one broker's queue.
//!
//! # Example
//!
//! ```ignore
//! let store = QueueStore::new("b1", Paths::new());
//! store.initialize().await?;
//!
//! store
//!     .enqueue(NewQueuedMessage::new("sensors/t1", json!({"v": 42})).with_qos(1))
//!     .await?;
//!
//! // Drain: fetch a batch, deliver, then remove only what was confirmed.
//! let batch = store.list(DEFAULT_LIST_LIMIT).await?;
//! let delivered: Vec<i64> = deliver(&batch).await;
//! store.remove_by_ids(&delivered).await?;
//! ```

mod error;
mod executor;
mod migrations;
mod models;
pub mod queries;
mod registry;
mod store;

#[cfg(test)]
mod tests;

pub use error::{DatabaseError, DatabaseResult, QueueStoreError, QueueStoreResult};
pub use executor::QueueDatabase;
pub use migrations::{run_migrations, CURRENT_VERSION};
pub use models::{NewQueuedMessage, QueuedMessage};
pub use queue_config_and_utils::{Paths, DEFAULT_LIST_LIMIT};
pub use registry::is_open;
pub use store::QueueStore;
