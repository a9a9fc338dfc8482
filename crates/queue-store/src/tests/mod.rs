//! Behavior tests for `QueueStore`.

mod concurrency;
mod errors;

use crate::{NewQueuedMessage, Paths, QueueStore};
use serde_json::json;
use tempfile::TempDir;

/// A store under `<tmp>/data`, not yet initialized.
fn store_in(dir: &TempDir, broker_id: &str) -> QueueStore {
    QueueStore::new(broker_id, Paths::with_data_dir(dir.path().join("data")))
}

/// An initialized store under `<tmp>/data`.
async fn open_store(dir: &TempDir, broker_id: &str) -> QueueStore {
    let store = store_in(dir, broker_id);
    store.initialize().await.unwrap();
    store
}

fn message(topic: &str, n: i64) -> NewQueuedMessage {
    NewQueuedMessage::new(topic, json!({ "n": n }))
}

async fn ids(store: &QueueStore) -> Vec<i64> {
    store
        .list(0)
        .await
        .unwrap()
        .into_iter()
        .map(|m| m.id)
        .collect()
}
