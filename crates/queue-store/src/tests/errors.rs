//! Storage failures surface as the operation's read or write error.

use super::{message, open_store};
use crate::{QueueStore, QueueStoreError};
use rusqlite::Connection;
use tempfile::tempdir;

/// A second connection to the store's file, for damaging it behind its back.
fn side_connection(store: &QueueStore) -> Connection {
    Connection::open(store.database_path().unwrap()).unwrap()
}

#[tokio::test]
async fn undecodable_payload_is_read_error() {
    let dir = tempdir().unwrap();
    let store = open_store(&dir, "b1").await;
    store.enqueue(message("t", 1)).await.unwrap();
    side_connection(&store)
        .execute(
            "INSERT INTO queued_messages (topic, payload) VALUES ('t', '{not json')",
            [],
        )
        .unwrap();

    assert!(matches!(
        store.list(0).await,
        Err(QueueStoreError::StorageRead(_))
    ));
    assert!(matches!(
        store.peek().await,
        Err(QueueStoreError::StorageRead(_))
    ));
    // Counting does not decode rows.
    assert_eq!(store.len().await.unwrap(), 2);
}

#[tokio::test]
async fn unparseable_timestamp_is_read_error() {
    let dir = tempdir().unwrap();
    let store = open_store(&dir, "b1").await;
    let id = store.enqueue(message("t", 1)).await.unwrap();
    side_connection(&store)
        .execute(
            "UPDATE queued_messages SET timestamp = 'garbage' WHERE id = ?1",
            [id],
        )
        .unwrap();

    assert!(matches!(
        store.list(0).await,
        Err(QueueStoreError::StorageRead(_))
    ));
}

#[tokio::test]
async fn missing_table_maps_reads_and_writes() {
    let dir = tempdir().unwrap();
    let store = open_store(&dir, "b1").await;
    store.enqueue(message("t", 1)).await.unwrap();
    side_connection(&store)
        .execute_batch("DROP TABLE queued_messages")
        .unwrap();

    assert!(matches!(
        store.enqueue(message("t", 2)).await,
        Err(QueueStoreError::StorageWrite(_))
    ));
    assert!(matches!(
        store.remove_oldest().await,
        Err(QueueStoreError::StorageWrite(_))
    ));
    assert!(matches!(
        store.remove_by_id(1).await,
        Err(QueueStoreError::StorageWrite(_))
    ));
    assert!(matches!(
        store.remove_by_ids(&[1, 2]).await,
        Err(QueueStoreError::StorageWrite(_))
    ));
    assert!(matches!(
        store.len().await,
        Err(QueueStoreError::StorageRead(_))
    ));
    assert!(matches!(
        store.list(0).await,
        Err(QueueStoreError::StorageRead(_))
    ));
}
