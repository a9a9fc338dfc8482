//! Concurrent callers sharing one store.

use super::{message, open_store};
use crate::QueueStoreError;
use std::collections::HashSet;
use std::sync::Arc;
use tempfile::tempdir;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_enqueues_get_unique_ids() {
    let dir = tempdir().unwrap();
    let store = Arc::new(open_store(&dir, "b1").await);

    let mut handles = vec![];
    for n in 0..50 {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            store.enqueue(message("t", n)).await
        }));
    }

    let mut assigned = HashSet::new();
    for handle in handles {
        assert!(assigned.insert(handle.await.unwrap().unwrap()));
    }

    let listed = store.list(0).await.unwrap();
    assert_eq!(listed.len(), 50);
    assert!(listed.windows(2).all(|w| w[0].id < w[1].id));
    let listed_ids: HashSet<i64> = listed.iter().map(|m| m.id).collect();
    assert_eq!(listed_ids, assigned);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn bulk_remove_is_all_or_nothing_for_readers() {
    let dir = tempdir().unwrap();
    let store = Arc::new(open_store(&dir, "b1").await);
    let mut doomed = Vec::new();
    for n in 0..100 {
        let id = store.enqueue(message("t", n)).await.unwrap();
        if n % 2 == 0 {
            doomed.push(id);
        }
    }
    let doomed_set: HashSet<i64> = doomed.iter().copied().collect();

    let reader = {
        let store = store.clone();
        let doomed_set = doomed_set.clone();
        tokio::spawn(async move {
            let mut seen = Vec::new();
            for _ in 0..20 {
                let snapshot = store.list(0).await.unwrap();
                seen.push(
                    snapshot
                        .iter()
                        .filter(|m| doomed_set.contains(&m.id))
                        .count(),
                );
                tokio::task::yield_now().await;
            }
            seen
        })
    };

    store.remove_by_ids(&doomed).await.unwrap();

    for visible in reader.await.unwrap() {
        assert!(visible == 0 || visible == doomed_set.len());
    }
    assert_eq!(store.len().await.unwrap(), 50);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_remove_oldest_never_double_removes() {
    let dir = tempdir().unwrap();
    let store = Arc::new(open_store(&dir, "b1").await);
    for n in 0..10 {
        store.enqueue(message("t", n)).await.unwrap();
    }

    let mut handles = vec![];
    for _ in 0..15 {
        let store = store.clone();
        handles.push(tokio::spawn(async move { store.remove_oldest().await }));
    }

    let mut removed = HashSet::new();
    let mut noops = 0;
    for handle in handles {
        match handle.await.unwrap().unwrap() {
            Some(id) => assert!(removed.insert(id)),
            None => noops += 1,
        }
    }

    assert_eq!(removed.len(), 10);
    assert_eq!(noops, 5);
    assert_eq!(store.len().await.unwrap(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn close_waits_for_in_flight_and_blocks_later_writes() {
    let dir = tempdir().unwrap();
    let store = Arc::new(open_store(&dir, "b1").await);

    let writers: Vec<_> = (0..20)
        .map(|n| {
            let store = store.clone();
            tokio::spawn(async move { store.enqueue(message("t", n)).await })
        })
        .collect();

    store.close().await.unwrap();

    let mut stored = 0;
    for writer in writers {
        match writer.await.unwrap() {
            Ok(_) => stored += 1,
            Err(QueueStoreError::NotInitialized) => {}
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    store.initialize().await.unwrap();
    assert_eq!(store.len().await.unwrap(), stored);
}
