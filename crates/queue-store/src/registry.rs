//! Process-wide registry of open queue files.
//!
//! A queue file may have at most one open [`QueueStore`](crate::QueueStore)
//! per process. Other processes are only kept out by SQLite's own locking.

use crate::{QueueStoreError, QueueStoreResult};
use parking_lot::{const_mutex, Mutex};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

static OPEN_FILES: Mutex<BTreeSet<PathBuf>> = const_mutex(BTreeSet::new());

/// Exclusive claim on a queue file, released on drop.
#[derive(Debug)]
pub(crate) struct FileLease {
    key: PathBuf,
}

impl FileLease {
    /// Claim `path` for this process.
    ///
    /// The parent directory must already exist; it is canonicalized so two
    /// spellings of the same location share one claim.
    pub(crate) fn acquire(path: &Path) -> QueueStoreResult<Self> {
        let key = registry_key(path)?;

        let mut open = OPEN_FILES.lock();
        if !open.insert(key.clone()) {
            return Err(QueueStoreError::StorageUnavailable(format!(
                "queue file {} is already open in this process",
                key.display()
            )));
        }

        Ok(Self { key })
    }
}

impl Drop for FileLease {
    fn drop(&mut self) {
        OPEN_FILES.lock().remove(&self.key);
    }
}

/// Whether some store in this process holds `path` open.
pub fn is_open(path: &Path) -> bool {
    registry_key(path)
        .map(|key| OPEN_FILES.lock().contains(&key))
        .unwrap_or(false)
}

fn registry_key(path: &Path) -> QueueStoreResult<PathBuf> {
    let unavailable = |reason: String| QueueStoreError::StorageUnavailable(reason);

    let file_name = path
        .file_name()
        .ok_or_else(|| unavailable(format!("{} has no file name", path.display())))?;
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let parent = std::fs::canonicalize(parent)
        .map_err(|e| unavailable(format!("cannot resolve {}: {}", parent.display(), e)))?;

    Ok(parent.join(file_name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_lease_is_exclusive_until_dropped() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("queue-a.sqlite");

        let lease = FileLease::acquire(&path).unwrap();
        assert!(is_open(&path));
        assert!(matches!(
            FileLease::acquire(&path),
            Err(QueueStoreError::StorageUnavailable(_))
        ));

        drop(lease);
        assert!(!is_open(&path));
        assert!(FileLease::acquire(&path).is_ok());
    }

    #[test]
    fn test_lease_key_normalizes_path_spelling() {
        let dir = tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("sub")).unwrap();
        let direct = dir.path().join("queue-b.sqlite");
        let roundabout = dir.path().join("sub").join("..").join("queue-b.sqlite");

        let _lease = FileLease::acquire(&direct).unwrap();
        assert!(FileLease::acquire(&roundabout).is_err());
    }

    #[test]
    fn test_missing_parent_is_unavailable() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("queue-c.sqlite");

        assert!(matches!(
            FileLease::acquire(&path),
            Err(QueueStoreError::StorageUnavailable(_))
        ));
    }
}
