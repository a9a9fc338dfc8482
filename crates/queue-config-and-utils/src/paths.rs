//! File system paths for queue storage.

use crate::{CoreError, CoreResult};
use sha2::{Digest, Sha256};
use std::path::PathBuf;

/// Default data directory, relative to the process working directory.
pub const DEFAULT_DATA_DIR: &str = "data";
/// Prefix shared by every queue database file.
const QUEUE_FILE_PREFIX: &str = "queue-";
/// Extension for queue database files.
const QUEUE_FILE_EXTENSION: &str = "sqlite";

/// Manages file system paths for queue storage.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Directory holding one database file per broker (./data)
    data_dir: PathBuf,
}

impl Paths {
    /// Create a new Paths instance rooted at `./data`.
    pub fn new() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
        }
    }

    /// Create a new Paths instance with a custom data directory.
    pub fn with_data_dir(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    /// Get the data directory.
    pub fn data_dir(&self) -> &PathBuf {
        &self.data_dir
    }

    /// Get the config file path (./data/config.json).
    pub fn config_file(&self) -> PathBuf {
        self.data_dir.join("config.json")
    }

    /// Get the queue database path for a broker (./data/queue-<broker>.sqlite).
    ///
    /// The same broker id always maps to the same file, so a restarted
    /// process resumes the queue it left behind.
    pub fn queue_file(&self, broker_id: &str) -> CoreResult<PathBuf> {
        let stem = queue_file_stem(broker_id)?;
        Ok(self
            .data_dir
            .join(format!("{QUEUE_FILE_PREFIX}{stem}.{QUEUE_FILE_EXTENSION}")))
    }

    /// Ensure the data directory exists.
    pub fn ensure_dirs(&self) -> CoreResult<()> {
        std::fs::create_dir_all(&self.data_dir)?;
        Ok(())
    }
}

impl Default for Paths {
    fn default() -> Self {
        Self::new()
    }
}

/// Hex digits in the disambiguating suffix.
const SUFFIX_HEX_LEN: usize = 8;

/// Derive the file-name stem for a broker id.
///
/// Ids made only of `[a-z0-9._-]` are used verbatim, unless they already end
/// in something shaped like a hash suffix. Every other id is lowercased, has
/// unsafe characters replaced with `_`, and gets a short SHA-256 suffix of
/// the raw id. Verbatim stems never end in a suffix and hashed stems always
/// do, so distinct ids get distinct files. All stems are lowercase, which
/// keeps `B1` and `b1` apart on case-insensitive filesystems.
pub fn queue_file_stem(broker_id: &str) -> CoreResult<String> {
    if broker_id.is_empty() {
        return Err(CoreError::Path("broker id must not be empty".to_string()));
    }

    let is_safe = |c: char| {
        c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '.' | '_' | '-')
    };
    let verbatim = broker_id.chars().all(is_safe)
        && broker_id != "."
        && broker_id != ".."
        && !has_hash_suffix(broker_id);
    if verbatim {
        return Ok(broker_id.to_string());
    }

    let sanitized: String = broker_id
        .chars()
        .map(|c| c.to_ascii_lowercase())
        .map(|c| if is_safe(c) { c } else { '_' })
        .collect();
    let digest = Sha256::digest(broker_id.as_bytes());
    let suffix: String = digest[..SUFFIX_HEX_LEN / 2]
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect();

    Ok(format!("{sanitized}-{suffix}"))
}

/// Whether `stem` ends in `-` followed by `SUFFIX_HEX_LEN` lowercase hex digits.
fn has_hash_suffix(stem: &str) -> bool {
    let bytes = stem.as_bytes();
    if bytes.len() < SUFFIX_HEX_LEN + 1 {
        return false;
    }
    let (head, tail) = bytes.split_at(bytes.len() - SUFFIX_HEX_LEN);
    head.last() == Some(&b'-')
        && tail
            .iter()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(b))
}
