//! Configuration management for the broker queue.

use crate::{CoreError, CoreResult, Paths};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Default number of messages returned by a single drain.
pub const DEFAULT_LIST_LIMIT: usize = 500;

/// Environment variable overriding the log level.
const LOG_LEVEL_ENV: &str = "BROKER_QUEUE_LOG_LEVEL";
/// Environment variable overriding the data directory.
const DATA_DIR_ENV: &str = "BROKER_QUEUE_DATA_DIR";

/// Queue configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Data directory override. `None` keeps the directory the config was loaded from.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
    /// Batch size used when draining without an explicit limit.
    #[serde(default = "default_list_limit")]
    pub list_limit: usize,
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_list_limit() -> usize {
    DEFAULT_LIST_LIMIT
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            data_dir: None,
            list_limit: DEFAULT_LIST_LIMIT,
        }
    }
}

impl Config {
    /// Load configuration from the data directory, falling back to defaults.
    ///
    /// Environment variables win over the file.
    pub fn load(paths: &Paths) -> CoreResult<Self> {
        let config_path = paths.config_file();

        let mut config = if config_path.exists() {
            Self::load_from_file(&config_path)?
        } else {
            Self::default()
        };

        config.load_from_env();
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a file.
    pub fn save(&self, paths: &Paths) -> CoreResult<()> {
        paths.ensure_dirs()?;
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(paths.config_file(), content)?;
        Ok(())
    }

    /// Resolve the paths queues should live under.
    pub fn paths(&self, fallback: &Paths) -> Paths {
        match &self.data_dir {
            Some(dir) => Paths::with_data_dir(dir.clone()),
            None => fallback.clone(),
        }
    }

    fn load_from_env(&mut self) {
        self.apply_overrides(
            std::env::var(LOG_LEVEL_ENV).ok(),
            std::env::var(DATA_DIR_ENV).ok(),
        );
    }

    fn apply_overrides(&mut self, log_level: Option<String>, data_dir: Option<String>) {
        if let Some(level) = log_level.filter(|v| !v.trim().is_empty()) {
            self.log_level = level;
        }
        if let Some(dir) = data_dir.filter(|v| !v.trim().is_empty()) {
            self.data_dir = Some(PathBuf::from(dir));
        }
    }

    fn validate(&self) -> CoreResult<()> {
        if self.list_limit == 0 {
            return Err(CoreError::Config(
                "list_limit must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
