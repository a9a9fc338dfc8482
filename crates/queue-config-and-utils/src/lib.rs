//! Configuration, storage paths, and logging for the broker queue.

mod config;
mod error;
mod logging;
mod paths;

pub use config::{Config, DEFAULT_LIST_LIMIT, DEFAULT_LOG_LEVEL};
pub use error::{CoreError, CoreResult};
pub use logging::{init_logging, init_logging_with_format, LogFormat};
pub use paths::{queue_file_stem, Paths, DEFAULT_DATA_DIR};
