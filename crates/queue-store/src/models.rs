//! Queue model types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A pending message, as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueuedMessage {
    /// Store-assigned id; FIFO order is ascending id.
    pub id: i64,
    pub topic: String,
    pub payload: Value,
    pub qos: u8,
    pub retain: bool,
    /// Insertion time. Not an ordering key; may collide.
    pub timestamp: DateTime<Utc>,
}

/// A message to enqueue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewQueuedMessage {
    pub topic: String,
    pub payload: Value,
    #[serde(default)]
    pub qos: u8,
    #[serde(default)]
    pub retain: bool,
}

impl NewQueuedMessage {
    /// Create a message with qos 0 and retain off.
    pub fn new(topic: impl Into<String>, payload: Value) -> Self {
        Self {
            topic: topic.into(),
            payload,
            qos: 0,
            retain: false,
        }
    }

    pub fn with_qos(mut self, qos: u8) -> Self {
        self.qos = qos;
        self
    }

    pub fn with_retain(mut self, retain: bool) -> Self {
        self.retain = retain;
        self
    }
}
