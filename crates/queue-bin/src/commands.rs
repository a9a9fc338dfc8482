//! Subcommand handlers. Each writes JSON to the given writer.

use anyhow::Context;
use clap::Subcommand;
use queue_store::{NewQueuedMessage, QueueStore};
use serde_json::json;
use std::io::Write;

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print the number of pending messages
    Len,
    /// Print pending messages oldest first, one JSON object per line
    List {
        /// Maximum messages to print. Defaults to the configured list limit
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
    /// Print the oldest pending message, or null
    Peek,
    /// Append a message
    Enqueue {
        /// Topic (non-empty)
        #[arg(short, long)]
        topic: String,
        /// Payload as JSON text
        #[arg(short, long)]
        payload: String,
        /// Quality-of-service level
        #[arg(short, long, default_value_t = 0)]
        qos: u8,
        /// Set the retain flag
        #[arg(short, long)]
        retain: bool,
    },
    /// Remove messages by id
    Remove {
        /// Message ids
        #[arg(required = true)]
        ids: Vec<i64>,
    },
    /// Remove the oldest message
    RemoveOldest,
}

/// Run one command against an initialized store.
pub async fn run<W: Write>(
    store: &QueueStore,
    command: Command,
    default_limit: usize,
    out: &mut W,
) -> anyhow::Result<()> {
    match command {
        Command::Len => {
            let length = store.len().await?;
            writeln!(out, "{}", json!({ "broker_id": store.broker_id(), "length": length }))?;
        }
        Command::List { limit } => {
            for message in store.list(limit.unwrap_or(default_limit)).await? {
                writeln!(out, "{}", serde_json::to_string(&message)?)?;
            }
        }
        Command::Peek => {
            let message = store.peek().await?;
            writeln!(out, "{}", serde_json::to_string(&message)?)?;
        }
        Command::Enqueue {
            topic,
            payload,
            qos,
            retain,
        } => {
            let payload: serde_json::Value =
                serde_json::from_str(&payload).context("payload must be valid JSON")?;
            let id = store
                .enqueue(
                    NewQueuedMessage::new(topic, payload)
                        .with_qos(qos)
                        .with_retain(retain),
                )
                .await?;
            writeln!(out, "{}", json!({ "id": id }))?;
        }
        Command::Remove { ids } => {
            let removed = store.remove_by_ids(&ids).await?;
            writeln!(out, "{}", json!({ "removed": removed }))?;
        }
        Command::RemoveOldest => {
            let removed = store.remove_oldest().await?;
            writeln!(out, "{}", json!({ "removed_id": removed }))?;
        }
    }
    Ok(())
}
