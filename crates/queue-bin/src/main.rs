//! Broker queue CLI - inspect and manipulate a broker's pending-message queue.

mod commands;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use commands::Command;
use queue_config_and_utils::{init_logging, Config, Paths};
use queue_store::QueueStore;

/// Broker queue command-line interface.
#[derive(Parser)]
#[command(name = "broker-queue")]
#[command(about = "Inspect and manipulate a broker's durable message queue")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Broker identifier selecting the queue file
    #[arg(short, long, env = "BROKER_QUEUE_BROKER", global = true)]
    broker: Option<String>,

    /// Log level (trace, debug, info, warn, error). Defaults to the config file value
    #[arg(short, long, global = true)]
    log_level: Option<String>,

    /// Directory holding queue files and config.json. Defaults to ./data
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let broker = cli
        .broker
        .context("--broker or BROKER_QUEUE_BROKER is required")?;

    let paths = match &cli.data_dir {
        Some(dir) => Paths::with_data_dir(dir.clone()),
        None => Paths::new(),
    };
    let config = Config::load(&paths)?;
    let paths = match cli.data_dir {
        Some(_) => paths,
        None => config.paths(&paths),
    };

    init_logging(cli.log_level.as_deref().unwrap_or(&config.log_level));

    let store = QueueStore::new(broker, paths);
    store.initialize().await?;

    let mut stdout = std::io::stdout().lock();
    let result = commands::run(&store, cli.command, config.list_limit, &mut stdout).await;

    if let Err(e) = store.close().await {
        tracing::warn!(error = %e, "Queue store did not close cleanly");
    }
    result
}
