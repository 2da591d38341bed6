// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use anyhow::{Context, Result};
use clap::Parser;
use gordon::config::{load_config, Config, ServiceBuilder};
use gordon::engine::RouterStats;
use std::path::PathBuf;
use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Phase-routed event processing service
#[derive(Parser, Debug)]
#[command(name = "gordon", version, about)]
struct Cli {
    /// Directory holding gordon.toml and gordon-user.toml
    #[arg(short = 'c', long, default_value = ".")]
    config_root: PathBuf,

    /// Log level filter; overrides core.logging.level, RUST_LOG overrides both
    #[arg(long)]
    log_level: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli.config_root).with_context(|| {
        format!("loading configuration from '{}'", cli.config_root.display())
    })?;

    let level = cli
        .log_level
        .as_deref()
        .unwrap_or(&config.core.logging.level);
    init_tracing(level)?;

    // one thread keeps handler scheduling cooperative
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("building the tokio runtime")?;
    let stats = runtime.block_on(run(config))?;

    tracing::info!(
        consumed = stats.consumed,
        completed = stats.completed,
        dropped = stats.dropped,
        discarded = stats.discarded,
        rejected = stats.rejected,
        "Service stopped"
    );
    Ok(())
}

fn init_tracing(level: &str) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(level)
            .with_context(|| format!("invalid log level '{}'", level))?,
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();
    Ok(())
}

async fn run(config: Config) -> Result<RouterStats> {
    let service = ServiceBuilder::new(&config)
        .with_runtime(Handle::current())
        .build()
        .context("building the service")?;

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("Interrupt received, stopping");
                interrupt.cancel();
            }
            Err(error) => tracing::warn!(%error, "Cannot listen for Ctrl-C"),
        }
    });

    Ok(service.run(cancel).await)
}
