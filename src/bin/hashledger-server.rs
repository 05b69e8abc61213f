#![forbid(unsafe_code)]
//! HTTP server exposing a HashLedger chain

use clap::Parser;
use hashledger::api::run_api_server;
use hashledger::cli::{init_tracing, open_ledger_from_config};
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "hashledger-server", version, about = "Serve a HashLedger chain over HTTP")]
struct Args {
    /// Path to the TOML config file (defaults to ./hashledger.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    init_tracing("info");
    let args = Args::parse();

    let (config, ledger) = open_ledger_from_config(args.config.as_deref())?;
    info!(location = %ledger.location(), "Starting HashLedger server");

    if config.storage.init_on_start {
        let init_ledger = ledger.clone();
        if tokio::task::spawn_blocking(move || init_ledger.init()).await?? {
            info!("Created empty chain document");
        }
    }

    let addr = config.socket_addr()?;
    if let Err(e) = run_api_server(ledger, addr).await {
        error!("API server failed: {}", e);
        return Err(e);
    }
    Ok(())
}
