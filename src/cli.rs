//! Helpers shared by the `hashledger` binaries.

use crate::blockchain::Block;
use crate::config::{load_config, load_config_from, Config};
use crate::error::Result;
use crate::ledger::LedgerService;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, ContentArrangement, Table};
use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Install the `fmt` subscriber on stderr. `RUST_LOG` overrides `default_filter`.
pub fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Load the config (explicit path or `hashledger.toml`) and open the ledger it names.
pub fn open_ledger_from_config(config_path: Option<&Path>) -> Result<(Config, LedgerService)> {
    let config = match config_path {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };
    let ledger = LedgerService::open(&config.storage.path)?;
    Ok((config, ledger))
}

/// First and last characters of a digest, or `-` for the genesis sentinel.
pub fn short_hash(hash: &str) -> String {
    if hash.is_empty() {
        "-".to_string()
    } else if hash.chars().count() > 16 {
        let head: String = hash.chars().take(8).collect();
        let mut tail: Vec<char> = hash.chars().rev().take(8).collect();
        tail.reverse();
        format!("{}...{}", head, tail.into_iter().collect::<String>())
    } else {
        hash.to_string()
    }
}

pub fn blocks_table(blocks: &[Block]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("#").add_attribute(Attribute::Bold),
            Cell::new("Id").add_attribute(Attribute::Bold),
            Cell::new("Name").add_attribute(Attribute::Bold),
            Cell::new("Amount").add_attribute(Attribute::Bold),
            Cell::new("Timestamp").add_attribute(Attribute::Bold),
            Cell::new("Previous hash").add_attribute(Attribute::Bold),
        ]);

    for (position, block) in blocks.iter().enumerate() {
        table.add_row(vec![
            Cell::new(position),
            Cell::new(&block.id),
            Cell::new(&block.name),
            Cell::new(block.amount),
            Cell::new(&block.timestamp),
            Cell::new(short_hash(&block.previous_hash)),
        ]);
    }
    table
}
