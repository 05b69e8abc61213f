#![forbid(unsafe_code)]
//! Command-line access to a HashLedger chain document

use clap::{Parser, Subcommand};
use colored::*;
use hashledger::blockchain::BlockDraft;
use hashledger::cli::{blocks_table, init_tracing, open_ledger_from_config, short_hash};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "hashledger", version, about = "Append-only hash-linked ledger")]
struct Cli {
    /// Path to the TOML config file (defaults to ./hashledger.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create an empty chain document if none exists
    Init,
    /// Print every block in order
    List,
    /// Print one block by id
    Show { id: String },
    /// Print the last block and its hash
    Last,
    /// Append a new block
    Append {
        #[arg(short, long)]
        name: String,
        #[arg(short, long, allow_negative_numbers = true)]
        amount: f64,
    },
    /// Check every link and id in the chain
    Verify,
}

fn main() -> ExitCode {
    init_tracing("warn");
    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {}", "error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let (_config, ledger) = open_ledger_from_config(cli.config.as_deref())?;

    match cli.command {
        Command::Init => {
            if ledger.init()? {
                println!("{} {}", "Created empty chain at".green(), ledger.location());
            } else {
                println!("{} {}", "Chain already exists at".yellow(), ledger.location());
            }
        }
        Command::List => {
            let blocks = ledger.list_all()?;
            if blocks.is_empty() {
                println!("{}", "The chain is empty.".yellow());
            } else {
                println!("{}", blocks_table(&blocks));
                println!("{} block(s)", blocks.len());
            }
        }
        Command::Show { id } => {
            let block = ledger.find_by_id(&id)?;
            println!("{}", serde_json::to_string_pretty(&block)?);
            println!("{} {}", "hash:".bright_cyan(), block.digest());
        }
        Command::Last => match ledger.last_block()? {
            Some(block) => {
                println!("{}", serde_json::to_string_pretty(&block)?);
                println!("{} {}", "hash:".bright_cyan(), block.digest());
            }
            None => println!("{}", "The chain is empty.".yellow()),
        },
        Command::Append { name, amount } => {
            let blocks = ledger.append(BlockDraft::new(name, amount))?;
            if let Some(block) = blocks.last() {
                println!(
                    "{} {} (height {}, previous {})",
                    "Appended block".green().bold(),
                    block.id,
                    blocks.len(),
                    short_hash(&block.previous_hash)
                );
            }
        }
        Command::Verify => {
            let report = ledger.verify()?;
            if report.is_valid() {
                println!(
                    "{} {} block(s), tip {}",
                    "Chain OK:".green().bold(),
                    report.length,
                    report.tip_hash.as_deref().map(short_hash).unwrap_or_else(|| "-".to_string())
                );
            } else {
                println!(
                    "{} {} violation(s)",
                    "Chain BROKEN:".red().bold(),
                    report.violations.len()
                );
                for violation in &report.violations {
                    println!("  - {}", violation);
                }
                return Ok(ExitCode::from(2));
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}
