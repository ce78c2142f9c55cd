//! rulestore policy store adapter demo CLI
//!
//! Runs the adapter against an in-process transactional document database
//! and prints the stored policy after every step.
//!
//! Usage:
//!   cargo run -p demo -- run-all
//!   cargo run -p demo -- policy
//!   cargo run -p demo -- filtered
//!   cargo run -p demo -- --config rulestore.toml model

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use rulestore_contracts::{config::StoreConfig, error::RuleStoreResult};
use rulestore_memdb::MemoryDatabase;

mod scenarios;

// ── CLI definition ────────────────────────────────────────────────────────────

/// rulestore: persist authorization policy in a document database.
#[derive(Parser)]
#[command(
    name = "demo",
    about = "rulestore policy adapter demo",
    long_about = "Runs rulestore scenarios showing full-replace saves, single and\n\
                  filtered removal, and validated model-definition storage."
)]
struct Cli {
    /// TOML file with the store configuration (`collection = "..."`).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run every scenario in sequence.
    RunAll,
    /// Save, add, and remove single rules.
    Policy,
    /// Filtered bulk removal, including wildcard fields.
    Filtered,
    /// Store and load the model definition.
    Model,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    // Set RUST_LOG=debug for per-operation logs.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    let result = load_config(cli.config.as_deref()).and_then(|config| {
        let db = MemoryDatabase::new();
        match cli.command {
            Command::RunAll => run_all(&db, &config),
            Command::Policy => scenarios::run_policy(&db, &config),
            Command::Filtered => scenarios::run_filtered(&db, &config),
            Command::Model => scenarios::run_model(&db, &config),
        }
    });

    match result {
        Ok(()) => {
            println!("All selected scenarios completed successfully.");
        }
        Err(e) => {
            eprintln!("Demo error: {}", e);
            std::process::exit(1);
        }
    }
}

fn load_config(path: Option<&std::path::Path>) -> RuleStoreResult<StoreConfig> {
    match path {
        Some(path) => StoreConfig::from_file(path),
        None => Ok(StoreConfig::default()),
    }
}

fn run_all(db: &MemoryDatabase, config: &StoreConfig) -> RuleStoreResult<()> {
    scenarios::run_policy(db, config)?;
    scenarios::run_filtered(db, config)?;
    scenarios::run_model(db, config)?;
    Ok(())
}
