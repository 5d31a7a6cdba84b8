//! Turnstake CLI
//!
//! Replays recorded rollup inputs against an in-memory ledger and offers a few
//! helpers for working with game ids and configuration.

use clap::{Parser, Subcommand};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use turnstake::{
    common::types::amount_serde, config::ConfigLoader, games::id, Address, Amount, Arena, ArenaConfig, ArenaInput,
    InMemoryLedger, NoticeLog,
};

/// Turnstake CLI
#[derive(Parser)]
#[command(name = "turnstake")]
#[command(about = "Deterministic matchmaking and escrow for two-player games")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a recorded input sequence
    Replay {
        /// JSON file with initial balances and inputs
        #[arg(short, long)]
        inputs: PathBuf,

        /// Configuration file path
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Print the game id for a pairing
    DeriveId {
        #[arg(short, long)]
        white: Address,

        #[arg(short, long)]
        black: Address,

        /// Input index the pairing join arrived at
        #[arg(short, long)]
        index: u64,
    },

    /// Print the default configuration as TOML
    DefaultConfig,
}

#[derive(Deserialize)]
struct ReplayFile {
    #[serde(default)]
    balances: BTreeMap<Address, Balance>,
    inputs: Vec<ArenaInput>,
}

#[derive(Deserialize)]
struct Balance(#[serde(with = "amount_serde")] Amount);

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Replay { inputs, config } => {
            let mut loader = ConfigLoader::new();
            if let Some(path) = config {
                loader = loader.with_path(path);
            }
            let config = loader.load()?;
            init_tracing(&config);
            replay(config, &inputs)
        }
        Commands::DeriveId { white, black, index } => {
            println!("{}", id::derive(&white, &black, index));
            Ok(())
        }
        Commands::DefaultConfig => {
            print!("{}", toml::to_string_pretty(&ArenaConfig::default())?);
            Ok(())
        }
    }
}

fn init_tracing(config: &ArenaConfig) {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("turnstake={}", config.monitoring.log_level.as_filter()).into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn replay(config: ArenaConfig, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(path)?;
    let file: ReplayFile = serde_json::from_str(&content)?;

    let ledger = InMemoryLedger::with_balances(file.balances.into_iter().map(|(player, Balance(amount))| (player, amount)))?;
    let mut arena = Arena::new(config, ledger, NoticeLog::new())?;

    tracing::info!(inputs = file.inputs.len(), "replaying inputs");

    for (index, input) in file.inputs.into_iter().enumerate() {
        let result = arena.advance(input);
        println!("{}", serde_json::to_string(&serde_json::json!({ "input": index, "result": result }))?);
    }

    for notice in arena.emitter().notices() {
        println!("notice {}", notice.to_hex());
    }
    println!("games {}", arena.registry().len());
    println!("waiting {}", arena.lobby().len());
    println!("digest 0x{}", hex::encode(arena.state_digest()?));

    Ok(())
}
