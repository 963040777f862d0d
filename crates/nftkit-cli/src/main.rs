use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::EnvFilter;

mod config;
mod sub_commands;

/// Mint a collection and put it up for auction
#[derive(Parser)]
#[command(name = "nftkit")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the config file
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Logging level
    #[arg(short, long, default_value = "warn")]
    log_level: Level,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a receipt or transaction json file
    DecodeReceipt(sub_commands::decode_receipt::DecodeReceiptSubCommand),
    /// Poll the ledger until a transaction has a receipt
    Watch(sub_commands::watch::WatchSubCommand),
    /// Mint and auction assets against the fake ledger
    Simulate(sub_commands::simulate::SimulateSubCommand),
}

#[tokio::main]
async fn main() -> Result<()> {
    let args: Cli = Cli::parse();
    let default_filter = args.log_level;

    let hyper_filter = "hyper=warn";
    let reqwest_filter = "reqwest=warn";

    let env_filter = EnvFilter::new(format!(
        "{},{},{}",
        default_filter, hyper_filter, reqwest_filter
    ));

    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let settings = config::Settings::new(args.config.as_ref());

    match &args.command {
        Commands::DecodeReceipt(sub_command_args) => {
            sub_commands::decode_receipt::decode_receipt(sub_command_args).await
        }
        Commands::Watch(sub_command_args) => {
            sub_commands::watch::watch(&settings, sub_command_args).await
        }
        Commands::Simulate(sub_command_args) => {
            sub_commands::simulate::simulate(&settings, sub_command_args).await
        }
    }
}
