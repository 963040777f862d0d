use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Result};
use clap::Args;
use nftkit::{Amount, Asset, AuctionState, FlatPrice, Launchpad, MintState};
use nftkit_fake_ledger::{FakeContentStore, FakeLedger};

use crate::config::{LedgerBackend, Settings};

#[derive(Args)]
pub struct SimulateSubCommand {
    /// Asset files, one token is minted per file
    #[arg(required = true)]
    assets: Vec<PathBuf>,
    /// Collection name
    #[arg(long)]
    collection_name: String,
    /// Auction duration in hours
    #[arg(long, default_value = "24")]
    duration_hours: u64,
    /// Starting price of every token, defaults to the configured price
    #[arg(long)]
    price: Option<u64>,
    /// Give up on a transaction after this many seconds
    #[arg(long, default_value = "60")]
    timeout_secs: u64,
}

fn content_type(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .as_deref()
    {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("json") => "application/json",
        _ => "application/octet-stream",
    }
}

async fn read_asset(path: &Path) -> Result<Asset> {
    let content = tokio::fs::read(path).await?;
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string());

    Ok(Asset::new(name, "", content, content_type(path)))
}

pub async fn simulate(settings: &Settings, sub_command_args: &SimulateSubCommand) -> Result<()> {
    if settings.ledger.backend != LedgerBackend::Fake {
        tracing::warn!("Simulation always runs against the fake ledger");
    }

    let mut assets = Vec::with_capacity(sub_command_args.assets.len());
    for path in &sub_command_args.assets {
        assets.push(read_asset(path).await?);
    }

    let ledger = Arc::new(FakeLedger::new(settings.fake_ledger.clone()));
    let launchpad = Launchpad::new(
        ledger.clone(),
        Arc::new(FakeContentStore::new()),
        settings.launchpad_settings(),
    );
    let polling = launchpad.start_polling();
    let timeout = Duration::from_secs(sub_command_args.timeout_secs);

    let mint_id = launchpad.mint().start(assets).await?;
    println!("Mint transaction: {}", mint_id);

    let mint_state = launchpad.mint().wait_for_completion(timeout).await?;
    println!("Mint: {}", mint_state.status_text());
    if mint_state != MintState::Completed {
        polling.stop().await;
        bail!("Mint did not complete");
    }

    let token_ids = launchpad.mint().token_ids().await;
    let listed: Vec<String> = token_ids.iter().map(|id| id.to_string()).collect();
    println!("Token ids: {}", listed.join(", "));

    let price = Amount::from(
        sub_command_args
            .price
            .unwrap_or(settings.auction.default_price),
    );

    let auction_id = launchpad
        .auction()
        .start(
            &sub_command_args.collection_name,
            sub_command_args.duration_hours,
            &FlatPrice(price),
        )
        .await?;
    println!("Auction transaction: {}", auction_id);

    let auction_state = launchpad.auction().wait_for_completion(timeout).await?;
    polling.stop().await;

    println!("Auction: {}", auction_state.status_text());
    if let Some(request) = launchpad.auction().request().await {
        println!(
            "Auctioned {} tokens at {} for {} blocks",
            request.token_ids.len(),
            price,
            request.block_duration
        );
    }

    if auction_state != AuctionState::Completed {
        bail!("Auction did not complete");
    }

    tracing::debug!("Fake ledger served {} queries", ledger.query_count());

    Ok(())
}
