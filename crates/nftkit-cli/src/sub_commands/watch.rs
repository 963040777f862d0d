use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Result};
use clap::Args;
use nftkit::{JsonRpcLedger, PollingLoop, ReceiptDecoder, TransactionId, TransactionWatch};
use url::Url;

use crate::config::{LedgerBackend, Settings};

#[derive(Args)]
pub struct WatchSubCommand {
    /// Transaction id
    transaction_id: String,
    /// Give up after this many seconds
    #[arg(long, default_value = "300")]
    timeout_secs: u64,
}

pub async fn watch(settings: &Settings, sub_command_args: &WatchSubCommand) -> Result<()> {
    let rpc_url = match (&settings.ledger.backend, &settings.ledger.rpc_url) {
        (LedgerBackend::JsonRpc, Some(rpc_url)) => Url::parse(rpc_url)?,
        _ => bail!("Watching a transaction requires the jsonrpc ledger backend"),
    };

    let ledger = JsonRpcLedger::with_timeout(rpc_url, settings.poll_interval() * 10)?;

    let id = TransactionId::new(sub_command_args.transaction_id.as_str());
    let watch = TransactionWatch::new("watch", id.clone())?;

    let mut poller = PollingLoop::new(Arc::new(ledger), settings.poll_interval());
    poller.register(Arc::new(watch.clone()));
    let polling = poller.spawn();

    println!("Waiting for {}", id);

    let receipt = watch
        .wait_for_receipt(Duration::from_secs(sub_command_args.timeout_secs))
        .await;
    polling.stop().await;
    let receipt = receipt?;

    println!("Success: {}", receipt.success);
    for event in &receipt.event_logs {
        println!("Event: {}", event.name);
    }

    if receipt.success {
        match ReceiptDecoder::decode_minted_token_ids(&receipt) {
            Ok(token_ids) if !token_ids.is_empty() => {
                let token_ids: Vec<String> = token_ids.iter().map(|id| id.to_string()).collect();
                println!("Minted tokens: {}", token_ids.join(", "));
            }
            Ok(_) => (),
            Err(err) => tracing::warn!("Could not decode token ids: {}", err),
        }
    }

    Ok(())
}
