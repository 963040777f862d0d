use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Args;
use nftkit::{LedgerTransaction, Receipt, ReceiptDecoder};
use serde_json::{json, Value};

#[derive(Args)]
pub struct DecodeReceiptSubCommand {
    /// Json file holding a receipt or a whole transaction
    file: PathBuf,
}

fn parse_receipt(contents: &str) -> Result<Receipt> {
    let value: Value = serde_json::from_str(contents)?;

    // A transaction object nests the receipt, a bare receipt carries `success` itself
    if value.get("success").is_some() {
        return Ok(serde_json::from_value(value)?);
    }

    let transaction: LedgerTransaction = serde_json::from_value(value)?;
    match transaction.receipt {
        Some(receipt) => Ok(receipt),
        None => bail!("Transaction {} has no receipt yet", transaction.id),
    }
}

pub async fn decode_receipt(sub_command_args: &DecodeReceiptSubCommand) -> Result<()> {
    let contents = tokio::fs::read_to_string(&sub_command_args.file).await?;
    let receipt = parse_receipt(&contents)?;

    let events: Vec<&str> = receipt
        .event_logs
        .iter()
        .map(|event| event.name.as_str())
        .collect();

    let token_ids = if receipt.success {
        Some(ReceiptDecoder::decode_minted_token_ids(&receipt)?)
    } else {
        None
    };

    let summary = json!({
        "success": receipt.success,
        "events": events,
        "token_ids": token_ids,
    });

    println!("{}", serde_json::to_string_pretty(&summary)?);

    Ok(())
}
