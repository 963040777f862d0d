//! Launch tests
//!
//! Drive mint and auction workflows against the fake ledger, ticking the polling loop by hand
//! unless a test is about the spawned loop itself.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Result};
use nftkit::{
    Amount, Asset, AuctionState, Error, FlatPrice, Launchpad, LaunchpadSettings, MintState,
    PollOutcome, PriceSchedule, Receipt, TokenId,
};
use nftkit_fake_ledger::{FakeContentStore, FakeLedger, FakeLedgerConfig};

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("nftkit=debug")
        .with_test_writer()
        .try_init();
}

fn assets(count: usize) -> Vec<Asset> {
    (0..count)
        .map(|i| {
            Asset::new(
                format!("asset-{i}.png"),
                format!("Asset number {i}"),
                vec![i as u8; 16],
                "image/png",
            )
        })
        .collect()
}

fn launchpad(ledger: &Arc<FakeLedger>, store: FakeContentStore) -> Launchpad {
    Launchpad::new(ledger.clone(), Arc::new(store), LaunchpadSettings::default())
}

#[tokio::test]
async fn test_mint_two_assets_yields_reversed_token_ids() -> Result<()> {
    init_logging();

    let ledger = Arc::new(FakeLedger::default());
    let launchpad = launchpad(&ledger, FakeContentStore::new());
    let poller = launchpad.poller();

    launchpad.mint().start(assets(2)).await?;
    assert_eq!(launchpad.mint().state(), MintState::AwaitingConfirmation);

    assert_eq!(
        poller.tick().await,
        vec![PollOutcome::Pending, PollOutcome::Idle]
    );
    assert_eq!(launchpad.mint().state(), MintState::AwaitingConfirmation);

    assert_eq!(
        poller.tick().await,
        vec![PollOutcome::Resolved { success: true }, PollOutcome::Idle]
    );
    assert_eq!(launchpad.mint().state(), MintState::Completed);
    assert_eq!(
        launchpad.mint().token_ids().await,
        vec![TokenId::from(2), TokenId::from(1)]
    );

    let handle = launchpad.mint().transaction().await;
    assert!(!handle.awaiting_result);
    assert!(handle.last_receipt.is_some_and(|receipt| receipt.success));

    Ok(())
}

#[tokio::test]
async fn test_failed_mint_receipt() -> Result<()> {
    let ledger = Arc::new(FakeLedger::new(FakeLedgerConfig {
        mint_succeeds: false,
        confirmation_polls: 0,
        ..Default::default()
    }));
    let launchpad = launchpad(&ledger, FakeContentStore::new());
    let poller = launchpad.poller();

    launchpad.mint().start(assets(3)).await?;

    assert_eq!(
        poller.tick().await[0],
        PollOutcome::Resolved { success: false }
    );
    assert_eq!(launchpad.mint().state(), MintState::Failed);
    assert!(launchpad.mint().token_ids().await.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_upload_failure_submits_nothing() -> Result<()> {
    let ledger = Arc::new(FakeLedger::default());
    let launchpad = launchpad(&ledger, FakeContentStore::new().rejecting("asset-2.png"));

    let result = launchpad.mint().start(assets(4)).await;

    assert!(matches!(result, Err(Error::UploadFailed(_))));
    assert_eq!(launchpad.mint().state(), MintState::Failed);
    assert!(ledger.submitted_mints().await.is_empty());
    assert!(!launchpad.mint().transaction().await.awaiting_result);

    Ok(())
}

#[tokio::test]
async fn test_submission_failure_fails_mint() -> Result<()> {
    let ledger = Arc::new(FakeLedger::new(FakeLedgerConfig {
        reject_submissions: true,
        ..Default::default()
    }));
    let launchpad = launchpad(&ledger, FakeContentStore::new());

    let result = launchpad.mint().start(assets(1)).await;

    assert!(matches!(result, Err(Error::SubmissionFailed(_))));
    assert_eq!(launchpad.mint().state(), MintState::Failed);

    Ok(())
}

#[tokio::test]
async fn test_mint_rejects_second_start_while_awaiting() -> Result<()> {
    let ledger = Arc::new(FakeLedger::default());
    let launchpad = launchpad(&ledger, FakeContentStore::new());

    launchpad.mint().start(assets(1)).await?;
    let result = launchpad.mint().start(assets(1)).await;

    assert!(matches!(result, Err(Error::PreconditionNotMet(_))));
    assert_eq!(launchpad.mint().state(), MintState::AwaitingConfirmation);
    assert_eq!(ledger.submitted_mints().await.len(), 1);

    Ok(())
}

#[tokio::test]
async fn test_malformed_receipt_fails_mint() -> Result<()> {
    let ledger = Arc::new(FakeLedger::default());
    let launchpad = launchpad(&ledger, FakeContentStore::new());
    let poller = launchpad.poller();

    let id = launchpad.mint().start(assets(1)).await?;
    let malformed = serde_json::from_value::<Receipt>(serde_json::json!({
        "success": true,
        "event_logs": [
            { "_eventname": "MintSuccess", "params": [] }
        ]
    }))?;
    ledger.set_receipt(&id, malformed).await?;

    poller.tick().await;
    assert_eq!(poller.tick().await[0], PollOutcome::ResolveFailed);
    assert_eq!(launchpad.mint().state(), MintState::Failed);
    assert!(launchpad.mint().token_ids().await.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_transient_query_failures_keep_awaiting() -> Result<()> {
    let ledger = Arc::new(FakeLedger::new(FakeLedgerConfig {
        transient_failures: 2,
        confirmation_polls: 0,
        ..Default::default()
    }));
    let launchpad = launchpad(&ledger, FakeContentStore::new());
    let poller = launchpad.poller();

    launchpad.mint().start(assets(1)).await?;

    for _ in 0..2 {
        assert_eq!(poller.tick().await[0], PollOutcome::QueryFailed);
        assert_eq!(launchpad.mint().state(), MintState::AwaitingConfirmation);
    }

    assert_eq!(
        poller.tick().await[0],
        PollOutcome::Resolved { success: true }
    );
    assert_eq!(launchpad.mint().state(), MintState::Completed);

    Ok(())
}

#[tokio::test]
async fn test_ticks_after_resolution_are_idle() -> Result<()> {
    let ledger = Arc::new(FakeLedger::new(FakeLedgerConfig {
        confirmation_polls: 0,
        ..Default::default()
    }));
    let launchpad = launchpad(&ledger, FakeContentStore::new());
    let poller = launchpad.poller();

    launchpad.mint().start(assets(2)).await?;
    poller.tick().await;
    let queries = ledger.query_count();
    let token_ids = launchpad.mint().token_ids().await;

    for _ in 0..3 {
        assert_eq!(
            poller.tick().await,
            vec![PollOutcome::Idle, PollOutcome::Idle]
        );
    }

    assert_eq!(ledger.query_count(), queries);
    assert_eq!(launchpad.mint().token_ids().await, token_ids);
    assert_eq!(launchpad.mint().state(), MintState::Completed);

    Ok(())
}

#[tokio::test]
async fn test_retry_after_failed_mint() -> Result<()> {
    let ledger = Arc::new(FakeLedger::new(FakeLedgerConfig {
        confirmation_polls: 0,
        ..Default::default()
    }));
    let launchpad = launchpad(
        &ledger,
        FakeContentStore::new().rejecting("asset-1.png"),
    );
    let poller = launchpad.poller();

    assert!(launchpad.mint().start(assets(2)).await.is_err());
    assert_eq!(launchpad.mint().state(), MintState::Failed);

    launchpad.mint().start(assets(1)).await?;
    poller.tick().await;

    assert_eq!(launchpad.mint().state(), MintState::Completed);
    assert_eq!(launchpad.mint().token_ids().await, vec![TokenId::from(1)]);

    Ok(())
}

#[tokio::test]
async fn test_auction_requires_completed_mint() -> Result<()> {
    let ledger = Arc::new(FakeLedger::default());
    let launchpad = launchpad(&ledger, FakeContentStore::new());

    let before_mint = launchpad
        .auction()
        .start("collection", 24, &FlatPrice::default())
        .await;
    assert!(matches!(before_mint, Err(Error::PreconditionNotMet(_))));

    launchpad.mint().start(assets(1)).await?;
    let while_awaiting = launchpad
        .auction()
        .start("collection", 24, &FlatPrice::default())
        .await;
    assert!(matches!(while_awaiting, Err(Error::PreconditionNotMet(_))));

    assert_eq!(launchpad.auction().state(), AuctionState::NotStarted);
    assert!(ledger.submitted_auctions().await.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_auction_requires_minted_tokens() -> Result<()> {
    let ledger = Arc::new(FakeLedger::new(FakeLedgerConfig {
        confirmation_polls: 0,
        ..Default::default()
    }));
    let launchpad = launchpad(&ledger, FakeContentStore::new());
    let poller = launchpad.poller();

    let id = launchpad.mint().start(assets(1)).await?;
    ledger.set_receipt(&id, Receipt::success(vec![])).await?;
    poller.tick().await;

    assert_eq!(launchpad.mint().state(), MintState::Completed);
    assert!(launchpad.mint().token_ids().await.is_empty());

    let result = launchpad
        .auction()
        .start("collection", 24, &FlatPrice::default())
        .await;

    assert!(matches!(result, Err(Error::PreconditionNotMet(_))));
    assert_eq!(launchpad.auction().state(), AuctionState::NotStarted);
    assert!(ledger.submitted_auctions().await.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_auction_request_after_mint() -> Result<()> {
    let ledger = Arc::new(FakeLedger::new(FakeLedgerConfig {
        confirmation_polls: 0,
        first_token_id: 7,
        ..Default::default()
    }));
    let launchpad = launchpad(&ledger, FakeContentStore::new());
    let poller = launchpad.poller();

    launchpad.mint().start(assets(3)).await?;
    poller.tick().await;
    assert_eq!(launchpad.mint().state(), MintState::Completed);

    let pricing = PriceSchedule::new(Amount::from(1000u64))
        .with_price(TokenId::from(8), Amount::from(2500u64));
    launchpad.auction().start("Genesis", 24, &pricing).await?;
    assert_eq!(
        launchpad.auction().state(),
        AuctionState::AwaitingConfirmation
    );

    let submitted = ledger.submitted_auctions().await;
    let [request] = submitted.as_slice() else {
        bail!("expected one auction submission, got {}", submitted.len());
    };
    assert_eq!(request.collection_name, "Genesis");
    assert_eq!(
        request.token_ids,
        vec![TokenId::from(9), TokenId::from(8), TokenId::from(7)]
    );
    assert_eq!(
        request.prices,
        vec![
            Amount::from(1000u64),
            Amount::from(2500u64),
            Amount::from(1000u64)
        ]
    );
    assert_eq!(request.block_duration, 720);

    assert_eq!(
        poller.tick().await,
        vec![PollOutcome::Idle, PollOutcome::Resolved { success: true }]
    );
    assert_eq!(launchpad.auction().state(), AuctionState::Completed);
    assert!(launchpad.auction().collection_id().await.is_none());

    Ok(())
}

#[tokio::test]
async fn test_auction_price_mismatch_submits_nothing() -> Result<()> {
    let ledger = Arc::new(FakeLedger::new(FakeLedgerConfig {
        confirmation_polls: 0,
        ..Default::default()
    }));
    let launchpad = launchpad(&ledger, FakeContentStore::new());
    let poller = launchpad.poller();

    launchpad.mint().start(assets(2)).await?;
    poller.tick().await;

    let prices = vec![Amount::from(10u64)];
    let result = launchpad.auction().start("Genesis", 1, &prices).await;

    assert!(matches!(
        result,
        Err(Error::PriceListMismatch {
            tokens: 2,
            prices: 1
        })
    ));
    assert_eq!(launchpad.auction().state(), AuctionState::NotStarted);
    assert!(ledger.submitted_auctions().await.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_failed_auction_can_be_retried() -> Result<()> {
    let ledger = Arc::new(FakeLedger::new(FakeLedgerConfig {
        confirmation_polls: 0,
        auction_succeeds: false,
        ..Default::default()
    }));
    let launchpad = launchpad(&ledger, FakeContentStore::new());
    let poller = launchpad.poller();

    launchpad.mint().start(assets(1)).await?;
    poller.tick().await;

    let first = launchpad
        .auction()
        .start("Genesis", 2, &FlatPrice::default())
        .await?;
    poller.tick().await;
    assert_eq!(launchpad.auction().state(), AuctionState::Failed);

    let second = launchpad
        .auction()
        .start("Genesis", 2, &FlatPrice::default())
        .await?;
    assert_ne!(first, second);
    assert_eq!(
        launchpad.auction().state(),
        AuctionState::AwaitingConfirmation
    );
    assert_eq!(ledger.submitted_auctions().await.len(), 2);

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_spawned_polling_completes_launch() -> Result<()> {
    init_logging();

    let ledger = Arc::new(FakeLedger::new(FakeLedgerConfig {
        confirmation_polls: 3,
        ..Default::default()
    }));
    let launchpad = Launchpad::new(
        ledger.clone(),
        Arc::new(FakeContentStore::new()),
        LaunchpadSettings {
            poll_interval: Duration::from_millis(500),
            ..Default::default()
        },
    );
    let polling = launchpad.start_polling();

    launchpad.mint().start(assets(2)).await?;
    let mint_state = launchpad
        .mint()
        .wait_for_completion(Duration::from_secs(30))
        .await?;
    assert_eq!(mint_state, MintState::Completed);

    launchpad
        .auction()
        .start("Genesis", 1, &FlatPrice(Amount::from(42u64)))
        .await?;
    let auction_state = launchpad
        .auction()
        .wait_for_completion(Duration::from_secs(30))
        .await?;
    assert_eq!(auction_state, AuctionState::Completed);

    polling.stop().await;

    let queries = ledger.query_count();
    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(ledger.query_count(), queries);

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_zero_poll_interval_still_polls() -> Result<()> {
    let ledger = Arc::new(FakeLedger::default());
    let launchpad = Launchpad::new(
        ledger.clone(),
        Arc::new(FakeContentStore::new()),
        LaunchpadSettings {
            poll_interval: Duration::ZERO,
            ..Default::default()
        },
    );
    let polling = launchpad.start_polling();

    launchpad.mint().start(assets(1)).await?;
    let state = launchpad
        .mint()
        .wait_for_completion(Duration::from_secs(30))
        .await?;

    assert_eq!(state, MintState::Completed);
    assert!(!polling.is_finished());
    assert!(ledger.query_count() > 0);

    polling.stop().await;

    Ok(())
}
