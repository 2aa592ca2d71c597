mod common;

use common::{generate_trade_id, offer_params, setup_env, INITIAL_NATIVE, INITIAL_TOKEN};
use solana_program::pubkey::Pubkey;
use swap_escrow::{Asset, SwapError, TradeEvent, TradeStatus};

// ============================================================================
// DEPOSIT TESTS
// ============================================================================

/// 1. Test: Native Deposit Creates Open Record
/// Verifies that a native deposit creates an uncompleted offer and moves exactly the offered
/// amount into the native vault.
/// Why: The escrow must hold exactly what the maker offered, and the record is what a taker
/// settles against.
#[tokio::test]
async fn test_deposit_seller_native_creates_record() {
    let env = setup_env().await;
    let trade_id = generate_trade_id();
    let offered = 2_000_000_000;
    let wanted = 50_000;

    let params = offer_params(trade_id, env.native_mint, env.mint_b, offered, wanted, false);
    let key = env
        .program
        .deposit_seller_native(env.maker, params)
        .await
        .unwrap();

    let offer = env.program.offer(&env.maker, trade_id).await.unwrap();
    assert_eq!(offer.id, trade_id);
    assert_eq!(offer.maker, env.maker);
    assert_eq!(offer.token_a_offered_amount, offered);
    assert_eq!(offer.token_b_wanted_amount, wanted);
    assert!(offer.is_native);
    assert!(!offer.is_taker_native);
    assert!(!offer.is_swap_completed, "New offer must not be completed");

    assert_eq!(key, env.program.offer_key(&env.maker, trade_id));
    assert_eq!(env.program.vault_balance(Asset::Native).await, offered);
    assert_eq!(env.program.committed(&key).await, offered);
    assert_eq!(
        env.native(&env.maker).await,
        INITIAL_NATIVE - offered - env.offer_rent()
    );
    assert_eq!(env.program.trade_status(&key).await, TradeStatus::Open);
}

/// 2. Test: Token Deposit Funds The Per-Mint Vault
/// Verifies that a token deposit lands in the vault of its mint and nowhere else.
/// Why: Vaults are pooled per asset; crediting the wrong pool would break solvency accounting.
#[tokio::test]
async fn test_deposit_seller_spl_funds_token_vault() {
    let env = setup_env().await;
    let trade_id = generate_trade_id();

    let params = offer_params(trade_id, env.mint_a, env.native_mint, 700, 1_000, true);
    env.program
        .deposit_seller_spl(env.maker, params)
        .await
        .unwrap();

    assert_eq!(env.program.vault_balance(Asset::Token(env.mint_a)).await, 700);
    assert_eq!(env.program.vault_balance(Asset::Token(env.mint_b)).await, 0);
    assert_eq!(env.program.vault_balance(Asset::Native).await, 0);
    assert_eq!(env.token(&env.maker, env.mint_a).await, INITIAL_TOKEN - 700);
    // Storage deposit is always paid in the native asset
    assert_eq!(env.native(&env.maker).await, INITIAL_NATIVE - env.offer_rent());
    assert!(env.program.is_solvent().await);
}

/// 3. Test: Duplicate Deposit Rejected
/// Verifies that a second deposit with the same maker and trade id fails with DuplicateKey and
/// moves nothing.
/// Why: A live record must never be overwritten; the first maker's escrow would otherwise be
/// orphaned.
#[tokio::test]
async fn test_duplicate_deposit_rejected() {
    let env = setup_env().await;
    let trade_id = generate_trade_id();
    let params = offer_params(trade_id, env.mint_a, env.mint_b, 100, 200, false);

    env.program
        .deposit_seller_spl(env.maker, params.clone())
        .await
        .unwrap();
    let native_before = env.native(&env.maker).await;

    let result = env.program.deposit_seller_spl(env.maker, params).await;
    assert_eq!(result, Err(SwapError::DuplicateKey));
    assert_eq!(env.program.vault_balance(Asset::Token(env.mint_a)).await, 100);
    assert_eq!(env.native(&env.maker).await, native_before);

    // Same id under a different maker is a different key
    let params = offer_params(trade_id, env.mint_a, env.mint_b, 100, 200, false);
    env.program
        .deposit_seller_spl(env.taker, params)
        .await
        .unwrap();
}

/// 4. Test: Zero Offered Amount Rejected
/// Verifies that deposits offering nothing fail with InvalidAmount.
/// Why: An empty escrow would let a taker pay for nothing.
#[tokio::test]
async fn test_zero_offered_amount_rejected() {
    let env = setup_env().await;

    let params = offer_params(1, env.native_mint, env.mint_a, 0, 10, false);
    let result = env.program.deposit_seller_native(env.maker, params).await;

    assert_eq!(result, Err(SwapError::InvalidAmount));
    assert_eq!(env.program.open_records().await, 0);
}

/// 5. Test: Mints Outside The Asset Set Rejected
/// Verifies that unregistered token mints and mismatched native flags fail with InvalidMint.
/// Why: Vaults exist only for configured assets, and a native leg must name the native mint.
#[tokio::test]
async fn test_invalid_mints_rejected() {
    let env = setup_env().await;
    let unknown = Pubkey::new_unique();

    let params = offer_params(1, unknown, env.mint_b, 10, 10, false);
    let result = env.program.deposit_seller_spl(env.maker, params).await;
    assert_eq!(result, Err(SwapError::InvalidMint));

    let params = offer_params(2, env.mint_a, env.mint_b, 10, 10, false);
    let result = env.program.deposit_seller_native(env.maker, params).await;
    assert_eq!(result, Err(SwapError::InvalidMint));

    let params = offer_params(3, env.native_mint, env.mint_b, 10, 10, false);
    let result = env.program.deposit_seller_spl(env.maker, params).await;
    assert_eq!(result, Err(SwapError::InvalidMint));

    // Wanted leg is checked too
    let params = offer_params(4, env.mint_a, env.mint_b, 10, 10, true);
    let result = env.program.deposit_seller_spl(env.maker, params).await;
    assert_eq!(result, Err(SwapError::InvalidMint));
}

/// 6. Test: Insufficient Balance Leaves No Partial State
/// Verifies that a deposit the maker cannot cover fails and leaves no record and no
/// storage-deposit debit.
/// Why: The record is created before the vault transfer; a failed transfer must roll the
/// record back.
#[tokio::test]
async fn test_insufficient_balance_rolls_back() {
    let env = setup_env().await;
    let trade_id = generate_trade_id();

    let result = env
        .program
        .deposit_seller_native(
            env.maker,
            offer_params(trade_id, env.native_mint, env.mint_a, INITIAL_NATIVE, 1, false),
        )
        .await;

    assert_eq!(result, Err(SwapError::InsufficientBalance));
    let offer = env.program.offer(&env.maker, trade_id).await;
    assert_eq!(offer, Err(SwapError::RecordNotFound));
    assert_eq!(env.native(&env.maker).await, INITIAL_NATIVE);
    assert_eq!(env.program.vault_balance(Asset::Native).await, 0);
    let key = env.program.offer_key(&env.maker, trade_id);
    assert_eq!(env.program.trade_status(&key).await, TradeStatus::Unknown);
}

/// 7. Test: Deposit Appends TradeCreated To History
/// Verifies that a committed deposit is recorded once in the trade history.
/// Why: The history is the audit trail that outlives closed records.
#[tokio::test]
async fn test_deposit_records_history() {
    let env = setup_env().await;
    let trade_id = generate_trade_id();

    let params = offer_params(trade_id, env.mint_a, env.mint_b, 5, 6, false);
    let key = env
        .program
        .deposit_seller_spl(env.maker, params)
        .await
        .unwrap();

    let history = env.program.history().await;
    assert_eq!(history.len(), 1);
    match &history[0].event {
        TradeEvent::TradeCreated {
            record,
            trade_id: id,
            offered,
            wanted,
            ..
        } => {
            assert_eq!(record, &key.to_string());
            assert_eq!(*id, trade_id);
            assert_eq!((*offered, *wanted), (5, 6));
        }
        other => panic!("Unexpected event {:?}", other),
    }
}

/// 8. Test: History Exports As Tagged JSON
/// Verifies that the exported history is a JSON array whose entries carry the event's type tag
/// and the record key.
/// Why: Operators read the audit trail outside the process, after the records are gone.
#[tokio::test]
async fn test_export_history_as_json() {
    let env = setup_env().await;
    let trade_id = generate_trade_id();

    let params = offer_params(trade_id, env.mint_a, env.mint_b, 5, 6, false);
    let key = env
        .program
        .deposit_seller_spl(env.maker, params)
        .await
        .unwrap();
    let params = common::take_params(env.maker, trade_id, env.mint_a, env.mint_b);
    env.program.take_offer(env.taker, params).await.unwrap();

    let exported = env.program.export_history().await.unwrap();
    let entries: Vec<serde_json::Value> = serde_json::from_str(&exported).unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["event"]["type"], "trade_created");
    assert_eq!(entries[1]["event"]["type"], "swap_completed");
    assert_eq!(entries[0]["event"]["record"], key.to_string());
    assert_eq!(entries[1]["event"]["record"], key.to_string());
}
