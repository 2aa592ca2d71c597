//! Settlement engine: validate, execute both legs, close the record.

use solana_program::pubkey::Pubkey;
use tracing::info;

use super::{split_fee, SettlementReceipt, SwapProgram};
use crate::address;
use crate::bank::Asset;
use crate::config::ProgramSettings;
use crate::error::SwapError;
use crate::events::{OfferKind, TradeEvent};
use crate::instruction::{FinalizeOriginEvmParams, FinalizeOriginSolParams, TakeParams};
use crate::runtime::Transaction;
use crate::state::{InterchainOffer, InterchainOriginSolOffer, Offer};

impl SwapProgram {
    /// Taker pays the wanted leg to the maker and receives the escrowed leg.
    pub async fn take_offer(
        &self,
        taker: Pubkey,
        params: TakeParams,
    ) -> Result<SettlementReceipt, SwapError> {
        self.execute(|settings, tx| process_take_offer(settings, tx, taker, params))
            .await
    }

    /// Releases a funded relayed trade to the external seller's local account.
    /// Only the relayer that created the record can finalize it.
    pub async fn finalize_interchain_origin_evm_offer(
        &self,
        relayer: Pubkey,
        params: FinalizeOriginEvmParams,
    ) -> Result<SettlementReceipt, SwapError> {
        self.execute(|settings, tx| {
            process_finalize_origin_evm(settings, tx, relayer, params)
        })
        .await
    }

    /// Releases an origin-SOL escrow to the external buyer's local account.
    /// Only an authorized relayer, having observed the buyer's external
    /// payment, can finalize; the seller cannot release their own escrow.
    pub async fn finalize_interchain_origin_sol_offer(
        &self,
        relayer: Pubkey,
        params: FinalizeOriginSolParams,
    ) -> Result<SettlementReceipt, SwapError> {
        self.execute(|settings, tx| {
            process_finalize_origin_sol(settings, tx, relayer, params)
        })
        .await
    }
}

fn process_take_offer(
    settings: &ProgramSettings,
    tx: &mut Transaction<'_>,
    taker: Pubkey,
    params: TakeParams,
) -> Result<SettlementReceipt, SwapError> {
    let key = address::offer_key(&settings.program_id, &params.maker, params.trade_id);
    let mut offer: Offer = tx.read_record(&key)?;

    if offer.is_swap_completed {
        return Err(SwapError::AlreadyCompleted);
    }
    if params.token_mint_a != offer.token_mint_a || params.token_mint_b != offer.token_mint_b {
        return Err(SwapError::MintMismatch);
    }
    if taker == offer.maker {
        return Err(SwapError::SelfTrade);
    }

    let offered_asset = Asset::for_leg(offer.is_native, offer.token_mint_a);
    let wanted_asset = Asset::for_leg(offer.is_taker_native, offer.token_mint_b);

    // Wanted leg first: the taker must cover it before anything leaves the vault
    tx.transfer(
        &taker,
        &offer.maker,
        wanted_asset,
        offer.token_b_wanted_amount,
    )?;
    tx.release_from_vault(&key, offered_asset, offer.token_a_offered_amount, &taker)?;

    offer.is_swap_completed = true;
    tx.write_record(&key, &offer)?;
    tx.close_record(&key)?;

    info!(
        "Offer {} of {} taken by {}: {} {} <-> {} {}",
        offer.id,
        offer.maker,
        taker,
        offer.token_a_offered_amount,
        offered_asset,
        offer.token_b_wanted_amount,
        wanted_asset
    );
    tx.emit(
        key,
        TradeEvent::SwapCompleted {
            kind: OfferKind::Offer,
            record: key.to_string(),
            trade_id: offer.id,
            recipient: taker.to_string(),
            released: offer.token_a_offered_amount,
            fee_collected: 0,
        },
    );
    Ok(SettlementReceipt {
        record: key,
        recipient: taker,
        released: offer.token_a_offered_amount,
        fee_collected: 0,
    })
}

fn process_finalize_origin_evm(
    settings: &ProgramSettings,
    tx: &mut Transaction<'_>,
    relayer: Pubkey,
    params: FinalizeOriginEvmParams,
) -> Result<SettlementReceipt, SwapError> {
    if !tx.state().relayers.contains(&relayer) {
        return Err(SwapError::Unauthorized);
    }
    let key = address::interchain_offer_key(&settings.program_id, &relayer, params.trade_id);
    let mut offer: InterchainOffer = tx.read_record(&key)?;

    if offer.is_swap_completed {
        return Err(SwapError::AlreadyCompleted);
    }
    if params.token_mint_a != offer.token_mint_a {
        return Err(SwapError::MintMismatch);
    }
    if !offer.is_funded() {
        return Err(SwapError::NotFunded);
    }

    let asset = Asset::for_leg(offer.is_taker_native, offer.token_mint_a);
    let (released, fee) = split_fee(settings, offer.token_b_wanted_amount);
    let recipient = offer.external_seller_sol;
    release_with_fee(settings, tx, &key, asset, released, fee, &recipient)?;

    offer.fee_collected = fee;
    offer.is_swap_completed = true;
    tx.write_record(&key, &offer)?;
    tx.close_record(&key)?;

    info!(
        "Relayed offer {} finalized by {}: {} {} released to {} (fee {})",
        offer.trade_id, relayer, released, asset, offer.external_seller_sol, fee
    );
    tx.emit(
        key,
        TradeEvent::SwapCompleted {
            kind: OfferKind::InterchainOffer,
            record: key.to_string(),
            trade_id: offer.trade_id,
            recipient: offer.external_seller_sol.to_string(),
            released,
            fee_collected: fee,
        },
    );
    Ok(SettlementReceipt {
        record: key,
        recipient: offer.external_seller_sol,
        released,
        fee_collected: fee,
    })
}

fn process_finalize_origin_sol(
    settings: &ProgramSettings,
    tx: &mut Transaction<'_>,
    relayer: Pubkey,
    params: FinalizeOriginSolParams,
) -> Result<SettlementReceipt, SwapError> {
    if !tx.state().relayers.contains(&relayer) {
        return Err(SwapError::Unauthorized);
    }
    let key = address::interchain_origin_sol_offer_key(
        &settings.program_id,
        &params.seller,
        params.trade_id,
    );
    let mut offer: InterchainOriginSolOffer = tx.read_record(&key)?;

    if offer.is_swap_completed {
        return Err(SwapError::AlreadyCompleted);
    }
    if params.token_mint_a != offer.token_mint_a {
        return Err(SwapError::MintMismatch);
    }
    if params.external_buyer_sol == offer.seller_sol {
        return Err(SwapError::SelfTrade);
    }

    let asset = Asset::for_leg(offer.is_native, offer.token_mint_a);
    let (released, fee) = split_fee(settings, offer.token_a_offered_amount);
    let recipient = params.external_buyer_sol;
    release_with_fee(settings, tx, &key, asset, released, fee, &recipient)?;

    offer.is_swap_completed = true;
    tx.write_record(&key, &offer)?;
    tx.close_record(&key)?;

    info!(
        "Origin-SOL offer {} of {} finalized by {}: {} {} released to {} (fee {})",
        offer.trade_id, offer.seller_sol, relayer, released, asset, params.external_buyer_sol, fee
    );
    tx.emit(
        key,
        TradeEvent::SwapCompleted {
            kind: OfferKind::InterchainOriginSolOffer,
            record: key.to_string(),
            trade_id: offer.trade_id,
            recipient: params.external_buyer_sol.to_string(),
            released,
            fee_collected: fee,
        },
    );
    Ok(SettlementReceipt {
        record: key,
        recipient: params.external_buyer_sol,
        released,
        fee_collected: fee,
    })
}

fn release_with_fee(
    settings: &ProgramSettings,
    tx: &mut Transaction<'_>,
    key: &Pubkey,
    asset: Asset,
    released: u64,
    fee: u64,
    recipient: &Pubkey,
) -> Result<(), SwapError> {
    tx.release_from_vault(key, asset, released, recipient)?;
    if let Some(collector) = settings.fee_collector.filter(|_| fee > 0) {
        tx.release_from_vault(key, asset, fee, &collector)?;
    }
    Ok(())
}
