//! Deposit engine: create a record and move the offered asset into custody.

use solana_program::pubkey::Pubkey;
use tracing::{debug, info};

use super::{leg_asset, SwapProgram};
use crate::address;
use crate::config::ProgramSettings;
use crate::error::SwapError;
use crate::events::{evm_hex, OfferKind, TradeEvent};
use crate::instruction::{OfferParams, OriginEvmDepositParams, OriginSolDepositParams};
use crate::runtime::Transaction;
use crate::state::{InterchainOffer, InterchainOriginSolOffer, Offer};

impl SwapProgram {
    /// Maker escrows the native asset. Returns the new record's key.
    pub async fn deposit_seller_native(
        &self,
        maker: Pubkey,
        params: OfferParams,
    ) -> Result<Pubkey, SwapError> {
        self.execute(|settings, tx| process_deposit_offer(settings, tx, maker, params, true))
            .await
    }

    /// Maker escrows token A. Returns the new record's key.
    pub async fn deposit_seller_spl(
        &self,
        maker: Pubkey,
        params: OfferParams,
    ) -> Result<Pubkey, SwapError> {
        self.execute(|settings, tx| process_deposit_offer(settings, tx, maker, params, false))
            .await
    }

    /// Local buyer funds a relayed trade with the native asset.
    pub async fn interchain_origin_evm_deposit_seller_native(
        &self,
        buyer: Pubkey,
        params: OriginEvmDepositParams,
    ) -> Result<Pubkey, SwapError> {
        self.execute(|settings, tx| {
            process_origin_evm_deposit(settings, tx, buyer, params, true)
        })
        .await
    }

    /// Local buyer funds a relayed trade with a token.
    pub async fn interchain_origin_evm_deposit_seller_spl(
        &self,
        buyer: Pubkey,
        params: OriginEvmDepositParams,
    ) -> Result<Pubkey, SwapError> {
        self.execute(|settings, tx| {
            process_origin_evm_deposit(settings, tx, buyer, params, false)
        })
        .await
    }

    /// Local seller escrows the native asset for a buyer paying on the external chain.
    pub async fn interchain_origin_sol_deposit_seller_native(
        &self,
        seller: Pubkey,
        params: OriginSolDepositParams,
    ) -> Result<Pubkey, SwapError> {
        self.execute(|settings, tx| {
            process_origin_sol_deposit(settings, tx, seller, params, true)
        })
        .await
    }

    /// Local seller escrows a token for a buyer paying on the external chain.
    pub async fn interchain_origin_sol_deposit_seller_spl(
        &self,
        seller: Pubkey,
        params: OriginSolDepositParams,
    ) -> Result<Pubkey, SwapError> {
        self.execute(|settings, tx| {
            process_origin_sol_deposit(settings, tx, seller, params, false)
        })
        .await
    }
}

fn process_deposit_offer(
    settings: &ProgramSettings,
    tx: &mut Transaction<'_>,
    maker: Pubkey,
    params: OfferParams,
    is_native: bool,
) -> Result<Pubkey, SwapError> {
    if params.token_a_offered_amount == 0 {
        return Err(SwapError::InvalidAmount);
    }
    let offered_asset = leg_asset(settings, is_native, &params.token_mint_a)?;
    leg_asset(settings, params.is_taker_native, &params.token_mint_b)?;

    let key = address::offer_key(&settings.program_id, &maker, params.trade_id);
    let offer = Offer::new(
        params.trade_id,
        maker,
        params.token_mint_a,
        params.token_mint_b,
        params.token_a_offered_amount,
        params.token_b_wanted_amount,
        is_native,
        params.is_taker_native,
    );

    tx.create_record(key, &maker, settings.rent_for::<Offer>(), &offer)?;
    tx.deposit_to_vault(&key, &maker, offered_asset, params.token_a_offered_amount)?;

    info!(
        "Offer {} created by {}: {} {} for {}",
        params.trade_id,
        maker,
        params.token_a_offered_amount,
        offered_asset,
        params.token_b_wanted_amount
    );
    tx.emit(
        key,
        TradeEvent::TradeCreated {
            kind: OfferKind::Offer,
            record: key.to_string(),
            trade_id: params.trade_id,
            initiator: maker.to_string(),
            asset: offered_asset.to_string(),
            offered: params.token_a_offered_amount,
            wanted: params.token_b_wanted_amount,
        },
    );
    Ok(key)
}

fn process_origin_evm_deposit(
    settings: &ProgramSettings,
    tx: &mut Transaction<'_>,
    buyer: Pubkey,
    params: OriginEvmDepositParams,
    is_native: bool,
) -> Result<Pubkey, SwapError> {
    let key =
        address::interchain_offer_key(&settings.program_id, &params.relayer, params.trade_id);
    let mut offer: InterchainOffer = tx.read_record(&key)?;

    if offer.is_swap_completed {
        return Err(SwapError::AlreadyCompleted);
    }
    if offer.is_funded() {
        return Err(SwapError::AlreadyFunded);
    }
    if is_native != offer.is_taker_native || params.token_mint_a != offer.token_mint_a {
        return Err(SwapError::MintMismatch);
    }
    if buyer == offer.external_seller_sol {
        return Err(SwapError::SelfTrade);
    }
    if params.amount != offer.token_b_wanted_amount {
        return Err(SwapError::InvalidAmount);
    }
    let asset = leg_asset(settings, offer.is_taker_native, &offer.token_mint_a)?;

    tx.deposit_to_vault(&key, &buyer, asset, params.amount)?;
    offer.buyer_sol = Some(buyer);
    offer.buyer_evm = Some(params.buyer_evm);
    tx.write_record(&key, &offer)?;

    debug!(%key, %buyer, buyer_evm = %evm_hex(&params.buyer_evm), "Relayed offer funded");
    tx.emit(
        key,
        TradeEvent::OfferFunded {
            record: key.to_string(),
            trade_id: params.trade_id,
            buyer: buyer.to_string(),
            amount: params.amount,
        },
    );
    Ok(key)
}

fn process_origin_sol_deposit(
    settings: &ProgramSettings,
    tx: &mut Transaction<'_>,
    seller: Pubkey,
    params: OriginSolDepositParams,
    is_native: bool,
) -> Result<Pubkey, SwapError> {
    if params.token_a_offered_amount == 0 {
        return Err(SwapError::InvalidAmount);
    }
    // The wanted leg is paid on the external chain, so only the offered mint is checked here
    let offered_asset = leg_asset(settings, is_native, &params.token_mint_a)?;

    let key =
        address::interchain_origin_sol_offer_key(&settings.program_id, &seller, params.trade_id);
    let offer = InterchainOriginSolOffer::new(
        params.trade_id,
        seller,
        params.seller_evm,
        params.token_mint_a,
        params.token_a_offered_amount,
        params.token_b_wanted_amount,
        is_native,
        params.is_taker_native,
    );

    let rent = settings.rent_for::<InterchainOriginSolOffer>();
    tx.create_record(key, &seller, rent, &offer)?;
    tx.deposit_to_vault(&key, &seller, offered_asset, params.token_a_offered_amount)?;

    info!(
        "Origin-SOL offer {} created by {} (evm {}): {} {}",
        params.trade_id,
        seller,
        evm_hex(&params.seller_evm),
        params.token_a_offered_amount,
        offered_asset
    );
    tx.emit(
        key,
        TradeEvent::TradeCreated {
            kind: OfferKind::InterchainOriginSolOffer,
            record: key.to_string(),
            trade_id: params.trade_id,
            initiator: seller.to_string(),
            asset: offered_asset.to_string(),
            offered: params.token_a_offered_amount,
            wanted: params.token_b_wanted_amount,
        },
    );
    Ok(key)
}
