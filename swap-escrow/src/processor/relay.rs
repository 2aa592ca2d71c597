//! Relay engine: relayer-authorized mirroring of external-chain trades, and
//! the admin-managed relayer registry.

use solana_program::pubkey::Pubkey;
use tracing::{info, warn};

use super::{leg_asset, SwapProgram};
use crate::address;
use crate::config::ProgramSettings;
use crate::error::SwapError;
use crate::events::{evm_hex, TradeEvent};
use crate::instruction::RelayParams;
use crate::runtime::Transaction;
use crate::state::InterchainOffer;

impl SwapProgram {
    /// Creates an unfunded [`InterchainOffer`] keyed by `(relayer, trade_id)`.
    ///
    /// The external-chain deposit is taken on the relayer's word; nothing about
    /// it is verified here. The only asset moved is the relayer's storage deposit.
    pub async fn relay_offer_clone(
        &self,
        relayer: Pubkey,
        params: RelayParams,
    ) -> Result<Pubkey, SwapError> {
        self.execute(|settings, tx| process_relay_offer_clone(settings, tx, relayer, params))
            .await
    }

    /// Authorizes `relayer`. Returns false if it was already authorized.
    pub async fn add_relayer(&self, admin: Pubkey, relayer: Pubkey) -> Result<bool, SwapError> {
        self.execute(|settings, tx| {
            require_admin(settings, &admin)?;
            let added = tx.set_relayer(relayer, true);
            info!("Relayer {} added: {}", relayer, added);
            Ok(added)
        })
        .await
    }

    /// Revokes `relayer`. Returns false if it was not authorized.
    pub async fn remove_relayer(&self, admin: Pubkey, relayer: Pubkey) -> Result<bool, SwapError> {
        self.execute(|settings, tx| {
            require_admin(settings, &admin)?;
            let removed = tx.set_relayer(relayer, false);
            info!("Relayer {} removed: {}", relayer, removed);
            Ok(removed)
        })
        .await
    }
}

fn require_admin(settings: &ProgramSettings, signer: &Pubkey) -> Result<(), SwapError> {
    if *signer != settings.admin {
        warn!("Rejected relayer registry change from non-admin {}", signer);
        return Err(SwapError::Unauthorized);
    }
    Ok(())
}

fn process_relay_offer_clone(
    settings: &ProgramSettings,
    tx: &mut Transaction<'_>,
    relayer: Pubkey,
    params: RelayParams,
) -> Result<Pubkey, SwapError> {
    if !tx.state().relayers.contains(&relayer) {
        warn!("Unauthorized relay attempt from {}", relayer);
        return Err(SwapError::Unauthorized);
    }
    if params.token_a_offered_amount == 0 || params.token_b_wanted_amount == 0 {
        return Err(SwapError::InvalidAmount);
    }
    // Asset the local buyer will pay in
    leg_asset(settings, params.is_taker_native, &params.token_mint_a)?;

    let key = address::interchain_offer_key(&settings.program_id, &relayer, params.trade_id);
    let offer = InterchainOffer::new(
        params.trade_id,
        relayer,
        params.external_seller_sol,
        params.external_seller_evm,
        params.token_mint_a,
        params.token_a_offered_amount,
        params.token_b_wanted_amount,
        params.is_taker_native,
        params.chain_id,
    );
    let rent = settings.rent_for::<InterchainOffer>();
    tx.create_record(key, &relayer, rent, &offer)?;

    info!(
        "Relayed offer {} from chain {} (seller {}): {} offered, {} wanted",
        params.trade_id,
        params.chain_id,
        evm_hex(&params.external_seller_evm),
        params.token_a_offered_amount,
        params.token_b_wanted_amount
    );
    tx.emit(
        key,
        TradeEvent::OfferRelayed {
            record: key.to_string(),
            trade_id: params.trade_id,
            relayer: relayer.to_string(),
            seller_evm: evm_hex(&params.external_seller_evm),
            chain_id: params.chain_id,
        },
    );
    Ok(key)
}
