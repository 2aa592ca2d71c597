//! Deterministic key derivation for escrow records and custody vaults.
//!
//! Record keys are program-derived addresses over
//! `[namespace, initiator, trade_id.to_le_bytes()]`, so the same logical trade
//! always maps to the same slot and no secondary index is needed.

use solana_program::pubkey::Pubkey;

/// Seeds for PDA derivation
pub mod seeds {
    pub const OFFER_SEED: &[u8] = b"offer";
    pub const INTERCHAIN_OFFER_SEED: &[u8] = b"interchain-offer";
    pub const INTERCHAIN_ORIGIN_SOL_OFFER_SEED: &[u8] = b"interchain-origin-sol-offer";
    pub const VAULT_NATIVE_SEED: &[u8] = b"vault-native";
    pub const GLOBAL_AUTHORITY_SEED: &[u8] = b"global-authority";
}

/// Derives the record key for `(namespace, initiator, trade_id)`.
pub fn record_key(
    program_id: &Pubkey,
    namespace: &[u8],
    initiator: &Pubkey,
    trade_id: u64,
) -> Pubkey {
    let (key, _bump) = Pubkey::find_program_address(
        &[namespace, initiator.as_ref(), &trade_id.to_le_bytes()],
        program_id,
    );
    key
}

/// Key of an intra-chain [`Offer`](crate::state::Offer), scoped to its maker.
pub fn offer_key(program_id: &Pubkey, maker: &Pubkey, trade_id: u64) -> Pubkey {
    record_key(program_id, seeds::OFFER_SEED, maker, trade_id)
}

/// Key of a relayed [`InterchainOffer`](crate::state::InterchainOffer).
///
/// Relayed records key off the relayer, not the eventual local buyer.
pub fn interchain_offer_key(program_id: &Pubkey, relayer: &Pubkey, trade_id: u64) -> Pubkey {
    record_key(program_id, seeds::INTERCHAIN_OFFER_SEED, relayer, trade_id)
}

/// Key of an [`InterchainOriginSolOffer`](crate::state::InterchainOriginSolOffer), scoped to
/// its seller.
pub fn interchain_origin_sol_offer_key(
    program_id: &Pubkey,
    seller: &Pubkey,
    trade_id: u64,
) -> Pubkey {
    record_key(
        program_id,
        seeds::INTERCHAIN_ORIGIN_SOL_OFFER_SEED,
        seller,
        trade_id,
    )
}

/// The single native-asset vault of a deployment.
pub fn native_vault(program_id: &Pubkey) -> Pubkey {
    Pubkey::find_program_address(&[seeds::VAULT_NATIVE_SEED], program_id).0
}

/// Program-controlled authority owning every token vault.
pub fn global_authority(program_id: &Pubkey) -> Pubkey {
    Pubkey::find_program_address(&[seeds::GLOBAL_AUTHORITY_SEED], program_id).0
}

/// Associated holding account for `mint` under the global authority.
pub fn token_vault(program_id: &Pubkey, mint: &Pubkey) -> Pubkey {
    let authority = global_authority(program_id);
    Pubkey::find_program_address(&[authority.as_ref(), mint.as_ref()], program_id).0
}
