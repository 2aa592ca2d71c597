//! Escrow record definitions
//!
//! Each record is borsh-encoded into a fixed-size slot. The first field is an
//! 8-byte discriminator, checked on every read so a slot is never decoded as
//! the wrong record type.

use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::pubkey::Pubkey;

use crate::EvmAddress;

/// A record type stored in the escrow record store.
pub trait EscrowRecord: BorshSerialize + BorshDeserialize {
    const DISCRIMINATOR: [u8; 8];
    /// Slot size in bytes, discriminator included. Sized for the largest encoding.
    const LEN: usize;
}

/// Intra-chain offer: the maker escrows token A and wants token B from any taker.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct Offer {
    /// Discriminator for record type
    pub discriminator: [u8; 8],
    /// Trade id, unique per maker
    pub id: u64,
    /// Maker who escrowed the offered asset
    pub maker: Pubkey,
    /// Mint of the offered asset (native mint when `is_native`)
    pub token_mint_a: Pubkey,
    /// Mint of the wanted asset (native mint when `is_taker_native`)
    pub token_mint_b: Pubkey,
    pub token_a_offered_amount: u64,
    pub token_b_wanted_amount: u64,
    /// Maker escrowed the native asset
    pub is_native: bool,
    /// Taker pays in the native asset
    pub is_taker_native: bool,
    pub is_swap_completed: bool,
}

impl EscrowRecord for Offer {
    const DISCRIMINATOR: [u8; 8] = *b"OFFER\0\0\0";
    const LEN: usize = 8 + 8 + 32 + 32 + 32 + 8 + 8 + 1 + 1 + 1; // 131 bytes
}

impl Offer {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: u64,
        maker: Pubkey,
        token_mint_a: Pubkey,
        token_mint_b: Pubkey,
        token_a_offered_amount: u64,
        token_b_wanted_amount: u64,
        is_native: bool,
        is_taker_native: bool,
    ) -> Self {
        Self {
            discriminator: Self::DISCRIMINATOR,
            id,
            maker,
            token_mint_a,
            token_mint_b,
            token_a_offered_amount,
            token_b_wanted_amount,
            is_native,
            is_taker_native,
            is_swap_completed: false,
        }
    }
}

/// Relayed trade whose seller leg originates on the external chain.
///
/// The seller's asset never touches this ledger. A local buyer funds the vault
/// with `token_b_wanted_amount` of `token_mint_a`, and on finalize that deposit
/// is released to the seller's local receiving account.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct InterchainOffer {
    /// Discriminator for record type
    pub discriminator: [u8; 8],
    /// Trade id, same as on the external chain
    pub trade_id: u64,
    /// Relayer that mirrored the trade and paid for the slot
    pub relayer: Pubkey,
    /// Seller's local address where the buyer's payment is released
    pub external_seller_sol: Pubkey,
    /// Seller's address on the external chain
    pub external_seller_evm: EvmAddress,
    /// Local buyer, bound on deposit
    pub buyer_sol: Option<Pubkey>,
    /// Buyer's external-chain address, bound on deposit
    pub buyer_evm: Option<EvmAddress>,
    /// Mint of the asset the local buyer pays
    pub token_mint_a: Pubkey,
    /// Amount the seller delivers on the external chain
    pub token_a_offered_amount: u64,
    /// Amount the local buyer escrows here
    pub token_b_wanted_amount: u64,
    pub is_native: bool,
    pub is_taker_native: bool,
    /// External chain id
    pub chain_id: u64,
    pub is_swap_completed: bool,
    pub is_seller_origin_sol: bool,
    /// Fee withheld on finalize
    pub fee_collected: u64,
}

impl EscrowRecord for InterchainOffer {
    const DISCRIMINATOR: [u8; 8] = *b"ICOFFER\0";
    // 222 bytes: options are sized for the bound (Some) case
    const LEN: usize = 8 + 8 + 32 + 32 + 20 + 33 + 21 + 32 + 8 + 8 + 1 + 1 + 8 + 1 + 1 + 8;
}

impl InterchainOffer {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        trade_id: u64,
        relayer: Pubkey,
        external_seller_sol: Pubkey,
        external_seller_evm: EvmAddress,
        token_mint_a: Pubkey,
        token_a_offered_amount: u64,
        token_b_wanted_amount: u64,
        is_taker_native: bool,
        chain_id: u64,
    ) -> Self {
        Self {
            discriminator: Self::DISCRIMINATOR,
            trade_id,
            relayer,
            external_seller_sol,
            external_seller_evm,
            buyer_sol: None,
            buyer_evm: None,
            token_mint_a,
            token_a_offered_amount,
            token_b_wanted_amount,
            is_native: false,
            is_taker_native,
            chain_id,
            is_swap_completed: false,
            is_seller_origin_sol: false,
            fee_collected: 0,
        }
    }

    pub fn is_funded(&self) -> bool {
        self.buyer_sol.is_some()
    }
}

/// Trade whose seller deposits locally; settlement pays an external buyer's
/// local receiving account.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct InterchainOriginSolOffer {
    /// Discriminator for record type
    pub discriminator: [u8; 8],
    pub trade_id: u64,
    /// Seller who escrowed the offered asset
    pub seller_sol: Pubkey,
    /// Seller's address on the external chain, where the buyer pays
    pub seller_evm: EvmAddress,
    /// Mint of the offered asset (native mint when `is_native`)
    pub token_mint_a: Pubkey,
    pub token_a_offered_amount: u64,
    /// Amount the buyer pays on the external chain
    pub token_b_wanted_amount: u64,
    pub is_native: bool,
    pub is_taker_native: bool,
    pub is_swap_completed: bool,
}

impl EscrowRecord for InterchainOriginSolOffer {
    const DISCRIMINATOR: [u8; 8] = *b"ICSOLOFR";
    const LEN: usize = 8 + 8 + 32 + 20 + 32 + 8 + 8 + 1 + 1 + 1; // 119 bytes
}

impl InterchainOriginSolOffer {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        trade_id: u64,
        seller_sol: Pubkey,
        seller_evm: EvmAddress,
        token_mint_a: Pubkey,
        token_a_offered_amount: u64,
        token_b_wanted_amount: u64,
        is_native: bool,
        is_taker_native: bool,
    ) -> Self {
        Self {
            discriminator: Self::DISCRIMINATOR,
            trade_id,
            seller_sol,
            seller_evm,
            token_mint_a,
            token_a_offered_amount,
            token_b_wanted_amount,
            is_native,
            is_taker_native,
            is_swap_completed: false,
        }
    }
}
