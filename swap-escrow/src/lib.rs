//! Atomic Swap Escrow
//!
//! Escrow records and custody vaults for bilateral swaps between a native base
//! asset and fungible tokens. Trades either settle on one ledger (intra-chain
//! offers) or mirror a trade whose other leg lives on an external chain, in
//! which case a trusted relayer instantiates the local record.
//!
//! Every entry point on [`SwapProgram`] runs as a single atomic unit against the
//! shared record/vault state: either all transfers and record writes commit, or
//! none do.

pub mod address;
pub mod bank;
pub mod config;
pub mod error;
pub mod events;
pub mod instruction;
pub mod processor;
pub mod runtime;
pub mod state;
pub mod storage;
pub mod vault;

pub use solana_program::pubkey::Pubkey;

// Re-export commonly used types
pub use bank::Asset;
pub use config::{Config, ProgramSettings};
pub use error::SwapError;
pub use events::{HistoryEntry, OfferKind, TradeEvent, TradeStatus};
pub use instruction::SwapInstruction;
pub use processor::{SettlementReceipt, SwapProgram};
pub use state::{EscrowRecord, InterchainOffer, InterchainOriginSolOffer, Offer};

/// Basis-point denominator used for relay fees.
pub const BPS_DENOMINATOR: u64 = 10_000;

/// 20-byte EVM account address.
pub type EvmAddress = [u8; 20];
