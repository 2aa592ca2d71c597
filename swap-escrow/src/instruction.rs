//! Instruction definitions for the swap escrow program.
//!
//! Each variant maps one-to-one onto an entry point of
//! [`SwapProgram`](crate::processor::SwapProgram). The signer is passed
//! alongside the encoded instruction, not inside it.

use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::pubkey::Pubkey;

use crate::error::SwapError;
use crate::EvmAddress;

/// Parameters of an intra-chain deposit.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct OfferParams {
    pub trade_id: u64,
    pub token_b_wanted_amount: u64,
    pub token_a_offered_amount: u64,
    pub is_taker_native: bool,
    pub token_mint_a: Pubkey,
    pub token_mint_b: Pubkey,
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct TakeParams {
    pub maker: Pubkey,
    pub trade_id: u64,
    pub token_mint_a: Pubkey,
    pub token_mint_b: Pubkey,
}

/// Mirror of a trade observed on the external chain.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct RelayParams {
    pub trade_id: u64,
    pub external_seller_evm: EvmAddress,
    pub external_seller_sol: Pubkey,
    pub token_a_offered_amount: u64,
    pub token_b_wanted_amount: u64,
    pub is_taker_native: bool,
    pub chain_id: u64,
    /// Asset the local buyer will pay in
    pub token_mint_a: Pubkey,
}

/// Local buyer funding a relayed trade.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct OriginEvmDepositParams {
    /// Relayer whose record is being funded
    pub relayer: Pubkey,
    pub trade_id: u64,
    /// Must equal the record's wanted amount
    pub amount: u64,
    pub buyer_evm: EvmAddress,
    pub token_mint_a: Pubkey,
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct FinalizeOriginEvmParams {
    pub trade_id: u64,
    pub token_mint_a: Pubkey,
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct OriginSolDepositParams {
    pub trade_id: u64,
    pub seller_evm: EvmAddress,
    pub token_a_offered_amount: u64,
    pub token_b_wanted_amount: u64,
    pub is_taker_native: bool,
    pub token_mint_a: Pubkey,
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct FinalizeOriginSolParams {
    pub seller: Pubkey,
    pub trade_id: u64,
    /// External buyer's local receiving account
    pub external_buyer_sol: Pubkey,
    pub token_mint_a: Pubkey,
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub enum SwapInstruction {
    /// Maker escrows the native asset in exchange for token B (or native).
    DepositSellerNative(OfferParams),

    /// Maker escrows token A.
    DepositSellerSpl(OfferParams),

    /// Taker pays the wanted leg to the maker and receives the escrowed leg.
    TakeOffer(TakeParams),

    /// Authorized relayer mirrors an external-chain trade as an unfunded record.
    RelayOfferClone(RelayParams),

    /// Local buyer funds a relayed trade with the native asset.
    InterchainOriginEvmDepositSellerNative(OriginEvmDepositParams),

    /// Local buyer funds a relayed trade with a token.
    InterchainOriginEvmDepositSellerSpl(OriginEvmDepositParams),

    /// Relayer releases the buyer's deposit to the external seller's local account.
    FinalizeInterchainOriginEvmOffer(FinalizeOriginEvmParams),

    /// Local seller escrows the native asset for an external buyer.
    InterchainOriginSolDepositSellerNative(OriginSolDepositParams),

    /// Local seller escrows a token for an external buyer.
    InterchainOriginSolDepositSellerSpl(OriginSolDepositParams),

    /// Relayer releases the escrow to the external buyer's local account.
    FinalizeInterchainOriginSolOffer(FinalizeOriginSolParams),

    /// Admin only.
    AddRelayer { relayer: Pubkey },

    /// Admin only.
    RemoveRelayer { relayer: Pubkey },
}

impl SwapInstruction {
    pub fn pack(&self) -> Result<Vec<u8>, SwapError> {
        self.try_to_vec().map_err(|_| SwapError::InvalidInstructionData)
    }

    pub fn unpack(data: &[u8]) -> Result<Self, SwapError> {
        Self::try_from_slice(data).map_err(|_| SwapError::InvalidInstructionData)
    }

    /// Instruction name as logged by the processor.
    pub fn name(&self) -> &'static str {
        match self {
            SwapInstruction::DepositSellerNative(_) => "DepositSellerNative",
            SwapInstruction::DepositSellerSpl(_) => "DepositSellerSpl",
            SwapInstruction::TakeOffer(_) => "TakeOffer",
            SwapInstruction::RelayOfferClone(_) => "RelayOfferClone",
            SwapInstruction::InterchainOriginEvmDepositSellerNative(_) => {
                "InterchainOriginEvmDepositSellerNative"
            }
            SwapInstruction::InterchainOriginEvmDepositSellerSpl(_) => {
                "InterchainOriginEvmDepositSellerSpl"
            }
            SwapInstruction::FinalizeInterchainOriginEvmOffer(_) => {
                "FinalizeInterchainOriginEvmOffer"
            }
            SwapInstruction::InterchainOriginSolDepositSellerNative(_) => {
                "InterchainOriginSolDepositSellerNative"
            }
            SwapInstruction::InterchainOriginSolDepositSellerSpl(_) => {
                "InterchainOriginSolDepositSellerSpl"
            }
            SwapInstruction::FinalizeInterchainOriginSolOffer(_) => {
                "FinalizeInterchainOriginSolOffer"
            }
            SwapInstruction::AddRelayer { .. } => "AddRelayer",
            SwapInstruction::RemoveRelayer { .. } => "RemoveRelayer",
        }
    }
}
