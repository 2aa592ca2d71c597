//! Error types

use thiserror::Error;

use crate::storage::StoreError;

/// Errors surfaced synchronously by every entry point.
///
/// Nothing is retried internally; a failed entry point leaves no partial
/// transfer or record write behind.
#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum SwapError {
    #[error("A live record already exists at this key")]
    DuplicateKey,

    #[error("Record not found")]
    RecordNotFound,

    #[error("Swap is already completed")]
    AlreadyCompleted,

    #[error("Offer is already funded")]
    AlreadyFunded,

    #[error("Offer has not been funded yet")]
    NotFunded,

    #[error("Insufficient balance")]
    InsufficientBalance,

    #[error("Insufficient vault funds")]
    InsufficientVaultFunds,

    #[error("Supplied mint does not match the record")]
    MintMismatch,

    #[error("Mint is not part of the configured asset set")]
    InvalidMint,

    #[error("Invalid amount or zero amount not allowed")]
    InvalidAmount,

    #[error("Caller is not authorized for this operation")]
    Unauthorized,

    #[error("Maker and taker cannot be the same")]
    SelfTrade,

    #[error("Slot does not hold a record of the expected type")]
    InvalidRecord,

    #[error("Record could not be serialized into its slot")]
    Serialization,

    #[error("Invalid instruction data")]
    InvalidInstructionData,

    #[error("Arithmetic overflow")]
    ArithmeticOverflow,
}

impl From<StoreError> for SwapError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::DuplicateKey => SwapError::DuplicateKey,
            StoreError::NotFound => SwapError::RecordNotFound,
            StoreError::InvalidRecord => SwapError::InvalidRecord,
            StoreError::Serialization => SwapError::Serialization,
        }
    }
}
