//! Custody vaults
//!
//! Deposited assets are pooled: one native vault and one token vault per mint,
//! shared by every open trade. The pooled balance alone cannot tell which
//! trade owns what, so the [`VaultLedger`] records each trade's commitment
//! under its record key.

use std::collections::{HashMap, HashSet};

use solana_program::pubkey::Pubkey;

use crate::address;
use crate::bank::Asset;

/// Amount a single open trade holds in custody.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Commitment {
    pub asset: Asset,
    pub amount: u64,
}

/// Per-trade commitments against the pooled vaults, keyed by record key.
#[derive(Debug, Default)]
pub struct VaultLedger {
    commitments: HashMap<Pubkey, Commitment>,
}

impl VaultLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commitment(&self, record: &Pubkey) -> Option<Commitment> {
        self.commitments.get(record).copied()
    }

    /// Replaces the commitment of `record` and returns the previous one.
    pub(crate) fn set(
        &mut self,
        record: Pubkey,
        commitment: Option<Commitment>,
    ) -> Option<Commitment> {
        match commitment {
            Some(c) if c.amount > 0 => self.commitments.insert(record, c),
            _ => self.commitments.remove(&record),
        }
    }

    /// Sum of all open commitments in `asset`.
    pub fn committed_total(&self, asset: Asset) -> u128 {
        self.commitments
            .values()
            .filter(|c| c.asset == asset)
            .map(|c| u128::from(c.amount))
            .sum()
    }

    /// Assets with at least one open commitment.
    pub fn assets(&self) -> HashSet<Asset> {
        self.commitments.values().map(|c| c.asset).collect()
    }

    pub fn open_trades(&self) -> usize {
        self.commitments.len()
    }
}

/// Vault addresses of one deployment.
#[derive(Debug, Clone)]
pub struct Vaults {
    pub native: Pubkey,
    pub authority: Pubkey,
    program_id: Pubkey,
}

impl Vaults {
    pub fn new(program_id: Pubkey) -> Self {
        Self {
            native: address::native_vault(&program_id),
            authority: address::global_authority(&program_id),
            program_id,
        }
    }

    /// Vault account holding `asset`.
    pub fn address_for(&self, asset: Asset) -> Pubkey {
        match asset {
            Asset::Native => self.native,
            Asset::Token(mint) => address::token_vault(&self.program_id, &mint),
        }
    }
}
