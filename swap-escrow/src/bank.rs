//! Balances of the native asset and fungible tokens held by ledger accounts.

use std::collections::HashMap;
use std::fmt;

use solana_program::pubkey::Pubkey;

/// An asset a balance can be held in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Asset {
    /// The ledger's base unit of value
    Native,
    /// A fungible token identified by its mint
    Token(Pubkey),
}

impl Asset {
    /// Picks the asset of one trade leg from its native flag and configured mint.
    pub fn for_leg(is_native: bool, mint: Pubkey) -> Self {
        if is_native {
            Asset::Native
        } else {
            Asset::Token(mint)
        }
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Asset::Native => write!(f, "native"),
            Asset::Token(mint) => write!(f, "token:{}", mint),
        }
    }
}

/// Raw balances keyed by `(owner, asset)`.
///
/// Zero balances are not stored. Mutation goes through
/// [`Transaction`](crate::runtime::Transaction) so every change is journaled.
#[derive(Debug, Default)]
pub struct Bank {
    balances: HashMap<(Pubkey, Asset), u64>,
}

impl Bank {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn balance(&self, owner: &Pubkey, asset: Asset) -> u64 {
        self.balances.get(&(*owner, asset)).copied().unwrap_or(0)
    }

    /// Overwrites a balance and returns the previous value.
    pub(crate) fn set_balance(&mut self, owner: Pubkey, asset: Asset, amount: u64) -> u64 {
        let previous = if amount == 0 {
            self.balances.remove(&(owner, asset))
        } else {
            self.balances.insert((owner, asset), amount)
        };
        previous.unwrap_or(0)
    }

    /// Sum of every balance held in `asset`.
    pub fn supply(&self, asset: Asset) -> u128 {
        self.balances
            .iter()
            .filter(|((_, held), _)| *held == asset)
            .map(|(_, amount)| u128::from(*amount))
            .sum()
    }
}
