//! Program state and atomic transactions.
//!
//! Every entry point mutates [`ProgramState`] only through a [`Transaction`].
//! Each mutation pushes an undo entry onto the journal; dropping a transaction
//! without committing replays the journal backwards, so an entry point that
//! fails part-way leaves no transfer or record write behind.

use std::collections::HashSet;

use solana_program::pubkey::Pubkey;
use tracing::{debug, warn};

use crate::bank::{Asset, Bank};
use crate::error::SwapError;
use crate::events::{TradeEvent, TradeHistory};
use crate::state::EscrowRecord;
use crate::storage::{encode, RecordStore, Slot};
use crate::vault::{Commitment, VaultLedger, Vaults};

// ============================================================================
// PROGRAM STATE
// ============================================================================

/// Everything an entry point can touch.
#[derive(Debug)]
pub struct ProgramState {
    pub records: RecordStore,
    pub bank: Bank,
    pub ledger: VaultLedger,
    pub vaults: Vaults,
    pub history: TradeHistory,
    pub relayers: HashSet<Pubkey>,
}

impl ProgramState {
    pub fn new(program_id: Pubkey, relayers: impl IntoIterator<Item = Pubkey>) -> Self {
        Self {
            records: RecordStore::new(),
            bank: Bank::new(),
            ledger: VaultLedger::new(),
            vaults: Vaults::new(program_id),
            history: TradeHistory::new(),
            relayers: relayers.into_iter().collect(),
        }
    }

    /// Raw balance of the vault holding `asset`.
    pub fn vault_balance(&self, asset: Asset) -> u64 {
        self.bank.balance(&self.vaults.address_for(asset), asset)
    }

    /// True when, for every asset with open commitments, the committed total
    /// does not exceed the vault's raw balance.
    pub fn is_solvent(&self) -> bool {
        self.ledger
            .assets()
            .into_iter()
            .all(|asset| {
                self.ledger.committed_total(asset) <= u128::from(self.vault_balance(asset))
            })
    }
}

// ============================================================================
// TRANSACTION
// ============================================================================

#[derive(Debug)]
enum Undo {
    Balance { owner: Pubkey, asset: Asset, previous: u64 },
    Slot { key: Pubkey, previous: Option<Slot> },
    Commitment { record: Pubkey, previous: Option<Commitment> },
    Relayer { relayer: Pubkey, was_present: bool },
}

/// All-or-nothing unit of work over [`ProgramState`].
///
/// Events emitted during the transaction are only appended to the history on
/// [`commit`](Transaction::commit).
pub struct Transaction<'a> {
    state: &'a mut ProgramState,
    journal: Vec<Undo>,
    pending: Vec<(Pubkey, TradeEvent)>,
}

impl<'a> Transaction<'a> {
    pub fn begin(state: &'a mut ProgramState) -> Self {
        Self {
            state,
            journal: Vec::new(),
            pending: Vec::new(),
        }
    }

    pub fn state(&self) -> &ProgramState {
        &*self.state
    }

    fn set_balance(&mut self, owner: Pubkey, asset: Asset, amount: u64) {
        let previous = self.state.bank.set_balance(owner, asset, amount);
        self.journal.push(Undo::Balance { owner, asset, previous });
    }

    pub fn debit(&mut self, owner: &Pubkey, asset: Asset, amount: u64) -> Result<(), SwapError> {
        let balance = self.state.bank.balance(owner, asset);
        let remaining = balance.checked_sub(amount).ok_or(SwapError::InsufficientBalance)?;
        self.set_balance(*owner, asset, remaining);
        Ok(())
    }

    pub fn credit(&mut self, owner: &Pubkey, asset: Asset, amount: u64) -> Result<(), SwapError> {
        let balance = self.state.bank.balance(owner, asset);
        let updated = balance.checked_add(amount).ok_or(SwapError::ArithmeticOverflow)?;
        self.set_balance(*owner, asset, updated);
        Ok(())
    }

    pub fn transfer(
        &mut self,
        from: &Pubkey,
        to: &Pubkey,
        asset: Asset,
        amount: u64,
    ) -> Result<(), SwapError> {
        self.debit(from, asset, amount)?;
        self.credit(to, asset, amount)?;
        debug!(%from, %to, %asset, amount, "Transfer");
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Records
    // ------------------------------------------------------------------------

    /// Creates a record at `key`. The storage deposit moves from `payer` into
    /// the record's own account until the record is closed.
    pub fn create_record<R: EscrowRecord>(
        &mut self,
        key: Pubkey,
        payer: &Pubkey,
        rent: u64,
        record: &R,
    ) -> Result<(), SwapError> {
        if self.state.records.contains(&key) {
            return Err(SwapError::DuplicateKey);
        }
        let data = encode(record)?;
        self.transfer(payer, &key, Asset::Native, rent)?;
        self.state.records.create(key, Slot { payer: *payer, rent, data })?;
        self.journal.push(Undo::Slot { key, previous: None });
        Ok(())
    }

    pub fn read_record<R: EscrowRecord>(&self, key: &Pubkey) -> Result<R, SwapError> {
        Ok(self.state.records.read(key)?)
    }

    pub fn write_record<R: EscrowRecord>(
        &mut self,
        key: &Pubkey,
        record: &R,
    ) -> Result<(), SwapError> {
        let previous = self.state.records.write(key, record)?;
        self.journal.push(Undo::Slot { key: *key, previous: Some(previous) });
        Ok(())
    }

    /// Destroys the record at `key` and returns its storage deposit to the
    /// account that paid it.
    pub fn close_record(&mut self, key: &Pubkey) -> Result<Slot, SwapError> {
        let slot = self.state.records.close(key)?;
        self.journal.push(Undo::Slot { key: *key, previous: Some(slot.clone()) });
        self.transfer(key, &slot.payer, Asset::Native, slot.rent)?;
        Ok(slot)
    }

    // ------------------------------------------------------------------------
    // Vaults
    // ------------------------------------------------------------------------

    /// Moves `amount` of `asset` from `from` into the pooled vault and commits
    /// it to `record`. A record can be funded only once.
    pub fn deposit_to_vault(
        &mut self,
        record: &Pubkey,
        from: &Pubkey,
        asset: Asset,
        amount: u64,
    ) -> Result<(), SwapError> {
        if self.state.ledger.commitment(record).is_some() {
            return Err(SwapError::AlreadyFunded);
        }
        let vault = self.state.vaults.address_for(asset);
        self.transfer(from, &vault, asset, amount)?;
        let previous = self.state.ledger.set(*record, Some(Commitment { asset, amount }));
        self.journal.push(Undo::Commitment { record: *record, previous });
        Ok(())
    }

    /// Releases `amount` of `record`'s commitment to `to`.
    ///
    /// Fails with `InsufficientVaultFunds` when the record's own commitment in
    /// `asset`, or the vault's raw balance, is below `amount`.
    pub fn release_from_vault(
        &mut self,
        record: &Pubkey,
        asset: Asset,
        amount: u64,
        to: &Pubkey,
    ) -> Result<(), SwapError> {
        let commitment = self
            .state
            .ledger
            .commitment(record)
            .filter(|c| c.asset == asset && c.amount >= amount)
            .ok_or(SwapError::InsufficientVaultFunds)?;
        if self.state.vault_balance(asset) < amount {
            return Err(SwapError::InsufficientVaultFunds);
        }
        let vault = self.state.vaults.address_for(asset);
        self.transfer(&vault, to, asset, amount)?;
        let remaining = Commitment { amount: commitment.amount - amount, ..commitment };
        let previous = self.state.ledger.set(*record, Some(remaining));
        self.journal.push(Undo::Commitment { record: *record, previous });
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Relayer registry
    // ------------------------------------------------------------------------

    /// Adds or removes `relayer`. Returns whether the registry changed.
    pub fn set_relayer(&mut self, relayer: Pubkey, authorized: bool) -> bool {
        let was_present = self.state.relayers.contains(&relayer);
        if was_present == authorized {
            return false;
        }
        if authorized {
            self.state.relayers.insert(relayer);
        } else {
            self.state.relayers.remove(&relayer);
        }
        self.journal.push(Undo::Relayer { relayer, was_present });
        true
    }

    /// Queues an event for the history. Dropped if the transaction rolls back.
    pub fn emit(&mut self, key: Pubkey, event: TradeEvent) {
        self.pending.push((key, event));
    }

    /// Makes every change permanent and publishes queued events.
    pub fn commit(mut self) {
        self.journal.clear();
        for (key, event) in std::mem::take(&mut self.pending) {
            self.state.history.record(key, event);
        }
    }

    fn rollback(&mut self) {
        while let Some(undo) = self.journal.pop() {
            match undo {
                Undo::Balance { owner, asset, previous } => {
                    self.state.bank.set_balance(owner, asset, previous);
                }
                Undo::Slot { key, previous } => self.state.records.restore(key, previous),
                Undo::Commitment { record, previous } => {
                    self.state.ledger.set(record, previous);
                }
                Undo::Relayer { relayer, was_present } => {
                    if was_present {
                        self.state.relayers.insert(relayer);
                    } else {
                        self.state.relayers.remove(&relayer);
                    }
                }
            }
        }
    }
}

impl Drop for Transaction<'_> {
    fn drop(&mut self) {
        if !self.journal.is_empty() {
            warn!("Rolling back {} uncommitted change(s)", self.journal.len());
            self.rollback();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Offer;

    fn sample_offer(maker: Pubkey) -> Offer {
        let (mint_a, mint_b) = (Pubkey::new_unique(), Pubkey::new_unique());
        Offer::new(1, maker, mint_a, mint_b, 10, 20, true, false)
    }

    fn funded_state(owner: &Pubkey, amount: u64) -> ProgramState {
        let mut state = ProgramState::new(Pubkey::new_unique(), []);
        let mut tx = Transaction::begin(&mut state);
        tx.credit(owner, Asset::Native, amount).unwrap();
        tx.commit();
        state
    }

    #[test]
    fn test_drop_rolls_back() {
        let owner = Pubkey::new_unique();
        let mut state = funded_state(&owner, 1_000);
        let key = Pubkey::new_unique();

        {
            let mut tx = Transaction::begin(&mut state);
            let offer = sample_offer(owner);
            tx.create_record(key, &owner, 100, &offer).unwrap();
            tx.deposit_to_vault(&key, &owner, Asset::Native, 500).unwrap();
            tx.emit(key, TradeEvent::OfferFunded {
                record: key.to_string(),
                trade_id: 1,
                buyer: owner.to_string(),
                amount: 500,
            });
        }

        assert_eq!(state.bank.balance(&owner, Asset::Native), 1_000);
        assert_eq!(state.vault_balance(Asset::Native), 0);
        assert!(!state.records.contains(&key));
        assert_eq!(state.ledger.commitment(&key), None);
        assert!(state.history.entries().is_empty());
    }

    #[test]
    fn test_release_limited_to_own_commitment() {
        let owner = Pubkey::new_unique();
        let mut state = funded_state(&owner, 1_000);
        let first = Pubkey::new_unique();
        let second = Pubkey::new_unique();

        let mut tx = Transaction::begin(&mut state);
        tx.deposit_to_vault(&first, &owner, Asset::Native, 300).unwrap();
        tx.deposit_to_vault(&second, &owner, Asset::Native, 400).unwrap();

        // Pool holds 700 but the first trade only committed 300
        assert_eq!(
            tx.release_from_vault(&first, Asset::Native, 400, &owner),
            Err(SwapError::InsufficientVaultFunds)
        );
        tx.release_from_vault(&first, Asset::Native, 300, &owner).unwrap();
        tx.commit();

        assert_eq!(state.ledger.commitment(&first), None);
        assert_eq!(state.vault_balance(Asset::Native), 400);
        assert!(state.is_solvent());
    }

    #[test]
    fn test_second_deposit_rejected() {
        let owner = Pubkey::new_unique();
        let mut state = funded_state(&owner, 1_000);
        let record = Pubkey::new_unique();

        let mut tx = Transaction::begin(&mut state);
        tx.deposit_to_vault(&record, &owner, Asset::Native, 10).unwrap();
        assert_eq!(
            tx.deposit_to_vault(&record, &owner, Asset::Native, 10),
            Err(SwapError::AlreadyFunded)
        );
    }

    #[test]
    fn test_close_refunds_payer() {
        let owner = Pubkey::new_unique();
        let mut state = funded_state(&owner, 1_000);
        let key = Pubkey::new_unique();
        let offer = sample_offer(owner);

        let mut tx = Transaction::begin(&mut state);
        tx.create_record(key, &owner, 250, &offer).unwrap();
        assert_eq!(tx.state().bank.balance(&owner, Asset::Native), 750);
        let slot = tx.close_record(&key).unwrap();
        tx.commit();

        assert_eq!(slot.rent, 250);
        assert_eq!(state.bank.balance(&owner, Asset::Native), 1_000);
        assert_eq!(state.bank.balance(&key, Asset::Native), 0);
    }
}
