//! Storage Module
//!
//! Keyed, fixed-size slots holding escrow records. A slot also remembers who
//! paid its storage deposit so closing it can return the deposit.

use std::collections::HashMap;

use solana_program::pubkey::Pubkey;
use thiserror::Error;
use tracing::debug;

use crate::state::EscrowRecord;

/// Storage error type
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum StoreError {
    #[error("A live record already exists at this key")]
    DuplicateKey,
    #[error("Record not found")]
    NotFound,
    #[error("Slot holds a different record type")]
    InvalidRecord,
    #[error("Record does not fit its slot")]
    Serialization,
}

pub type StoreResult<T> = Result<T, StoreError>;

/// One occupied slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot {
    /// Account that paid the storage deposit
    pub payer: Pubkey,
    /// Storage deposit held while the slot is live
    pub rent: u64,
    /// Encoded record, exactly `R::LEN` bytes
    pub data: Vec<u8>,
}

/// Encodes `record` into a zero-padded buffer of `R::LEN` bytes.
pub fn encode<R: EscrowRecord>(record: &R) -> StoreResult<Vec<u8>> {
    let mut data = record.try_to_vec().map_err(|_| StoreError::Serialization)?;
    if data.len() > R::LEN {
        return Err(StoreError::Serialization);
    }
    data.resize(R::LEN, 0);
    Ok(data)
}

/// Decodes a slot's bytes after checking the discriminator.
pub fn decode<R: EscrowRecord>(data: &[u8]) -> StoreResult<R> {
    if data.get(..R::DISCRIMINATOR.len()) != Some(&R::DISCRIMINATOR[..]) {
        return Err(StoreError::InvalidRecord);
    }
    let mut cursor = data;
    R::deserialize(&mut cursor).map_err(|_| StoreError::InvalidRecord)
}

/// In-memory record store.
///
/// Uses HashMap for O(1) lookup by derived key. Not synchronized on its own;
/// it lives inside [`ProgramState`](crate::runtime::ProgramState), which is
/// only reached through the program lock.
#[derive(Debug, Default)]
pub struct RecordStore {
    slots: HashMap<Pubkey, Slot>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &Pubkey) -> bool {
        self.slots.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn slot(&self, key: &Pubkey) -> Option<&Slot> {
        self.slots.get(key)
    }

    /// Reads and decodes the record at `key`.
    pub fn read<R: EscrowRecord>(&self, key: &Pubkey) -> StoreResult<R> {
        let slot = self.slots.get(key).ok_or(StoreError::NotFound)?;
        decode(&slot.data)
    }

    /// Occupies `key`. Fails with `DuplicateKey` if a live record is there.
    pub fn create(&mut self, key: Pubkey, slot: Slot) -> StoreResult<()> {
        if self.slots.contains_key(&key) {
            return Err(StoreError::DuplicateKey);
        }
        debug!(%key, payer = %slot.payer, rent = slot.rent, "Slot created");
        self.slots.insert(key, slot);
        Ok(())
    }

    /// Rewrites the record at `key` in place and returns the previous slot.
    pub fn write<R: EscrowRecord>(&mut self, key: &Pubkey, record: &R) -> StoreResult<Slot> {
        let data = encode(record)?;
        let slot = self.slots.get_mut(key).ok_or(StoreError::NotFound)?;
        decode::<R>(&slot.data)?;
        let previous = slot.clone();
        slot.data = data;
        Ok(previous)
    }

    /// Removes the slot at `key` and hands it back so its deposit can be refunded.
    pub fn close(&mut self, key: &Pubkey) -> StoreResult<Slot> {
        let slot = self.slots.remove(key).ok_or(StoreError::NotFound)?;
        debug!(%key, payer = %slot.payer, rent = slot.rent, "Slot closed");
        Ok(slot)
    }

    /// Puts a slot back to a journaled value.
    pub(crate) fn restore(&mut self, key: Pubkey, previous: Option<Slot>) {
        match previous {
            Some(slot) => {
                self.slots.insert(key, slot);
            }
            None => {
                self.slots.remove(&key);
            }
        }
    }
}
