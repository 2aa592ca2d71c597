//! Instruction processing
//!
//! [`SwapProgram`] is the handle every caller shares. Each entry point takes
//! the program lock, runs its handler inside a [`Transaction`], and commits
//! only if the handler succeeds.

mod deposit;
mod relay;
mod settle;

use std::sync::Arc;

use serde::Serialize;
use solana_program::pubkey::Pubkey;
use tokio::sync::Mutex;
use tracing::info;

use crate::address;
use crate::bank::Asset;
use crate::config::{Config, ProgramSettings};
use crate::error::SwapError;
use crate::events::{HistoryEntry, TradeStatus};
use crate::instruction::SwapInstruction;
use crate::runtime::{ProgramState, Transaction};
use crate::state::{InterchainOffer, InterchainOriginSolOffer, Offer};

/// Outcome of a successful settlement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SettlementReceipt {
    /// Key of the record that was closed
    #[serde(serialize_with = "serialize_pubkey")]
    pub record: Pubkey,
    /// Account the escrowed asset was released to
    #[serde(serialize_with = "serialize_pubkey")]
    pub recipient: Pubkey,
    /// Amount released to `recipient`
    pub released: u64,
    /// Amount withheld for the fee collector
    pub fee_collected: u64,
}

fn serialize_pubkey<S: serde::Serializer>(key: &Pubkey, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&key.to_string())
}

/// Shared handle to one deployed swap program.
#[derive(Clone)]
pub struct SwapProgram {
    settings: Arc<ProgramSettings>,
    state: Arc<Mutex<ProgramState>>,
}

impl SwapProgram {
    pub fn new(settings: ProgramSettings) -> Self {
        let state = ProgramState::new(settings.program_id, settings.relayers.iter().copied());
        info!(
            "Swap program {} initialized with {} relayer(s), fee {} bps",
            settings.program_id,
            settings.relayers.len(),
            settings.fee_bps
        );
        Self {
            settings: Arc::new(settings),
            state: Arc::new(Mutex::new(state)),
        }
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        Ok(Self::new(config.resolve()?))
    }

    pub fn settings(&self) -> &ProgramSettings {
        &self.settings
    }

    pub fn program_id(&self) -> Pubkey {
        self.settings.program_id
    }

    /// Runs `handler` as one atomic unit under the program lock.
    async fn execute<T, F>(&self, handler: F) -> Result<T, SwapError>
    where
        F: FnOnce(&ProgramSettings, &mut Transaction<'_>) -> Result<T, SwapError>,
    {
        let mut state = self.state.lock().await;
        let mut tx = Transaction::begin(&mut state);
        let output = handler(&self.settings, &mut tx)?;
        tx.commit();
        Ok(output)
    }

    /// Decodes and dispatches one instruction signed by `signer`.
    pub async fn process_instruction(&self, signer: Pubkey, data: &[u8]) -> Result<(), SwapError> {
        let instruction = SwapInstruction::unpack(data)?;
        info!("Instruction: {}", instruction.name());

        match instruction {
            SwapInstruction::DepositSellerNative(params) => {
                self.deposit_seller_native(signer, params).await.map(|_| ())
            }
            SwapInstruction::DepositSellerSpl(params) => {
                self.deposit_seller_spl(signer, params).await.map(|_| ())
            }
            SwapInstruction::TakeOffer(params) => {
                self.take_offer(signer, params).await.map(|_| ())
            }
            SwapInstruction::RelayOfferClone(params) => {
                self.relay_offer_clone(signer, params).await.map(|_| ())
            }
            SwapInstruction::InterchainOriginEvmDepositSellerNative(params) => self
                .interchain_origin_evm_deposit_seller_native(signer, params)
                .await
                .map(|_| ()),
            SwapInstruction::InterchainOriginEvmDepositSellerSpl(params) => self
                .interchain_origin_evm_deposit_seller_spl(signer, params)
                .await
                .map(|_| ()),
            SwapInstruction::FinalizeInterchainOriginEvmOffer(params) => self
                .finalize_interchain_origin_evm_offer(signer, params)
                .await
                .map(|_| ()),
            SwapInstruction::InterchainOriginSolDepositSellerNative(params) => self
                .interchain_origin_sol_deposit_seller_native(signer, params)
                .await
                .map(|_| ()),
            SwapInstruction::InterchainOriginSolDepositSellerSpl(params) => self
                .interchain_origin_sol_deposit_seller_spl(signer, params)
                .await
                .map(|_| ()),
            SwapInstruction::FinalizeInterchainOriginSolOffer(params) => self
                .finalize_interchain_origin_sol_offer(signer, params)
                .await
                .map(|_| ()),
            SwapInstruction::AddRelayer { relayer } => {
                self.add_relayer(signer, relayer).await.map(|_| ())
            }
            SwapInstruction::RemoveRelayer { relayer } => {
                self.remove_relayer(signer, relayer).await.map(|_| ())
            }
        }
    }

    /// Credits `owner` with `amount` of `asset`. Used by faucets and fixtures.
    pub async fn fund(&self, owner: Pubkey, asset: Asset, amount: u64) -> Result<(), SwapError> {
        self.execute(|_, tx| tx.credit(&owner, asset, amount)).await
    }

    // ========================================================================
    // READS
    // ========================================================================

    pub fn offer_key(&self, maker: &Pubkey, trade_id: u64) -> Pubkey {
        address::offer_key(&self.settings.program_id, maker, trade_id)
    }

    pub fn interchain_offer_key(&self, relayer: &Pubkey, trade_id: u64) -> Pubkey {
        address::interchain_offer_key(&self.settings.program_id, relayer, trade_id)
    }

    pub fn interchain_origin_sol_offer_key(&self, seller: &Pubkey, trade_id: u64) -> Pubkey {
        address::interchain_origin_sol_offer_key(&self.settings.program_id, seller, trade_id)
    }

    pub async fn offer(&self, maker: &Pubkey, trade_id: u64) -> Result<Offer, SwapError> {
        let key = self.offer_key(maker, trade_id);
        Ok(self.state.lock().await.records.read(&key)?)
    }

    pub async fn interchain_offer(
        &self,
        relayer: &Pubkey,
        trade_id: u64,
    ) -> Result<InterchainOffer, SwapError> {
        let key = self.interchain_offer_key(relayer, trade_id);
        Ok(self.state.lock().await.records.read(&key)?)
    }

    pub async fn interchain_origin_sol_offer(
        &self,
        seller: &Pubkey,
        trade_id: u64,
    ) -> Result<InterchainOriginSolOffer, SwapError> {
        let key = self.interchain_origin_sol_offer_key(seller, trade_id);
        Ok(self.state.lock().await.records.read(&key)?)
    }

    pub async fn balance(&self, owner: &Pubkey, asset: Asset) -> u64 {
        self.state.lock().await.bank.balance(owner, asset)
    }

    /// Total held in `asset` across every account, vaults and record keys included.
    pub async fn supply(&self, asset: Asset) -> u128 {
        self.state.lock().await.bank.supply(asset)
    }

    pub async fn vault_balance(&self, asset: Asset) -> u64 {
        self.state.lock().await.vault_balance(asset)
    }

    /// Amount still held in custody for the record at `key`.
    pub async fn committed(&self, key: &Pubkey) -> u64 {
        self.state
            .lock()
            .await
            .ledger
            .commitment(key)
            .map(|c| c.amount)
            .unwrap_or(0)
    }

    /// Total committed across open trades in `asset`.
    pub async fn committed_total(&self, asset: Asset) -> u128 {
        self.state.lock().await.ledger.committed_total(asset)
    }

    pub async fn trade_status(&self, key: &Pubkey) -> TradeStatus {
        let state = self.state.lock().await;
        if state.records.contains(key) {
            TradeStatus::Open
        } else if state.history.is_closed(key) {
            TradeStatus::Closed
        } else {
            TradeStatus::Unknown
        }
    }

    pub async fn history(&self) -> Vec<HistoryEntry> {
        self.state.lock().await.history.entries().to_vec()
    }

    pub async fn export_history(&self) -> serde_json::Result<String> {
        self.state.lock().await.history.export_json()
    }

    pub async fn is_relayer(&self, account: &Pubkey) -> bool {
        self.state.lock().await.relayers.contains(account)
    }

    /// Committed total per asset never exceeds the vault's raw balance.
    pub async fn is_solvent(&self) -> bool {
        self.state.lock().await.is_solvent()
    }

    pub async fn open_records(&self) -> usize {
        self.state.lock().await.records.len()
    }
}

/// Resolves the asset of one trade leg, checking its mint against the
/// configured asset set.
///
/// Native legs must name the native mint; token legs must name a registered
/// mint other than the native one.
pub(crate) fn leg_asset(
    settings: &ProgramSettings,
    is_native: bool,
    mint: &Pubkey,
) -> Result<Asset, SwapError> {
    if is_native {
        if *mint != settings.native_mint {
            return Err(SwapError::InvalidMint);
        }
        return Ok(Asset::Native);
    }
    if *mint == settings.native_mint || !settings.is_registered_mint(mint) {
        return Err(SwapError::InvalidMint);
    }
    Ok(Asset::Token(*mint))
}

/// Splits a release of `amount` into the recipient's share and the fee.
pub(crate) fn split_fee(settings: &ProgramSettings, amount: u64) -> (u64, u64) {
    let fee = settings.fee_for(amount);
    (amount - fee, fee)
}
