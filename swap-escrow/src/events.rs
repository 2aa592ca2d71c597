//! Trade events and the append-only trade history.
//!
//! Events are emitted through `tracing` as they commit and appended to the
//! history, which outlives the records themselves: a closed trade leaves no
//! slot behind, but its history entries remain.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use solana_program::pubkey::Pubkey;
use tracing::info;

/// Record kind an event refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OfferKind {
    Offer,
    InterchainOffer,
    InterchainOriginSolOffer,
}

/// Trade lifecycle event. Addresses are rendered as base58 (local) or
/// 0x-prefixed hex (external chain).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TradeEvent {
    TradeCreated {
        kind: OfferKind,
        record: String,
        trade_id: u64,
        initiator: String,
        asset: String,
        offered: u64,
        wanted: u64,
    },
    OfferRelayed {
        record: String,
        trade_id: u64,
        relayer: String,
        seller_evm: String,
        chain_id: u64,
    },
    OfferFunded {
        record: String,
        trade_id: u64,
        buyer: String,
        amount: u64,
    },
    SwapCompleted {
        kind: OfferKind,
        record: String,
        trade_id: u64,
        recipient: String,
        released: u64,
        fee_collected: u64,
    },
}

impl TradeEvent {
    pub fn record(&self) -> &str {
        match self {
            TradeEvent::TradeCreated { record, .. }
            | TradeEvent::OfferRelayed { record, .. }
            | TradeEvent::OfferFunded { record, .. }
            | TradeEvent::SwapCompleted { record, .. } => record,
        }
    }
}

/// A committed event with its position in the history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub sequence: u64,
    pub recorded_at: DateTime<Utc>,
    pub event: TradeEvent,
}

/// Observable status of a record key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeStatus {
    /// Never seen by this deployment
    Unknown,
    /// A live record occupies the key
    Open,
    /// The trade settled and its record was destroyed
    Closed,
}

/// Append-only audit log of committed events.
#[derive(Debug, Default)]
pub struct TradeHistory {
    entries: Vec<HistoryEntry>,
    closed: HashSet<Pubkey>,
}

impl TradeHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record(&mut self, key: Pubkey, event: TradeEvent) {
        if matches!(event, TradeEvent::SwapCompleted { .. }) {
            self.closed.insert(key);
        }
        emit(&event);
        let entry = HistoryEntry {
            sequence: self.entries.len() as u64,
            recorded_at: Utc::now(),
            event,
        };
        self.entries.push(entry);
    }

    /// Whether a trade at `key` has settled. Keys can be reused after close.
    pub fn is_closed(&self, key: &Pubkey) -> bool {
        self.closed.contains(key)
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    /// Entries touching one record key.
    pub fn for_record(&self, key: &Pubkey) -> Vec<HistoryEntry> {
        let key = key.to_string();
        self.entries
            .iter()
            .filter(|entry| entry.event.record() == key)
            .cloned()
            .collect()
    }

    pub fn export_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.entries)
    }
}

/// Logs a committed event.
pub fn emit(event: &TradeEvent) {
    match event {
        TradeEvent::TradeCreated {
            kind,
            record,
            trade_id,
            initiator,
            asset,
            offered,
            wanted,
        } => info!(
            "Event: TradeCreated kind={:?} record={} trade_id={} initiator={} asset={} \
             offered={} wanted={}",
            kind, record, trade_id, initiator, asset, offered, wanted
        ),
        TradeEvent::OfferRelayed {
            record,
            trade_id,
            relayer,
            seller_evm,
            chain_id,
        } => info!(
            "Event: OfferRelayed record={} trade_id={} relayer={} seller_evm={} chain_id={}",
            record, trade_id, relayer, seller_evm, chain_id
        ),
        TradeEvent::OfferFunded {
            record,
            trade_id,
            buyer,
            amount,
        } => info!(
            "Event: OfferFunded record={} trade_id={} buyer={} amount={}",
            record, trade_id, buyer, amount
        ),
        TradeEvent::SwapCompleted {
            kind,
            record,
            trade_id,
            recipient,
            released,
            fee_collected,
        } => info!(
            "Event: SwapCompleted kind={:?} record={} trade_id={} recipient={} released={} \
             fee_collected={}",
            kind, record, trade_id, recipient, released, fee_collected
        ),
    }
}

/// Formats an external-chain address for events.
pub fn evm_hex(address: &[u8; 20]) -> String {
    format!("0x{}", hex::encode(address))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn completed(record: &Pubkey) -> TradeEvent {
        TradeEvent::SwapCompleted {
            kind: OfferKind::Offer,
            record: record.to_string(),
            trade_id: 1,
            recipient: Pubkey::new_unique().to_string(),
            released: 10,
            fee_collected: 0,
        }
    }

    #[test]
    fn test_completion_marks_closed() {
        let mut history = TradeHistory::new();
        let key = Pubkey::new_unique();

        history.record(key, completed(&key));

        assert!(history.is_closed(&key));
        assert_eq!(history.entries()[0].sequence, 0);
        assert_eq!(history.for_record(&key).len(), 1);
    }

    #[test]
    fn test_export_json_tags_events() {
        let mut history = TradeHistory::new();
        let key = Pubkey::new_unique();
        history.record(key, completed(&key));

        let json = history.export_json().unwrap();
        assert!(json.contains("\"type\": \"swap_completed\""));
        assert!(json.contains("\"kind\": \"offer\""));
    }

    #[test]
    fn test_evm_hex() {
        assert_eq!(evm_hex(&[0xab; 20]), format!("0x{}", "ab".repeat(20)));
    }
}
