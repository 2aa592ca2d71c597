//! Configuration Management Module
//!
//! Loads the deployment settings of a swap program: program and admin
//! addresses, the relayer registry, registered token mints, relay fees, and
//! storage deposit pricing.

use std::collections::HashSet;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use solana_program::pubkey::Pubkey;

use crate::state::EscrowRecord;
use crate::BPS_DENOMINATOR;

/// Mint address standing in for the native asset.
pub const NATIVE_MINT: &str = "So11111111111111111111111111111111111111112";

const DEFAULT_PROGRAM_ID: &str = "Gy3NkwcvDi8CseKtAew9fVT64fQjGxR3NPQcPGRsXbJX";
const DEFAULT_ADMIN: &str = "2FK5HanikJVGuJmQBi11Az49ipafQr8iX6SvppZM539F";

// ============================================================================
// CONFIGURATION STRUCTURES
// ============================================================================

/// Main configuration structure as read from TOML.
///
/// Addresses are base58 strings; [`Config::resolve`] parses and checks them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Program identity and administration
    pub program: ProgramConfig,
    /// Relayer registry and relay fees
    #[serde(default)]
    pub relay: RelayConfig,
    /// Registered fungible tokens
    #[serde(default)]
    pub assets: AssetsConfig,
    /// Storage deposit pricing
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgramConfig {
    /// Program id all record and vault keys are derived under
    pub program_id: String,
    /// Account allowed to add and remove relayers
    pub admin: String,
    /// Mint that identifies the native asset
    #[serde(default = "default_native_mint")]
    pub native_mint: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Relayers authorized at startup
    #[serde(default)]
    pub relayers: Vec<String>,
    /// Fee withheld on inter-chain finalize, in basis points
    #[serde(default)]
    pub fee_bps: u64,
    /// Recipient of withheld fees. Required when `fee_bps > 0`.
    #[serde(default)]
    pub fee_collector: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssetsConfig {
    /// Token mints accepted on token legs
    #[serde(default)]
    pub token_mints: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Storage deposit charged per byte of slot
    #[serde(default = "default_lamports_per_byte")]
    pub lamports_per_byte: u64,
    /// Bytes charged on top of the record itself
    #[serde(default = "default_slot_overhead")]
    pub slot_overhead: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            lamports_per_byte: default_lamports_per_byte(),
            slot_overhead: default_slot_overhead(),
        }
    }
}

fn default_native_mint() -> String {
    NATIVE_MINT.to_string()
}

fn default_lamports_per_byte() -> u64 {
    6960
}

fn default_slot_overhead() -> u64 {
    128
}

// ============================================================================
// CONFIGURATION LOADING AND MANAGEMENT
// ============================================================================

impl Config {
    /// Loads configuration from the TOML file.
    ///
    /// Reads `SWAP_CONFIG_PATH` if set, otherwise `config/swap.toml`. A missing
    /// file is an error that points at the template.
    pub fn load() -> anyhow::Result<Self> {
        // Check for custom config path via environment variable (for tests)
        let config_path = std::env::var("SWAP_CONFIG_PATH")
            .unwrap_or_else(|_| "config/swap.toml".to_string());

        if std::path::Path::new(&config_path).exists() {
            let content = std::fs::read_to_string(&config_path)?;
            Self::from_toml_str(&content)
        } else {
            Err(anyhow::anyhow!(
                "Configuration file '{}' not found. Please copy the template:\n\
                cp config/swap.template.toml config/swap.toml\n\
                Then edit config/swap.toml with your actual values.",
                config_path
            ))
        }
    }

    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Parses addresses and checks fee settings.
    pub fn resolve(&self) -> anyhow::Result<ProgramSettings> {
        let program_id = parse_pubkey("program.program_id", &self.program.program_id)?;
        let admin = parse_pubkey("program.admin", &self.program.admin)?;
        let native_mint = parse_pubkey("program.native_mint", &self.program.native_mint)?;

        let relayers = self
            .relay
            .relayers
            .iter()
            .map(|r| parse_pubkey("relay.relayers", r))
            .collect::<anyhow::Result<Vec<_>>>()?;

        let token_mints = self
            .assets
            .token_mints
            .iter()
            .map(|m| parse_pubkey("assets.token_mints", m))
            .collect::<anyhow::Result<HashSet<_>>>()?;
        if token_mints.contains(&native_mint) {
            anyhow::bail!("assets.token_mints must not contain the native mint {}", native_mint);
        }

        if self.relay.fee_bps > BPS_DENOMINATOR {
            anyhow::bail!(
                "relay.fee_bps must be at most {}, got {}",
                BPS_DENOMINATOR,
                self.relay.fee_bps
            );
        }
        let fee_collector = self
            .relay
            .fee_collector
            .as_deref()
            .map(|c| parse_pubkey("relay.fee_collector", c))
            .transpose()?;
        if self.relay.fee_bps > 0 && fee_collector.is_none() {
            anyhow::bail!("relay.fee_collector is required when relay.fee_bps is non-zero");
        }

        Ok(ProgramSettings {
            program_id,
            admin,
            native_mint,
            relayers,
            token_mints,
            fee_bps: self.relay.fee_bps,
            fee_collector,
            lamports_per_byte: self.storage.lamports_per_byte,
            slot_overhead: self.storage.slot_overhead,
        })
    }
}

impl Default for Config {
    /// Local development configuration: default program id and admin, no
    /// relayers, no registered tokens, no fees.
    fn default() -> Self {
        Self {
            program: ProgramConfig {
                program_id: DEFAULT_PROGRAM_ID.to_string(),
                admin: DEFAULT_ADMIN.to_string(),
                native_mint: default_native_mint(),
            },
            relay: RelayConfig::default(),
            assets: AssetsConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}

fn parse_pubkey(field: &str, value: &str) -> anyhow::Result<Pubkey> {
    Pubkey::from_str(value).map_err(|e| anyhow::anyhow!("Invalid {} '{}': {}", field, value, e))
}

// ============================================================================
// RESOLVED SETTINGS
// ============================================================================

/// Parsed, validated settings shared by every entry point.
#[derive(Debug, Clone)]
pub struct ProgramSettings {
    pub program_id: Pubkey,
    pub admin: Pubkey,
    pub native_mint: Pubkey,
    pub relayers: Vec<Pubkey>,
    pub token_mints: HashSet<Pubkey>,
    pub fee_bps: u64,
    pub fee_collector: Option<Pubkey>,
    pub lamports_per_byte: u64,
    pub slot_overhead: u64,
}

impl ProgramSettings {
    /// Storage deposit for a slot holding `R`.
    pub fn rent_for<R: EscrowRecord>(&self) -> u64 {
        self.slot_overhead
            .saturating_add(R::LEN as u64)
            .saturating_mul(self.lamports_per_byte)
    }

    /// Fee withheld from an inter-chain release of `amount`.
    pub fn fee_for(&self, amount: u64) -> u64 {
        if self.fee_collector.is_none() {
            return 0;
        }
        let fee = u128::from(amount) * u128::from(self.fee_bps) / u128::from(BPS_DENOMINATOR);
        fee as u64
    }

    pub fn is_registered_mint(&self, mint: &Pubkey) -> bool {
        self.token_mints.contains(mint)
    }
}
