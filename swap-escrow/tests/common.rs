#![allow(dead_code)]

use rand::Rng;
use solana_program::pubkey::Pubkey;

use swap_escrow::instruction::{
    FinalizeOriginEvmParams, FinalizeOriginSolParams, OfferParams, OriginEvmDepositParams,
    OriginSolDepositParams, RelayParams, TakeParams,
};
use swap_escrow::{
    Asset, Config, InterchainOffer, InterchainOriginSolOffer, Offer, ProgramSettings, SwapProgram,
};

// ============================================================================
// TEST CONSTANTS
// ============================================================================

pub const INITIAL_NATIVE: u64 = 100_000_000_000;
pub const INITIAL_TOKEN: u64 = 1_000_000_000_000;

pub const SELLER_EVM: [u8; 20] = [0x11; 20];
pub const BUYER_EVM: [u8; 20] = [0x22; 20];
pub const CHAIN_ID: u64 = 31337;

// ============================================================================
// TEST HARNESS HELPERS
// ============================================================================

/// Participants and assets shared by most tests.
pub struct TestEnv {
    pub program: SwapProgram,
    pub native_mint: Pubkey,
    pub mint_a: Pubkey,
    pub mint_b: Pubkey,
    pub admin: Pubkey,
    pub maker: Pubkey,
    pub taker: Pubkey,
    pub relayer: Pubkey,
    pub fee_collector: Pubkey,
}

impl TestEnv {
    pub fn settings(&self) -> &ProgramSettings {
        self.program.settings()
    }

    pub fn offer_rent(&self) -> u64 {
        self.settings().rent_for::<Offer>()
    }

    pub fn interchain_rent(&self) -> u64 {
        self.settings().rent_for::<InterchainOffer>()
    }

    pub fn origin_sol_rent(&self) -> u64 {
        self.settings().rent_for::<InterchainOriginSolOffer>()
    }

    pub async fn native(&self, account: &Pubkey) -> u64 {
        self.program.balance(account, Asset::Native).await
    }

    pub async fn token(&self, account: &Pubkey, mint: Pubkey) -> u64 {
        self.program.balance(account, Asset::Token(mint)).await
    }
}

/// Installs a test log subscriber once per test binary.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// Helper: Resolve settings with two registered token mints and one relayer
pub fn test_settings(
    mint_a: Pubkey,
    mint_b: Pubkey,
    relayer: Pubkey,
    fee: Option<(u64, Pubkey)>,
) -> ProgramSettings {
    let mut config = Config::default();
    config.assets.token_mints = vec![mint_a.to_string(), mint_b.to_string()];
    config.relay.relayers = vec![relayer.to_string()];
    if let Some((bps, collector)) = fee {
        config.relay.fee_bps = bps;
        config.relay.fee_collector = Some(collector.to_string());
    }
    config.resolve().unwrap()
}

/// Helper: Build a program and fund maker, taker and relayer with every asset
pub async fn setup_env_with_fee(fee_bps: Option<u64>) -> TestEnv {
    init_tracing();

    let mint_a = Pubkey::new_unique();
    let mint_b = Pubkey::new_unique();
    let relayer = Pubkey::new_unique();
    let fee_collector = Pubkey::new_unique();
    let fee = fee_bps.map(|bps| (bps, fee_collector));
    let settings = test_settings(mint_a, mint_b, relayer, fee);
    let native_mint = settings.native_mint;
    let admin = settings.admin;
    let program = SwapProgram::new(settings);

    let maker = Pubkey::new_unique();
    let taker = Pubkey::new_unique();
    for account in [maker, taker, relayer] {
        let balances = [
            (Asset::Native, INITIAL_NATIVE),
            (Asset::Token(mint_a), INITIAL_TOKEN),
            (Asset::Token(mint_b), INITIAL_TOKEN),
        ];
        for (asset, amount) in balances {
            program.fund(account, asset, amount).await.unwrap();
        }
    }

    TestEnv {
        program,
        native_mint,
        mint_a,
        mint_b,
        admin,
        maker,
        taker,
        relayer,
        fee_collector,
    }
}

pub async fn setup_env() -> TestEnv {
    setup_env_with_fee(None).await
}

/// Generate a random trade id
pub fn generate_trade_id() -> u64 {
    rand::thread_rng().gen()
}

// ============================================================================
// INSTRUCTION PARAM BUILDERS
// ============================================================================

pub fn offer_params(
    trade_id: u64,
    token_mint_a: Pubkey,
    token_mint_b: Pubkey,
    offered: u64,
    wanted: u64,
    is_taker_native: bool,
) -> OfferParams {
    OfferParams {
        trade_id,
        token_b_wanted_amount: wanted,
        token_a_offered_amount: offered,
        is_taker_native,
        token_mint_a,
        token_mint_b,
    }
}

pub fn take_params(
    maker: Pubkey,
    trade_id: u64,
    token_mint_a: Pubkey,
    token_mint_b: Pubkey,
) -> TakeParams {
    TakeParams {
        maker,
        trade_id,
        token_mint_a,
        token_mint_b,
    }
}

pub fn relay_params(
    trade_id: u64,
    external_seller_sol: Pubkey,
    token_mint_a: Pubkey,
    offered: u64,
    wanted: u64,
    is_taker_native: bool,
) -> RelayParams {
    RelayParams {
        trade_id,
        external_seller_evm: SELLER_EVM,
        external_seller_sol,
        token_a_offered_amount: offered,
        token_b_wanted_amount: wanted,
        is_taker_native,
        chain_id: CHAIN_ID,
        token_mint_a,
    }
}

pub fn origin_evm_deposit_params(
    relayer: Pubkey,
    trade_id: u64,
    amount: u64,
    token_mint_a: Pubkey,
) -> OriginEvmDepositParams {
    OriginEvmDepositParams {
        relayer,
        trade_id,
        amount,
        buyer_evm: BUYER_EVM,
        token_mint_a,
    }
}

pub fn finalize_origin_evm_params(
    trade_id: u64,
    token_mint_a: Pubkey,
) -> FinalizeOriginEvmParams {
    FinalizeOriginEvmParams { trade_id, token_mint_a }
}

pub fn origin_sol_deposit_params(
    trade_id: u64,
    token_mint_a: Pubkey,
    offered: u64,
    wanted: u64,
) -> OriginSolDepositParams {
    OriginSolDepositParams {
        trade_id,
        seller_evm: SELLER_EVM,
        token_a_offered_amount: offered,
        token_b_wanted_amount: wanted,
        is_taker_native: false,
        token_mint_a,
    }
}

pub fn finalize_origin_sol_params(
    seller: Pubkey,
    trade_id: u64,
    external_buyer_sol: Pubkey,
    token_mint_a: Pubkey,
) -> FinalizeOriginSolParams {
    FinalizeOriginSolParams {
        seller,
        trade_id,
        external_buyer_sol,
        token_mint_a,
    }
}
