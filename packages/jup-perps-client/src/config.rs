use std::path::PathBuf;

use anchor_client::solana_sdk::{
    commitment_config::CommitmentConfig,
    signature::{read_keypair_file, Keypair},
};
use anchor_lang::prelude::Pubkey;
use clap::{Args, Parser, Subcommand, ValueEnum};
use jup_perp_itf::{custodies, mints, Side, PRICE_DECIMALS};

use crate::{
    compute_budget::ComputeBudgetParams,
    errors::{PerpsError, PerpsResult},
    instructions::{DecreaseRequest, IncreaseRequest, PositionKey},
};

pub const DEFAULT_RPC_URL: &str = "https://api.mainnet-beta.solana.com";
pub const DEFAULT_KEYPAIR_PATH: &str = "~/.config/solana/id.json";

#[derive(Debug, Parser)]
#[command(name = "jup-perps", version, about = "Jupiter Perpetuals market requests")]
pub struct Cli {
    #[arg(long, env = "RPC_URL", default_value = DEFAULT_RPC_URL, global = true)]
    pub rpc_url: String,

    /// Path of the signing keypair, solana json format
    #[arg(long, env = "KEYPAIR_PATH", default_value = DEFAULT_KEYPAIR_PATH, global = true)]
    pub keypair: String,

    #[arg(long, env = "PRIORITY_FEE_MICRO_LAMPORTS", default_value_t = 0, global = true)]
    pub priority_fee: u64,

    /// Extra compute units above the simulated consumption, in bps
    #[arg(long, env = "COMPUTE_MARGIN_BPS", default_value_t = 0, global = true)]
    pub compute_margin_bps: u16,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Open a position, then request to close it
    Demo {
        #[command(flatten)]
        open: OpenArgs,

        /// Worst acceptable close price, in usd
        #[arg(long)]
        close_price_slippage: f64,

        /// Mint to receive the proceeds in, defaults to the collateral mint
        #[arg(long)]
        desired_mint: Option<Pubkey>,
    },
    /// Request a position increase
    Open(OpenArgs),
    /// Request to close an entire position
    Close(CloseArgs),
    /// Show the position address and its state
    Position(MarketArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Market {
    Sol,
    Eth,
    Btc,
}

impl Market {
    pub fn custody(&self) -> Pubkey {
        match self {
            Market::Sol => custodies::SOL,
            Market::Eth => custodies::ETH,
            Market::Btc => custodies::BTC,
        }
    }

    pub fn mint(&self) -> Pubkey {
        match self {
            Market::Sol => mints::WSOL,
            Market::Eth => mints::ETH,
            Market::Btc => mints::WBTC,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TradeSide {
    Long,
    Short,
}

impl From<TradeSide> for Side {
    fn from(side: TradeSide) -> Self {
        match side {
            TradeSide::Long => Side::Long,
            TradeSide::Short => Side::Short,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Stable {
    Usdc,
    Usdt,
}

impl Stable {
    pub fn custody(&self) -> Pubkey {
        match self {
            Stable::Usdc => custodies::USDC,
            Stable::Usdt => custodies::USDT,
        }
    }

    pub fn mint(&self) -> Pubkey {
        match self {
            Stable::Usdc => mints::USDC,
            Stable::Usdt => mints::USDT,
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct MarketArgs {
    #[arg(long, value_enum, default_value_t = Market::Sol)]
    pub market: Market,

    #[arg(long, value_enum, default_value_t = TradeSide::Long)]
    pub side: TradeSide,

    /// Collateral of short positions
    #[arg(long, value_enum, default_value_t = Stable::Usdc)]
    pub short_collateral: Stable,
}

impl MarketArgs {
    /// Longs are collateralized by the traded asset, shorts by a stable
    pub fn collateral_custody(&self) -> Pubkey {
        match self.side {
            TradeSide::Long => self.market.custody(),
            TradeSide::Short => self.short_collateral.custody(),
        }
    }

    pub fn collateral_mint(&self) -> Pubkey {
        match self.side {
            TradeSide::Long => self.market.mint(),
            TradeSide::Short => self.short_collateral.mint(),
        }
    }

    pub fn position_key(&self, owner: Pubkey) -> PositionKey {
        PositionKey {
            owner,
            custody: self.market.custody(),
            collateral_custody: self.collateral_custody(),
            side: self.side.into(),
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct OpenArgs {
    #[command(flatten)]
    pub market: MarketArgs,

    /// Notional size to add, in usd
    #[arg(long)]
    pub size_usd: f64,

    /// Collateral to deposit, in native units of the input mint
    #[arg(long)]
    pub collateral: u64,

    /// Mint the collateral is paid with, defaults to the collateral mint
    #[arg(long)]
    pub input_mint: Option<Pubkey>,

    /// Worst acceptable entry price, in usd
    #[arg(long)]
    pub price_slippage: f64,

    /// Required when the input mint has to be swapped into the collateral mint
    #[arg(long)]
    pub jupiter_minimum_out: Option<u64>,
}

impl OpenArgs {
    pub fn increase_request(&self, owner: Pubkey) -> PerpsResult<IncreaseRequest> {
        let input_mint = self
            .input_mint
            .unwrap_or_else(|| self.market.collateral_mint());
        if input_mint != self.market.collateral_mint() && self.jupiter_minimum_out.is_none() {
            return Err(PerpsError::InvalidArgument(format!(
                "input mint {input_mint} differs from the collateral mint, \
                 --jupiter-minimum-out is required"
            )));
        }
        if self.collateral == 0 {
            return Err(PerpsError::InvalidArgument(
                "collateral must be positive".to_string(),
            ));
        }
        Ok(IncreaseRequest {
            position: self.market.position_key(owner),
            input_mint,
            size_usd_delta: usd_to_native(self.size_usd)?,
            collateral_token_delta: self.collateral,
            price_slippage: usd_to_native(self.price_slippage)?,
            jupiter_minimum_out: self.jupiter_minimum_out,
        })
    }
}

#[derive(Debug, Clone, Args)]
pub struct CloseArgs {
    #[command(flatten)]
    pub market: MarketArgs,

    /// Worst acceptable close price, in usd
    #[arg(long)]
    pub price_slippage: f64,

    /// Mint to receive the proceeds in, defaults to the collateral mint
    #[arg(long)]
    pub desired_mint: Option<Pubkey>,
}

impl CloseArgs {
    pub fn decrease_request(&self, owner: Pubkey) -> PerpsResult<DecreaseRequest> {
        Ok(DecreaseRequest {
            position: self.market.position_key(owner),
            desired_mint: self
                .desired_mint
                .unwrap_or_else(|| self.market.collateral_mint()),
            price_slippage: usd_to_native(self.price_slippage)?,
        })
    }
}

/// Settings shared by every command
#[derive(Debug, Clone)]
pub struct Config {
    pub rpc_url: String,
    pub keypair_path: PathBuf,
    pub commitment: CommitmentConfig,
    pub compute_budget: ComputeBudgetParams,
}

impl Config {
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            rpc_url: cli.rpc_url.clone(),
            keypair_path: expand_home(&cli.keypair),
            commitment: CommitmentConfig::confirmed(),
            compute_budget: ComputeBudgetParams::new(cli.compute_margin_bps, cli.priority_fee),
        }
    }

    pub fn load_keypair(&self) -> PerpsResult<Keypair> {
        read_keypair_file(&self.keypair_path).map_err(|err| PerpsError::Keypair {
            path: self.keypair_path.display().to_string(),
            reason: err.to_string(),
        })
    }
}

fn expand_home(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), std::env::var_os("HOME")) {
        (Some(rest), Some(home)) => PathBuf::from(home).join(rest),
        _ => PathBuf::from(path),
    }
}

/// Usd amount scaled by `PRICE_DECIMALS`
pub fn usd_to_native(usd: f64) -> PerpsResult<u64> {
    if !usd.is_finite() || usd < 0.0 {
        return Err(PerpsError::InvalidArgument(format!(
            "{usd} is not a valid usd amount"
        )));
    }
    let scaled = (usd * 10f64.powi(i32::from(PRICE_DECIMALS))).round();
    if scaled > u64::MAX as f64 {
        return Err(PerpsError::InvalidArgument(format!("{usd} usd is too large")));
    }
    Ok(scaled as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usd_amounts_are_scaled_to_price_decimals() {
        assert_eq!(usd_to_native(10.0).unwrap(), 10_000_000);
        assert_eq!(usd_to_native(143.25).unwrap(), 143_250_000);
        assert_eq!(usd_to_native(0.0000004).unwrap(), 0);
        assert!(usd_to_native(-1.0).is_err());
        assert!(usd_to_native(f64::NAN).is_err());
        assert!(usd_to_native(f64::INFINITY).is_err());
    }

    #[test]
    fn long_and_short_collateral() {
        let long = MarketArgs {
            market: Market::Eth,
            side: TradeSide::Long,
            short_collateral: Stable::Usdc,
        };
        assert_eq!(long.collateral_custody(), custodies::ETH);
        assert_eq!(long.collateral_mint(), mints::ETH);

        let short = MarketArgs {
            side: TradeSide::Short,
            short_collateral: Stable::Usdt,
            ..long
        };
        let key = short.position_key(Pubkey::new_unique());
        assert_eq!(key.custody, custodies::ETH);
        assert_eq!(key.collateral_custody, custodies::USDT);
        assert_eq!(key.side, Side::Short);
    }

    #[test]
    fn parses_open_command() {
        let cli = Cli::try_parse_from([
            "jup-perps",
            "--rpc-url",
            "http://localhost:8899",
            "open",
            "--size-usd",
            "10",
            "--collateral",
            "100000000",
            "--price-slippage",
            "250.5",
        ])
        .unwrap();
        assert_eq!(cli.rpc_url, "http://localhost:8899");

        let Command::Open(open) = cli.command else {
            panic!("expected the open command");
        };
        let owner = Pubkey::new_unique();
        let request = open.increase_request(owner).unwrap();
        assert_eq!(request.input_mint, mints::WSOL);
        assert_eq!(request.size_usd_delta, 10_000_000);
        assert_eq!(request.price_slippage, 250_500_000);
        assert_eq!(request.position.owner, owner);
        assert_eq!(request.position.side, Side::Long);
    }

    #[test]
    fn swapped_input_requires_minimum_out() {
        let open = OpenArgs {
            market: MarketArgs {
                market: Market::Sol,
                side: TradeSide::Long,
                short_collateral: Stable::Usdc,
            },
            size_usd: 10.0,
            collateral: 5_000_000,
            input_mint: Some(mints::USDC),
            price_slippage: 200.0,
            jupiter_minimum_out: None,
        };
        assert!(matches!(
            open.increase_request(Pubkey::new_unique()),
            Err(PerpsError::InvalidArgument(_))
        ));

        let open = OpenArgs {
            jupiter_minimum_out: Some(20_000_000),
            ..open
        };
        assert!(open.increase_request(Pubkey::new_unique()).is_ok());
    }

    #[test]
    fn close_defaults_to_collateral_mint() {
        let close = CloseArgs {
            market: MarketArgs {
                market: Market::Btc,
                side: TradeSide::Short,
                short_collateral: Stable::Usdc,
            },
            price_slippage: 70_000.0,
            desired_mint: None,
        };
        let request = close.decrease_request(Pubkey::new_unique()).unwrap();
        assert_eq!(request.desired_mint, mints::USDC);
        assert_eq!(request.price_slippage, 70_000_000_000);
    }

    #[test]
    fn keypair_path_expands_home() {
        let expanded = expand_home("/tmp/id.json");
        assert_eq!(expanded, PathBuf::from("/tmp/id.json"));
        if let Some(home) = std::env::var_os("HOME") {
            assert_eq!(
                expand_home("~/.config/solana/id.json"),
                PathBuf::from(home).join(".config/solana/id.json")
            );
        }
    }

    #[test]
    fn missing_keypair_is_reported() {
        let config = Config {
            rpc_url: DEFAULT_RPC_URL.to_string(),
            keypair_path: PathBuf::from("/nonexistent/id.json"),
            commitment: CommitmentConfig::confirmed(),
            compute_budget: ComputeBudgetParams::default(),
        };
        assert!(matches!(
            config.load_keypair(),
            Err(PerpsError::Keypair { .. })
        ));
    }
}
