#![allow(clippy::result_large_err)]

pub mod states;
pub mod utils;

use anchor_lang::prelude::*;
use anchor_spl::{
    associated_token::AssociatedToken,
    token::{Mint, Token},
};
use solana_program::pubkey;
pub use states::*;

declare_id!("PERPHjGBqRHArX4DySjwM6UJHiR3sWAatqfdBS2qQJu");

pub const PERPETUAL_ACC: Pubkey = pubkey!("H4ND9aYttUVLFmNypZqLjZ52FYiGvdEB45GmwNoKEjTj");

/// JLP pool, the only pool of the program
pub const JLP_POOL: Pubkey = pubkey!("5BUwFW4nRbftYTDMbgxykoFWqWHPzahFSNAaaaJtVKsq");

pub const PRICE_DECIMALS: u8 = 6;

pub mod custodies {
    use super::*;

    pub const SOL: Pubkey = pubkey!("7xS2gz2bTp3fwCC7knJvUWTEU9Tycczu6VhJYKgi1wdz");
    pub const ETH: Pubkey = pubkey!("AQCGyheWPLeo6Qp9WpYS9m3Qj479t7R636N9ey1rEjEn");
    pub const BTC: Pubkey = pubkey!("5Pv3gM9JrFFH883SWAhvJC9RPYmo8UNxuFtv5bMMALkm");
    pub const USDC: Pubkey = pubkey!("G18jKKXQwBbrHeiK3C9MRXhkHsLHf7XgCSisykV46EZa");
    pub const USDT: Pubkey = pubkey!("4vkNeXiYEUizLdrpdPS1eC2mccyM4NUPRtERrk6ZETkk");
}

pub mod mints {
    use super::*;

    pub const WSOL: Pubkey = pubkey!("So11111111111111111111111111111111111111112");
    pub const ETH: Pubkey = pubkey!("7vfCXTUXx5WJV5JADk17DUJ4ksgau7utNKj4b963voxs");
    pub const WBTC: Pubkey = pubkey!("3NZ9JMVBmGAqocybic2c7LQCJScmgsAZ6vQqTDzcqmJh");
    pub const USDC: Pubkey = pubkey!("EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v");
    pub const USDT: Pubkey = pubkey!("Es9vMFrzaCERmJfrF4H2FYD4KCoNkY11McCe8BenwNYB");
}

#[program]
pub mod perpetuals {
    use super::*;

    #[allow(unused_variables)]
    pub fn create_increase_position_market_request(
        ctx: Context<CreateIncreasePositionMarketRequest>,
        params: CreateIncreasePositionMarketRequestParams,
    ) -> Result<()> {
        // We only need the interface, not the actual implementation here.
        unimplemented!("jup-perp-itf is just an interface")
    }

    #[allow(unused_variables)]
    pub fn create_decrease_position_market_request(
        ctx: Context<CreateDecreasePositionMarketRequest>,
        params: CreateDecreasePositionMarketRequestParams,
    ) -> Result<()> {
        unimplemented!("jup-perp-itf is just an interface")
    }
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct CreateIncreasePositionMarketRequestParams {
    /// Notional increase in usd scaled by `PRICE_DECIMALS`
    pub size_usd_delta: u64,
    /// Collateral deposited, in native units of the input mint
    pub collateral_token_delta: u64,
    pub side: Side,
    /// Worst acceptable execution price, scaled by `PRICE_DECIMALS`
    pub price_slippage: u64,
    pub jupiter_minimum_out: Option<u64>,
    pub counter: u64,
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct CreateDecreasePositionMarketRequestParams {
    pub collateral_usd_delta: u64,
    pub size_usd_delta: u64,
    pub price_slippage: u64,
    pub jupiter_minimum_out: Option<u64>,
    pub entire_position: Option<bool>,
    pub counter: u64,
}

#[derive(Accounts)]
pub struct CreateIncreasePositionMarketRequest<'info> {
    #[account(mut)]
    pub owner: Signer<'info>,

    /// CHECK: don't care this is just an interface
    #[account(mut)]
    pub funding_account: AccountInfo<'info>,

    // H4ND9aYttUVLFmNypZqLjZ52FYiGvdEB45GmwNoKEjTj
    /// CHECK: don't care this is just an interface
    #[account()]
    pub perpetuals: AccountInfo<'info>,

    /// CHECK: don't care this is just an interface
    #[account()]
    pub pool: AccountInfo<'info>,

    /// CHECK: created by the program on first increase
    #[account(mut)]
    pub position: AccountInfo<'info>,

    /// CHECK: created by this instruction
    #[account(mut)]
    pub position_request: AccountInfo<'info>,

    /// CHECK: escrow ata of the position request
    #[account(mut)]
    pub position_request_ata: AccountInfo<'info>,

    /// CHECK: don't care this is just an interface
    #[account()]
    pub custody: AccountInfo<'info>,

    /// CHECK: don't care this is just an interface
    #[account()]
    pub collateral_custody: AccountInfo<'info>,

    pub input_mint: Account<'info, Mint>,

    /// CHECK: don't care this is just an interface
    pub referral: Option<UncheckedAccount<'info>>,

    pub token_program: Program<'info, Token>,
    pub associated_token_program: Program<'info, AssociatedToken>,
    pub system_program: Program<'info, System>,

    /// CHECK: anchor event authority of the program
    #[account()]
    pub event_authority: AccountInfo<'info>,

    /// CHECK: the perpetuals program itself
    #[account()]
    pub program: AccountInfo<'info>,
}

#[derive(Accounts)]
pub struct CreateDecreasePositionMarketRequest<'info> {
    #[account(mut)]
    pub owner: Signer<'info>,

    /// CHECK: don't care this is just an interface
    #[account(mut)]
    pub receiving_account: AccountInfo<'info>,

    /// CHECK: don't care this is just an interface
    #[account()]
    pub perpetuals: AccountInfo<'info>,

    /// CHECK: don't care this is just an interface
    #[account()]
    pub pool: AccountInfo<'info>,

    /// CHECK: don't care this is just an interface
    #[account()]
    pub position: AccountInfo<'info>,

    /// CHECK: created by this instruction
    #[account(mut)]
    pub position_request: AccountInfo<'info>,

    /// CHECK: escrow ata of the position request
    #[account(mut)]
    pub position_request_ata: AccountInfo<'info>,

    /// CHECK: don't care this is just an interface
    #[account()]
    pub custody: AccountInfo<'info>,

    /// CHECK: don't care this is just an interface
    #[account()]
    pub collateral_custody: AccountInfo<'info>,

    pub desired_mint: Account<'info, Mint>,

    /// CHECK: don't care this is just an interface
    pub referral: Option<UncheckedAccount<'info>>,

    pub token_program: Program<'info, Token>,
    pub associated_token_program: Program<'info, AssociatedToken>,
    pub system_program: Program<'info, System>,

    /// CHECK: anchor event authority of the program
    #[account()]
    pub event_authority: AccountInfo<'info>,

    /// CHECK: the perpetuals program itself
    #[account()]
    pub program: AccountInfo<'info>,
}
