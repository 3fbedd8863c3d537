use anchor_lang::prelude::*;

#[account]
#[derive(Default, Debug)]
pub struct Position {
    pub owner: Pubkey,
    pub pool: Pubkey,
    pub custody: Pubkey,
    pub collateral_custody: Pubkey,
    pub open_time: i64,
    pub update_time: i64,
    pub side: Side,
    /// Entry price scaled by `PRICE_DECIMALS`
    pub price: u64,
    /// Position size in usd scaled by `PRICE_DECIMALS`
    pub size_usd: u64,
    pub collateral_usd: u64,
    pub realised_pnl_usd: i64,
    pub cumulative_interest_snapshot: u128,
    pub locked_amount: u64,
    pub bump: u8,
}

impl Position {
    /// A position account outlives its size: it stays on chain with a zero size once closed
    pub fn is_open(&self) -> bool {
        self.size_usd > 0
    }
}

/// Pending request left for the keepers, deleted once executed
#[account]
#[derive(Default, Debug)]
pub struct PositionRequest {
    pub owner: Pubkey,
    pub pool: Pubkey,
    pub custody: Pubkey,
    pub position: Pubkey,
    pub mint: Pubkey,
    pub open_time: i64,
    pub update_time: i64,
    pub size_usd_delta: u64,
    pub collateral_delta: u64,
    pub request_change: RequestChange,
    pub request_type: RequestType,
    pub side: Side,
    pub price_slippage: Option<u64>,
    pub jupiter_minimum_out: Option<u64>,
    pub pre_swap_amount: Option<u64>,
    pub trigger_price: Option<u64>,
    pub trigger_above_threshold: Option<bool>,
    pub entire_position: Option<bool>,
    pub executed: bool,
    pub counter: u64,
    pub bump: u8,
    pub referral: Option<Pubkey>,
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Side {
    #[default]
    None,
    Long,
    Short,
}

impl Side {
    /// Byte used in the position PDA seeds, `None` never owns a position
    pub fn seed(&self) -> Option<u8> {
        match self {
            Side::None => None,
            Side::Long => Some(1),
            Side::Short => Some(2),
        }
    }
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum RequestChange {
    #[default]
    None,
    Increase,
    Decrease,
}

impl RequestChange {
    pub fn seed(&self) -> Option<u8> {
        match self {
            RequestChange::None => None,
            RequestChange::Increase => Some(1),
            RequestChange::Decrease => Some(2),
        }
    }
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RequestType {
    #[default]
    Market,
    Trigger,
}
