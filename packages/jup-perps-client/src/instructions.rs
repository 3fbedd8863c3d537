use std::rc::Rc;

use anchor_client::{
    solana_sdk::{
        commitment_config::CommitmentConfig, instruction::Instruction, signature::Keypair,
        system_instruction, system_program,
    },
    Client, Cluster, Program,
};
use anchor_lang::prelude::Pubkey;
use anchor_spl::{
    associated_token::{self, get_associated_token_address},
    token::spl_token,
};
use jup_perp_itf::{
    accounts::{CreateDecreasePositionMarketRequest, CreateIncreasePositionMarketRequest},
    instruction,
    mints,
    utils::{get_event_authority_pk, get_position_pk},
    CreateDecreasePositionMarketRequestParams, CreateIncreasePositionMarketRequestParams,
    RequestChange, Side, JLP_POOL, PERPETUAL_ACC,
};
use spl_associated_token_account::instruction::create_associated_token_account_idempotent;
use tracing::debug;

use crate::{counter::RequestCounter, errors::PerpsResult};

pub type PerpsProgram = Program<Rc<Keypair>>;

pub fn get_program(
    cluster: Cluster,
    payer: Rc<Keypair>,
    commitment: CommitmentConfig,
) -> PerpsResult<PerpsProgram> {
    let client = Client::new_with_options(cluster, payer, commitment);
    Ok(client.program(jup_perp_itf::ID)?)
}

/// Position a request applies to, the pool is always the JLP pool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionKey {
    pub owner: Pubkey,
    pub custody: Pubkey,
    pub collateral_custody: Pubkey,
    pub side: Side,
}

impl PositionKey {
    pub fn position_pk(&self) -> PerpsResult<Pubkey> {
        let (position_pk, _) = get_position_pk(
            &self.owner,
            &JLP_POOL,
            &self.custody,
            &self.collateral_custody,
            self.side,
        )?;
        Ok(position_pk)
    }
}

#[derive(Debug, Clone)]
pub struct IncreaseRequest {
    pub position: PositionKey,
    /// Mint the collateral is paid with, swapped by the program when it differs from the
    /// collateral custody mint
    pub input_mint: Pubkey,
    pub size_usd_delta: u64,
    pub collateral_token_delta: u64,
    pub price_slippage: u64,
    pub jupiter_minimum_out: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct DecreaseRequest {
    pub position: PositionKey,
    pub desired_mint: Pubkey,
    pub price_slippage: u64,
}

#[derive(Debug, Clone)]
pub struct ComposedRequest {
    pub instructions: Vec<Instruction>,
    pub position: Pubkey,
    pub position_request: Pubkey,
    pub counter: u64,
}

/// Funding ata setup, funding, increase request and, for wrapped SOL, closing of the funding ata
pub fn compose_increase_position_ixs(
    program: &PerpsProgram,
    request: &IncreaseRequest,
    counter: &mut RequestCounter,
) -> PerpsResult<ComposedRequest> {
    let owner = request.position.owner;
    let position = request.position.position_pk()?;
    let (position_request, counter) =
        counter.next_request_pk(&position, RequestChange::Increase)?;
    let position_request_ata =
        get_associated_token_address(&position_request, &request.input_mint);
    let funding_account = get_associated_token_address(&owner, &request.input_mint);
    let (event_authority, _) = get_event_authority_pk();
    let is_native = request.input_mint == mints::WSOL;

    let mut builder = program
        .request()
        .instruction(create_associated_token_account_idempotent(
            &owner,
            &owner,
            &request.input_mint,
            &spl_token::ID,
        ));
    if is_native {
        builder = builder
            .instruction(system_instruction::transfer(
                &owner,
                &funding_account,
                request.collateral_token_delta,
            ))
            .instruction(spl_token::instruction::sync_native(
                &spl_token::ID,
                &funding_account,
            )?);
    }

    let mut instructions = builder
        .accounts(CreateIncreasePositionMarketRequest {
            owner,
            funding_account,
            perpetuals: PERPETUAL_ACC,
            pool: JLP_POOL,
            position,
            position_request,
            position_request_ata,
            custody: request.position.custody,
            collateral_custody: request.position.collateral_custody,
            input_mint: request.input_mint,
            referral: None,
            token_program: spl_token::ID,
            associated_token_program: associated_token::ID,
            system_program: system_program::ID,
            event_authority,
            program: jup_perp_itf::ID,
        })
        .args(instruction::CreateIncreasePositionMarketRequest {
            params: CreateIncreasePositionMarketRequestParams {
                size_usd_delta: request.size_usd_delta,
                collateral_token_delta: request.collateral_token_delta,
                side: request.position.side,
                price_slippage: request.price_slippage,
                jupiter_minimum_out: request.jupiter_minimum_out,
                counter,
            },
        })
        .instructions()?;

    if is_native {
        instructions.push(spl_token::instruction::close_account(
            &spl_token::ID,
            &funding_account,
            &owner,
            &owner,
            &[],
        )?);
    }

    debug!(
        %position,
        %position_request,
        counter,
        ixs = instructions.len(),
        "composed increase request"
    );

    Ok(ComposedRequest {
        instructions,
        position,
        position_request,
        counter,
    })
}

/// Receiving ata setup and a decrease request closing the entire position
pub fn compose_close_position_ixs(
    program: &PerpsProgram,
    request: &DecreaseRequest,
    counter: &mut RequestCounter,
) -> PerpsResult<ComposedRequest> {
    let owner = request.position.owner;
    let position = request.position.position_pk()?;
    let (position_request, counter) =
        counter.next_request_pk(&position, RequestChange::Decrease)?;
    let position_request_ata =
        get_associated_token_address(&position_request, &request.desired_mint);
    let receiving_account = get_associated_token_address(&owner, &request.desired_mint);
    let (event_authority, _) = get_event_authority_pk();

    let instructions = program
        .request()
        .instruction(create_associated_token_account_idempotent(
            &owner,
            &owner,
            &request.desired_mint,
            &spl_token::ID,
        ))
        .accounts(CreateDecreasePositionMarketRequest {
            owner,
            receiving_account,
            perpetuals: PERPETUAL_ACC,
            pool: JLP_POOL,
            position,
            position_request,
            position_request_ata,
            custody: request.position.custody,
            collateral_custody: request.position.collateral_custody,
            desired_mint: request.desired_mint,
            referral: None,
            token_program: spl_token::ID,
            associated_token_program: associated_token::ID,
            system_program: system_program::ID,
            event_authority,
            program: jup_perp_itf::ID,
        })
        .args(instruction::CreateDecreasePositionMarketRequest {
            params: CreateDecreasePositionMarketRequestParams {
                collateral_usd_delta: 0,
                size_usd_delta: 0,
                price_slippage: request.price_slippage,
                jupiter_minimum_out: None,
                entire_position: Some(true),
                counter,
            },
        })
        .instructions()?;

    debug!(
        %position,
        %position_request,
        counter,
        ixs = instructions.len(),
        "composed close request"
    );

    Ok(ComposedRequest {
        instructions,
        position,
        position_request,
        counter,
    })
}
