use anchor_client::{
    solana_client::{rpc_client::RpcClient, rpc_config::RpcSimulateTransactionConfig},
    solana_sdk::{
        compute_budget::ComputeBudgetInstruction, instruction::Instruction, signature::Keypair,
        signer::Signer, transaction::Transaction,
    },
};
use tracing::{debug, warn};

use crate::errors::PerpsResult;

/// Highest limit the runtime accepts for a single transaction, also the fallback when the
/// simulation does not report its consumption
pub const MAX_COMPUTE_UNIT_LIMIT: u32 = 1_400_000;

const BPS_DENOMINATOR: u64 = 10_000;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ComputeBudgetParams {
    /// Extra units on top of the simulated consumption, in bps of it
    pub margin_bps: u16,
    pub priority_fee_micro_lamports: u64,
}

impl ComputeBudgetParams {
    pub fn new(margin_bps: u16, priority_fee_micro_lamports: u64) -> Self {
        Self {
            margin_bps,
            priority_fee_micro_lamports,
        }
    }

    /// Unit limit to request given the simulated consumption, a zero report counts as none
    pub fn unit_limit(&self, units_consumed: Option<u64>) -> u32 {
        let Some(units) = units_consumed.filter(|units| *units > 0) else {
            return MAX_COMPUTE_UNIT_LIMIT;
        };
        let margin = units.saturating_mul(u64::from(self.margin_bps)) / BPS_DENOMINATOR;
        let limit = units.saturating_add(margin);
        u32::try_from(limit)
            .unwrap_or(MAX_COMPUTE_UNIT_LIMIT)
            .min(MAX_COMPUTE_UNIT_LIMIT)
    }

    pub fn instructions(&self, unit_limit: u32) -> Vec<Instruction> {
        let mut ixs = vec![ComputeBudgetInstruction::set_compute_unit_limit(unit_limit)];
        if self.priority_fee_micro_lamports > 0 {
            ixs.push(ComputeBudgetInstruction::set_compute_unit_price(
                self.priority_fee_micro_lamports,
            ));
        }
        ixs
    }
}

/// Dry-run the instructions under the maximum limit and return the consumed units.
///
/// Any failure of the simulation itself is logged and reported as `None`, the caller then
/// falls back to the maximum limit. Only fetching the blockhash is fatal.
pub fn simulate_compute_units(
    rpc: &RpcClient,
    payer: &Keypair,
    ixs: &[Instruction],
) -> PerpsResult<Option<u64>> {
    let mut sim_ixs = vec![ComputeBudgetInstruction::set_compute_unit_limit(
        MAX_COMPUTE_UNIT_LIMIT,
    )];
    sim_ixs.extend_from_slice(ixs);

    let blockhash = rpc.get_latest_blockhash()?;
    let tx = Transaction::new_signed_with_payer(
        &sim_ixs,
        Some(&payer.pubkey()),
        &[payer],
        blockhash,
    );
    let config = RpcSimulateTransactionConfig {
        sig_verify: false,
        replace_recent_blockhash: true,
        commitment: Some(rpc.commitment()),
        ..RpcSimulateTransactionConfig::default()
    };

    let result = match rpc.simulate_transaction_with_config(&tx, config) {
        Ok(response) => response.value,
        Err(err) => {
            warn!(%err, "simulation request failed");
            return Ok(None);
        }
    };

    if let Some(err) = result.err {
        warn!(?err, logs = ?result.logs, "simulation returned an error");
        return Ok(None);
    }

    debug!(units_consumed = ?result.units_consumed, "simulated transaction");
    Ok(result.units_consumed)
}

/// Prepend compute budget instructions sized from a single simulation
pub fn with_compute_budget(
    rpc: &RpcClient,
    payer: &Keypair,
    ixs: Vec<Instruction>,
    params: &ComputeBudgetParams,
) -> PerpsResult<Vec<Instruction>> {
    let units_consumed = simulate_compute_units(rpc, payer, &ixs)?;
    let unit_limit = params.unit_limit(units_consumed);
    if units_consumed.unwrap_or_default() == 0 {
        warn!(unit_limit, "no simulated consumption, using the maximum compute unit limit");
    }
    debug!(
        unit_limit,
        priority_fee = params.priority_fee_micro_lamports,
        "sized compute budget"
    );

    let mut budgeted = params.instructions(unit_limit);
    budgeted.extend(ixs);
    Ok(budgeted)
}
