use std::{rc::Rc, str::FromStr};

use anchor_client::{
    solana_client::rpc_client::RpcClient,
    solana_sdk::{
        account::Account, instruction::Instruction, signature::Keypair, signature::Signature,
        signer::Signer,
    },
    Cluster,
};
use anchor_lang::{prelude::Pubkey, AccountDeserialize};
use jup_perp_itf::{utils::check_position_pk, Position};
use tracing::info;

use crate::{
    compute_budget::{with_compute_budget, ComputeBudgetParams},
    config::Config,
    counter::RequestCounter,
    errors::{PerpsError, PerpsResult},
    instructions::{
        compose_close_position_ixs, compose_increase_position_ixs, get_program, DecreaseRequest,
        IncreaseRequest, PerpsProgram,
    },
    submit::sign_and_send,
};

/// Open and close flows, each one simulated, budgeted, signed and sent once
pub struct PerpsClient {
    rpc: RpcClient,
    payer: Rc<Keypair>,
    program: PerpsProgram,
    counter: RequestCounter,
    compute_budget: ComputeBudgetParams,
}

impl PerpsClient {
    pub fn new(config: &Config) -> PerpsResult<Self> {
        let payer = Rc::new(config.load_keypair()?);
        let cluster = Cluster::from_str(&config.rpc_url)
            .map_err(|err| PerpsError::InvalidArgument(format!("rpc url: {err}")))?;
        let program = get_program(cluster, payer.clone(), config.commitment)?;
        let rpc = RpcClient::new_with_commitment(config.rpc_url.clone(), config.commitment);

        Ok(Self {
            rpc,
            payer,
            program,
            counter: RequestCounter::from_clock(),
            compute_budget: config.compute_budget,
        })
    }

    pub fn owner(&self) -> Pubkey {
        self.payer.pubkey()
    }

    pub fn open_position(&mut self, request: &IncreaseRequest) -> PerpsResult<Signature> {
        let composed = compose_increase_position_ixs(&self.program, request, &mut self.counter)?;
        info!(
            position = %composed.position,
            position_request = %composed.position_request,
            counter = composed.counter,
            size_usd_delta = request.size_usd_delta,
            collateral_token_delta = request.collateral_token_delta,
            "opening position"
        );
        self.submit(composed.instructions)
    }

    pub fn close_position(&mut self, request: &DecreaseRequest) -> PerpsResult<Signature> {
        let position_pk = request.position.position_pk()?;
        let position = self
            .fetch_position(&position_pk)?
            .ok_or(PerpsError::PositionNotFound(position_pk))?;
        if !position.is_open() {
            return Err(PerpsError::EmptyPosition(position_pk));
        }

        let composed = compose_close_position_ixs(&self.program, request, &mut self.counter)?;
        info!(
            position = %composed.position,
            position_request = %composed.position_request,
            counter = composed.counter,
            size_usd = position.size_usd,
            collateral_usd = position.collateral_usd,
            "closing position"
        );
        self.submit(composed.instructions)
    }

    pub fn fetch_position(&self, position_pk: &Pubkey) -> PerpsResult<Option<Position>> {
        let account = self
            .rpc
            .get_account_with_commitment(position_pk, self.rpc.commitment())?
            .value;
        account
            .map(|account| decode_position(position_pk, &account))
            .transpose()
    }

    fn submit(&self, ixs: Vec<Instruction>) -> PerpsResult<Signature> {
        let ixs = with_compute_budget(&self.rpc, &self.payer, ixs, &self.compute_budget)?;
        sign_and_send(&self.rpc, &self.payer, &ixs)
    }
}

pub fn decode_position(position_pk: &Pubkey, account: &Account) -> PerpsResult<Position> {
    if account.owner != jup_perp_itf::ID {
        return Err(PerpsError::PositionDecode {
            position: *position_pk,
            reason: format!("owned by {} instead of the perpetuals program", account.owner),
        });
    }
    let position = Position::try_deserialize(&mut account.data.as_slice()).map_err(|err| {
        PerpsError::PositionDecode {
            position: *position_pk,
            reason: err.to_string(),
        }
    })?;
    check_position_pk(&position, position_pk)?;
    Ok(position)
}

#[cfg(test)]
mod tests {
    use anchor_lang::AccountSerialize;
    use jup_perp_itf::{custodies, Side, JLP_POOL};

    use super::*;
    use crate::instructions::PositionKey;

    fn position_account(position: &Position, owner: Pubkey) -> Account {
        let mut data = Vec::new();
        position.try_serialize(&mut data).unwrap();
        Account {
            lamports: 2_000_000,
            data,
            owner,
            executable: false,
            rent_epoch: 0,
        }
    }

    fn open_short_btc() -> (Pubkey, Position) {
        let key = PositionKey {
            owner: Pubkey::new_unique(),
            custody: custodies::BTC,
            collateral_custody: custodies::USDC,
            side: Side::Short,
        };
        let (position_pk, bump) = jup_perp_itf::utils::get_position_pk(
            &key.owner,
            &JLP_POOL,
            &key.custody,
            &key.collateral_custody,
            key.side,
        )
        .unwrap();
        let position = Position {
            owner: key.owner,
            pool: JLP_POOL,
            custody: key.custody,
            collateral_custody: key.collateral_custody,
            side: key.side,
            price: 65_000_000_000,
            size_usd: 50_000_000,
            collateral_usd: 10_000_000,
            bump,
            ..Default::default()
        };
        (position_pk, position)
    }

    #[test]
    fn decodes_position_account() {
        let (position_pk, position) = open_short_btc();
        let account = position_account(&position, jup_perp_itf::ID);

        let decoded = decode_position(&position_pk, &account).unwrap();
        assert_eq!(decoded.size_usd, 50_000_000);
        assert_eq!(decoded.side, Side::Short);
        assert!(decoded.is_open());
    }

    #[test]
    fn rejects_foreign_owner() {
        let (position_pk, position) = open_short_btc();
        let account = position_account(&position, Pubkey::new_unique());

        assert!(matches!(
            decode_position(&position_pk, &account),
            Err(PerpsError::PositionDecode { .. })
        ));
    }

    #[test]
    fn rejects_position_at_another_address() {
        let (_, position) = open_short_btc();
        let account = position_account(&position, jup_perp_itf::ID);

        assert!(matches!(
            decode_position(&Pubkey::new_unique(), &account),
            Err(PerpsError::Pda(_))
        ));
    }

    #[test]
    fn rejects_garbage_data() {
        let (position_pk, _) = open_short_btc();
        let account = Account {
            lamports: 1,
            data: vec![7; 16],
            owner: jup_perp_itf::ID,
            executable: false,
            rent_epoch: 0,
        };

        assert!(matches!(
            decode_position(&position_pk, &account),
            Err(PerpsError::PositionDecode { .. })
        ));
    }

    #[test]
    fn closed_position_is_not_open() {
        let (_, mut position) = open_short_btc();
        position.size_usd = 0;
        assert!(!position.is_open());
    }
}
