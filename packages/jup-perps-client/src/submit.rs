use anchor_client::{
    solana_client::{rpc_client::RpcClient, rpc_config::RpcSendTransactionConfig},
    solana_sdk::{
        instruction::Instruction, signature::Keypair, signature::Signature, signer::Signer,
        transaction::Transaction,
    },
};
use tracing::info;

use crate::errors::PerpsResult;

/// Sign with the single local key and broadcast, without waiting for any confirmation
pub fn sign_and_send(
    rpc: &RpcClient,
    payer: &Keypair,
    ixs: &[Instruction],
) -> PerpsResult<Signature> {
    let blockhash = rpc.get_latest_blockhash()?;
    let tx = Transaction::new_signed_with_payer(ixs, Some(&payer.pubkey()), &[payer], blockhash);

    let signature = rpc.send_transaction_with_config(
        &tx,
        RpcSendTransactionConfig {
            skip_preflight: true,
            ..RpcSendTransactionConfig::default()
        },
    )?;

    info!(%signature, ixs = ixs.len(), "transaction sent");
    Ok(signature)
}

#[cfg(test)]
mod tests {
    use anchor_client::solana_sdk::{pubkey::Pubkey, system_instruction};

    use super::*;

    #[test]
    fn returns_the_transaction_signature() {
        let payer = Keypair::new();
        let rpc = RpcClient::new_mock("succeeds".to_string());
        let ix = system_instruction::transfer(&payer.pubkey(), &Pubkey::new_unique(), 1);

        let signature = sign_and_send(&rpc, &payer, &[ix]).unwrap();
        assert_ne!(signature, Signature::default());
    }

    #[test]
    fn blockhash_failure_is_fatal() {
        let payer = Keypair::new();
        let rpc = RpcClient::new_mock("fails".to_string());
        let ix = system_instruction::transfer(&payer.pubkey(), &Pubkey::new_unique(), 1);

        assert!(sign_and_send(&rpc, &payer, &[ix]).is_err());
    }
}
