use anchor_client::{solana_client::client_error::ClientError as RpcError, ClientError};
use anchor_lang::prelude::{ProgramError, Pubkey};
use jup_perp_itf::utils::Errors as PdaError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PerpsError {
    #[error("RPC request failed: {0}")]
    Rpc(#[from] RpcError),

    #[error("Unable to build instruction: {0}")]
    InstructionBuild(#[from] ClientError),

    #[error("Invalid instruction input: {0}")]
    Program(#[from] ProgramError),

    #[error("Address derivation failed: {0}")]
    Pda(#[from] PdaError),

    #[error("No position account at {0}")]
    PositionNotFound(Pubkey),

    #[error("Position {0} has a zero size")]
    EmptyPosition(Pubkey),

    #[error("Unable to deserialize position {position}: {reason}")]
    PositionDecode { position: Pubkey, reason: String },

    #[error("Unable to read keypair {path}: {reason}")]
    Keypair { path: String, reason: String },

    #[error("Request counter exhausted")]
    CounterExhausted,

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl PerpsError {
    /// Errors caused by the position state rather than by the client or the network
    pub fn is_position_state(&self) -> bool {
        matches!(
            self,
            PerpsError::PositionNotFound(_) | PerpsError::EmptyPosition(_)
        )
    }
}

pub type PerpsResult<T = ()> = std::result::Result<T, PerpsError>;
