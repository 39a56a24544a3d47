use solana_sdk::{
    instruction::InstructionError, pubkey::Pubkey, signature::Signature,
    transaction::TransactionError,
};
use thiserror::Error;

use crate::network::NetworkError;

/// Everything that can go wrong between building an escrow instruction and
/// seeing it confirmed. Each variant names the account it is about so callers
/// can branch (retry a lookup, abort a swap, prompt for a smaller amount).
#[derive(Debug, Error)]
pub enum EscrowClientError {
    #[error("account {address} does not exist")]
    Lookup { address: Pubkey },

    #[error(
        "mints use different token programs: {mint_a} is owned by {program_a}, {mint_b} by {program_b}"
    )]
    MismatchedTokenProgram {
        mint_a: Pubkey,
        program_a: Pubkey,
        mint_b: Pubkey,
        program_b: Pubkey,
    },

    #[error("{mint} is not a token mint (owned by {owner})")]
    NotATokenMint { mint: Pubkey, owner: Pubkey },

    #[error("amount must be greater than zero")]
    InvalidAmount,

    #[error("insufficient funds in {account}: need {needed}, have {available}")]
    InsufficientFunds {
        account: Pubkey,
        needed: u64,
        available: u64,
    },

    #[error("insufficient token balance in {account}: need {needed}, have {available}")]
    InsufficientTokenBalance {
        account: Pubkey,
        needed: u64,
        available: u64,
    },

    #[error("offer {offer} not found")]
    OfferNotFound { offer: Pubkey },

    #[error("{signer} is not the maker of offer {offer}")]
    NotOfferMaker { offer: Pubkey, signer: Pubkey },

    /// The transaction was sent but never reached the requested commitment.
    /// It may still land: re-query state before retrying.
    #[error("transaction {signature} not confirmed after {attempts} status checks, outcome unknown")]
    SubmissionFailure { signature: Signature, attempts: u32 },

    #[error("transaction rejected: {reason}")]
    TransactionRejected { reason: TransactionError },

    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("failed to build transaction: {0}")]
    Build(String),

    #[error("partially signed transaction: {0}")]
    PartialTransaction(String),
}

pub type Result<T, E = EscrowClientError> = std::result::Result<T, E>;

impl EscrowClientError {
    /// Custom program error code of a rejected transaction, if it carries one
    pub fn custom_code(&self) -> Option<u32> {
        match self {
            Self::TransactionRejected { reason } => custom_error_code(reason),
            _ => None,
        }
    }
}

/// Extract the `Custom(code)` an on-chain program failed with
pub fn custom_error_code(reason: &TransactionError) -> Option<u32> {
    match reason {
        TransactionError::InstructionError(_, InstructionError::Custom(code)) => Some(*code),
        _ => None,
    }
}
