use std::str::FromStr;

use log::debug;
use solana_sdk::pubkey::Pubkey;

use crate::{
    error::{EscrowClientError, Result},
    network::Network,
};

/// The two incompatible implementations of the token standard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TokenProgramKind {
    /// The original SPL Token program
    Classic,
    /// Token-2022 (token extensions)
    Extended,
}

impl TokenProgramKind {
    pub fn from_program_id(program_id: &Pubkey) -> Option<Self> {
        if *program_id == anchor_spl::token::ID {
            Some(Self::Classic)
        } else if *program_id == anchor_spl::token_2022::ID {
            Some(Self::Extended)
        } else {
            None
        }
    }

    pub fn program_id(self) -> Pubkey {
        match self {
            Self::Classic => anchor_spl::token::ID,
            Self::Extended => anchor_spl::token_2022::ID,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Classic => "Token Program",
            Self::Extended => "Token-2022 Program",
        }
    }
}

impl FromStr for TokenProgramKind {
    type Err = EscrowClientError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "token" | "spl-token" | "classic" => Ok(Self::Classic),
            "token-2022" | "token2022" | "extended" => Ok(Self::Extended),
            other => Err(EscrowClientError::Config(format!(
                "unknown token program {other:?}, expected \"token\" or \"token-2022\""
            ))),
        }
    }
}

/// Owner of the `mint` account
pub async fn resolve<N: Network>(network: &N, mint: &Pubkey) -> Result<Pubkey> {
    let account = network
        .get_account(mint)
        .await?
        .ok_or(EscrowClientError::Lookup { address: *mint })?;

    debug!("Mint {mint} is owned by {}", account.owner);
    Ok(account.owner)
}

/// Owner of the `mint` account, which must be one of the token programs
pub async fn resolve_token_program<N: Network>(network: &N, mint: &Pubkey) -> Result<Pubkey> {
    let owner = resolve(network, mint).await?;
    match TokenProgramKind::from_program_id(&owner) {
        Some(_) => Ok(owner),
        None => Err(EscrowClientError::NotATokenMint { mint: *mint, owner }),
    }
}

/// Token program shared by both sides of a swap.
///
/// Both mints are looked up concurrently; the swap cannot mix variants because
/// the vault and every transfer are program specific.
pub async fn resolve_pair<N: Network>(
    network: &N,
    mint_a: &Pubkey,
    mint_b: &Pubkey,
) -> Result<Pubkey> {
    let (program_a, program_b) = tokio::try_join!(
        resolve_token_program(network, mint_a),
        resolve_token_program(network, mint_b),
    )?;

    if program_a != program_b {
        return Err(EscrowClientError::MismatchedTokenProgram {
            mint_a: *mint_a,
            program_a,
            mint_b: *mint_b,
            program_b,
        });
    }
    Ok(program_a)
}
