use anchor_lang::prelude::*;

// Variant order fixes the on-chain error codes (6000, 6001, ...); append only.
#[error_code]
pub enum EscrowError {
    #[msg("Invalid amount: amount must be greater than zero")]
    InvalidAmount,
    #[msg("Token mints must be different")]
    SameTokenMints,
    #[msg("Insufficient token balance")]
    InsufficientTokenBalance,
    #[msg("Invalid maker: maker does not match offer maker")]
    InvalidMaker,
}
