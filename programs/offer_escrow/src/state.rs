use anchor_lang::prelude::*;

/// Offer account that stores the terms of a pending swap
#[account]
#[derive(InitSpace, Debug, PartialEq, Eq)]
pub struct Offer {
    /// Random identifier chosen by the maker, part of the PDA seeds
    pub id: u64,
    /// The maker's wallet address (creator of the offer)
    pub maker: Pubkey,
    /// Token A mint (the token the maker deposits)
    pub token_mint_a: Pubkey,
    /// Token B mint (the token the maker wants to receive)
    pub token_mint_b: Pubkey,
    /// Amount of Token A held by the vault
    pub token_a_offered_amount: u64,
    /// Amount of Token B the maker wants to receive
    pub token_b_wanted_amount: u64,
    /// Bump seed for PDA derivation
    pub bump: u8,
}
