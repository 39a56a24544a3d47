//! Deterministic addresses of the escrow protocol. Pure, no network access.

use anchor_spl::associated_token::get_associated_token_address_with_program_id;
use offer_escrow::OFFER_SEED;
use solana_sdk::pubkey::Pubkey;

/// Offer PDA for `(maker, offer_id)`: seeds `["offer", maker, offer_id (LE)]`
pub fn derive_offer_address(program_id: &Pubkey, maker: &Pubkey, offer_id: u64) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[OFFER_SEED, maker.as_ref(), offer_id.to_le_bytes().as_ref()],
        program_id,
    )
}

/// Canonical associated token account of `owner` for `mint` under `token_program`.
/// `owner` may be off-curve (a PDA).
pub fn derive_associated_account(mint: &Pubkey, owner: &Pubkey, token_program: &Pubkey) -> Pubkey {
    get_associated_token_address_with_program_id(owner, mint, token_program)
}

/// Vault of an offer: the offer PDA's associated account for Token A
pub fn derive_vault_address(offer: &Pubkey, token_mint_a: &Pubkey, token_program: &Pubkey) -> Pubkey {
    derive_associated_account(token_mint_a, offer, token_program)
}

/// Fresh random offer id
pub fn generate_offer_id() -> u64 {
    rand::random()
}
