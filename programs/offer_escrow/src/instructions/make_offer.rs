use anchor_lang::prelude::*;
use anchor_spl::{
    associated_token::AssociatedToken,
    token_interface::{transfer_checked, Mint, TokenAccount, TokenInterface, TransferChecked},
};

use crate::{errors::EscrowError, state::Offer, ANCHOR_DISCRIMINATOR, OFFER_SEED};

#[derive(Accounts)]
#[instruction(id: u64)]
pub struct MakeOffer<'info> {
    /// The maker who sets the terms and deposits Token A
    #[account(mut)]
    pub maker: Signer<'info>,

    /// Token A mint (the token the maker will deposit)
    #[account(mint::token_program = token_program)]
    pub token_mint_a: InterfaceAccount<'info, Mint>,

    /// Token B mint (the token the maker wants to receive)
    #[account(mint::token_program = token_program)]
    pub token_mint_b: InterfaceAccount<'info, Mint>,

    /// Maker's associated token account for Token A (source of the deposit)
    #[account(
        mut,
        associated_token::mint = token_mint_a,
        associated_token::authority = maker,
        associated_token::token_program = token_program,
    )]
    pub maker_token_account_a: InterfaceAccount<'info, TokenAccount>,

    /// Offer account that stores the swap terms
    #[account(
        init,
        payer = maker,
        space = ANCHOR_DISCRIMINATOR + Offer::INIT_SPACE,
        seeds = [OFFER_SEED, maker.key().as_ref(), id.to_le_bytes().as_ref()],
        bump,
    )]
    pub offer: Account<'info, Offer>,

    /// Vault owned by the offer PDA, holds Token A until the offer is taken or closed
    #[account(
        init,
        payer = maker,
        associated_token::mint = token_mint_a,
        associated_token::authority = offer,
        associated_token::token_program = token_program,
    )]
    pub vault: InterfaceAccount<'info, TokenAccount>,

    pub associated_token_program: Program<'info, AssociatedToken>,
    pub token_program: Interface<'info, TokenInterface>,
    pub system_program: Program<'info, System>,
}

impl<'info> MakeOffer<'info> {
    /// Persist the offer terms
    pub fn save_offer(
        &mut self,
        id: u64,
        token_a_offered_amount: u64,
        token_b_wanted_amount: u64,
        bumps: &MakeOfferBumps,
    ) -> Result<()> {
        self.offer.set_inner(Offer {
            id,
            maker: self.maker.key(),
            token_mint_a: self.token_mint_a.key(),
            token_mint_b: self.token_mint_b.key(),
            token_a_offered_amount,
            token_b_wanted_amount,
            bump: bumps.offer,
        });
        Ok(())
    }

    /// Transfer Token A from maker to vault
    pub fn deposit(&mut self, amount: u64) -> Result<()> {
        let cpi_accounts = TransferChecked {
            from: self.maker_token_account_a.to_account_info(),
            mint: self.token_mint_a.to_account_info(),
            to: self.vault.to_account_info(),
            authority: self.maker.to_account_info(),
        };
        let cpi_program = self.token_program.to_account_info();
        let cpi_ctx = CpiContext::new(cpi_program, cpi_accounts);

        transfer_checked(cpi_ctx, amount, self.token_mint_a.decimals)
    }
}

/// Handler for the make_offer instruction
pub fn handle_make_offer(
    ctx: Context<MakeOffer>,
    id: u64,
    token_a_offered_amount: u64,
    token_b_wanted_amount: u64,
) -> Result<()> {
    require_gt!(token_a_offered_amount, 0, EscrowError::InvalidAmount);
    require_gt!(token_b_wanted_amount, 0, EscrowError::InvalidAmount);
    require_keys_neq!(
        ctx.accounts.token_mint_a.key(),
        ctx.accounts.token_mint_b.key(),
        EscrowError::SameTokenMints
    );

    ctx.accounts.deposit(token_a_offered_amount)?;
    ctx.accounts.save_offer(
        id,
        token_a_offered_amount,
        token_b_wanted_amount,
        &ctx.bumps,
    )?;

    msg!(
        "Offer {} created: {} of Token A for {} of Token B",
        id,
        token_a_offered_amount,
        token_b_wanted_amount
    );
    Ok(())
}
