use anchor_lang::prelude::*;
use anchor_spl::{
    associated_token::AssociatedToken,
    token_interface::{
        close_account, transfer_checked, CloseAccount, Mint, TokenAccount, TokenInterface,
        TransferChecked,
    },
};

use crate::{errors::EscrowError, state::Offer, OFFER_SEED};

#[derive(Accounts)]
pub struct CloseOffer<'info> {
    /// The maker who created the offer (only they can close it)
    #[account(mut)]
    pub maker: Signer<'info>,

    /// Offer account storing the terms (closed to the maker)
    #[account(
        mut,
        close = maker,
        has_one = maker @ EscrowError::InvalidMaker,
        has_one = token_mint_a,
        seeds = [OFFER_SEED, maker.key().as_ref(), offer.id.to_le_bytes().as_ref()],
        bump = offer.bump,
    )]
    pub offer: Account<'info, Offer>,

    /// Vault holding Token A (owned by the offer)
    #[account(
        mut,
        associated_token::mint = token_mint_a,
        associated_token::authority = offer,
        associated_token::token_program = token_program,
    )]
    pub vault: InterfaceAccount<'info, TokenAccount>,

    /// Token A mint
    #[account(mint::token_program = token_program)]
    pub token_mint_a: InterfaceAccount<'info, Mint>,

    /// Maker's associated token account for Token A (receives the refund)
    #[account(
        init_if_needed,
        payer = maker,
        associated_token::mint = token_mint_a,
        associated_token::authority = maker,
        associated_token::token_program = token_program,
    )]
    pub maker_token_account_a: InterfaceAccount<'info, TokenAccount>,

    pub associated_token_program: Program<'info, AssociatedToken>,
    pub token_program: Interface<'info, TokenInterface>,
    pub system_program: Program<'info, System>,
}

impl<'info> CloseOffer<'info> {
    /// Return all Token A from the vault to the maker and close the vault
    pub fn refund_and_close_vault(&mut self) -> Result<()> {
        let id_bytes = self.offer.id.to_le_bytes();
        let signer_seeds: &[&[&[u8]]] = &[&[
            OFFER_SEED,
            self.maker.key.as_ref(),
            id_bytes.as_ref(),
            &[self.offer.bump],
        ]];

        let cpi_accounts = TransferChecked {
            from: self.vault.to_account_info(),
            mint: self.token_mint_a.to_account_info(),
            to: self.maker_token_account_a.to_account_info(),
            authority: self.offer.to_account_info(),
        };
        let cpi_program = self.token_program.to_account_info();
        let cpi_ctx = CpiContext::new_with_signer(cpi_program, cpi_accounts, signer_seeds);

        transfer_checked(cpi_ctx, self.vault.amount, self.token_mint_a.decimals)?;

        let cpi_accounts = CloseAccount {
            account: self.vault.to_account_info(),
            destination: self.maker.to_account_info(),
            authority: self.offer.to_account_info(),
        };
        let cpi_program = self.token_program.to_account_info();
        let cpi_ctx = CpiContext::new_with_signer(cpi_program, cpi_accounts, signer_seeds);

        close_account(cpi_ctx)
    }
}

/// Handler for the close_offer instruction
pub fn handle_close_offer(ctx: Context<CloseOffer>) -> Result<()> {
    ctx.accounts.refund_and_close_vault()?;

    msg!("Offer {} closed by maker", ctx.accounts.offer.id);
    Ok(())
}
