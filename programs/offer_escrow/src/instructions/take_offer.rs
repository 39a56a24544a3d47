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
pub struct TakeOffer<'info> {
    /// The taker who accepts the offer terms
    #[account(mut)]
    pub taker: Signer<'info>,

    /// The maker who created the offer, receives Token B and the reclaimed rent
    #[account(mut)]
    pub maker: SystemAccount<'info>,

    /// Token A mint
    #[account(mint::token_program = token_program)]
    pub token_mint_a: Box<InterfaceAccount<'info, Mint>>,

    /// Token B mint
    #[account(mint::token_program = token_program)]
    pub token_mint_b: Box<InterfaceAccount<'info, Mint>>,

    /// Taker's associated token account for Token A (receives the vault balance)
    #[account(
        init_if_needed,
        payer = taker,
        associated_token::mint = token_mint_a,
        associated_token::authority = taker,
        associated_token::token_program = token_program,
    )]
    pub taker_token_account_a: Box<InterfaceAccount<'info, TokenAccount>>,

    /// Taker's associated token account for Token B (source of payment)
    #[account(
        mut,
        associated_token::mint = token_mint_b,
        associated_token::authority = taker,
        associated_token::token_program = token_program,
    )]
    pub taker_token_account_b: Box<InterfaceAccount<'info, TokenAccount>>,

    /// Maker's associated token account for Token B (receives payment)
    #[account(
        init_if_needed,
        payer = taker,
        associated_token::mint = token_mint_b,
        associated_token::authority = maker,
        associated_token::token_program = token_program,
    )]
    pub maker_token_account_b: Box<InterfaceAccount<'info, TokenAccount>>,

    /// Offer account storing the terms (closed to the maker)
    #[account(
        mut,
        close = maker,
        has_one = maker @ EscrowError::InvalidMaker,
        has_one = token_mint_a,
        has_one = token_mint_b,
        seeds = [OFFER_SEED, maker.key().as_ref(), offer.id.to_le_bytes().as_ref()],
        bump = offer.bump,
    )]
    pub offer: Box<Account<'info, Offer>>,

    /// Vault holding Token A (owned by the offer)
    #[account(
        mut,
        associated_token::mint = token_mint_a,
        associated_token::authority = offer,
        associated_token::token_program = token_program,
    )]
    pub vault: Box<InterfaceAccount<'info, TokenAccount>>,

    pub associated_token_program: Program<'info, AssociatedToken>,
    pub token_program: Interface<'info, TokenInterface>,
    pub system_program: Program<'info, System>,
}

impl<'info> TakeOffer<'info> {
    /// Both legs of the swap must be fully funded before anything moves
    pub fn check_balances(&self) -> Result<()> {
        require_gte!(
            self.taker_token_account_b.amount,
            self.offer.token_b_wanted_amount,
            EscrowError::InsufficientTokenBalance
        );
        require_gte!(
            self.vault.amount,
            self.offer.token_a_offered_amount,
            EscrowError::InsufficientTokenBalance
        );
        Ok(())
    }

    /// Transfer Token B from taker to maker
    pub fn send_wanted_tokens_to_maker(&mut self) -> Result<()> {
        let cpi_accounts = TransferChecked {
            from: self.taker_token_account_b.to_account_info(),
            mint: self.token_mint_b.to_account_info(),
            to: self.maker_token_account_b.to_account_info(),
            authority: self.taker.to_account_info(),
        };
        let cpi_program = self.token_program.to_account_info();
        let cpi_ctx = CpiContext::new(cpi_program, cpi_accounts);

        transfer_checked(
            cpi_ctx,
            self.offer.token_b_wanted_amount,
            self.token_mint_b.decimals,
        )
    }

    /// Withdraw all Token A from the vault to the taker, then close the vault
    pub fn withdraw_and_close_vault(&mut self) -> Result<()> {
        let maker_key = self.maker.key();
        let id_bytes = self.offer.id.to_le_bytes();
        let signer_seeds: &[&[&[u8]]] = &[&[
            OFFER_SEED,
            maker_key.as_ref(),
            id_bytes.as_ref(),
            &[self.offer.bump],
        ]];

        let cpi_accounts = TransferChecked {
            from: self.vault.to_account_info(),
            mint: self.token_mint_a.to_account_info(),
            to: self.taker_token_account_a.to_account_info(),
            authority: self.offer.to_account_info(),
        };
        let cpi_program = self.token_program.to_account_info();
        let cpi_ctx = CpiContext::new_with_signer(cpi_program, cpi_accounts, signer_seeds);

        transfer_checked(cpi_ctx, self.vault.amount, self.token_mint_a.decimals)?;

        // Rent of the vault goes back to the maker who paid for it
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

/// Handler for the take_offer instruction
pub fn handle_take_offer(ctx: Context<TakeOffer>) -> Result<()> {
    ctx.accounts.check_balances()?;

    ctx.accounts.send_wanted_tokens_to_maker()?;
    ctx.accounts.withdraw_and_close_vault()?;

    msg!(
        "Offer {} taken by {}",
        ctx.accounts.offer.id,
        ctx.accounts.taker.key()
    );
    Ok(())
}
