use anchor_lang::prelude::*;

pub mod constants;
pub mod errors;
pub mod instructions;
pub mod state;

pub use constants::*;
pub use instructions::*;
pub use state::*;

declare_id!("4KQEPJFeRBfNuoSfecPXeJXEthzzKPfegpD887JYYhv6");

#[program]
pub mod offer_escrow {
    use super::*;

    /// Create an offer: maker deposits Token A into the vault and records how much Token B it wants
    pub fn make_offer(
        ctx: Context<MakeOffer>,
        id: u64,
        token_a_offered_amount: u64,
        token_b_wanted_amount: u64,
    ) -> Result<()> {
        instructions::make_offer::handle_make_offer(
            ctx,
            id,
            token_a_offered_amount,
            token_b_wanted_amount,
        )
    }

    /// Take an offer: taker sends Token B to the maker and receives the vault's Token A
    pub fn take_offer(ctx: Context<TakeOffer>) -> Result<()> {
        instructions::take_offer::handle_take_offer(ctx)
    }

    /// Close an unfulfilled offer: maker reclaims Token A
    pub fn close_offer(ctx: Context<CloseOffer>) -> Result<()> {
        instructions::close_offer::handle_close_offer(ctx)
    }
}
