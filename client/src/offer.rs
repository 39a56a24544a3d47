use anchor_lang::{AccountDeserialize, InstructionData, ToAccountMetas};
use log::{debug, info};
use offer_escrow::{errors::EscrowError, Offer};
use solana_sdk::{
    instruction::Instruction,
    pubkey::Pubkey,
    signature::{Signature, Signer},
    system_program,
};

use crate::{
    address::{derive_associated_account, derive_offer_address, derive_vault_address, generate_offer_id},
    config::ClientConfig,
    error::{EscrowClientError, Result},
    network::Network,
    submit::Submitter,
    token::token_balance,
    token_program::{resolve_pair, resolve_token_program},
};

/// Program error raised when either leg of a take is underfunded
pub const INSUFFICIENT_TOKEN_BALANCE: u32 =
    anchor_lang::error::ERROR_CODE_OFFSET + EscrowError::InsufficientTokenBalance as u32;

/// Anchor's code for an account that is expected to hold data but does not
pub const ACCOUNT_NOT_INITIALIZED: u32 =
    anchor_lang::error::ErrorCode::AccountNotInitialized as u32;

/// Token program error for a transfer larger than the source balance
pub const TOKEN_INSUFFICIENT_FUNDS: u32 = 1;

/// What a successful `make_offer` produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OfferReceipt {
    pub offer: Pubkey,
    pub vault: Pubkey,
    pub offer_id: u64,
    pub signature: Signature,
}

pub struct MakeOfferAccounts {
    pub maker: Pubkey,
    pub token_mint_a: Pubkey,
    pub token_mint_b: Pubkey,
    pub token_program: Pubkey,
}

pub fn make_offer_instruction(
    program_id: &Pubkey,
    accounts: &MakeOfferAccounts,
    offer_id: u64,
    token_a_offered_amount: u64,
    token_b_wanted_amount: u64,
) -> Instruction {
    let (offer, _) = derive_offer_address(program_id, &accounts.maker, offer_id);

    let metas = offer_escrow::accounts::MakeOffer {
        maker: accounts.maker,
        token_mint_a: accounts.token_mint_a,
        token_mint_b: accounts.token_mint_b,
        maker_token_account_a: derive_associated_account(
            &accounts.token_mint_a,
            &accounts.maker,
            &accounts.token_program,
        ),
        offer,
        vault: derive_vault_address(&offer, &accounts.token_mint_a, &accounts.token_program),
        associated_token_program: anchor_spl::associated_token::ID,
        token_program: accounts.token_program,
        system_program: system_program::ID,
    }
    .to_account_metas(None);

    Instruction {
        program_id: *program_id,
        accounts: metas,
        data: offer_escrow::instruction::MakeOffer {
            id: offer_id,
            token_a_offered_amount,
            token_b_wanted_amount,
        }
        .data(),
    }
}

pub fn take_offer_instruction(
    program_id: &Pubkey,
    offer_address: &Pubkey,
    offer: &Offer,
    taker: &Pubkey,
    token_program: &Pubkey,
) -> Instruction {
    let metas = offer_escrow::accounts::TakeOffer {
        taker: *taker,
        maker: offer.maker,
        token_mint_a: offer.token_mint_a,
        token_mint_b: offer.token_mint_b,
        taker_token_account_a: derive_associated_account(&offer.token_mint_a, taker, token_program),
        taker_token_account_b: derive_associated_account(&offer.token_mint_b, taker, token_program),
        maker_token_account_b: derive_associated_account(
            &offer.token_mint_b,
            &offer.maker,
            token_program,
        ),
        offer: *offer_address,
        vault: derive_vault_address(offer_address, &offer.token_mint_a, token_program),
        associated_token_program: anchor_spl::associated_token::ID,
        token_program: *token_program,
        system_program: system_program::ID,
    }
    .to_account_metas(None);

    Instruction {
        program_id: *program_id,
        accounts: metas,
        data: offer_escrow::instruction::TakeOffer {}.data(),
    }
}

pub fn close_offer_instruction(
    program_id: &Pubkey,
    offer_address: &Pubkey,
    offer: &Offer,
    token_program: &Pubkey,
) -> Instruction {
    let metas = offer_escrow::accounts::CloseOffer {
        maker: offer.maker,
        offer: *offer_address,
        vault: derive_vault_address(offer_address, &offer.token_mint_a, token_program),
        token_mint_a: offer.token_mint_a,
        maker_token_account_a: derive_associated_account(
            &offer.token_mint_a,
            &offer.maker,
            token_program,
        ),
        associated_token_program: anchor_spl::associated_token::ID,
        token_program: *token_program,
        system_program: system_program::ID,
    }
    .to_account_metas(None);

    Instruction {
        program_id: *program_id,
        accounts: metas,
        data: offer_escrow::instruction::CloseOffer {}.data(),
    }
}

/// Entry point for the three offer operations against one deployment
pub struct EscrowClient<'a, N> {
    network: &'a N,
    program_id: Pubkey,
    submitter: Submitter<'a, N>,
}

impl<'a, N: Network> EscrowClient<'a, N> {
    pub fn new(network: &'a N, config: &ClientConfig) -> Self {
        Self {
            network,
            program_id: config.program_id,
            submitter: Submitter::new(network, config.confirm),
        }
    }

    pub fn program_id(&self) -> &Pubkey {
        &self.program_id
    }

    pub fn submitter(&self) -> &Submitter<'a, N> {
        &self.submitter
    }

    /// Read and decode the offer record at `offer_address`
    pub async fn fetch_offer(&self, offer_address: &Pubkey) -> Result<Offer> {
        let not_found = || EscrowClientError::OfferNotFound {
            offer: *offer_address,
        };

        let account = self
            .network
            .get_account(offer_address)
            .await?
            .ok_or_else(not_found)?;
        if account.owner != self.program_id {
            debug!("{offer_address} is owned by {}, not an offer", account.owner);
            return Err(not_found());
        }

        Offer::try_deserialize(&mut account.data.as_slice()).map_err(|e| {
            debug!("{offer_address} does not decode as an offer: {e}");
            not_found()
        })
    }

    /// Deposit `token_a_offered_amount` of `token_mint_a` and ask for
    /// `token_b_wanted_amount` of `token_mint_b` in return, under a fresh id
    pub async fn make_offer(
        &self,
        maker: &dyn Signer,
        token_mint_a: &Pubkey,
        token_mint_b: &Pubkey,
        token_a_offered_amount: u64,
        token_b_wanted_amount: u64,
    ) -> Result<OfferReceipt> {
        self.make_offer_with_id(
            maker,
            generate_offer_id(),
            token_mint_a,
            token_mint_b,
            token_a_offered_amount,
            token_b_wanted_amount,
        )
        .await
    }

    pub async fn make_offer_with_id(
        &self,
        maker: &dyn Signer,
        offer_id: u64,
        token_mint_a: &Pubkey,
        token_mint_b: &Pubkey,
        token_a_offered_amount: u64,
        token_b_wanted_amount: u64,
    ) -> Result<OfferReceipt> {
        if token_a_offered_amount == 0 || token_b_wanted_amount == 0 {
            return Err(EscrowClientError::InvalidAmount);
        }

        let token_program = resolve_pair(self.network, token_mint_a, token_mint_b).await?;
        let maker_key = maker.pubkey();
        let (offer, _) = derive_offer_address(&self.program_id, &maker_key, offer_id);
        let vault = derive_vault_address(&offer, token_mint_a, &token_program);
        let maker_token_account_a =
            derive_associated_account(token_mint_a, &maker_key, &token_program);
        debug!("Offer {offer_id} of {maker_key} at {offer}, vault {vault}");

        let available = token_balance(self.network, &maker_token_account_a)
            .await?
            .unwrap_or(0);
        if available < token_a_offered_amount {
            return Err(EscrowClientError::InsufficientFunds {
                account: maker_token_account_a,
                needed: token_a_offered_amount,
                available,
            });
        }

        let instruction = make_offer_instruction(
            &self.program_id,
            &MakeOfferAccounts {
                maker: maker_key,
                token_mint_a: *token_mint_a,
                token_mint_b: *token_mint_b,
                token_program,
            },
            offer_id,
            token_a_offered_amount,
            token_b_wanted_amount,
        );

        let signature = match self
            .submitter
            .submit(&[instruction], &maker_key, &[maker])
            .await
        {
            Ok(signature) => signature,
            Err(err) if err.custom_code() == Some(TOKEN_INSUFFICIENT_FUNDS) => {
                // Balance moved between the pre-flight read and execution
                let available = token_balance(self.network, &maker_token_account_a)
                    .await?
                    .unwrap_or(0);
                return Err(EscrowClientError::InsufficientFunds {
                    account: maker_token_account_a,
                    needed: token_a_offered_amount,
                    available,
                });
            }
            Err(err) => return Err(err),
        };

        info!("Offer {offer} created: {token_a_offered_amount} of {token_mint_a} for {token_b_wanted_amount} of {token_mint_b}");
        Ok(OfferReceipt {
            offer,
            vault,
            offer_id,
            signature,
        })
    }

    /// Pay the wanted amount of Token B to the maker and withdraw the vault
    pub async fn take_offer(&self, offer_address: &Pubkey, taker: &dyn Signer) -> Result<Signature> {
        let offer = self.fetch_offer(offer_address).await?;
        self.take_offer_with_record(offer_address, &offer, taker).await
    }

    /// Like [`Self::take_offer`] with a record read earlier. The record may be
    /// stale; losing a race to another taker surfaces as `OfferNotFound`.
    pub async fn take_offer_with_record(
        &self,
        offer_address: &Pubkey,
        offer: &Offer,
        taker: &dyn Signer,
    ) -> Result<Signature> {
        let token_program =
            resolve_pair(self.network, &offer.token_mint_a, &offer.token_mint_b).await?;
        let taker_key = taker.pubkey();
        let taker_token_account_b =
            derive_associated_account(&offer.token_mint_b, &taker_key, &token_program);

        let available = token_balance(self.network, &taker_token_account_b)
            .await?
            .unwrap_or(0);
        if available < offer.token_b_wanted_amount {
            return Err(EscrowClientError::InsufficientTokenBalance {
                account: taker_token_account_b,
                needed: offer.token_b_wanted_amount,
                available,
            });
        }

        let instruction = take_offer_instruction(
            &self.program_id,
            offer_address,
            offer,
            &taker_key,
            &token_program,
        );

        match self
            .submitter
            .submit(&[instruction], &taker_key, &[taker])
            .await
        {
            Ok(signature) => {
                info!("Offer {offer_address} taken by {taker_key}");
                Ok(signature)
            }
            Err(err) => Err(self
                .classify_take_failure(err, offer_address, offer, &taker_token_account_b, &token_program)
                .await),
        }
    }

    /// Refund the vault to the maker and close the offer
    pub async fn close_offer(&self, offer_address: &Pubkey, maker: &dyn Signer) -> Result<Signature> {
        let offer = self.fetch_offer(offer_address).await?;
        let maker_key = maker.pubkey();
        if offer.maker != maker_key {
            return Err(EscrowClientError::NotOfferMaker {
                offer: *offer_address,
                signer: maker_key,
            });
        }

        let token_program = resolve_token_program(self.network, &offer.token_mint_a).await?;
        let instruction =
            close_offer_instruction(&self.program_id, offer_address, &offer, &token_program);

        match self
            .submitter
            .submit(&[instruction], &maker_key, &[maker])
            .await
        {
            Ok(signature) => {
                info!("Offer {offer_address} closed, vault refunded to {maker_key}");
                Ok(signature)
            }
            Err(err) if err.custom_code() == Some(ACCOUNT_NOT_INITIALIZED) => {
                Err(self.offer_gone_or(err, offer_address).await)
            }
            Err(err) => Err(err),
        }
    }

    async fn classify_take_failure(
        &self,
        err: EscrowClientError,
        offer_address: &Pubkey,
        offer: &Offer,
        taker_token_account_b: &Pubkey,
        token_program: &Pubkey,
    ) -> EscrowClientError {
        match err.custom_code() {
            Some(ACCOUNT_NOT_INITIALIZED) => self.offer_gone_or(err, offer_address).await,
            Some(INSUFFICIENT_TOKEN_BALANCE) => {
                let taker_balance = token_balance(self.network, taker_token_account_b).await;
                if let Ok(available) = taker_balance {
                    let available = available.unwrap_or(0);
                    if available < offer.token_b_wanted_amount {
                        return EscrowClientError::InsufficientTokenBalance {
                            account: *taker_token_account_b,
                            needed: offer.token_b_wanted_amount,
                            available,
                        };
                    }
                }

                let vault = derive_vault_address(offer_address, &offer.token_mint_a, token_program);
                let available = match token_balance(self.network, &vault).await {
                    Ok(balance) => balance.unwrap_or(0),
                    Err(_) => return err,
                };
                EscrowClientError::InsufficientTokenBalance {
                    account: vault,
                    needed: offer.token_a_offered_amount,
                    available,
                }
            }
            _ => err,
        }
    }

    /// `OfferNotFound` when the record no longer exists, else the original error
    async fn offer_gone_or(&self, err: EscrowClientError, offer_address: &Pubkey) -> EscrowClientError {
        match self.network.get_account(offer_address).await {
            Ok(None) => EscrowClientError::OfferNotFound {
                offer: *offer_address,
            },
            _ => err,
        }
    }
}
