//! Create the associated token account of `OWNER` (default: the payer) for `MINT`.

use anyhow::{Context, Result};
use offer_escrow_client::{
    address::derive_associated_account,
    config::{env_or, env_pubkey},
    init_logging,
    token::create_associated_account_instruction,
    token_program::resolve_token_program,
    wallet::load_keypair,
    ClientConfig, Submitter,
};
use solana_sdk::signature::Signer;

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let config = ClientConfig::from_env()?;
    let rpc = config.rpc_client();
    let submitter = Submitter::new(&rpc, config.confirm);

    let payer = load_keypair("SECRET_KEY")?;
    let mint = env_pubkey("MINT")?;
    let owner = env_or("OWNER", payer.pubkey())?;

    let token_program = resolve_token_program(&rpc, &mint)
        .await
        .context("failed to resolve the mint's token program")?;
    let account = derive_associated_account(&mint, &owner, &token_program);

    let instruction =
        create_associated_account_instruction(&payer.pubkey(), &owner, &mint, &token_program);
    submitter
        .submit(&[instruction], &payer.pubkey(), &[&payer])
        .await
        .context("failed to create token account")?;

    println!("Token account: {}", config.explorer_link("address", account));
    Ok(())
}
