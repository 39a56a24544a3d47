//! Mint `AMOUNT` raw units of `MINT` into the associated account of `RECIPIENT`
//! (default: the mint authority).

use anyhow::{Context, Result};
use offer_escrow_client::{
    address::derive_associated_account,
    config::{env_or, env_pubkey, env_u64},
    init_logging,
    token::{mint_info, mint_to_instruction, ui_amount},
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

    let authority = load_keypair("SECRET_KEY")?;
    let mint = env_pubkey("MINT")?;
    let amount = env_u64("AMOUNT")?;
    let recipient = env_or("RECIPIENT", authority.pubkey())?;

    let info = mint_info(&rpc, &mint).await.context("failed to read mint")?;
    let destination = derive_associated_account(&mint, &recipient, &info.program);
    println!(
        "Minting {} tokens to {destination}",
        ui_amount(amount, info.decimals)
    );

    let instruction = mint_to_instruction(
        &info.program,
        &mint,
        &destination,
        &authority.pubkey(),
        &[],
        amount,
    )?;
    let signature = submitter
        .submit(&[instruction], &authority.pubkey(), &[&authority])
        .await
        .context("mint failed")?;

    println!("Tokens minted: {}", config.explorer_link("tx", signature));
    Ok(())
}
