//! Attach Metaplex metadata (`TOKEN_NAME`, `TOKEN_SYMBOL`, `TOKEN_URI`) to `MINT`.

use anyhow::{Context, Result};
use offer_escrow_client::{
    config::{env_or, env_pubkey, require_env},
    init_logging,
    token::create_metadata_instruction,
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
    let name = require_env("TOKEN_NAME")?;
    let symbol = require_env("TOKEN_SYMBOL")?;
    let uri: String = env_or("TOKEN_URI", String::new())?;

    let instruction = create_metadata_instruction(
        &mint,
        &authority.pubkey(),
        &authority.pubkey(),
        &name,
        &symbol,
        &uri,
    );
    let signature = submitter
        .submit(&[instruction], &authority.pubkey(), &[&authority])
        .await
        .context("failed to create metadata")?;

    println!("Transaction: {}", config.explorer_link("tx", signature));
    println!("Look at the token mint again: {}", config.explorer_link("address", mint));
    Ok(())
}
