//! Create a new mint with `SECRET_KEY` as mint authority.

use anyhow::{Context, Result};
use offer_escrow_client::{
    config::env_or, init_logging, token::create_mint, wallet::load_keypair, ClientConfig,
    Submitter, TokenProgramKind,
};
use solana_sdk::signature::{Keypair, Signer};

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let config = ClientConfig::from_env()?;
    let rpc = config.rpc_client();
    let submitter = Submitter::new(&rpc, config.confirm);

    let payer = load_keypair("SECRET_KEY")?;
    let decimals: u8 = env_or("DECIMALS", 2)?;
    let program: TokenProgramKind = env_or("TOKEN_PROGRAM", TokenProgramKind::Classic)?;
    println!("Our public key: {}", payer.pubkey());

    let mint = Keypair::new();
    create_mint(
        &submitter,
        &payer,
        &mint,
        &payer.pubkey(),
        decimals,
        &program.program_id(),
    )
        .await
        .context("failed to create mint")?;

    println!(
        "Token mint ({}): {}",
        program.label(),
        config.explorer_link("address", mint.pubkey())
    );
    Ok(())
}
