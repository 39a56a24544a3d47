//! Offer `TOKEN_A_OFFERED_AMOUNT` of `TOKEN_MINT_A` for `TOKEN_B_WANTED_AMOUNT`
//! of `TOKEN_MINT_B`, signed by `SECRET_KEY`.

use anyhow::{Context, Result};
use offer_escrow_client::{
    config::{env_pubkey, env_u64},
    init_logging,
    wallet::load_keypair,
    ClientConfig, EscrowClient,
};

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let config = ClientConfig::from_env()?;
    let rpc = config.rpc_client();
    let client = EscrowClient::new(&rpc, &config);

    let maker = load_keypair("SECRET_KEY")?;
    let token_mint_a = env_pubkey("TOKEN_MINT_A")?;
    let token_mint_b = env_pubkey("TOKEN_MINT_B")?;
    let offered = env_u64("TOKEN_A_OFFERED_AMOUNT")?;
    let wanted = env_u64("TOKEN_B_WANTED_AMOUNT")?;

    let receipt = client
        .make_offer(&maker, &token_mint_a, &token_mint_b, offered, wanted)
        .await
        .context("failed to make offer")?;

    println!("Offer id: {}", receipt.offer_id);
    println!("Offer: {}", config.explorer_link("address", receipt.offer));
    println!("Vault: {}", config.explorer_link("address", receipt.vault));
    println!("Transaction: {}", config.explorer_link("tx", receipt.signature));
    Ok(())
}
