//! Close the unfulfilled offer at `OFFER` and refund the maker (`SECRET_KEY`).

use anyhow::{Context, Result};
use offer_escrow_client::{
    config::env_pubkey, init_logging, wallet::load_keypair, ClientConfig, EscrowClient,
};

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let config = ClientConfig::from_env()?;
    let rpc = config.rpc_client();
    let client = EscrowClient::new(&rpc, &config);

    let maker = load_keypair("SECRET_KEY")?;
    let offer = env_pubkey("OFFER")?;

    let signature = client
        .close_offer(&offer, &maker)
        .await
        .context("failed to close offer")?;
    println!("Offer closed: {}", config.explorer_link("tx", signature));
    Ok(())
}
