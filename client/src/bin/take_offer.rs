//! Take the offer at `OFFER`, signed by `SECRET_KEY`.

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

    let taker = load_keypair("SECRET_KEY")?;
    let offer = env_pubkey("OFFER")?;

    let record = client.fetch_offer(&offer).await?;
    println!(
        "Offer {offer}: {} of {} for {} of {}",
        record.token_a_offered_amount,
        record.token_mint_a,
        record.token_b_wanted_amount,
        record.token_mint_b
    );

    let signature = client
        .take_offer_with_record(&offer, &record, &taker)
        .await
        .context("failed to take offer")?;
    println!("Offer taken: {}", config.explorer_link("tx", signature));
    Ok(())
}
