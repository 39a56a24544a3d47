//! Top up `WALLET_ADDRESS` from the faucet when it runs low, then print its balance.

use anyhow::{Context, Result};
use offer_escrow_client::{
    config::env_pubkey, init_logging, token::airdrop_if_required, ClientConfig, Submitter,
};
use solana_sdk::native_token::LAMPORTS_PER_SOL;

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let config = ClientConfig::from_env()?;
    let rpc = config.rpc_client();
    let submitter = Submitter::new(&rpc, config.confirm);
    println!("Connected to {}", config.rpc_url);

    let address = env_pubkey("WALLET_ADDRESS")?;

    match airdrop_if_required(&submitter, &address, LAMPORTS_PER_SOL, LAMPORTS_PER_SOL / 2)
        .await
        .context("airdrop failed")?
    {
        Some(signature) => println!("Airdrop: {signature}"),
        None => println!("Airdrop: not needed"),
    }

    let balance = rpc
        .get_balance(&address)
        .await
        .context("failed to read balance")?;
    println!(
        "The balance for the wallet at address {address} is: {} SOL",
        balance as f64 / LAMPORTS_PER_SOL as f64
    );
    Ok(())
}
