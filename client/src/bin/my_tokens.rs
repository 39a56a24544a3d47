//! List the token holdings of `WALLET_ADDRESS` under both token programs.

use anyhow::{Context, Result};
use offer_escrow_client::{
    config::env_pubkey,
    init_logging,
    portfolio::{enrich, list_holdings, TokenLabel},
    token::ui_amount,
    ClientConfig,
};

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let config = ClientConfig::from_env()?;
    let rpc = config.rpc_client();
    let owner = env_pubkey("WALLET_ADDRESS")?;

    let holdings = list_holdings(&rpc, &owner)
        .await
        .context("failed to list token accounts")?;
    if holdings.is_empty() {
        println!("No tokens found for {owner}");
        return Ok(());
    }

    for entry in enrich(&rpc, holdings).await {
        let (name, symbol) = match &entry.label {
            TokenLabel::Known { name, symbol } => (name.as_str(), symbol.as_str()),
            TokenLabel::Unknown => ("Unknown Token", "Unknown Symbol"),
        };
        let holding = &entry.holding;

        println!("Token Mint: {}", holding.mint);
        println!("Account Address: {}", holding.account);
        println!("Name: {name}");
        println!("Symbol: {symbol}");
        println!("Balance: {}", ui_amount(holding.amount, holding.decimals));
        println!("Standard: {}", holding.program.label());
        println!();
    }
    Ok(())
}
