//! Send SOL from `SECRET_KEY` to `RECIPIENT` with a memo attached.

use anyhow::{Context, Result};
use offer_escrow_client::{
    config::{env_or, env_pubkey},
    init_logging,
    token::memo_instruction,
    wallet::load_keypair,
    ClientConfig, Submitter,
};
use solana_sdk::{native_token::LAMPORTS_PER_SOL, signature::Signer, system_instruction};

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let config = ClientConfig::from_env()?;
    let rpc = config.rpc_client();
    let submitter = Submitter::new(&rpc, config.confirm);

    let sender = load_keypair("SECRET_KEY")?;
    let recipient = env_pubkey("RECIPIENT")?;
    let lamports: u64 = env_or("LAMPORTS", LAMPORTS_PER_SOL / 100)?;
    let memo: String = env_or("MEMO", "Rust Forever!".to_string())?;
    println!("Sender public key: {}", sender.pubkey());

    println!("Sending {lamports} lamports to {recipient} with memo {memo:?}");
    let instructions = [
        system_instruction::transfer(&sender.pubkey(), &recipient, lamports),
        memo_instruction(&memo, &[&sender.pubkey()]),
    ];
    let signature = submitter
        .submit(&instructions, &sender.pubkey(), &[&sender])
        .await
        .context("transfer failed")?;

    println!("Transaction confirmed: {}", config.explorer_link("tx", signature));
    Ok(())
}
