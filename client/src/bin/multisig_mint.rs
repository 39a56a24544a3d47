//! Mint under a 2-of-2 multisig authority.
//!
//! `PAYER_SECRET_KEY` funds everything; `SIGNER1_SECRET_KEY` and
//! `SIGNER2_SECRET_KEY` are the multisig members and both sign the mint.

use anyhow::{Context, Result};
use offer_escrow_client::{
    address::derive_associated_account,
    config::env_or,
    init_logging,
    token::{
        create_associated_account_instruction, create_mint, create_multisig, mint_to_instruction,
        ui_amount,
    },
    wallet::load_keypair,
    ClientConfig, Submitter, TokenProgramKind,
};
use solana_sdk::signature::{Keypair, Signer};

const DECIMALS: u8 = 2;

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let config = ClientConfig::from_env()?;
    let rpc = config.rpc_client();
    let submitter = Submitter::new(&rpc, config.confirm);

    let payer = load_keypair("PAYER_SECRET_KEY")?;
    let signer1 = load_keypair("SIGNER1_SECRET_KEY")?;
    let signer2 = load_keypair("SIGNER2_SECRET_KEY")?;
    let program: TokenProgramKind = env_or("TOKEN_PROGRAM", TokenProgramKind::Classic)?;
    let token_program = program.program_id();
    println!("Payer public key: {}", payer.pubkey());
    println!("Signer 1 public key: {}", signer1.pubkey());
    println!("Signer 2 public key: {}", signer2.pubkey());

    let multisig = Keypair::new();
    create_multisig(
        &submitter,
        &payer,
        &multisig,
        &[&signer1.pubkey(), &signer2.pubkey()],
        2,
        &token_program,
    )
    .await
    .context("failed to create multisig")?;
    println!("Multisig created: {}", config.explorer_link("address", multisig.pubkey()));

    let mint = Keypair::new();
    create_mint(
        &submitter,
        &payer,
        &mint,
        &multisig.pubkey(),
        DECIMALS,
        &token_program,
    )
    .await
    .context("failed to create mint")?;
    println!("Token mint created: {}", config.explorer_link("address", mint.pubkey()));

    let destination = derive_associated_account(&mint.pubkey(), &signer1.pubkey(), &token_program);
    let amount = 10 * 10u64.pow(DECIMALS as u32);
    println!(
        "Minting {} tokens to {destination}",
        ui_amount(amount, DECIMALS)
    );

    let instructions = [
        create_associated_account_instruction(
            &payer.pubkey(),
            &signer1.pubkey(),
            &mint.pubkey(),
            &token_program,
        ),
        mint_to_instruction(
            &token_program,
            &mint.pubkey(),
            &destination,
            &multisig.pubkey(),
            &[&signer1.pubkey(), &signer2.pubkey()],
            amount,
        )?,
    ];
    let signature = submitter
        .submit(&instructions, &payer.pubkey(), &[&payer, &signer1, &signer2])
        .await
        .context("multisig mint failed")?;

    println!("Tokens minted: {}", config.explorer_link("tx", signature));
    Ok(())
}
