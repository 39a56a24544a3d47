//! Send tokens with the receiver paying the fee.
//!
//! The sender signs first and hands the transaction over through a file; the
//! receiver completes and submits it. With `--nonce` the transaction uses a
//! fresh durable nonce (authority: the receiver) instead of a recent
//! blockhash, so the hand-off may take arbitrarily long.

use std::path::PathBuf;

use anyhow::{Context, Result};
use offer_escrow_client::{
    address::derive_associated_account,
    config::{env_or, env_pubkey, env_u64},
    init_logging,
    nonce::{
        build_nonce_transfer, build_recipient_pays_transfer, complete_and_submit,
        create_nonce_account_instructions, load_partially_signed, nonce_account_size,
        save_partially_signed, wait_for_nonce,
    },
    token::{
        create_associated_account_instruction, mint_info, token_balance,
        transfer_checked_instruction, ui_amount, MintInfo,
    },
    wallet::load_keypair,
    ClientConfig, Network, Submitter,
};
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::{
    native_token::LAMPORTS_PER_SOL,
    pubkey::Pubkey,
    signature::{Keypair, Signer},
};

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let config = ClientConfig::from_env()?;
    let rpc = config.rpc_client();
    let submitter = Submitter::new(&rpc, config.confirm);
    let use_nonce = std::env::args().any(|arg| arg == "--nonce");

    let sender = load_keypair("SENDER_SECRET_KEY")?;
    let receiver = load_keypair("RECEIVER_SECRET_KEY")?;
    let mint = env_pubkey("MINT")?;
    let tx_file: PathBuf = env_or("TX_FILE", PathBuf::from("transfer_tx.bin"))?;

    let info = mint_info(&rpc, &mint).await.context("failed to read mint")?;
    println!("Token {mint}: decimals {}, supply {}", info.decimals, info.supply);
    // Three whole tokens unless AMOUNT says otherwise
    let three_tokens = 10u64
        .checked_pow(info.decimals as u32)
        .and_then(|unit| unit.checked_mul(3));
    let amount = match three_tokens {
        Some(default) => env_or("AMOUNT", default)?,
        None => env_u64("AMOUNT").with_context(|| {
            format!("3 tokens at {} decimals overflow u64, AMOUNT is required", info.decimals)
        })?,
    };

    let sender_account = derive_associated_account(&mint, &sender.pubkey(), &info.program);
    let receiver_account = derive_associated_account(&mint, &receiver.pubkey(), &info.program);
    submitter
        .submit(
            &[
                create_associated_account_instruction(
                    &receiver.pubkey(),
                    &sender.pubkey(),
                    &mint,
                    &info.program,
                ),
                create_associated_account_instruction(
                    &receiver.pubkey(),
                    &receiver.pubkey(),
                    &mint,
                    &info.program,
                ),
            ],
            &receiver.pubkey(),
            &[&receiver],
        )
        .await
        .context("failed to prepare token accounts")?;

    print_balances(&rpc, "Sender (before)", &sender.pubkey(), &sender_account, &info).await?;
    print_balances(&rpc, "Receiver (before)", &receiver.pubkey(), &receiver_account, &info).await?;

    let transfer = transfer_checked_instruction(
        &info.program,
        &sender_account,
        &mint,
        &receiver_account,
        &sender.pubkey(),
        &[],
        amount,
        info.decimals,
    )?;
    println!(
        "Transferring {} tokens ({amount} raw units)",
        ui_amount(amount, info.decimals)
    );

    let partial = if use_nonce {
        let nonce_account = Keypair::new();
        let lamports = rpc
            .get_minimum_balance_for_rent_exemption(nonce_account_size())
            .await
            .context("failed to read nonce rent")?;
        submitter
            .submit(
                &create_nonce_account_instructions(
                    &receiver.pubkey(),
                    &nonce_account.pubkey(),
                    &receiver.pubkey(),
                    lamports,
                ),
                &receiver.pubkey(),
                &[&receiver, &nonce_account],
            )
            .await
            .context("failed to create nonce account")?;
        println!("Nonce account created: {}", nonce_account.pubkey());

        let nonce = wait_for_nonce(&rpc, &nonce_account.pubkey(), config.confirm)
            .await
            .context("nonce account never became visible")?;
        build_nonce_transfer(
            &[transfer],
            &nonce_account.pubkey(),
            &receiver.pubkey(),
            &receiver.pubkey(),
            nonce,
            &[&sender],
        )?
    } else {
        let blockhash = rpc
            .get_latest_blockhash()
            .await
            .context("failed to fetch blockhash")?;
        build_recipient_pays_transfer(&[transfer], &receiver.pubkey(), blockhash, &[&sender])?
    };

    save_partially_signed(&tx_file, &partial)?;
    println!("Partially signed by the sender, saved to {}", tx_file.display());

    let loaded = load_partially_signed(&tx_file)?;
    let signature = complete_and_submit(&submitter, loaded, &[&receiver])
        .await
        .context("receiver failed to complete the transfer")?;
    println!("Transaction confirmed: {}", config.explorer_link("tx", signature));

    print_balances(&rpc, "Sender (after)", &sender.pubkey(), &sender_account, &info).await?;
    print_balances(&rpc, "Receiver (after)", &receiver.pubkey(), &receiver_account, &info).await?;
    Ok(())
}

async fn print_balances(
    rpc: &RpcClient,
    label: &str,
    wallet: &Pubkey,
    token_account: &Pubkey,
    info: &MintInfo,
) -> Result<()> {
    let (lamports, tokens) = tokio::join!(
        Network::get_balance(rpc, wallet),
        token_balance(rpc, token_account),
    );
    let lamports = lamports.with_context(|| format!("failed to read balance of {wallet}"))?;
    let tokens = tokens.with_context(|| format!("failed to read {token_account}"))?;

    println!("[{label}]");
    println!("  Wallet: {wallet}");
    println!("  SOL balance: {} SOL", lamports as f64 / LAMPORTS_PER_SOL as f64);
    println!(
        "  Token balance: {} tokens",
        ui_amount(tokens.unwrap_or(0), info.decimals)
    );
    Ok(())
}
