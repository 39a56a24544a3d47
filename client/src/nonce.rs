//! Durable-nonce transactions and offline (partial) signing.
//!
//! A transaction whose blockhash is a stored nonce does not expire, so one
//! party can sign it, hand the bytes over through a file, and another party
//! can add its signature and submit it later.

use std::path::Path;

use log::{debug, info};
use solana_client::nonce_utils::data_from_account;
use solana_sdk::{
    hash::Hash,
    instruction::Instruction,
    nonce::state::State as NonceState,
    pubkey::Pubkey,
    signature::{Signature, Signer},
    system_instruction,
    transaction::{Transaction, VersionedTransaction},
};

use crate::{
    config::ConfirmPolicy,
    error::{EscrowClientError, Result},
    network::Network,
    submit::Submitter,
};

/// Space of a nonce account
pub fn nonce_account_size() -> usize {
    NonceState::size()
}

pub fn create_nonce_account_instructions(
    payer: &Pubkey,
    nonce_account: &Pubkey,
    authority: &Pubkey,
    lamports: u64,
) -> Vec<Instruction> {
    system_instruction::create_nonce_account(payer, nonce_account, authority, lamports)
}

/// Poll until `nonce_account` exists and is initialised, returning the
/// stored nonce
pub async fn wait_for_nonce<N: Network>(
    network: &N,
    nonce_account: &Pubkey,
    policy: ConfirmPolicy,
) -> Result<Hash> {
    for attempt in 1..=policy.max_attempts {
        if let Some(account) = network.get_account(nonce_account).await? {
            match data_from_account(&account) {
                Ok(data) => {
                    debug!("Nonce account {nonce_account} ready after {attempt} reads");
                    return Ok(data.blockhash());
                }
                Err(err) => debug!("Nonce account {nonce_account} not usable yet: {err}"),
            }
        }

        if attempt < policy.max_attempts {
            tokio::time::sleep(policy.poll_interval).await;
        }
    }

    Err(EscrowClientError::Lookup {
        address: *nonce_account,
    })
}

/// Legacy transaction that advances `nonce_account` first and uses
/// `nonce_hash` as its blockhash, partially signed by `signers`
pub fn build_nonce_transfer(
    instructions: &[Instruction],
    nonce_account: &Pubkey,
    nonce_authority: &Pubkey,
    fee_payer: &Pubkey,
    nonce_hash: Hash,
    signers: &[&dyn Signer],
) -> Result<Transaction> {
    let mut all = Vec::with_capacity(instructions.len() + 1);
    all.push(system_instruction::advance_nonce_account(
        nonce_account,
        nonce_authority,
    ));
    all.extend_from_slice(instructions);

    partially_signed(&all, fee_payer, nonce_hash, signers)
}

/// Same hand-off without a nonce: valid only until `blockhash` expires
pub fn build_recipient_pays_transfer(
    instructions: &[Instruction],
    fee_payer: &Pubkey,
    blockhash: Hash,
    signers: &[&dyn Signer],
) -> Result<Transaction> {
    partially_signed(instructions, fee_payer, blockhash, signers)
}

fn partially_signed(
    instructions: &[Instruction],
    fee_payer: &Pubkey,
    blockhash: Hash,
    signers: &[&dyn Signer],
) -> Result<Transaction> {
    let mut transaction = Transaction::new_with_payer(instructions, Some(fee_payer));
    transaction
        .try_partial_sign(signers, blockhash)
        .map_err(|e| EscrowClientError::PartialTransaction(e.to_string()))?;
    Ok(transaction)
}

pub fn save_partially_signed(path: &Path, transaction: &Transaction) -> Result<()> {
    let bytes = bincode::serialize(transaction)
        .map_err(|e| EscrowClientError::PartialTransaction(e.to_string()))?;
    std::fs::write(path, bytes).map_err(|e| {
        EscrowClientError::PartialTransaction(format!("writing {}: {e}", path.display()))
    })?;

    info!("Partially signed transaction saved to {}", path.display());
    Ok(())
}

pub fn load_partially_signed(path: &Path) -> Result<Transaction> {
    let bytes = std::fs::read(path).map_err(|e| {
        EscrowClientError::PartialTransaction(format!("reading {}: {e}", path.display()))
    })?;
    bincode::deserialize(&bytes).map_err(|e| {
        EscrowClientError::PartialTransaction(format!("decoding {}: {e}", path.display()))
    })
}

/// Add the remaining signatures and submit
pub async fn complete_and_submit<N: Network>(
    submitter: &Submitter<'_, N>,
    mut transaction: Transaction,
    signers: &[&dyn Signer],
) -> Result<Signature> {
    let blockhash = transaction.message.recent_blockhash;
    transaction
        .try_partial_sign(signers, blockhash)
        .map_err(|e| EscrowClientError::PartialTransaction(e.to_string()))?;

    if !transaction.is_signed() {
        return Err(EscrowClientError::PartialTransaction(
            "transaction is still missing signatures".to_string(),
        ));
    }

    submitter
        .submit_transaction(&VersionedTransaction::from(transaction))
        .await
}
