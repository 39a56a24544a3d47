use log::{debug, info, warn};
use solana_sdk::{
    hash::Hash,
    instruction::Instruction,
    message::{v0, VersionedMessage},
    pubkey::Pubkey,
    signature::{Signature, Signer},
    transaction::VersionedTransaction,
};

use crate::{
    config::ConfirmPolicy,
    error::{EscrowClientError, Result},
    network::{Network, NetworkError, SignatureStatus},
};

/// Builds, signs, sends and confirms transactions.
///
/// Confirmation is polled a bounded number of times; running out of attempts
/// yields [`EscrowClientError::SubmissionFailure`], which means "unknown
/// outcome", not "failed".
pub struct Submitter<'a, N> {
    network: &'a N,
    policy: ConfirmPolicy,
}

impl<'a, N: Network> Submitter<'a, N> {
    pub fn new(network: &'a N, policy: ConfirmPolicy) -> Self {
        Self { network, policy }
    }

    pub fn network(&self) -> &'a N {
        self.network
    }

    pub fn policy(&self) -> ConfirmPolicy {
        self.policy
    }

    /// Compile `instructions` into a v0 transaction bound to the latest
    /// blockhash, sign, send and wait for confirmation
    pub async fn submit(
        &self,
        instructions: &[Instruction],
        payer: &Pubkey,
        signers: &[&dyn Signer],
    ) -> Result<Signature> {
        let blockhash = self.network.get_latest_blockhash().await?;
        let transaction = build_transaction(instructions, payer, signers, blockhash)?;
        self.submit_transaction(&transaction).await
    }

    /// Send an already signed transaction and wait for confirmation
    pub async fn submit_transaction(&self, transaction: &VersionedTransaction) -> Result<Signature> {
        let signature = match self.network.send_transaction(transaction).await {
            Ok(signature) => signature,
            Err(NetworkError::Rejected(reason)) => {
                return Err(EscrowClientError::TransactionRejected { reason })
            }
            Err(err) => return Err(err.into()),
        };
        info!("Submitted transaction {signature}");

        self.confirm(&signature).await?;
        Ok(signature)
    }

    /// Poll the status of `signature` until it is confirmed, fails, or the
    /// attempts run out
    pub async fn confirm(&self, signature: &Signature) -> Result<()> {
        let attempts = self.policy.max_attempts;

        for attempt in 1..=attempts {
            match self.network.get_signature_status(signature).await {
                Ok(SignatureStatus::Confirmed) => {
                    info!("Transaction {signature} confirmed");
                    return Ok(());
                }
                Ok(SignatureStatus::Failed(reason)) => {
                    return Err(EscrowClientError::TransactionRejected { reason });
                }
                Ok(SignatureStatus::Pending) => {
                    debug!("Transaction {signature} pending ({attempt}/{attempts})");
                }
                // Already sent: a failed status read says nothing about the outcome
                Err(err) => {
                    warn!("Status check {attempt}/{attempts} for {signature} failed: {err}");
                }
            }

            if attempt < attempts {
                tokio::time::sleep(self.policy.poll_interval).await;
            }
        }

        Err(EscrowClientError::SubmissionFailure {
            signature: *signature,
            attempts,
        })
    }
}

/// Compile and sign a v0 transaction
pub fn build_transaction(
    instructions: &[Instruction],
    payer: &Pubkey,
    signers: &[&dyn Signer],
    blockhash: Hash,
) -> Result<VersionedTransaction> {
    let message = v0::Message::try_compile(payer, instructions, &[], blockhash)
        .map_err(|e| EscrowClientError::Build(e.to_string()))?;

    VersionedTransaction::try_new(VersionedMessage::V0(message), signers)
        .map_err(|e| EscrowClientError::Build(e.to_string()))
}
