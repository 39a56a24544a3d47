use std::str::FromStr;

use serde::Deserialize;
use solana_client::{
    client_error::ClientError, nonblocking::rpc_client::RpcClient,
    rpc_config::RpcSendTransactionConfig, rpc_request::TokenAccountsFilter,
};
use solana_sdk::{
    account::Account,
    hash::Hash,
    pubkey::Pubkey,
    signature::Signature,
    transaction::{TransactionError, VersionedTransaction},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("RPC request failed: {0}")]
    Rpc(String),
    /// The node refused the transaction up front (preflight simulation failed)
    #[error("transaction rejected by the node: {0}")]
    Rejected(TransactionError),
    #[error("malformed RPC response: {0}")]
    Malformed(String),
}

impl From<ClientError> for NetworkError {
    fn from(err: ClientError) -> Self {
        match err.get_transaction_error() {
            Some(reason) => Self::Rejected(reason),
            None => Self::Rpc(err.to_string()),
        }
    }
}

/// Where a submitted signature stands at the requested commitment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignatureStatus {
    /// Unknown to the node, or seen below the requested commitment
    Pending,
    Confirmed,
    Failed(TransactionError),
}

/// A token account as reported by the node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenAccountEntry {
    pub address: Pubkey,
    pub mint: Pubkey,
    pub amount: u64,
    pub decimals: u8,
}

/// The RPC surface the client needs.
///
/// Implemented for the nonblocking [`RpcClient`]; tests implement it over an
/// in-memory ledger or a local SVM.
#[allow(async_fn_in_trait)]
pub trait Network {
    async fn get_account(&self, address: &Pubkey) -> Result<Option<Account>, NetworkError>;

    async fn get_balance(&self, address: &Pubkey) -> Result<u64, NetworkError>;

    async fn get_latest_blockhash(&self) -> Result<Hash, NetworkError>;

    async fn get_minimum_balance_for_rent_exemption(
        &self,
        data_len: usize,
    ) -> Result<u64, NetworkError>;

    async fn send_transaction(
        &self,
        transaction: &VersionedTransaction,
    ) -> Result<Signature, NetworkError>;

    async fn get_signature_status(
        &self,
        signature: &Signature,
    ) -> Result<SignatureStatus, NetworkError>;

    async fn request_airdrop(
        &self,
        address: &Pubkey,
        lamports: u64,
    ) -> Result<Signature, NetworkError>;

    async fn get_token_accounts_by_owner(
        &self,
        owner: &Pubkey,
        token_program: &Pubkey,
    ) -> Result<Vec<TokenAccountEntry>, NetworkError>;
}

impl Network for RpcClient {
    async fn get_account(&self, address: &Pubkey) -> Result<Option<Account>, NetworkError> {
        let response = self
            .get_account_with_commitment(address, self.commitment())
            .await?;
        Ok(response.value)
    }

    async fn get_balance(&self, address: &Pubkey) -> Result<u64, NetworkError> {
        Ok(RpcClient::get_balance(self, address).await?)
    }

    async fn get_latest_blockhash(&self) -> Result<Hash, NetworkError> {
        Ok(RpcClient::get_latest_blockhash(self).await?)
    }

    async fn get_minimum_balance_for_rent_exemption(
        &self,
        data_len: usize,
    ) -> Result<u64, NetworkError> {
        Ok(RpcClient::get_minimum_balance_for_rent_exemption(self, data_len).await?)
    }

    async fn send_transaction(
        &self,
        transaction: &VersionedTransaction,
    ) -> Result<Signature, NetworkError> {
        let config = RpcSendTransactionConfig {
            preflight_commitment: Some(self.commitment().commitment),
            ..RpcSendTransactionConfig::default()
        };
        Ok(self.send_transaction_with_config(transaction, config).await?)
    }

    async fn get_signature_status(
        &self,
        signature: &Signature,
    ) -> Result<SignatureStatus, NetworkError> {
        let response = self.get_signature_statuses(&[*signature]).await?;
        let status = match response.value.into_iter().next().flatten() {
            None => SignatureStatus::Pending,
            Some(status) => match status.err.clone() {
                Some(reason) => SignatureStatus::Failed(reason),
                None if status.satisfies_commitment(self.commitment()) => {
                    SignatureStatus::Confirmed
                }
                None => SignatureStatus::Pending,
            },
        };
        Ok(status)
    }

    async fn request_airdrop(
        &self,
        address: &Pubkey,
        lamports: u64,
    ) -> Result<Signature, NetworkError> {
        Ok(RpcClient::request_airdrop(self, address, lamports).await?)
    }

    async fn get_token_accounts_by_owner(
        &self,
        owner: &Pubkey,
        token_program: &Pubkey,
    ) -> Result<Vec<TokenAccountEntry>, NetworkError> {
        let keyed_accounts = RpcClient::get_token_accounts_by_owner(
            self,
            owner,
            TokenAccountsFilter::ProgramId(*token_program),
        )
        .await?;

        keyed_accounts
            .into_iter()
            .map(|keyed| {
                let address = Pubkey::from_str(&keyed.pubkey)
                    .map_err(|e| NetworkError::Malformed(format!("{}: {e}", keyed.pubkey)))?;
                let data = serde_json::to_value(&keyed.account.data)
                    .map_err(|e| NetworkError::Malformed(e.to_string()))?;
                parse_token_account(address, &data)
            })
            .collect()
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ParsedTokenAccountInfo {
    mint: String,
    token_amount: ParsedTokenAmount,
}

#[derive(Deserialize)]
struct ParsedTokenAmount {
    amount: String,
    decimals: u8,
}

/// Decode the `jsonParsed` data of a token account
pub fn parse_token_account(
    address: Pubkey,
    data: &serde_json::Value,
) -> Result<TokenAccountEntry, NetworkError> {
    let info = data
        .pointer("/parsed/info")
        .ok_or_else(|| NetworkError::Malformed(format!("{address}: not a parsed token account")))?;
    let info: ParsedTokenAccountInfo = serde_json::from_value(info.clone())
        .map_err(|e| NetworkError::Malformed(format!("{address}: {e}")))?;

    let mint = Pubkey::from_str(&info.mint)
        .map_err(|e| NetworkError::Malformed(format!("{address}: mint {e}")))?;
    let amount = info
        .token_amount
        .amount
        .parse()
        .map_err(|e| NetworkError::Malformed(format!("{address}: amount {e}")))?;

    Ok(TokenAccountEntry {
        address,
        mint,
        amount,
        decimals: info.token_amount.decimals,
    })
}
