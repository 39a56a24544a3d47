use std::{fmt::Display, str::FromStr, time::Duration};

use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::{commitment_config::CommitmentConfig, pubkey::Pubkey};

use crate::error::{EscrowClientError, Result};

pub const DEFAULT_RPC_URL: &str = "https://api.devnet.solana.com";
pub const DEFAULT_CONFIRM_ATTEMPTS: u32 = 30;
pub const DEFAULT_CONFIRM_INTERVAL: Duration = Duration::from_millis(1_000);

/// How long to wait for a signature (or freshly created account) to become visible
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmPolicy {
    pub max_attempts: u32,
    pub poll_interval: Duration,
}

impl Default for ConfirmPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_CONFIRM_ATTEMPTS,
            poll_interval: DEFAULT_CONFIRM_INTERVAL,
        }
    }
}

/// Connection settings handed to every entry point
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub rpc_url: String,
    pub commitment: CommitmentConfig,
    pub program_id: Pubkey,
    pub confirm: ConfirmPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            rpc_url: DEFAULT_RPC_URL.to_string(),
            commitment: CommitmentConfig::confirmed(),
            program_id: offer_escrow::ID,
            confirm: ConfirmPolicy::default(),
        }
    }
}

impl ClientConfig {
    /// Load `.env` (if present) and read the process environment
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any key/value source.
    ///
    /// Recognised keys: `RPC_URL`, `COMMITMENT`, `ESCROW_PROGRAM_ID`,
    /// `CONFIRM_ATTEMPTS`, `CONFIRM_INTERVAL_MS`. Missing keys keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(url) = lookup("RPC_URL") {
            config.rpc_url = url;
        }
        if let Some(commitment) = lookup("COMMITMENT") {
            config.commitment = CommitmentConfig::from_str(&commitment)
                .map_err(|_| invalid("COMMITMENT", &commitment))?;
        }
        if let Some(program_id) = lookup("ESCROW_PROGRAM_ID") {
            config.program_id = parse_pubkey("ESCROW_PROGRAM_ID", &program_id)?;
        }
        if let Some(attempts) = lookup("CONFIRM_ATTEMPTS") {
            config.confirm.max_attempts = attempts
                .parse()
                .ok()
                .filter(|attempts| *attempts > 0)
                .ok_or_else(|| invalid("CONFIRM_ATTEMPTS", &attempts))?;
        }
        if let Some(interval) = lookup("CONFIRM_INTERVAL_MS") {
            let millis: u64 = interval
                .parse()
                .map_err(|_| invalid("CONFIRM_INTERVAL_MS", &interval))?;
            config.confirm.poll_interval = Duration::from_millis(millis);
        }

        Ok(config)
    }

    pub fn rpc_client(&self) -> RpcClient {
        RpcClient::new_with_commitment(self.rpc_url.clone(), self.commitment)
    }

    /// Explorer link for an address or transaction on the configured cluster
    pub fn explorer_link(&self, kind: &str, value: impl Display) -> String {
        let base = format!("https://explorer.solana.com/{kind}/{value}");
        if self.rpc_url.contains("devnet") {
            format!("{base}?cluster=devnet")
        } else if self.rpc_url.contains("testnet") {
            format!("{base}?cluster=testnet")
        } else if self.rpc_url.contains("mainnet") {
            base
        } else {
            format!("{base}?cluster=custom&customUrl={}", self.rpc_url)
        }
    }
}

/// Read a required public key from the environment
pub fn env_pubkey(key: &str) -> Result<Pubkey> {
    let value = require_env(key)?;
    parse_pubkey(key, &value)
}

/// Read a required integer from the environment
pub fn env_u64(key: &str) -> Result<u64> {
    let value = require_env(key)?;
    value.trim().parse().map_err(|_| invalid(key, &value))
}

/// Read an optional value from the environment, `default` when unset
pub fn env_or<T: FromStr>(key: &str, default: T) -> Result<T> {
    match std::env::var(key) {
        Ok(value) => value.trim().parse().map_err(|_| invalid(key, &value)),
        Err(_) => Ok(default),
    }
}

pub fn require_env(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| EscrowClientError::Config(format!("{key} is not set")))
}

fn parse_pubkey(key: &str, value: &str) -> Result<Pubkey> {
    Pubkey::from_str(value.trim()).map_err(|_| invalid(key, value))
}

fn invalid(key: &str, value: &str) -> EscrowClientError {
    EscrowClientError::Config(format!("invalid {key}: {value:?}"))
}
