use std::time::{Duration, Instant};

use log::debug;
use solana_sdk::signature::{Keypair, Signer};

use crate::{
    config::require_env,
    error::{EscrowClientError, Result},
};

const BASE58_ALPHABET: &str = "123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

/// Load a keypair from an environment variable holding its 64-byte secret
/// key as a JSON array
pub fn load_keypair(var: &str) -> Result<Keypair> {
    let json = require_env(var)?;
    keypair_from_json(&json).map_err(|err| match err {
        EscrowClientError::Config(msg) => EscrowClientError::Config(format!("{var}: {msg}")),
        other => other,
    })
}

pub fn keypair_from_json(json: &str) -> Result<Keypair> {
    let bytes: Vec<u8> = serde_json::from_str(json.trim())
        .map_err(|e| EscrowClientError::Config(format!("secret key is not a JSON byte array: {e}")))?;
    Keypair::try_from(bytes.as_slice())
        .map_err(|e| EscrowClientError::Config(format!("invalid secret key: {e}")))
}

pub fn keypair_to_json(keypair: &Keypair) -> String {
    let bytes = keypair.to_bytes();
    // Serialising a byte slice cannot fail
    serde_json::to_string(bytes.as_slice()).unwrap_or_default()
}

#[derive(Debug)]
pub struct VanityMatch {
    pub keypair: Keypair,
    pub attempts: u64,
    pub elapsed: Duration,
}

/// Generate keypairs until one's address starts with `prefix`, ignoring case.
///
/// Returns `Ok(None)` when `max_attempts` keypairs were tried without a match.
pub fn find_vanity_keypair(prefix: &str, max_attempts: u64) -> Result<Option<VanityMatch>> {
    let prefix = prefix.to_lowercase();
    let alphabet = BASE58_ALPHABET.to_lowercase();
    if let Some(bad) = prefix.chars().find(|c| !alphabet.contains(*c)) {
        return Err(EscrowClientError::Config(format!(
            "{bad:?} can never appear in a base58 address"
        )));
    }

    let started = Instant::now();
    for attempts in 1..=max_attempts {
        let keypair = Keypair::new();
        if keypair.pubkey().to_string().to_lowercase().starts_with(&prefix) {
            return Ok(Some(VanityMatch {
                keypair,
                attempts,
                elapsed: started.elapsed(),
            }));
        }
    }

    debug!("No address starting with {prefix:?} in {max_attempts} attempts");
    Ok(None)
}
