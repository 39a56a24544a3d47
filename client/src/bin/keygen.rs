//! Generate a keypair whose address starts with a chosen prefix.
//!
//! Prefix: first argument, else `VANITY_PREFIX`, else "anza".

use anyhow::{Context, Result};
use offer_escrow_client::{
    config::env_or,
    init_logging,
    wallet::{find_vanity_keypair, keypair_to_json},
};
use solana_sdk::signature::Signer;

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_logging();

    let prefix = match std::env::args().nth(1) {
        Some(prefix) => prefix,
        None => env_or("VANITY_PREFIX", "anza".to_string())?,
    };
    let max_attempts: u64 = env_or("VANITY_MAX_ATTEMPTS", 50_000_000)?;

    println!("Searching for an address starting with {prefix:?}...");
    let found = find_vanity_keypair(&prefix, max_attempts)?
        .with_context(|| format!("no match for {prefix:?} in {max_attempts} attempts"))?;

    println!("Found in {} attempts!", found.attempts);
    println!("Time taken: {:.2} seconds", found.elapsed.as_secs_f64());
    println!("Public address: {}", found.keypair.pubkey());
    println!("Secret key: {}", keypair_to_json(&found.keypair));
    Ok(())
}
