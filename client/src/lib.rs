//! Client for the `offer_escrow` program.
//!
//! The escrow side (address derivation, token-program resolution, offer
//! construction/fulfillment/cancellation, transaction submission) sits on top of
//! the [`Network`] trait so it runs the same against a live RPC node or a local
//! test harness. The remaining modules back the wallet, token, durable-nonce and
//! portfolio scripts under `src/bin/`.

pub mod address;
pub mod config;
pub mod error;
pub mod network;
pub mod nonce;
pub mod offer;
pub mod portfolio;
pub mod submit;
pub mod token;
pub mod token_program;
pub mod wallet;

pub use config::{ClientConfig, ConfirmPolicy};
pub use error::{EscrowClientError, Result};
pub use network::{Network, NetworkError, SignatureStatus, TokenAccountEntry};
pub use offer::{EscrowClient, OfferReceipt};
pub use submit::Submitter;
pub use token_program::TokenProgramKind;

/// Initialise `env_logger` from `RUST_LOG`, defaulting to `info`.
pub fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
}
