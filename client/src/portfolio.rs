use std::collections::{BTreeSet, HashMap};

use anchor_spl::metadata::mpl_token_metadata::{self, accounts::Metadata};
use futures::future::join_all;
use log::{debug, warn};
use solana_sdk::pubkey::Pubkey;

use crate::{
    error::Result,
    network::{Network, TokenAccountEntry},
    token::metadata_address,
    token_program::TokenProgramKind,
};

/// A non-empty token account of the owner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenHolding {
    pub account: Pubkey,
    pub mint: Pubkey,
    pub amount: u64,
    pub decimals: u8,
    pub program: TokenProgramKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenLabel {
    Known { name: String, symbol: String },
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabeledHolding {
    pub holding: TokenHolding,
    pub label: TokenLabel,
}

/// Token accounts of `owner` under both token programs, zero balances dropped
pub async fn list_holdings<N: Network>(network: &N, owner: &Pubkey) -> Result<Vec<TokenHolding>> {
    let classic = TokenProgramKind::Classic;
    let extended = TokenProgramKind::Extended;
    let (classic_id, extended_id) = (classic.program_id(), extended.program_id());
    let (classic_accounts, extended_accounts) = tokio::try_join!(
        network.get_token_accounts_by_owner(owner, &classic_id),
        network.get_token_accounts_by_owner(owner, &extended_id),
    )?;

    let holdings: Vec<TokenHolding> = classic_accounts
        .into_iter()
        .map(|entry| (entry, classic))
        .chain(extended_accounts.into_iter().map(|entry| (entry, extended)))
        .filter(|(entry, _)| entry.amount > 0)
        .map(|(entry, program)| holding(entry, program))
        .collect();

    debug!("{owner} holds {} non-empty token accounts", holdings.len());
    Ok(holdings)
}

fn holding(entry: TokenAccountEntry, program: TokenProgramKind) -> TokenHolding {
    TokenHolding {
        account: entry.address,
        mint: entry.mint,
        amount: entry.amount,
        decimals: entry.decimals,
        program,
    }
}

/// Name and symbol from the mint's metadata account. Never fails: a missing
/// or unreadable account is `Unknown`.
pub async fn fetch_label<N: Network>(network: &N, mint: &Pubkey) -> TokenLabel {
    let address = metadata_address(mint);
    let account = match network.get_account(&address).await {
        Ok(Some(account)) if account.owner == mpl_token_metadata::ID => account,
        Ok(_) => {
            debug!("No metadata for mint {mint}");
            return TokenLabel::Unknown;
        }
        Err(err) => {
            warn!("Metadata lookup for mint {mint} failed: {err}");
            return TokenLabel::Unknown;
        }
    };

    match Metadata::from_bytes(&account.data) {
        Ok(metadata) => label(&metadata.name, &metadata.symbol),
        Err(err) => {
            warn!("Metadata of mint {mint} does not decode: {err}");
            TokenLabel::Unknown
        }
    }
}

/// Metadata strings are stored NUL padded to a fixed width
fn label(name: &str, symbol: &str) -> TokenLabel {
    let name = name.trim_end_matches('\0').trim();
    let symbol = symbol.trim_end_matches('\0').trim();
    if name.is_empty() {
        return TokenLabel::Unknown;
    }
    TokenLabel::Known {
        name: name.to_string(),
        symbol: symbol.to_string(),
    }
}

/// Attach a label to every holding, looking each distinct mint up once
pub async fn enrich<N: Network>(network: &N, holdings: Vec<TokenHolding>) -> Vec<LabeledHolding> {
    let mints: Vec<Pubkey> = holdings
        .iter()
        .map(|holding| holding.mint)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let labels = join_all(mints.iter().map(|mint| fetch_label(network, mint))).await;
    let labels: HashMap<Pubkey, TokenLabel> = mints.into_iter().zip(labels).collect();

    holdings
        .into_iter()
        .map(|holding| {
            let label = labels
                .get(&holding.mint)
                .cloned()
                .unwrap_or(TokenLabel::Unknown);
            LabeledHolding { holding, label }
        })
        .collect()
}
