//! Token-program instruction builders and reads shared by the scripts.
//!
//! Builders go through the Token-2022 instruction encoders, which accept
//! either token program id, so one set of functions serves both variants.

use anchor_spl::{
    associated_token::spl_associated_token_account::instruction::create_associated_token_account_idempotent,
    memo::spl_memo,
    metadata::mpl_token_metadata::{
        accounts::Metadata,
        instructions::{CreateMetadataAccountV3, CreateMetadataAccountV3InstructionArgs},
        types::DataV2,
    },
    token_2022::spl_token_2022::{
        self,
        extension::StateWithExtensions,
        state::{Account as TokenAccount, Mint, Multisig},
    },
};
use log::{debug, info};
use solana_sdk::{
    instruction::Instruction,
    program_pack::Pack,
    pubkey::Pubkey,
    signature::{Keypair, Signature, Signer},
    system_instruction, system_program,
};

use crate::{
    error::{EscrowClientError, Result},
    network::Network,
    submit::Submitter,
    token_program::resolve_token_program,
};

/// Decoded base state of a mint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MintInfo {
    pub program: Pubkey,
    pub decimals: u8,
    pub supply: u64,
}

/// Allocate and initialise a mint account
pub fn create_mint_instructions(
    payer: &Pubkey,
    mint: &Pubkey,
    mint_authority: &Pubkey,
    freeze_authority: Option<&Pubkey>,
    decimals: u8,
    lamports: u64,
    token_program: &Pubkey,
) -> Result<Vec<Instruction>> {
    let initialize = spl_token_2022::instruction::initialize_mint2(
        token_program,
        mint,
        mint_authority,
        freeze_authority,
        decimals,
    )
    .map_err(build_error)?;

    Ok(vec![
        system_instruction::create_account(payer, mint, lamports, Mint::LEN as u64, token_program),
        initialize,
    ])
}

/// Create `owner`'s associated account for `mint`; a no-op if it exists
pub fn create_associated_account_instruction(
    payer: &Pubkey,
    owner: &Pubkey,
    mint: &Pubkey,
    token_program: &Pubkey,
) -> Instruction {
    create_associated_token_account_idempotent(payer, owner, mint, token_program)
}

/// Mint `amount` to `destination`. `signers` is empty for a single authority
/// and lists the co-signers when `authority` is a multisig account.
pub fn mint_to_instruction(
    token_program: &Pubkey,
    mint: &Pubkey,
    destination: &Pubkey,
    authority: &Pubkey,
    signers: &[&Pubkey],
    amount: u64,
) -> Result<Instruction> {
    spl_token_2022::instruction::mint_to(token_program, mint, destination, authority, signers, amount)
        .map_err(build_error)
}

#[allow(clippy::too_many_arguments)]
pub fn transfer_checked_instruction(
    token_program: &Pubkey,
    source: &Pubkey,
    mint: &Pubkey,
    destination: &Pubkey,
    authority: &Pubkey,
    signers: &[&Pubkey],
    amount: u64,
    decimals: u8,
) -> Result<Instruction> {
    spl_token_2022::instruction::transfer_checked(
        token_program,
        source,
        mint,
        destination,
        authority,
        signers,
        amount,
        decimals,
    )
    .map_err(build_error)
}

/// Allocate and initialise an `m`-of-`signers.len()` multisig account
pub fn create_multisig_instructions(
    payer: &Pubkey,
    multisig: &Pubkey,
    signers: &[&Pubkey],
    m: u8,
    lamports: u64,
    token_program: &Pubkey,
) -> Result<Vec<Instruction>> {
    let initialize =
        spl_token_2022::instruction::initialize_multisig2(token_program, multisig, signers, m)
            .map_err(build_error)?;

    Ok(vec![
        system_instruction::create_account(
            payer,
            multisig,
            lamports,
            Multisig::LEN as u64,
            token_program,
        ),
        initialize,
    ])
}

/// Metaplex metadata account address of `mint`
pub fn metadata_address(mint: &Pubkey) -> Pubkey {
    Metadata::find_pda(mint).0
}

pub fn create_metadata_instruction(
    mint: &Pubkey,
    mint_authority: &Pubkey,
    payer: &Pubkey,
    name: &str,
    symbol: &str,
    uri: &str,
) -> Instruction {
    CreateMetadataAccountV3 {
        metadata: metadata_address(mint),
        mint: *mint,
        mint_authority: *mint_authority,
        payer: *payer,
        update_authority: (*mint_authority, true),
        system_program: system_program::ID,
        rent: None,
    }
    .instruction(CreateMetadataAccountV3InstructionArgs {
        data: DataV2 {
            name: name.to_string(),
            symbol: symbol.to_string(),
            uri: uri.to_string(),
            seller_fee_basis_points: 0,
            creators: None,
            collection: None,
            uses: None,
        },
        is_mutable: true,
        collection_details: None,
    })
}

pub fn memo_instruction(memo: &str, signers: &[&Pubkey]) -> Instruction {
    spl_memo::build_memo(memo.as_bytes(), signers)
}

pub async fn mint_info<N: Network>(network: &N, mint: &Pubkey) -> Result<MintInfo> {
    let program = resolve_token_program(network, mint).await?;
    let account = network
        .get_account(mint)
        .await?
        .ok_or(EscrowClientError::Lookup { address: *mint })?;
    let state = StateWithExtensions::<Mint>::unpack(&account.data).map_err(|_| {
        EscrowClientError::NotATokenMint {
            mint: *mint,
            owner: account.owner,
        }
    })?;

    Ok(MintInfo {
        program,
        decimals: state.base.decimals,
        supply: state.base.supply,
    })
}

/// Balance of a token account, `None` if the account does not exist
pub async fn token_balance<N: Network>(network: &N, account: &Pubkey) -> Result<Option<u64>> {
    let Some(data) = network.get_account(account).await?.map(|account| account.data) else {
        debug!("Token account {account} does not exist");
        return Ok(None);
    };
    let state = StateWithExtensions::<TokenAccount>::unpack(&data)
        .map_err(|_| EscrowClientError::Lookup { address: *account })?;
    Ok(Some(state.base.amount))
}

/// Airdrop `amount` lamports when the balance is below `min_balance` and wait
/// for the airdrop to confirm
pub async fn airdrop_if_required<N: Network>(
    submitter: &Submitter<'_, N>,
    address: &Pubkey,
    amount: u64,
    min_balance: u64,
) -> Result<Option<Signature>> {
    let network = submitter.network();
    let balance = network.get_balance(address).await?;
    if balance >= min_balance {
        debug!("{address} holds {balance} lamports, no airdrop needed");
        return Ok(None);
    }

    info!("Requesting airdrop of {amount} lamports to {address}");
    let signature = network.request_airdrop(address, amount).await?;
    submitter.confirm(&signature).await?;
    Ok(Some(signature))
}

/// Create and initialise `mint` (no freeze authority)
pub async fn create_mint<N: Network>(
    submitter: &Submitter<'_, N>,
    payer: &Keypair,
    mint: &Keypair,
    mint_authority: &Pubkey,
    decimals: u8,
    token_program: &Pubkey,
) -> Result<Signature> {
    let lamports = submitter
        .network()
        .get_minimum_balance_for_rent_exemption(Mint::LEN)
        .await?;
    let instructions = create_mint_instructions(
        &payer.pubkey(),
        &mint.pubkey(),
        mint_authority,
        None,
        decimals,
        lamports,
        token_program,
    )?;

    submitter
        .submit(&instructions, &payer.pubkey(), &[payer, mint])
        .await
}

/// Create an `m`-of-`signers.len()` multisig authority account
pub async fn create_multisig<N: Network>(
    submitter: &Submitter<'_, N>,
    payer: &Keypair,
    multisig: &Keypair,
    signers: &[&Pubkey],
    m: u8,
    token_program: &Pubkey,
) -> Result<Signature> {
    let lamports = submitter
        .network()
        .get_minimum_balance_for_rent_exemption(Multisig::LEN)
        .await?;
    let instructions = create_multisig_instructions(
        &payer.pubkey(),
        &multisig.pubkey(),
        signers,
        m,
        lamports,
        token_program,
    )?;

    submitter
        .submit(&instructions, &payer.pubkey(), &[payer, multisig])
        .await
}

/// Format a raw amount with `decimals` places, trailing zeros trimmed
pub fn ui_amount(amount: u64, decimals: u8) -> String {
    let decimals = decimals as usize;
    let digits = format!("{amount:0>width$}", width = decimals + 1);
    let (whole, fraction) = digits.split_at(digits.len() - decimals);
    let fraction = fraction.trim_end_matches('0');
    if fraction.is_empty() {
        whole.to_string()
    } else {
        format!("{whole}.{fraction}")
    }
}

fn build_error(err: impl std::fmt::Display) -> EscrowClientError {
    EscrowClientError::Build(err.to_string())
}
