//! Drives the compiled program through a local SVM. Each test returns early
//! when `target/deploy/offer_escrow.so` has not been built.

mod common;

use common::{test_config, LiteNetwork, INITIAL_LAMPORTS, TOKEN_2022_PROGRAM_ID, TOKEN_PROGRAM_ID};
use offer_escrow_client::{
    address::derive_associated_account,
    offer::{take_offer_instruction, INSUFFICIENT_TOKEN_BALANCE},
    ClientConfig, EscrowClient, EscrowClientError, Submitter,
};
use solana_sdk::{
    pubkey::Pubkey,
    signature::{Keypair, Signer},
};

const OFFERED_USDC: u64 = 10_000_000;
const WANTED_WIF: u64 = 100_000_000;

struct Swap {
    network: LiteNetwork,
    config: ClientConfig,
    alice: Keypair,
    bob: Keypair,
    usdc: Pubkey,
    wif: Pubkey,
}

impl Swap {
    fn account(&self, mint: &Pubkey, owner: &Pubkey) -> Pubkey {
        derive_associated_account(mint, owner, &TOKEN_PROGRAM_ID)
    }

    fn balance(&self, mint: &Pubkey, owner: &Pubkey) -> u64 {
        self.network.token_balance(&self.account(mint, owner))
    }
}

/// Alice holds 100 USDC and 5 WIF, Bob holds 20 USDC and 300 WIF
fn setup() -> Option<Swap> {
    let network = LiteNetwork::load()?;
    let alice = Keypair::new();
    let bob = Keypair::new();
    network.airdrop(&alice.pubkey(), 10 * INITIAL_LAMPORTS);
    network.airdrop(&bob.pubkey(), 10 * INITIAL_LAMPORTS);

    let authority = Pubkey::new_unique();
    let usdc = network.create_mint(&TOKEN_PROGRAM_ID, &authority);
    let wif = network.create_mint(&TOKEN_PROGRAM_ID, &authority);

    network.create_token_account(&usdc, &alice.pubkey(), &TOKEN_PROGRAM_ID, 100_000_000);
    network.create_token_account(&wif, &alice.pubkey(), &TOKEN_PROGRAM_ID, 5_000_000);
    network.create_token_account(&usdc, &bob.pubkey(), &TOKEN_PROGRAM_ID, 20_000_000);
    network.create_token_account(&wif, &bob.pubkey(), &TOKEN_PROGRAM_ID, 300_000_000);

    Some(Swap {
        network,
        config: test_config(5),
        alice,
        bob,
        usdc,
        wif,
    })
}

#[tokio::test]
async fn make_offer_moves_tokens_into_the_vault() {
    let Some(swap) = setup() else { return };
    let client = EscrowClient::new(&swap.network, &swap.config);

    let receipt = client
        .make_offer(&swap.alice, &swap.usdc, &swap.wif, OFFERED_USDC, WANTED_WIF)
        .await
        .unwrap();

    let offer = client.fetch_offer(&receipt.offer).await.unwrap();
    assert_eq!(offer.id, receipt.offer_id);
    assert_eq!(offer.maker, swap.alice.pubkey());
    assert_eq!(offer.token_mint_a, swap.usdc);
    assert_eq!(offer.token_mint_b, swap.wif);
    assert_eq!(offer.token_a_offered_amount, OFFERED_USDC);
    assert_eq!(offer.token_b_wanted_amount, WANTED_WIF);

    assert_eq!(swap.network.token_balance(&receipt.vault), OFFERED_USDC);
    assert_eq!(
        swap.balance(&swap.usdc, &swap.alice.pubkey()),
        100_000_000 - OFFERED_USDC
    );
}

#[tokio::test]
async fn take_offer_settles_both_legs_and_closes_the_offer() {
    let Some(swap) = setup() else { return };
    let client = EscrowClient::new(&swap.network, &swap.config);
    let receipt = client
        .make_offer(&swap.alice, &swap.usdc, &swap.wif, OFFERED_USDC, WANTED_WIF)
        .await
        .unwrap();

    client.take_offer(&receipt.offer, &swap.bob).await.unwrap();

    assert_eq!(swap.balance(&swap.wif, &swap.alice.pubkey()), 5_000_000 + WANTED_WIF);
    assert_eq!(swap.balance(&swap.usdc, &swap.bob.pubkey()), 20_000_000 + OFFERED_USDC);
    assert_eq!(swap.balance(&swap.wif, &swap.bob.pubkey()), 300_000_000 - WANTED_WIF);

    let err = client.fetch_offer(&receipt.offer).await.unwrap_err();
    assert!(matches!(err, EscrowClientError::OfferNotFound { .. }));
    assert!(swap
        .network
        .account(&receipt.vault)
        .map_or(true, |vault| vault.lamports == 0));
}

#[tokio::test]
async fn underfunded_taker_is_refused_and_the_offer_survives() {
    let Some(swap) = setup() else { return };
    let client = EscrowClient::new(&swap.network, &swap.config);
    let receipt = client
        .make_offer(&swap.alice, &swap.usdc, &swap.wif, OFFERED_USDC, WANTED_WIF)
        .await
        .unwrap();

    let carol = Keypair::new();
    swap.network.airdrop(&carol.pubkey(), 10 * INITIAL_LAMPORTS);
    swap.network
        .create_token_account(&swap.wif, &carol.pubkey(), &TOKEN_PROGRAM_ID, WANTED_WIF - 1);

    let err = client.take_offer(&receipt.offer, &carol).await.unwrap_err();
    assert!(matches!(
        err,
        EscrowClientError::InsufficientTokenBalance { needed: WANTED_WIF, available, .. } if available == WANTED_WIF - 1
    ));

    // The program enforces the same rule when the client check is bypassed
    let offer = client.fetch_offer(&receipt.offer).await.unwrap();
    let instruction = take_offer_instruction(
        &offer_escrow::ID,
        &receipt.offer,
        &offer,
        &carol.pubkey(),
        &TOKEN_PROGRAM_ID,
    );
    let submitter = Submitter::new(&swap.network, swap.config.confirm);
    let err = submitter
        .submit(&[instruction], &carol.pubkey(), &[&carol])
        .await
        .unwrap_err();
    assert_eq!(err.custom_code(), Some(INSUFFICIENT_TOKEN_BALANCE));

    assert!(client.fetch_offer(&receipt.offer).await.is_ok());
    assert_eq!(swap.network.token_balance(&receipt.vault), OFFERED_USDC);
}

#[tokio::test]
async fn second_taker_with_a_stale_record_sees_offer_not_found() {
    let Some(swap) = setup() else { return };
    let client = EscrowClient::new(&swap.network, &swap.config);
    let receipt = client
        .make_offer(&swap.alice, &swap.usdc, &swap.wif, OFFERED_USDC, WANTED_WIF)
        .await
        .unwrap();

    let carol = Keypair::new();
    swap.network.airdrop(&carol.pubkey(), 10 * INITIAL_LAMPORTS);
    swap.network
        .create_token_account(&swap.wif, &carol.pubkey(), &TOKEN_PROGRAM_ID, WANTED_WIF);

    let bob_view = client.fetch_offer(&receipt.offer).await.unwrap();
    let carol_view = client.fetch_offer(&receipt.offer).await.unwrap();

    client
        .take_offer_with_record(&receipt.offer, &bob_view, &swap.bob)
        .await
        .unwrap();
    let err = client
        .take_offer_with_record(&receipt.offer, &carol_view, &carol)
        .await
        .unwrap_err();

    assert!(matches!(err, EscrowClientError::OfferNotFound { offer } if offer == receipt.offer));
    assert_eq!(swap.balance(&swap.wif, &carol.pubkey()), WANTED_WIF);
}

#[tokio::test]
async fn close_offer_refunds_the_maker() {
    let Some(swap) = setup() else { return };
    let client = EscrowClient::new(&swap.network, &swap.config);
    let receipt = client
        .make_offer(&swap.alice, &swap.usdc, &swap.wif, OFFERED_USDC, WANTED_WIF)
        .await
        .unwrap();

    let err = client.close_offer(&receipt.offer, &swap.bob).await.unwrap_err();
    assert!(matches!(err, EscrowClientError::NotOfferMaker { .. }));

    client.close_offer(&receipt.offer, &swap.alice).await.unwrap();

    assert_eq!(swap.balance(&swap.usdc, &swap.alice.pubkey()), 100_000_000);
    let err = client.fetch_offer(&receipt.offer).await.unwrap_err();
    assert!(matches!(err, EscrowClientError::OfferNotFound { .. }));
}

#[tokio::test]
async fn mixed_token_programs_never_reach_the_program() {
    let Some(swap) = setup() else { return };
    let client = EscrowClient::new(&swap.network, &swap.config);
    let bonk = swap
        .network
        .create_mint(&TOKEN_2022_PROGRAM_ID, &Pubkey::new_unique());

    let err = client
        .make_offer(&swap.alice, &swap.usdc, &bonk, OFFERED_USDC, WANTED_WIF)
        .await
        .unwrap_err();

    assert!(matches!(err, EscrowClientError::MismatchedTokenProgram { .. }));
    assert_eq!(swap.balance(&swap.usdc, &swap.alice.pubkey()), 100_000_000);
}
