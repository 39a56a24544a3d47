#![allow(dead_code)]

use std::{
    cell::RefCell,
    collections::{HashMap, HashSet, VecDeque},
    sync::atomic::{AtomicU32, Ordering},
    time::Duration,
};

use anchor_lang::AccountSerialize;
use litesvm::LiteSVM;
use offer_escrow::Offer;
use offer_escrow_client::{
    address::derive_associated_account, token::metadata_address, ClientConfig, ConfirmPolicy,
    Network, NetworkError, SignatureStatus, TokenAccountEntry,
};
use solana_sdk::{
    account::Account,
    hash::Hash,
    pubkey::Pubkey,
    signature::Signature,
    transaction::{TransactionError, VersionedTransaction},
};

// ---------------------------------------------------------------------------
// Program IDs and constants
// ---------------------------------------------------------------------------
pub const TOKEN_PROGRAM_ID: Pubkey = anchor_spl::token::ID;
pub const TOKEN_2022_PROGRAM_ID: Pubkey = anchor_spl::token_2022::ID;
pub const METADATA_PROGRAM_ID: Pubkey = anchor_spl::metadata::mpl_token_metadata::ID;
pub const INITIAL_LAMPORTS: u64 = 1_000_000_000;
pub const DECIMALS: u8 = 6;

/// Config that polls without sleeping
pub fn test_config(max_attempts: u32) -> ClientConfig {
    ClientConfig {
        confirm: ConfirmPolicy {
            max_attempts,
            poll_interval: Duration::ZERO,
        },
        ..ClientConfig::default()
    }
}

// ---------------------------------------------------------------------------
// Raw account layouts
// ---------------------------------------------------------------------------
pub fn mint_data(decimals: u8, supply: u64, authority: &Pubkey) -> Vec<u8> {
    let mut data = vec![0u8; 82];
    data[0..4].copy_from_slice(&1u32.to_le_bytes()); // mint_authority = Some
    data[4..36].copy_from_slice(authority.as_ref());
    data[36..44].copy_from_slice(&supply.to_le_bytes());
    data[44] = decimals;
    data[45] = 1; // is_initialized
    data
}

pub fn token_account_data(mint: &Pubkey, owner: &Pubkey, amount: u64) -> Vec<u8> {
    let mut data = vec![0u8; 165];
    data[0..32].copy_from_slice(mint.as_ref());
    data[32..64].copy_from_slice(owner.as_ref());
    data[64..72].copy_from_slice(&amount.to_le_bytes());
    data[108] = 1; // state = Initialized
    data
}

pub fn offer_data(offer: &Offer) -> Vec<u8> {
    let mut data = Vec::new();
    offer.try_serialize(&mut data).unwrap();
    data
}

/// Borsh layout of a Metaplex `Metadata` account; trailing optional fields
/// are left as zero (None)
pub fn metadata_data(mint: &Pubkey, name: &str, symbol: &str) -> Vec<u8> {
    fn push_str(data: &mut Vec<u8>, value: &str, width: usize) {
        let mut padded = value.as_bytes().to_vec();
        padded.resize(width, 0);
        data.extend_from_slice(&(padded.len() as u32).to_le_bytes());
        data.extend_from_slice(&padded);
    }

    let mut data = vec![4u8]; // Key::MetadataV1
    data.extend_from_slice(Pubkey::new_unique().as_ref()); // update authority
    data.extend_from_slice(mint.as_ref());
    push_str(&mut data, name, 32);
    push_str(&mut data, symbol, 10);
    push_str(&mut data, "", 200);
    data.extend_from_slice(&0u16.to_le_bytes()); // seller fee basis points
    data.push(0); // creators
    data.push(0); // primary sale happened
    data.push(1); // is mutable
    data.resize(data.len() + 64, 0);
    data
}

pub fn account(owner: Pubkey, data: Vec<u8>) -> Account {
    Account {
        lamports: INITIAL_LAMPORTS,
        data,
        owner,
        executable: false,
        rent_epoch: 0,
    }
}

// ---------------------------------------------------------------------------
// In-memory ledger
// ---------------------------------------------------------------------------

/// Scriptable [`Network`]: accounts live in a map, sends are recorded and
/// signature statuses come from a queue.
pub struct MockNetwork {
    accounts: RefCell<HashMap<Pubkey, Account>>,
    failing: RefCell<HashSet<Pubkey>>,
    token_accounts: RefCell<HashMap<(Pubkey, Pubkey), Vec<TokenAccountEntry>>>,
    statuses: RefCell<VecDeque<SignatureStatus>>,
    default_status: RefCell<SignatureStatus>,
    status_polls: AtomicU32,
    send_error: RefCell<Option<TransactionError>>,
    remove_on_send: RefCell<Vec<Pubkey>>,
    sent: RefCell<Vec<VersionedTransaction>>,
    airdrops: RefCell<Vec<(Pubkey, u64)>>,
}

impl Default for MockNetwork {
    fn default() -> Self {
        Self {
            accounts: RefCell::default(),
            failing: RefCell::default(),
            token_accounts: RefCell::default(),
            statuses: RefCell::default(),
            default_status: RefCell::new(SignatureStatus::Confirmed),
            status_polls: AtomicU32::new(0),
            send_error: RefCell::default(),
            remove_on_send: RefCell::default(),
            sent: RefCell::default(),
            airdrops: RefCell::default(),
        }
    }
}

impl MockNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_account(&self, address: Pubkey, account: Account) {
        self.accounts.borrow_mut().insert(address, account);
    }

    pub fn remove_account(&self, address: &Pubkey) {
        self.accounts.borrow_mut().remove(address);
    }

    pub fn add_mint(&self, mint: Pubkey, token_program: Pubkey) {
        self.set_account(
            mint,
            account(token_program, mint_data(DECIMALS, 0, &Pubkey::new_unique())),
        );
    }

    /// Fund `owner`'s associated account for `mint`, returning its address
    pub fn add_token_account(
        &self,
        mint: &Pubkey,
        owner: &Pubkey,
        token_program: &Pubkey,
        amount: u64,
    ) -> Pubkey {
        let address = derive_associated_account(mint, owner, token_program);
        self.set_account(
            address,
            account(*token_program, token_account_data(mint, owner, amount)),
        );
        address
    }

    pub fn add_offer(&self, address: Pubkey, offer: &Offer) {
        self.set_account(address, account(offer_escrow::ID, offer_data(offer)));
    }

    pub fn add_metadata(&self, mint: &Pubkey, name: &str, symbol: &str) {
        self.set_account(
            metadata_address(mint),
            account(METADATA_PROGRAM_ID, metadata_data(mint, name, symbol)),
        );
    }

    pub fn set_lamports(&self, address: Pubkey, lamports: u64) {
        let mut wallet = account(solana_sdk::system_program::ID, Vec::new());
        wallet.lamports = lamports;
        self.set_account(address, wallet);
    }

    /// Reads of `address` fail with an RPC error
    pub fn fail_reads_of(&self, address: Pubkey) {
        self.failing.borrow_mut().insert(address);
    }

    pub fn set_token_accounts(
        &self,
        owner: Pubkey,
        token_program: Pubkey,
        entries: Vec<TokenAccountEntry>,
    ) {
        self.token_accounts
            .borrow_mut()
            .insert((owner, token_program), entries);
    }

    /// Statuses returned by the next polls, in order; afterwards `default`
    pub fn script_statuses(&self, statuses: Vec<SignatureStatus>, default: SignatureStatus) {
        *self.statuses.borrow_mut() = statuses.into();
        *self.default_status.borrow_mut() = default;
    }

    /// The next send is refused by preflight with `err`
    pub fn reject_next_send(&self, err: TransactionError) {
        *self.send_error.borrow_mut() = Some(err);
    }

    /// `address` disappears when the next transaction is sent
    pub fn remove_on_send(&self, address: Pubkey) {
        self.remove_on_send.borrow_mut().push(address);
    }

    pub fn status_polls(&self) -> u32 {
        self.status_polls.load(Ordering::SeqCst)
    }

    pub fn sent(&self) -> Vec<VersionedTransaction> {
        self.sent.borrow().clone()
    }

    pub fn airdrops(&self) -> Vec<(Pubkey, u64)> {
        self.airdrops.borrow().clone()
    }
}

impl Network for MockNetwork {
    async fn get_account(&self, address: &Pubkey) -> Result<Option<Account>, NetworkError> {
        if self.failing.borrow().contains(address) {
            return Err(NetworkError::Rpc(format!("{address}: connection reset")));
        }
        Ok(self.accounts.borrow().get(address).cloned())
    }

    async fn get_balance(&self, address: &Pubkey) -> Result<u64, NetworkError> {
        Ok(self
            .accounts
            .borrow()
            .get(address)
            .map_or(0, |account| account.lamports))
    }

    async fn get_latest_blockhash(&self) -> Result<Hash, NetworkError> {
        Ok(Hash::new_unique())
    }

    async fn get_minimum_balance_for_rent_exemption(
        &self,
        data_len: usize,
    ) -> Result<u64, NetworkError> {
        Ok((data_len as u64 + 128) * 6_960)
    }

    async fn send_transaction(
        &self,
        transaction: &VersionedTransaction,
    ) -> Result<Signature, NetworkError> {
        self.sent.borrow_mut().push(transaction.clone());
        for address in self.remove_on_send.borrow_mut().drain(..) {
            self.accounts.borrow_mut().remove(&address);
        }
        if let Some(err) = self.send_error.borrow_mut().take() {
            return Err(NetworkError::Rejected(err));
        }
        Ok(transaction.signatures[0])
    }

    async fn get_signature_status(
        &self,
        _signature: &Signature,
    ) -> Result<SignatureStatus, NetworkError> {
        self.status_polls.fetch_add(1, Ordering::SeqCst);
        let next = self.statuses.borrow_mut().pop_front();
        Ok(next.unwrap_or_else(|| self.default_status.borrow().clone()))
    }

    async fn request_airdrop(
        &self,
        address: &Pubkey,
        lamports: u64,
    ) -> Result<Signature, NetworkError> {
        self.airdrops.borrow_mut().push((*address, lamports));
        Ok(Signature::new_unique())
    }

    async fn get_token_accounts_by_owner(
        &self,
        owner: &Pubkey,
        token_program: &Pubkey,
    ) -> Result<Vec<TokenAccountEntry>, NetworkError> {
        Ok(self
            .token_accounts
            .borrow()
            .get(&(*owner, *token_program))
            .cloned()
            .unwrap_or_default())
    }
}

// ---------------------------------------------------------------------------
// Local SVM running the compiled program
// ---------------------------------------------------------------------------
pub const PROGRAM_SO: &str = concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../target/deploy/offer_escrow.so"
);

/// [`Network`] over a [`LiteSVM`] with the escrow program loaded. Failed
/// transactions are refused at send time, like a preflight check.
pub struct LiteNetwork {
    svm: RefCell<LiteSVM>,
    landed: RefCell<HashSet<Signature>>,
}

impl LiteNetwork {
    /// `None` when the program has not been built yet
    pub fn load() -> Option<Self> {
        if !std::path::Path::new(PROGRAM_SO).exists() {
            eprintln!("skipping: {PROGRAM_SO} not found, run `anchor build` first");
            return None;
        }
        let mut svm = LiteSVM::new();
        svm.add_program_from_file(offer_escrow::ID, PROGRAM_SO)
            .expect("offer_escrow.so failed to load");
        Some(Self {
            svm: RefCell::new(svm),
            landed: RefCell::default(),
        })
    }

    pub fn airdrop(&self, address: &Pubkey, lamports: u64) {
        self.svm.borrow_mut().airdrop(address, lamports).unwrap();
    }

    pub fn set_account(&self, address: Pubkey, account: Account) {
        self.svm.borrow_mut().set_account(address, account).unwrap();
    }

    pub fn create_mint(&self, token_program: &Pubkey, authority: &Pubkey) -> Pubkey {
        let mint = Pubkey::new_unique();
        self.set_account(
            mint,
            account(*token_program, mint_data(DECIMALS, 0, authority)),
        );
        mint
    }

    pub fn create_token_account(
        &self,
        mint: &Pubkey,
        owner: &Pubkey,
        token_program: &Pubkey,
        amount: u64,
    ) -> Pubkey {
        let address = derive_associated_account(mint, owner, token_program);
        self.set_account(
            address,
            account(*token_program, token_account_data(mint, owner, amount)),
        );
        address
    }

    pub fn account(&self, address: &Pubkey) -> Option<Account> {
        self.svm.borrow().get_account(address)
    }

    pub fn token_balance(&self, address: &Pubkey) -> u64 {
        let account = self.account(address).expect("token account not found");
        u64::from_le_bytes(account.data[64..72].try_into().unwrap())
    }
}

impl Network for LiteNetwork {
    async fn get_account(&self, address: &Pubkey) -> Result<Option<Account>, NetworkError> {
        // Closed accounts linger with zero lamports
        Ok(self
            .svm
            .borrow()
            .get_account(address)
            .filter(|account| account.lamports > 0))
    }

    async fn get_balance(&self, address: &Pubkey) -> Result<u64, NetworkError> {
        Ok(self.svm.borrow().get_balance(address).unwrap_or(0))
    }

    async fn get_latest_blockhash(&self) -> Result<Hash, NetworkError> {
        Ok(self.svm.borrow().latest_blockhash())
    }

    async fn get_minimum_balance_for_rent_exemption(
        &self,
        data_len: usize,
    ) -> Result<u64, NetworkError> {
        Ok(self.svm.borrow().minimum_balance_for_rent_exemption(data_len))
    }

    async fn send_transaction(
        &self,
        transaction: &VersionedTransaction,
    ) -> Result<Signature, NetworkError> {
        let mut svm = self.svm.borrow_mut();
        let result = svm.send_transaction(transaction.clone());
        svm.expire_blockhash();

        match result {
            Ok(meta) => {
                self.landed.borrow_mut().insert(meta.signature);
                Ok(meta.signature)
            }
            Err(failed) => Err(NetworkError::Rejected(failed.err)),
        }
    }

    async fn get_signature_status(
        &self,
        signature: &Signature,
    ) -> Result<SignatureStatus, NetworkError> {
        if self.landed.borrow().contains(signature) {
            Ok(SignatureStatus::Confirmed)
        } else {
            Ok(SignatureStatus::Pending)
        }
    }

    async fn request_airdrop(
        &self,
        address: &Pubkey,
        lamports: u64,
    ) -> Result<Signature, NetworkError> {
        let meta = self
            .svm
            .borrow_mut()
            .airdrop(address, lamports)
            .map_err(|failed| NetworkError::Rejected(failed.err))?;
        self.landed.borrow_mut().insert(meta.signature);
        Ok(meta.signature)
    }

    async fn get_token_accounts_by_owner(
        &self,
        _owner: &Pubkey,
        _token_program: &Pubkey,
    ) -> Result<Vec<TokenAccountEntry>, NetworkError> {
        Err(NetworkError::Rpc(
            "owner scans are not supported by the local SVM".to_string(),
        ))
    }
}
