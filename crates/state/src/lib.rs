//! The Merkle-trie-backed account/storage state engine (§4.3).
//!
//! A [`State`] binds one main account trie plus a lazily-opened storage
//! trie per account, all sharing one [`dexio_trie::MemStore`]. Every
//! mutator stages its change in-memory; [`State::commit`] is the only
//! operation that touches the backing store.

#![deny(missing_debug_implementations)]

mod account;
mod authority;
mod error;
mod params;

pub use account::Account;
pub use authority::{AuthorityRegistry, Candidate, Proposer};
pub use error::StateError;
pub use params::Params;

use dexio_primitives::{Address, BigInt, Hash, Timestamp};
use dexio_trie::{MemStore, Trie};
use rustc_hash::FxHashMap;
use std::sync::Arc;

const ACCOUNT_TRIE_NAME: &str = "account";

/// A transactional view over the account trie and every account's storage
/// sub-trie, rooted at a single parent state root.
#[derive(Debug)]
pub struct State {
    store: Arc<MemStore>,
    accounts: Trie,
    storage: FxHashMap<Address, Trie>,
    code: FxHashMap<Hash, Vec<u8>>,
}

impl State {
    /// Opens the state rooted at `root` (use [`dexio_trie::empty_root`] for
    /// a brand-new state).
    pub fn new(store: Arc<MemStore>, root: Hash) -> Result<State, StateError> {
        let accounts = Trie::new_secure_trie(ACCOUNT_TRIE_NAME, store.clone(), root)?;
        Ok(State { store, accounts, storage: FxHashMap::default(), code: FxHashMap::default() })
    }

    fn load_account(&self, address: Address) -> Result<Account, StateError> {
        match self.accounts.get(address.as_slice()) {
            None => Ok(Account::empty()),
            Some(raw) => {
                let mut buf = raw.as_slice();
                Ok(<Account as alloy_rlp::Decodable>::decode(&mut buf)?)
            }
        }
    }

    fn save_account(&mut self, address: Address, account: Account) -> Result<(), StateError> {
        if account.is_empty() {
            self.accounts.update(address.as_slice(), Vec::new());
        } else {
            self.accounts.update(address.as_slice(), alloy_rlp::encode(&account));
        }
        Ok(())
    }

    fn storage_trie_name(address: Address) -> String {
        format!("storage/{address}")
    }

    fn storage_trie(&mut self, address: Address, root: Hash) -> Result<&mut Trie, StateError> {
        if !self.storage.contains_key(&address) {
            let trie = Trie::new_secure_trie(Self::storage_trie_name(address), self.store.clone(), root)?;
            self.storage.insert(address, trie);
        }
        Ok(self.storage.get_mut(&address).expect("just inserted"))
    }

    pub fn get_balance(&self, address: Address) -> Result<BigInt, StateError> {
        Ok(self.load_account(address)?.balance)
    }

    pub fn add_balance(&mut self, address: Address, amount: BigInt) -> Result<(), StateError> {
        let mut account = self.load_account(address)?;
        account.balance += amount;
        self.save_account(address, account)
    }

    pub fn sub_balance(&mut self, address: Address, amount: BigInt) -> Result<(), StateError> {
        let mut account = self.load_account(address)?;
        if account.balance < amount {
            return Err(StateError::InsufficientBalance { have: account.balance, need: amount });
        }
        account.balance -= amount;
        self.save_account(address, account)
    }

    /// Materialized energy at `at`, without writing anything back (lazy
    /// accrual, §3).
    pub fn get_energy(&self, address: Address, at: Timestamp) -> Result<BigInt, StateError> {
        Ok(self.load_account(address)?.calc_energy(at))
    }

    /// Sets the materialized energy and the instant it was materialized at.
    pub fn set_energy(&mut self, address: Address, value: BigInt, at: Timestamp) -> Result<(), StateError> {
        let mut account = self.load_account(address)?;
        account.energy = value;
        account.block_time = at;
        self.save_account(address, account)
    }

    pub fn get_code(&mut self, address: Address) -> Result<Vec<u8>, StateError> {
        let account = self.load_account(address)?;
        if account.code_hash.is_empty() {
            return Ok(Vec::new());
        }
        let hash = Hash::from_slice(&account.code_hash);
        Ok(self.code.get(&hash).cloned().unwrap_or_default())
    }

    pub fn set_code(&mut self, address: Address, code: Vec<u8>) -> Result<(), StateError> {
        let mut account = self.load_account(address)?;
        if code.is_empty() {
            account.code_hash = Vec::new();
        } else {
            let hash = alloy_primitives::keccak256(&code);
            self.code.insert(hash, code);
            account.code_hash = hash.to_vec();
        }
        self.save_account(address, account)
    }

    pub fn get_storage(&mut self, address: Address, key: Hash) -> Result<Vec<u8>, StateError> {
        let root = Hash::from_slice(&{
            let account = self.load_account(address)?;
            if account.storage_root.is_empty() {
                dexio_trie::empty_root().to_vec()
            } else {
                account.storage_root
            }
        });
        let trie = self.storage_trie(address, root)?;
        Ok(trie.get(key.as_slice()).unwrap_or_default())
    }

    pub fn set_storage(&mut self, address: Address, key: Hash, value: Vec<u8>) -> Result<(), StateError> {
        let account = self.load_account(address)?;
        let root = if account.storage_root.is_empty() {
            dexio_trie::empty_root()
        } else {
            Hash::from_slice(&account.storage_root)
        };
        let trie = self.storage_trie(address, root)?;
        trie.update(key.as_slice(), value);
        let new_root = trie.commit();

        let mut account = account;
        account.storage_root = if new_root == dexio_trie::empty_root() { Vec::new() } else { new_root.to_vec() };
        self.save_account(address, account)
    }

    /// Whether `address` currently holds a live (non-empty) account.
    pub fn exists(&self, address: Address) -> Result<bool, StateError> {
        Ok(!self.load_account(address)?.is_empty())
    }

    /// Removes `address` outright, regardless of its current contents.
    pub fn delete(&mut self, address: Address) -> Result<(), StateError> {
        self.save_account(address, Account::empty())
    }

    /// Commits the account trie (and, transitively, every storage trie
    /// whose root it references) and returns the new state root.
    pub fn commit(&mut self) -> Hash {
        self.accounts.commit()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(tag: u8) -> Address {
        let mut bytes = [0u8; 20];
        bytes[19] = tag;
        Address::from(bytes)
    }

    #[test]
    fn account_round_trips_through_save_and_load() {
        let store = MemStore::new_mem();
        let mut state = State::new(store, dexio_trie::empty_root()).unwrap();
        let a = addr(1);

        state.add_balance(a, BigInt::from(1)).unwrap();
        state.set_code(a, b"code hash source".to_vec()).unwrap();
        assert!(state.exists(a).unwrap());

        let code = state.get_code(a).unwrap();
        assert_eq!(code, b"code hash source".to_vec());
    }

    #[test]
    fn saving_an_empty_account_deletes_its_trie_entry() {
        let store = MemStore::new_mem();
        let mut state = State::new(store, dexio_trie::empty_root()).unwrap();
        let a = addr(1);

        state.add_balance(a, BigInt::from(1)).unwrap();
        assert!(state.exists(a).unwrap());

        state.sub_balance(a, BigInt::from(1)).unwrap();
        assert!(!state.exists(a).unwrap());
        assert_eq!(state.accounts.get(a.as_slice()), None);
    }

    #[test]
    fn storage_round_trips_and_zero_write_deletes() {
        let store = MemStore::new_mem();
        let mut state = State::new(store, dexio_trie::empty_root()).unwrap();
        let a = addr(1);
        let key = Hash::from_slice(&[7u8; 32]);

        assert_eq!(state.get_storage(a, key).unwrap(), Vec::<u8>::new());

        state.set_storage(a, key, b"value".to_vec()).unwrap();
        assert_eq!(state.get_storage(a, key).unwrap(), b"value".to_vec());

        state.set_storage(a, key, Vec::new()).unwrap();
        assert_eq!(state.get_storage(a, key).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn sub_balance_below_zero_is_rejected() {
        let store = MemStore::new_mem();
        let mut state = State::new(store, dexio_trie::empty_root()).unwrap();
        let a = addr(1);
        let err = state.sub_balance(a, BigInt::from(1)).unwrap_err();
        assert!(matches!(err, StateError::InsufficientBalance { .. }));
    }

    #[test]
    fn commit_then_reopen_preserves_balances() {
        let store = MemStore::new_mem();
        let mut state = State::new(store.clone(), dexio_trie::empty_root()).unwrap();
        let a = addr(1);
        state.add_balance(a, BigInt::from(42)).unwrap();
        let root = state.commit();

        let reopened = State::new(store, root).unwrap();
        assert_eq!(reopened.get_balance(a).unwrap(), BigInt::from(42));
    }
}
