//! The built-in params registry (§4.4): an address-scoped `Hash -> BigInt`
//! map backed directly by account storage, with no cross-key invariants.

use crate::{State, StateError};
use dexio_primitives::{Address, BigInt, Hash};

/// A view onto one account's storage, interpreted as params entries.
#[derive(Debug)]
pub struct Params<'s> {
    address: Address,
    state: &'s mut State,
}

impl<'s> Params<'s> {
    pub fn new(address: Address, state: &'s mut State) -> Params<'s> {
        Params { address, state }
    }

    /// Reads `key`, defaulting to zero if it was never set.
    pub fn get(&mut self, key: Hash) -> Result<BigInt, StateError> {
        let raw = self.state.get_storage(self.address, key)?;
        if raw.is_empty() {
            return Ok(BigInt::ZERO);
        }
        let mut buf = raw.as_slice();
        Ok(<BigInt as alloy_rlp::Decodable>::decode(&mut buf)?)
    }

    /// Writes `value` under `key`.
    pub fn set(&mut self, key: Hash, value: BigInt) -> Result<(), StateError> {
        let encoded = alloy_rlp::encode(value);
        self.state.set_storage(self.address, key, encoded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dexio_trie::MemStore;

    fn test_address(tag: &[u8]) -> Address {
        let mut bytes = [0u8; 20];
        bytes[..tag.len()].copy_from_slice(tag);
        Address::from(bytes)
    }

    #[test]
    fn get_after_set_returns_the_same_value() {
        let store = MemStore::new_mem();
        let mut state = State::new(store, dexio_trie::empty_root()).unwrap();
        let address = test_address(b"par");
        let mut params = Params::new(address, &mut state);
        let key = dexio_primitives::param_key("key");
        params.set(key, BigInt::from(10)).unwrap();
        assert_eq!(params.get(key).unwrap(), BigInt::from(10));
    }

    #[test]
    fn distinct_keys_do_not_interfere() {
        let store = MemStore::new_mem();
        let mut state = State::new(store, dexio_trie::empty_root()).unwrap();
        let address = test_address(b"par");
        let mut params = Params::new(address, &mut state);
        let key_a = dexio_primitives::param_key("a");
        let key_b = dexio_primitives::param_key("b");
        params.set(key_a, BigInt::from(1)).unwrap();
        params.set(key_b, BigInt::from(2)).unwrap();
        assert_eq!(params.get(key_a).unwrap(), BigInt::from(1));
        assert_eq!(params.get(key_b).unwrap(), BigInt::from(2));
    }

    #[test]
    fn unset_key_reads_as_zero() {
        let store = MemStore::new_mem();
        let mut state = State::new(store, dexio_trie::empty_root()).unwrap();
        let address = test_address(b"par");
        let mut params = Params::new(address, &mut state);
        assert_eq!(params.get(dexio_primitives::param_key("never-set")).unwrap(), BigInt::ZERO);
    }
}
