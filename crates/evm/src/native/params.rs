//! Native `Params` dispatch (§4.4): `Get`/`Set` over one account's storage,
//! reusing [`dexio_state::Params`] directly rather than re-implementing the
//! storage-trie plumbing.
//!
//! Wire layout (opaque to everything above the native table): a leading tag
//! byte, then a 32-byte key, then for `Set` a 32-byte big-endian value.

use super::{PARAMS_GET_GAS, PARAMS_SET_GAS};
use crate::{ExecutionOutput, RuntimeError, VmError};
use dexio_primitives::{params_address, BigInt, Hash};
use dexio_state::{Params, State};

const TAG_GET: u8 = 0;
const TAG_SET: u8 = 1;
const GET_LEN: usize = 33;
const SET_LEN: usize = 65;

pub(crate) fn dispatch_params(state: &mut State, data: &[u8], gas: u64) -> Result<ExecutionOutput, RuntimeError> {
    match data.first() {
        Some(&TAG_GET) if data.len() == GET_LEN => {
            if gas < PARAMS_GET_GAS {
                return Ok(out_of_gas());
            }
            let key = Hash::from_slice(&data[1..33]);
            let value = Params::new(params_address(), state).get(key)?;
            Ok(ExecutionOutput {
                output_data: value.to_be_bytes_vec(),
                left_over_gas: gas - PARAMS_GET_GAS,
                vm_error: None,
            })
        }
        Some(&TAG_SET) if data.len() == SET_LEN => {
            if gas < PARAMS_SET_GAS {
                return Ok(out_of_gas());
            }
            let key = Hash::from_slice(&data[1..33]);
            let value = BigInt::from_be_slice(&data[33..65]);
            Params::new(params_address(), state).set(key, value)?;
            Ok(ExecutionOutput { output_data: Vec::new(), left_over_gas: gas - PARAMS_SET_GAS, vm_error: None })
        }
        _ => Ok(malformed_call_data()),
    }
}

fn out_of_gas() -> ExecutionOutput {
    ExecutionOutput { output_data: Vec::new(), left_over_gas: 0, vm_error: Some(VmError::OutOfGas) }
}

fn malformed_call_data() -> ExecutionOutput {
    ExecutionOutput { output_data: Vec::new(), left_over_gas: 0, vm_error: Some(VmError::MalformedCallData) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dexio_trie::MemStore;

    fn call_data(tag: u8, key: Hash, value: Option<BigInt>) -> Vec<u8> {
        let mut data = vec![tag];
        data.extend_from_slice(key.as_slice());
        if let Some(value) = value {
            data.extend_from_slice(&value.to_be_bytes_vec());
        }
        data
    }

    fn fresh_state() -> State {
        State::new(MemStore::new_mem(), dexio_trie::empty_root()).unwrap()
    }

    #[test]
    fn get_after_set_round_trips_through_native_dispatch() {
        let mut state = fresh_state();
        let key = Hash::from_slice(&[1u8; 32]);

        let set = dispatch_params(&mut state, &call_data(TAG_SET, key, Some(BigInt::from(42))), 100_000).unwrap();
        assert!(set.vm_error.is_none());
        assert_eq!(set.left_over_gas, 100_000 - PARAMS_SET_GAS);

        let get = dispatch_params(&mut state, &call_data(TAG_GET, key, None), 100_000).unwrap();
        assert_eq!(BigInt::from_be_slice(&get.output_data), BigInt::from(42));
        assert_eq!(get.left_over_gas, 100_000 - PARAMS_GET_GAS);
    }

    #[test]
    fn unset_key_reads_as_zero() {
        let mut state = fresh_state();
        let key = Hash::from_slice(&[2u8; 32]);
        let get = dispatch_params(&mut state, &call_data(TAG_GET, key, None), 100_000).unwrap();
        assert_eq!(BigInt::from_be_slice(&get.output_data), BigInt::ZERO);
    }

    #[test]
    fn insufficient_gas_is_reported_as_a_vm_error_not_a_hard_failure() {
        let mut state = fresh_state();
        let key = Hash::from_slice(&[3u8; 32]);
        let out = dispatch_params(&mut state, &call_data(TAG_GET, key, None), PARAMS_GET_GAS - 1).unwrap();
        assert_eq!(out.left_over_gas, 0);
        assert_eq!(out.vm_error, Some(VmError::OutOfGas));
    }

    #[test]
    fn malformed_call_data_reverts_the_clause_instead_of_failing_dispatch() {
        let mut state = fresh_state();
        let out = dispatch_params(&mut state, &[TAG_GET, 1, 2], 100_000).unwrap();
        assert_eq!(out.left_over_gas, 0);
        assert_eq!(out.vm_error, Some(VmError::MalformedCallData));
    }
}
