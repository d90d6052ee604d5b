//! Native `Authority` dispatch (§4.5): `Add`/`Remove`/`Update` over the
//! in-process authority registry.
//!
//! The registry is not trie-backed (it is an arena keyed by `node_master`,
//! not account storage), so unlike [`super::params`] it cannot be reached
//! through [`dexio_state::State`] alone — the runtime threads a mutable
//! borrow of it in separately, alongside state.

use super::{AUTHORITY_ADD_GAS, AUTHORITY_REMOVE_GAS, AUTHORITY_UPDATE_GAS};
use crate::{ExecutionOutput, RuntimeError, VmError};
use dexio_primitives::{Address, Hash};
use dexio_state::{AuthorityRegistry, Candidate};

const TAG_ADD: u8 = 0;
const TAG_REMOVE: u8 = 1;
const TAG_UPDATE: u8 = 2;
const ADD_LEN: usize = 73;
const REMOVE_LEN: usize = 21;
const UPDATE_LEN: usize = 22;

pub(crate) fn dispatch_authority(
    authority: &mut AuthorityRegistry,
    data: &[u8],
    gas: u64,
) -> Result<ExecutionOutput, RuntimeError> {
    match data.first() {
        Some(&TAG_ADD) if data.len() == ADD_LEN => {
            if gas < AUTHORITY_ADD_GAS {
                return Ok(out_of_gas());
            }
            let node_master = Address::from_slice(&data[1..21]);
            let endorsor = Address::from_slice(&data[21..41]);
            let identity = Hash::from_slice(&data[41..73]);
            authority.add(Candidate { node_master, endorsor, identity, active: true });
            Ok(ExecutionOutput { output_data: Vec::new(), left_over_gas: gas - AUTHORITY_ADD_GAS, vm_error: None })
        }
        Some(&TAG_REMOVE) if data.len() == REMOVE_LEN => {
            if gas < AUTHORITY_REMOVE_GAS {
                return Ok(out_of_gas());
            }
            let node_master = Address::from_slice(&data[1..21]);
            authority.remove(node_master);
            Ok(ExecutionOutput { output_data: Vec::new(), left_over_gas: gas - AUTHORITY_REMOVE_GAS, vm_error: None })
        }
        Some(&TAG_UPDATE) if data.len() == UPDATE_LEN => {
            if gas < AUTHORITY_UPDATE_GAS {
                return Ok(out_of_gas());
            }
            let node_master = Address::from_slice(&data[1..21]);
            let active = data[21] != 0;
            authority.update(node_master, active);
            Ok(ExecutionOutput { output_data: Vec::new(), left_over_gas: gas - AUTHORITY_UPDATE_GAS, vm_error: None })
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
