//! A test-only native contract used to pin down the runtime's gas
//! accounting (§8, invariant 10 and scenario S6): `inner` charges a flat
//! cost, `outer` charges twice that plus a fixed nested-call overhead, so
//! that `outer_gas_used - 2*inner_gas_used` is a protocol constant
//! regardless of how much gas the caller offers.

use crate::ExecutionOutput;
use crate::VmError;
use dexio_primitives::{NATIVE_CALL_GAS, NESTED_CALL_PREPARE_GAS};

const TAG_INNER: u8 = 0;
const TAG_OUTER: u8 = 1;

pub(crate) fn dispatch_measure(data: &[u8], gas: u64) -> ExecutionOutput {
    let cost = match data.first() {
        Some(&TAG_OUTER) => 2 * NATIVE_CALL_GAS + NESTED_CALL_PREPARE_GAS,
        _ => NATIVE_CALL_GAS,
    };
    if gas < cost {
        return ExecutionOutput { output_data: Vec::new(), left_over_gas: 0, vm_error: Some(VmError::OutOfGas) };
    }
    ExecutionOutput { output_data: Vec::new(), left_over_gas: gas - cost, vm_error: None }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outer_minus_twice_inner_is_the_nested_call_overhead() {
        let gas_used = |tag: u8| {
            let out = dispatch_measure(&[tag], 1_000_000);
            1_000_000 - out.left_over_gas
        };
        let outer = gas_used(TAG_OUTER);
        let inner = gas_used(TAG_INNER);
        assert_eq!(outer - 2 * inner, NESTED_CALL_PREPARE_GAS);
        assert_eq!(outer - 2 * inner, 1_562);
    }

    #[test]
    fn insufficient_gas_yields_an_out_of_gas_error_with_nothing_left_over() {
        let out = dispatch_measure(&[TAG_INNER], NATIVE_CALL_GAS - 1);
        assert_eq!(out.left_over_gas, 0);
        assert_eq!(out.vm_error, Some(VmError::OutOfGas));
    }

    #[test]
    fn repeated_calls_from_identical_input_are_identical() {
        let a = dispatch_measure(&[TAG_OUTER], 500_000);
        let b = dispatch_measure(&[TAG_OUTER], 500_000);
        assert_eq!(a, b);
    }
}
