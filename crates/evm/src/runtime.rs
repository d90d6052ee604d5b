//! Binds state, block context and fork config together so a clause can be
//! dispatched to a native contract (§4's Runtime façade, §6).

use crate::native::{dispatch_authority, dispatch_measure, dispatch_params};
use crate::{BlockContext, RuntimeError, TransactionContext};
use dexio_chain::Clause;
use dexio_primitives::{authority_address, measure_address, params_address, ForkConfig};
use dexio_state::{AuthorityRegistry, State};

/// A recoverable failure during clause execution: the clause still
/// consumed gas and the block still finalizes, but the clause's own
/// effects are discarded (mirrors `Executor().VMErr` in the external
/// interface, §6).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VmError {
    #[error("insufficient gas for native call")]
    OutOfGas,
    /// A native contract's call data did not match its fixed wire layout.
    /// Reported the same way as `OutOfGas`: the clause reverts and the gas
    /// offered to it is consumed, but the tx is still adopted (§6, §7).
    #[error("malformed call data for native contract")]
    MalformedCallData,
}

/// The result of running one clause (§6: `{output_data, left_over_gas,
/// vm_error}`).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExecutionOutput {
    pub output_data: Vec<u8>,
    pub left_over_gas: u64,
    pub vm_error: Option<VmError>,
}

/// A clause already dispatched and ready to report its outcome.
///
/// In a bytecode interpreter `PrepareClause` would return a suspended
/// computation and calling it would step the interpreter; since every
/// clause this runtime can execute is a native, synchronous Rust call,
/// dispatch happens eagerly inside [`Runtime::prepare_clause`] and
/// `Executor::call` just hands back the already-computed outcome.
#[derive(Debug)]
pub struct Executor {
    output: ExecutionOutput,
}

impl Executor {
    pub fn call(self) -> ExecutionOutput {
        self.output
    }
}

/// The EVM runtime façade (§4, §6): owns nothing of its own beyond
/// borrowing the state and authority registry it executes against.
///
/// The authority registry is threaded in separately from `state` because it
/// is not trie-backed (§4.5) — there is no account whose storage it could
/// live under.
#[derive(Debug)]
pub struct Runtime<'s> {
    state: &'s mut State,
    authority: &'s mut AuthorityRegistry,
    block_context: BlockContext,
    fork_config: ForkConfig,
}

impl<'s> Runtime<'s> {
    pub fn new(
        state: &'s mut State,
        authority: &'s mut AuthorityRegistry,
        block_context: BlockContext,
        fork_config: ForkConfig,
    ) -> Runtime<'s> {
        Runtime { state, authority, block_context, fork_config }
    }

    pub fn block_context(&self) -> &BlockContext {
        &self.block_context
    }

    pub fn fork_config(&self) -> &ForkConfig {
        &self.fork_config
    }

    /// Dispatches `clause`, charging at most `gas`. `clause_index` and
    /// `tx_ctx` are accepted for parity with the external interface (§6)
    /// though the native contracts below don't yet need them.
    pub fn prepare_clause(
        &mut self,
        clause: &Clause,
        _clause_index: usize,
        gas: u64,
        _tx_ctx: &TransactionContext,
    ) -> Result<Executor, RuntimeError> {
        let alloy_primitives::TxKind::Call(to) = clause.to else {
            return Err(RuntimeError::ContractCreationUnsupported);
        };

        let output = if to == params_address() {
            dispatch_params(self.state, &clause.data, gas)?
        } else if to == authority_address() {
            dispatch_authority(self.authority, &clause.data, gas)?
        } else if to == measure_address() {
            dispatch_measure(&clause.data, gas)
        } else {
            ExecutionOutput { output_data: Vec::new(), left_over_gas: gas, vm_error: None }
        };

        Ok(Executor { output })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dexio_chain::Clause;
    use dexio_primitives::{Address, BigInt, Hash};
    use dexio_state::AuthorityRegistry;
    use dexio_trie::MemStore;

    fn block_context() -> BlockContext {
        BlockContext {
            beneficiary: Address::ZERO,
            signer: Address::ZERO,
            number: 1,
            time: 0,
            gas_limit: 10_000_000,
            total_score: 0,
        }
    }

    fn tx_context() -> TransactionContext {
        TransactionContext { tx_id: Hash::ZERO, origin: Address::ZERO }
    }

    #[test]
    fn clause_to_an_unknown_address_is_a_gas_free_noop() {
        let store = MemStore::new_mem();
        let mut state = State::new(store, dexio_trie::empty_root()).unwrap();
        let mut authority = AuthorityRegistry::new();
        let mut rt = Runtime::new(&mut state, &mut authority, block_context(), ForkConfig::all_activated());
        let clause = Clause::call(Address::from([9u8; 20]), BigInt::ZERO, Vec::new());
        let out = rt.prepare_clause(&clause, 0, 100_000, &tx_context()).unwrap().call();
        assert_eq!(out.left_over_gas, 100_000);
        assert!(out.vm_error.is_none());
    }

    #[test]
    fn contract_creation_is_rejected() {
        let store = MemStore::new_mem();
        let mut state = State::new(store, dexio_trie::empty_root()).unwrap();
        let mut authority = AuthorityRegistry::new();
        let mut rt = Runtime::new(&mut state, &mut authority, block_context(), ForkConfig::all_activated());
        let clause = Clause::new(alloy_primitives::TxKind::Create, BigInt::ZERO, Vec::new());
        let err = rt.prepare_clause(&clause, 0, 100_000, &tx_context()).unwrap_err();
        assert!(matches!(err, RuntimeError::ContractCreationUnsupported));
    }

    #[test]
    fn repeated_execution_from_identical_state_yields_identical_left_over_gas() {
        // invariant 10, §8.
        let store = MemStore::new_mem();
        let mut state = State::new(store, dexio_trie::empty_root()).unwrap();
        let mut authority = AuthorityRegistry::new();
        let clause = Clause::call(dexio_primitives::measure_address(), BigInt::ZERO, vec![1]);

        let mut rt = Runtime::new(&mut state, &mut authority, block_context(), ForkConfig::all_activated());
        let a = rt.prepare_clause(&clause, 0, u64::MAX, &tx_context()).unwrap().call();
        let b = rt.prepare_clause(&clause, 0, u64::MAX, &tx_context()).unwrap().call();
        assert_eq!(a.left_over_gas, b.left_over_gas);
    }
}
