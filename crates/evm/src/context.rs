use dexio_primitives::{Address, Timestamp};

/// The block-level environment every clause in a block executes against
/// (§4.2). Built once per [`crate::Runtime`] by the packer and held
/// constant for the block's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockContext {
    pub beneficiary: Address,
    pub signer: Address,
    pub number: u64,
    pub time: Timestamp,
    pub gas_limit: u64,
    pub total_score: u64,
}

/// The transaction-level environment a single clause executes within
/// (§6: `PrepareClause(clause, clause_index, gas, tx_ctx)`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransactionContext {
    pub tx_id: dexio_primitives::Hash,
    pub origin: Address,
}
