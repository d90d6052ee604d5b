use alloy_rlp::RlpEncodable;
use dexio_primitives::Hash;

/// The outcome of dispatching a single clause (§6's `{output_data,
/// left_over_gas, vm_error}`, narrowed to what a receipt needs to record).
///
/// `reverted` is carried as `u8` (0/1) rather than `bool`: the derive macro
/// this crate leans on elsewhere only needs to encode, never decode, a
/// receipt, and every other RLP-derived type in this workspace sticks to
/// integer and byte-string primitives.
#[derive(Debug, Clone, PartialEq, Eq, RlpEncodable)]
pub struct ClauseReceipt {
    pub output_data: Vec<u8>,
    pub gas_used: u64,
    pub reverted: u8,
}

/// The receipt for one adopted transaction: its own gas cost plus one
/// [`ClauseReceipt`] per clause, in clause order.
#[derive(Debug, Clone, PartialEq, Eq, RlpEncodable)]
pub struct Receipt {
    pub tx_id: Hash,
    pub gas_used: u64,
    pub clauses: Vec<ClauseReceipt>,
}
