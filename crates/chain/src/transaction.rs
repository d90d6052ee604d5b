use alloy_primitives::{keccak256, TxKind};
use alloy_rlp::{RlpDecodable, RlpEncodable};
use dexio_primitives::{Address, BigInt, Hash};

/// One call inside a transaction (§6, GLOSSARY): a recipient (or
/// contract-creation marker, out of scope for the native-only runtime), a
/// value transfer, and opaque call data.
///
/// `to` uses [`TxKind`] rather than `Option<Address>` — the same type the
/// wider alloy/reth ecosystem uses for this exact "empty RLP string means
/// create" shape — rather than hand-rolling the encoding of an `Option`
/// that the `alloy-rlp` derive only knows how to place as a trailing,
/// omittable struct field (see `depends_on` below).
#[derive(Debug, Clone, PartialEq, Eq, RlpEncodable, RlpDecodable)]
pub struct Clause {
    pub to: TxKind,
    pub value: BigInt,
    pub data: Vec<u8>,
}

impl Clause {
    pub fn new(to: TxKind, value: BigInt, data: Vec<u8>) -> Clause {
        Clause { to, value, data }
    }

    pub fn call(to: Address, value: BigInt, data: Vec<u8>) -> Clause {
        Clause { to: TxKind::Call(to), value, data }
    }
}

/// A transaction: one or more clauses admitted and executed atomically by a
/// [`crate::Block`]'s packing flow.
///
/// Signature recovery is explicitly out of scope (§1); `origin` is carried
/// directly rather than derived from a signature, standing in for the
/// sender identity a real node would recover via `secp256k1` before the
/// transaction ever reaches the packer.
///
/// `depends_on` is declared last and marked `#[rlp(trailing)]` so it can be
/// RLP-encoded/decoded as an omittable final list member, matching how the
/// reference ecosystem's headers/bodies place their own optional fields.
#[derive(Debug, Clone, PartialEq, Eq, RlpEncodable, RlpDecodable)]
#[rlp(trailing)]
pub struct Transaction {
    pub chain_tag: u8,
    pub block_ref: u64,
    pub expiration: u32,
    pub clauses: Vec<Clause>,
    pub gas: u64,
    pub nonce: u64,
    pub origin: Address,
    pub depends_on: Option<Hash>,
}

impl Transaction {
    /// Keccak-256 of the RLP-encoded transaction; used for replay
    /// detection and as the transaction-tree leaf.
    pub fn id(&self) -> Hash {
        keccak256(alloy_rlp::encode(self))
    }

    /// The block number beyond which this transaction may no longer be
    /// adopted: `block_ref + expiration`.
    pub fn expires_at(&self) -> u64 {
        self.block_ref.saturating_add(self.expiration as u64)
    }
}
