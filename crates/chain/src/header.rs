use alloy_primitives::keccak256;
use alloy_rlp::{RlpDecodable, RlpEncodable};
use dexio_primitives::{Address, Hash, Timestamp};

/// The consensus-relevant fields of a block header (§3), plus the
/// transactions/receipts roots the packer's `pack` step fills in — implied
/// by §4.2 even though §3's "consensus-relevant fields only" list omits
/// them for brevity.
///
/// A header never carries its own signature: the signature is carried
/// alongside it on [`crate::Block`], so `Header::id` (the value that gets
/// signed) does not depend on the signature that signs it.
#[derive(Debug, Clone, PartialEq, Eq, RlpEncodable, RlpDecodable)]
pub struct Header {
    pub parent_id: Hash,
    pub number: u64,
    pub timestamp: Timestamp,
    pub gas_limit: u64,
    pub total_score: u64,
    pub tx_root: Hash,
    pub receipts_root: Hash,
    pub state_root: Hash,
    pub beneficiary: Address,
    pub signer: Address,
}

impl Header {
    /// The genesis header: no parent, number 0, empty roots.
    pub fn genesis(state_root: Hash, timestamp: Timestamp, gas_limit: u64) -> Header {
        Header {
            parent_id: Hash::ZERO,
            number: 0,
            timestamp,
            gas_limit,
            total_score: 0,
            tx_root: dexio_trie_empty_root(),
            receipts_root: dexio_trie_empty_root(),
            state_root,
            beneficiary: Address::ZERO,
            signer: Address::ZERO,
        }
    }

    /// Keccak-256 of the RLP-encoded header (§3, §6). This is also the hash
    /// the block's signature is computed over.
    pub fn id(&self) -> Hash {
        keccak256(alloy_rlp::encode(self))
    }
}

/// Avoids a hard dependency from `dexio-chain` on `dexio-trie` just for one
/// constant; the empty root is a pure function of the RLP empty-string hash,
/// identical to `dexio_trie::empty_root()`.
fn dexio_trie_empty_root() -> Hash {
    keccak256([0x80])
}
