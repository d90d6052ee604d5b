use crate::{Header, Transaction};
use dexio_primitives::Hash;

/// A full block: header, its signature, and the transactions it carries.
///
/// The signature lives here rather than on [`Header`] so that `Header::id`
/// (the hash the signature is computed over) never depends on the
/// signature itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub header: Header,
    pub signature: Vec<u8>,
    pub transactions: Vec<Transaction>,
}

impl Block {
    pub fn new(header: Header, signature: Vec<u8>, transactions: Vec<Transaction>) -> Block {
        Block { header, signature, transactions }
    }

    pub fn id(&self) -> Hash {
        self.header.id()
    }
}

/// A block tagged with whether it belongs to an abandoned fork relative to
/// the stream a [`crate::BlockReader`] is replaying (§3, §4.6).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtendedBlock {
    pub block: Block,
    pub obsolete: bool,
}
