//! The in-memory, append-only block repository and its fork-aware reader
//! (§4.6, §6).

use crate::{Block, ChainError, ExtendedBlock, Header};
use dexio_poa::AncestorSource;
use dexio_primitives::Hash;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;

/// An append-only header/body store keyed by block ID, plus a single
/// mutable "best block" pointer (§5: a single atomic reference, a
/// single-writer discipline enforced by the caller).
#[derive(Debug)]
pub struct Repository {
    genesis_id: Hash,
    blocks: RwLock<FxHashMap<Hash, Block>>,
    best: RwLock<Hash>,
}

impl Repository {
    /// Seeds a repository with `genesis` as both its genesis and initial
    /// best block.
    pub fn new(genesis: Block) -> Repository {
        let id = genesis.id();
        let mut blocks = FxHashMap::default();
        blocks.insert(id, genesis);
        Repository { genesis_id: id, blocks: RwLock::new(blocks), best: RwLock::new(id) }
    }

    pub fn genesis_id(&self) -> Hash {
        self.genesis_id
    }

    /// Appends `block` to the repository. The block's parent must already
    /// be present (the repository never reorders or backfills).
    pub fn add_block(&self, block: Block) -> Result<Hash, ChainError> {
        let id = block.id();
        if !self.blocks.read().contains_key(&block.header.parent_id) {
            return Err(ChainError::UnknownBlock(block.header.parent_id));
        }
        self.blocks.write().insert(id, block);
        Ok(id)
    }

    pub fn get_block(&self, id: Hash) -> Result<Block, ChainError> {
        self.blocks.read().get(&id).cloned().ok_or(ChainError::UnknownBlock(id))
    }

    pub fn get_header(&self, id: Hash) -> Result<Header, ChainError> {
        Ok(self.get_block(id)?.header)
    }

    pub fn best_block_id(&self) -> Hash {
        *self.best.read()
    }

    /// Moves the best-block pointer. Callers are responsible for the
    /// single-writer discipline the repository assumes (§5).
    pub fn set_best_block_id(&self, id: Hash) {
        *self.best.write() = id;
    }

    /// The ancestor of both `a` and `b` after which their histories
    /// diverge.
    fn common_ancestor(&self, a: Hash, b: Hash) -> Result<Hash, ChainError> {
        let mut a_id = a;
        let mut a_header = self.get_header(a_id)?;
        let mut b_id = b;
        let mut b_header = self.get_header(b_id)?;

        while a_header.number > b_header.number {
            a_id = a_header.parent_id;
            a_header = self.get_header(a_id)?;
        }
        while b_header.number > a_header.number {
            b_id = b_header.parent_id;
            b_header = self.get_header(b_id)?;
        }
        while a_id != b_id {
            a_id = a_header.parent_id;
            a_header = self.get_header(a_id)?;
            b_id = b_header.parent_id;
            b_header = self.get_header(b_id)?;
        }
        Ok(a_id)
    }

    /// Blocks strictly after `ancestor` up to and including `tip`, in
    /// ascending block-number order.
    fn branch_from(&self, ancestor: Hash, tip: Hash) -> Result<Vec<Block>, ChainError> {
        let mut blocks = Vec::new();
        let mut cursor = tip;
        while cursor != ancestor {
            let block = self.get_block(cursor)?;
            let parent = block.header.parent_id;
            blocks.push(block);
            cursor = parent;
        }
        blocks.reverse();
        Ok(blocks)
    }

    /// Opens a fork-aware reader starting at `cursor_id` (§4.6).
    pub fn new_block_reader(&self, cursor_id: Hash) -> BlockReader<'_> {
        BlockReader { repo: self, cursor: cursor_id }
    }
}

impl AncestorSource for Repository {
    fn ancestor_id(&self, id: Hash, generations_back: u64) -> Option<Hash> {
        let mut cursor = id;
        for _ in 0..generations_back {
            let header = self.get_header(cursor).ok()?;
            if header.number == 0 {
                return None;
            }
            cursor = header.parent_id;
        }
        Some(cursor)
    }
}

/// A single-owner cursor replaying the path from where it started to the
/// repository's current best block (§4.6).
///
/// Each [`BlockReader::read`] call emits the side-chain blocks between the
/// cursor and the common ancestor with `best` (marked obsolete) followed by
/// the best-chain blocks from that ancestor to `best` (not obsolete), then
/// advances the cursor to `best`. A subsequent call on an unchanged
/// repository returns an empty batch.
#[derive(Debug)]
pub struct BlockReader<'r> {
    repo: &'r Repository,
    cursor: Hash,
}

impl BlockReader<'_> {
    pub fn read(&mut self) -> Result<Vec<ExtendedBlock>, ChainError> {
        let best = self.repo.best_block_id();
        if self.cursor == best {
            return Ok(Vec::new());
        }

        let ancestor = self.repo.common_ancestor(self.cursor, best)?;
        let mut out = Vec::new();

        if ancestor != self.cursor {
            for block in self.repo.branch_from(ancestor, self.cursor)? {
                out.push(ExtendedBlock { block, obsolete: true });
            }
        }
        for block in self.repo.branch_from(ancestor, best)? {
            out.push(ExtendedBlock { block, obsolete: false });
        }

        self.cursor = best;
        Ok(out)
    }
}
