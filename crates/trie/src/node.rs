//! In-memory node representation and recursive get/insert/delete.
//!
//! Every non-empty node is always content-addressed by the Keccak-256 hash
//! of its RLP encoding, never inlined into its parent even when small. Real
//! Ethereum tries inline short nodes to save space in proofs; this workspace
//! has no proof format to optimize for, so every node always round-trips
//! through the backing store, which keeps the encode/decode logic in one
//! place (see `DESIGN.md`).
use crate::error::TrieError;
use crate::nibble::{common_prefix_len, from_encoded_path, to_encoded_path};
use alloy_primitives::keccak256;
use alloy_rlp::{Decodable, Encodable, Header};
use dexio_primitives::Hash;
use rustc_hash::FxHashMap;

pub type NodeStore = FxHashMap<Hash, Vec<u8>>;

/// A node of the Merkle-Patricia trie, held fully in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Empty,
    Leaf {
        path: Vec<u8>,
        value: Vec<u8>,
    },
    Extension {
        path: Vec<u8>,
        child: Box<Node>,
    },
    Branch {
        children: Box<[Node; 16]>,
        value: Option<Vec<u8>>,
    },
}

fn empty_children() -> [Node; 16] {
    std::array::from_fn(|_| Node::Empty)
}

fn concat_paths(a: &[u8], b: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(a.len() + b.len());
    out.extend_from_slice(a);
    out.extend_from_slice(b);
    out
}

/// Keccak-256 of the RLP encoding of the empty string, the root hash of an
/// empty trie.
pub fn empty_root() -> Hash {
    use std::sync::OnceLock;
    static ROOT: OnceLock<Hash> = OnceLock::new();
    *ROOT.get_or_init(|| keccak256([0x80u8]))
}

pub fn get<'n>(node: &'n Node, key: &[u8]) -> Option<&'n [u8]> {
    match node {
        Node::Empty => None,
        Node::Leaf { path, value } => (path.as_slice() == key).then_some(value.as_slice()),
        Node::Extension { path, child } => {
            key.strip_prefix(path.as_slice()).and_then(|rest| get(child, rest))
        }
        Node::Branch { children, value } => {
            if key.is_empty() {
                value.as_deref()
            } else {
                get(&children[key[0] as usize], &key[1..])
            }
        }
    }
}

fn place_into_branch(children: &mut [Node; 16], branch_value: &mut Option<Vec<u8>>, key: &[u8], value: Vec<u8>) {
    if key.is_empty() {
        *branch_value = Some(value);
    } else {
        children[key[0] as usize] = Node::Leaf { path: key[1..].to_vec(), value };
    }
}

pub fn insert(node: Node, key: &[u8], value: Vec<u8>) -> Node {
    match node {
        Node::Empty => Node::Leaf { path: key.to_vec(), value },

        Node::Leaf { path, value: old_value } => {
            if path == key {
                return Node::Leaf { path, value };
            }
            let cp = common_prefix_len(&path, key);
            let mut children = empty_children();
            let mut branch_value = None;
            place_into_branch(&mut children, &mut branch_value, &path[cp..], old_value);
            place_into_branch(&mut children, &mut branch_value, &key[cp..], value);
            let branch = Node::Branch { children: Box::new(children), value: branch_value };
            if cp == 0 {
                branch
            } else {
                Node::Extension { path: path[..cp].to_vec(), child: Box::new(branch) }
            }
        }

        Node::Extension { path, child } => {
            let cp = common_prefix_len(&path, key);
            if cp == path.len() {
                let new_child = insert(*child, &key[cp..], value);
                return Node::Extension { path, child: Box::new(new_child) };
            }
            let mut children = empty_children();
            let mut branch_value = None;

            let old_branch_idx = path[cp];
            let old_remainder = if path.len() - cp == 1 {
                *child
            } else {
                Node::Extension { path: path[cp + 1..].to_vec(), child }
            };
            children[old_branch_idx as usize] = old_remainder;

            place_into_branch(&mut children, &mut branch_value, &key[cp..], value);
            let branch = Node::Branch { children: Box::new(children), value: branch_value };
            if cp == 0 {
                branch
            } else {
                Node::Extension { path: path[..cp].to_vec(), child: Box::new(branch) }
            }
        }

        Node::Branch { mut children, value: branch_value } => {
            if key.is_empty() {
                Node::Branch { children, value: Some(value) }
            } else {
                let idx = key[0] as usize;
                let existing = std::mem::replace(&mut children[idx], Node::Empty);
                children[idx] = insert(existing, &key[1..], value);
                Node::Branch { children, value: branch_value }
            }
        }
    }
}

fn merge_after_extension(ext_path: Vec<u8>, child: Node) -> Node {
    match child {
        Node::Empty => Node::Empty,
        Node::Leaf { path, value } => Node::Leaf { path: concat_paths(&ext_path, &path), value },
        Node::Extension { path, child } => {
            Node::Extension { path: concat_paths(&ext_path, &path), child }
        }
        branch @ Node::Branch { .. } => Node::Extension { path: ext_path, child: Box::new(branch) },
    }
}

fn collapse_branch(children: Box<[Node; 16]>, value: Option<Vec<u8>>) -> Node {
    let mut children = children;
    let mut only_idx = None;
    let mut count = 0usize;
    for (i, c) in children.iter().enumerate() {
        if !matches!(c, Node::Empty) {
            count += 1;
            only_idx = Some(i);
        }
    }
    match (count, &value) {
        (0, Some(_)) => Node::Leaf { path: Vec::new(), value: value.unwrap() },
        (0, None) => Node::Empty,
        (1, None) => {
            let idx = only_idx.expect("count == 1 implies a surviving child");
            let child = std::mem::replace(&mut children[idx], Node::Empty);
            merge_after_extension(vec![idx as u8], child)
        }
        _ => Node::Branch { children, value },
    }
}

/// Removes `key` from the subtree rooted at `node`, returning the new
/// subtree and whether anything was actually removed.
pub fn delete(node: Node, key: &[u8]) -> (Node, bool) {
    match node {
        Node::Empty => (Node::Empty, false),

        Node::Leaf { path, value } => {
            if path == key {
                (Node::Empty, true)
            } else {
                (Node::Leaf { path, value }, false)
            }
        }

        Node::Extension { path, child } => match key.strip_prefix(path.as_slice()) {
            None => (Node::Extension { path, child }, false),
            Some(rest) => {
                let (new_child, removed) = delete(*child, rest);
                if !removed {
                    (Node::Extension { path, child: Box::new(new_child) }, false)
                } else {
                    (merge_after_extension(path, new_child), true)
                }
            }
        },

        Node::Branch { mut children, value } => {
            if key.is_empty() {
                if value.is_none() {
                    return (Node::Branch { children, value }, false);
                }
                (collapse_branch(children, None), true)
            } else {
                let idx = key[0] as usize;
                let existing = std::mem::replace(&mut children[idx], Node::Empty);
                let (new_child, removed) = delete(existing, &key[1..]);
                children[idx] = new_child;
                if !removed {
                    (Node::Branch { children, value }, false)
                } else {
                    (collapse_branch(children, value), true)
                }
            }
        }
    }
}

fn rlp_encode_list(items: &[Vec<u8>]) -> Vec<u8> {
    let payload_length: usize = items.iter().map(|item| item.as_slice().length()).sum();
    let mut out = Vec::with_capacity(payload_length + 8);
    Header { list: true, payload_length }.encode(&mut out);
    for item in items {
        item.as_slice().encode(&mut out);
    }
    out
}

fn node_ref(node: &Node, store: &mut NodeStore) -> Vec<u8> {
    match node {
        Node::Empty => Vec::new(),
        _ => store_node(node, store).as_slice().to_vec(),
    }
}

/// Encodes `node`, stores the encoding under its Keccak-256 hash, and
/// returns that hash. Children are stored first (post-order), so the store
/// never contains a dangling reference.
pub fn store_node(node: &Node, store: &mut NodeStore) -> Hash {
    let encoded = match node {
        Node::Empty => vec![0x80],
        Node::Leaf { path, value } => {
            rlp_encode_list(&[to_encoded_path(path, true), value.clone()])
        }
        Node::Extension { path, child } => {
            let child_ref = node_ref(child, store);
            rlp_encode_list(&[to_encoded_path(path, false), child_ref])
        }
        Node::Branch { children, value } => {
            let mut items = Vec::with_capacity(17);
            for child in children.iter() {
                items.push(node_ref(child, store));
            }
            items.push(value.clone().unwrap_or_default());
            rlp_encode_list(&items)
        }
    };
    let hash = keccak256(&encoded);
    store.insert(hash, encoded);
    hash
}

fn decode_items(mut payload: &[u8]) -> Result<Vec<Vec<u8>>, TrieError> {
    let mut items = Vec::new();
    while !payload.is_empty() {
        items.push(Vec::<u8>::decode(&mut payload)?);
    }
    Ok(items)
}

fn decode_node(raw: &[u8], store: &NodeStore) -> Result<Node, TrieError> {
    let mut buf = raw;
    let header = Header::decode(&mut buf)?;
    if !header.list {
        return Err(TrieError::CorruptNode);
    }
    let items = decode_items(&buf[..header.payload_length])?;
    match items.len() {
        2 => {
            let (path, is_leaf) = from_encoded_path(&items[0]);
            if is_leaf {
                Ok(Node::Leaf { path, value: items[1].clone() })
            } else {
                let child = decode_ref(&items[1], store)?;
                Ok(Node::Extension { path, child: Box::new(child) })
            }
        }
        17 => {
            let mut children = empty_children();
            for (idx, slot) in children.iter_mut().enumerate() {
                *slot = decode_ref(&items[idx], store)?;
            }
            let value = (!items[16].is_empty()).then(|| items[16].clone());
            Ok(Node::Branch { children: Box::new(children), value })
        }
        _ => Err(TrieError::CorruptNode),
    }
}

fn decode_ref(bytes: &[u8], store: &NodeStore) -> Result<Node, TrieError> {
    if bytes.is_empty() {
        return Ok(Node::Empty);
    }
    if bytes.len() != 32 {
        return Err(TrieError::CorruptNode);
    }
    let hash = Hash::from_slice(bytes);
    let raw = store.get(&hash).ok_or(TrieError::NodeNotFound(hash))?;
    decode_node(raw, store)
}

/// Loads a full node tree rooted at `root` out of `store`.
pub fn load_root(root: Hash, store: &NodeStore) -> Result<Node, TrieError> {
    if root == empty_root() {
        return Ok(Node::Empty);
    }
    let raw = store.get(&root).ok_or(TrieError::NodeNotFound(root))?;
    decode_node(raw, store)
}
