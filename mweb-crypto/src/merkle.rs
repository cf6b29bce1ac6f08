//! Partial merkle trees.
//!
//! A partial merkle tree proves that a subset of a block's transactions is
//! committed to by the header's merkle root, without shipping the rest.
//!
//! ## Encoding
//!
//! The tree is walked depth-first. At each node one flag bit is emitted:
//!
//! ```text
//! bit = 1   some matched transaction lies below this node
//! bit = 0   nothing matched below; the node's hash is emitted and the
//!           walk does not descend
//! ```
//!
//! Leaves always emit their hash. When a level has an odd number of nodes
//! the last node is paired with itself.
//!
//! Extraction rejects any tree where the left and right children of a node
//! are identical, since duplicating trailing transactions would otherwise
//! yield the same root for two different transaction lists.

use crate::constants::MAX_BLOCK_TRANSACTIONS;
use crate::hash::Hash32;
use crate::wire::MerkleBlock;
use crate::{MwebError, Result};

/// Transactions matched by a partial merkle tree.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MerkleExtraction {
    /// Root recomputed from the proof
    pub root: Hash32,
    /// Matched txids in block order
    pub matches: Vec<Hash32>,
    /// Block positions of `matches`
    pub indices: Vec<u32>,
}

/// Recovers the matched transactions from a merkle block.
pub trait MerkleExtractor {
    /// Walk the proof in `block`.
    ///
    /// # Errors
    ///
    /// `MwebError::MalformedMerkleBlock` if the proof is structurally
    /// invalid. Root comparison is left to the caller.
    fn extract(&self, block: &MerkleBlock) -> Result<MerkleExtraction>;
}

/// A partial merkle tree: the node hashes and traversal bits.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PartialMerkleTree {
    /// Number of transactions in the block
    pub transactions: u32,
    /// Emitted node hashes, depth-first
    pub hashes: Vec<Hash32>,
    /// Traversal bits, one per visited node
    pub bits: Vec<bool>,
}

/// Number of nodes at `height` for a tree over `n` leaves.
fn tree_width(n: u32, height: u32) -> u32 {
    let n = u64::from(n);
    ((n + (1u64 << height) - 1) >> height) as u32
}

fn tree_height(n: u32) -> u32 {
    let mut height = 0;
    while tree_width(n, height) > 1 {
        height += 1;
    }
    height
}

fn node_hash(txids: &[Hash32], height: u32, pos: u32) -> Hash32 {
    if height == 0 {
        return txids[pos as usize];
    }
    let left = node_hash(txids, height - 1, pos * 2);
    let right = if pos * 2 + 1 < tree_width(txids.len() as u32, height - 1) {
        node_hash(txids, height - 1, pos * 2 + 1)
    } else {
        left
    };
    Hash32::merkle_parent(&left, &right)
}

/// Full merkle root of a transaction list, or `None` if it is empty.
pub fn merkle_root(txids: &[Hash32]) -> Option<Hash32> {
    if txids.is_empty() {
        return None;
    }
    Some(node_hash(txids, tree_height(txids.len() as u32), 0))
}

impl PartialMerkleTree {
    /// Build a proof for the transactions flagged in `matches`.
    ///
    /// `txids` and `matches` are parallel; extra entries in the longer one
    /// are ignored.
    pub fn from_txids(txids: &[Hash32], matches: &[bool]) -> Self {
        let len = txids.len().min(matches.len());
        let mut tree = Self {
            transactions: len as u32,
            hashes: Vec::new(),
            bits: Vec::new(),
        };
        if len > 0 {
            let height = tree_height(tree.transactions);
            tree.build(&txids[..len], &matches[..len], height, 0);
        }
        tree
    }

    fn build(&mut self, txids: &[Hash32], matches: &[bool], height: u32, pos: u32) {
        let start = (pos as usize) << height;
        let end = ((pos as usize + 1) << height).min(txids.len());
        let parent_of_match = matches[start..end].iter().any(|&m| m);
        self.bits.push(parent_of_match);

        if height == 0 || !parent_of_match {
            self.hashes.push(node_hash(txids, height, pos));
        } else {
            self.build(txids, matches, height - 1, pos * 2);
            if pos * 2 + 1 < tree_width(self.transactions, height - 1) {
                self.build(txids, matches, height - 1, pos * 2 + 1);
            }
        }
    }

    /// Unpack the traversal bits of a merkle block.
    pub fn from_merkle_block(block: &MerkleBlock) -> Self {
        let bits = (0..block.flags.len() * 8)
            .map(|i| block.flags[i / 8] & (1 << (i % 8)) != 0)
            .collect();
        Self {
            transactions: block.transactions,
            hashes: block.hashes.clone(),
            bits,
        }
    }

    /// Pack the traversal bits, least significant bit first.
    pub fn flag_bytes(&self) -> Vec<u8> {
        let mut out = vec![0u8; self.bits.len().div_ceil(8)];
        for (i, bit) in self.bits.iter().enumerate() {
            if *bit {
                out[i / 8] |= 1 << (i % 8);
            }
        }
        out
    }

    /// Recompute the root and collect the matched transactions.
    ///
    /// # Errors
    ///
    /// `MwebError::MalformedMerkleBlock` when the tree is inconsistent with
    /// its transaction count, runs out of bits or hashes, leaves any unused,
    /// or contains a node with identical children.
    pub fn extract_matches(&self) -> Result<MerkleExtraction> {
        if self.transactions == 0 {
            return Err(MwebError::MalformedMerkleBlock("no transactions"));
        }
        if self.transactions > MAX_BLOCK_TRANSACTIONS {
            return Err(MwebError::MalformedMerkleBlock("too many transactions"));
        }
        if self.hashes.len() > self.transactions as usize {
            return Err(MwebError::MalformedMerkleBlock("more hashes than transactions"));
        }
        if self.bits.len() < self.hashes.len() {
            return Err(MwebError::MalformedMerkleBlock("fewer flag bits than hashes"));
        }

        let mut walk = Walk {
            tree: self,
            bits_used: 0,
            hashes_used: 0,
            out: MerkleExtraction::default(),
        };
        let height = tree_height(self.transactions);
        walk.out.root = walk.extract(height, 0)?;

        if walk.bits_used.div_ceil(8) != self.bits.len().div_ceil(8) {
            return Err(MwebError::MalformedMerkleBlock("unused flag bytes"));
        }
        if walk.hashes_used != self.hashes.len() {
            return Err(MwebError::MalformedMerkleBlock("unused hashes"));
        }
        Ok(walk.out)
    }
}

struct Walk<'a> {
    tree: &'a PartialMerkleTree,
    bits_used: usize,
    hashes_used: usize,
    out: MerkleExtraction,
}

impl Walk<'_> {
    fn extract(&mut self, height: u32, pos: u32) -> Result<Hash32> {
        let parent_of_match = *self
            .tree
            .bits
            .get(self.bits_used)
            .ok_or(MwebError::MalformedMerkleBlock("ran out of flag bits"))?;
        self.bits_used += 1;

        if height == 0 || !parent_of_match {
            let hash = *self
                .tree
                .hashes
                .get(self.hashes_used)
                .ok_or(MwebError::MalformedMerkleBlock("ran out of hashes"))?;
            self.hashes_used += 1;
            if height == 0 && parent_of_match {
                self.out.matches.push(hash);
                self.out.indices.push(pos);
            }
            return Ok(hash);
        }

        let left = self.extract(height - 1, pos * 2)?;
        let right = if pos * 2 + 1 < tree_width(self.tree.transactions, height - 1) {
            let right = self.extract(height - 1, pos * 2 + 1)?;
            if right == left {
                return Err(MwebError::MalformedMerkleBlock("duplicate sibling hashes"));
            }
            right
        } else {
            left
        };
        Ok(Hash32::merkle_parent(&left, &right))
    }
}

/// The default extractor: decodes the block's flags and walks the tree.
#[derive(Debug, Clone, Copy, Default)]
pub struct PartialMerkleExtractor;

impl MerkleExtractor for PartialMerkleExtractor {
    fn extract(&self, block: &MerkleBlock) -> Result<MerkleExtraction> {
        if block.transactions > MAX_BLOCK_TRANSACTIONS {
            return Err(MwebError::MalformedMerkleBlock("too many transactions"));
        }
        // a tree over n leaves has fewer than 2n nodes, one bit each
        let max_flag_bytes = (2 * u64::from(block.transactions)).div_ceil(8) + 1;
        if block.flags.len() as u64 > max_flag_bytes {
            return Err(MwebError::MalformedMerkleBlock("too many flag bytes"));
        }
        PartialMerkleTree::from_merkle_block(block).extract_matches()
    }
}
