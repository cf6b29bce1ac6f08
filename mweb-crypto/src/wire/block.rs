//! Base-chain block header and merkle block.

use super::{write_compact_size, write_var_bytes, Decodable, Encodable, Reader};
use crate::constants::MAX_BLOCK_TRANSACTIONS;
use crate::hash::Hash32;
use crate::{MwebError, Result};

/// 80-byte base-chain block header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BlockHeader {
    /// Block version
    pub version: i32,
    /// Hash of the previous block
    pub prev_block: Hash32,
    /// Merkle root of the block's transactions
    pub merkle_root: Hash32,
    /// Unix timestamp
    pub timestamp: u32,
    /// Compact difficulty target
    pub bits: u32,
    /// Proof-of-work nonce
    pub nonce: u32,
}

impl BlockHeader {
    /// Serialized size in bytes.
    pub const SIZE: usize = 80;

    /// Block identity hash: SHA256d of the 80-byte header.
    pub fn hash(&self) -> Hash32 {
        Hash32::sha256d(&self.to_wire())
    }
}

impl Encodable for BlockHeader {
    fn encode(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.version.to_le_bytes());
        out.extend_from_slice(self.prev_block.as_bytes());
        out.extend_from_slice(self.merkle_root.as_bytes());
        out.extend_from_slice(&self.timestamp.to_le_bytes());
        out.extend_from_slice(&self.bits.to_le_bytes());
        out.extend_from_slice(&self.nonce.to_le_bytes());
    }
}

impl Decodable for BlockHeader {
    fn decode(r: &mut Reader<'_>) -> Result<Self> {
        Ok(Self {
            version: r.read_i32()?,
            prev_block: r.read_hash()?,
            merkle_root: r.read_hash()?,
            timestamp: r.read_u32()?,
            bits: r.read_u32()?,
            nonce: r.read_u32()?,
        })
    }
}

/// A block header with a partial merkle tree over its transactions.
///
/// `flags` holds the traversal bits, least significant bit first within each
/// byte. See [`crate::merkle`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MerkleBlock {
    /// Header of the block the proof is for
    pub header: BlockHeader,
    /// Total number of transactions in the block
    pub transactions: u32,
    /// Node hashes in depth-first order
    pub hashes: Vec<Hash32>,
    /// Packed traversal bits
    pub flags: Vec<u8>,
}

impl Encodable for MerkleBlock {
    fn encode(&self, out: &mut Vec<u8>) {
        self.header.encode(out);
        out.extend_from_slice(&self.transactions.to_le_bytes());
        write_compact_size(out, self.hashes.len() as u64);
        for h in &self.hashes {
            out.extend_from_slice(h.as_bytes());
        }
        write_var_bytes(out, &self.flags);
    }
}

impl Decodable for MerkleBlock {
    fn decode(r: &mut Reader<'_>) -> Result<Self> {
        let header = BlockHeader::decode(r)?;
        let transactions = r.read_u32()?;

        let count = r.read_count_of(32)?;
        if count > MAX_BLOCK_TRANSACTIONS as usize {
            return Err(MwebError::Decode("too many merkle hashes"));
        }
        let hashes = (0..count)
            .map(|_| r.read_hash())
            .collect::<Result<Vec<_>>>()?;

        let flags = r.read_var_bytes()?;

        Ok(Self {
            header,
            transactions,
            hashes,
            flags,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_genesis_header_hash() {
        // Bitcoin genesis block header
        let header = BlockHeader {
            version: 1,
            prev_block: Hash32::zero(),
            merkle_root: Hash32::from_hex(
                "4a5e1e4baab89f3a32518a88c31bc87f618f76673e2cc77ab2127b7afdeda33b",
            )
            .unwrap(),
            timestamp: 1_231_006_505,
            bits: 0x1d00_ffff,
            nonce: 2_083_236_893,
        };
        assert_eq!(header.to_wire().len(), BlockHeader::SIZE);
        assert_eq!(
            header.hash().to_string(),
            "000000000019d6689c085ae165831e934ff763ae46a2a6c172b3f1b60a8ce26f"
        );
    }

    #[test]
    fn test_merkle_block_wire() {
        let block = MerkleBlock {
            header: BlockHeader::default(),
            transactions: 3,
            hashes: vec![Hash32([1; 32]), Hash32([2; 32])],
            flags: vec![0x1d],
        };
        let bytes = block.to_wire();
        assert_eq!(bytes.len(), 80 + 4 + 1 + 64 + 1 + 1);
        assert_eq!(MerkleBlock::from_wire(&bytes).unwrap(), block);

        let mut extra = bytes.clone();
        extra.push(0);
        assert!(MerkleBlock::from_wire(&extra).is_err());
        assert!(MerkleBlock::from_wire(&bytes[..bytes.len() - 1]).is_err());
    }
}
