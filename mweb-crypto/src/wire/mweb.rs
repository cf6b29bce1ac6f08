//! MWEB header and the two messages the verifier checks.

use super::{write_var_bytes, write_varint, Decodable, Encodable, MerkleBlock, Reader, Transaction};
use crate::hash::Hash32;
use crate::{MwebError, Result};

/// Extension block header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MwebHeader {
    /// Height of the base-chain block it extends
    pub height: u32,
    /// Root of the output MMR
    pub output_root: Hash32,
    /// Root of the kernel MMR
    pub kernel_root: Hash32,
    /// BLAKE3 of the leafset bitmap
    pub leafset_root: Hash32,
    /// Total kernel offset
    pub kernel_offset: [u8; 32],
    /// Total stealth offset
    pub stealth_offset: [u8; 32],
    /// Number of leaves in the output MMR
    pub output_mmr_size: u64,
    /// Number of leaves in the kernel MMR
    pub kernel_mmr_size: u64,
}

impl MwebHeader {
    /// Header hash: BLAKE3 of the wire encoding.
    ///
    /// This is the value committed to by the HogAddr output.
    pub fn hash(&self) -> Hash32 {
        Hash32::blake3(&self.to_wire())
    }
}

impl Encodable for MwebHeader {
    fn encode(&self, out: &mut Vec<u8>) {
        write_varint(out, u64::from(self.height));
        out.extend_from_slice(self.output_root.as_bytes());
        out.extend_from_slice(self.kernel_root.as_bytes());
        out.extend_from_slice(self.leafset_root.as_bytes());
        out.extend_from_slice(&self.kernel_offset);
        out.extend_from_slice(&self.stealth_offset);
        write_varint(out, self.output_mmr_size);
        write_varint(out, self.kernel_mmr_size);
    }
}

impl Decodable for MwebHeader {
    fn decode(r: &mut Reader<'_>) -> Result<Self> {
        // height is a non-negative signed 32-bit value
        let height = u32::try_from(r.read_varint()?)
            .ok()
            .filter(|&h| h <= i32::MAX as u32)
            .ok_or(MwebError::Decode("mweb header height out of range"))?;
        Ok(Self {
            height,
            output_root: r.read_hash()?,
            kernel_root: r.read_hash()?,
            leafset_root: r.read_hash()?,
            kernel_offset: r.read_array()?,
            stealth_offset: r.read_array()?,
            output_mmr_size: r.read_varint()?,
            kernel_mmr_size: r.read_varint()?,
        })
    }
}

/// `mwebheader` message: everything needed to anchor an MWEB header.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MsgMwebHeader {
    /// Partial merkle proof for the HogEx transaction
    pub merkle: MerkleBlock,
    /// The HogEx transaction
    pub hogex: Transaction,
    /// The extension block header
    pub mweb_header: MwebHeader,
}

impl Encodable for MsgMwebHeader {
    fn encode(&self, out: &mut Vec<u8>) {
        self.merkle.encode(out);
        self.hogex.encode(out);
        self.mweb_header.encode(out);
    }
}

impl Decodable for MsgMwebHeader {
    fn decode(r: &mut Reader<'_>) -> Result<Self> {
        Ok(Self {
            merkle: MerkleBlock::decode(r)?,
            hogex: Transaction::decode(r)?,
            mweb_header: MwebHeader::decode(r)?,
        })
    }
}

/// `mwebleafset` message: the unspent-output bitmap for a block.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MsgMwebLeafset {
    /// Block the leafset belongs to
    pub block_hash: Hash32,
    /// Raw leafset bitmap
    pub leafset: Vec<u8>,
}

impl Encodable for MsgMwebLeafset {
    fn encode(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(self.block_hash.as_bytes());
        write_var_bytes(out, &self.leafset);
    }
}

impl Decodable for MsgMwebLeafset {
    fn decode(r: &mut Reader<'_>) -> Result<Self> {
        Ok(Self {
            block_hash: r.read_hash()?,
            leafset: r.read_var_bytes()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header() -> MwebHeader {
        MwebHeader {
            height: 1_000_000,
            output_root: Hash32([0x01; 32]),
            kernel_root: Hash32([0x02; 32]),
            leafset_root: Hash32([0x03; 32]),
            kernel_offset: [0x04; 32],
            stealth_offset: [0x05; 32],
            output_mmr_size: 1_000,
            kernel_mmr_size: 500,
        }
    }

    #[test]
    fn test_mweb_header_wire() {
        let h = header();
        let bytes = h.to_wire();
        // 3-byte height varint, five 32-byte fields, 2-byte and 2-byte sizes
        assert_eq!(bytes.len(), 3 + 5 * 32 + 2 + 2);
        assert_eq!(MwebHeader::from_wire(&bytes).unwrap(), h);
        assert_eq!(h.hash(), Hash32::blake3(&bytes));
    }

    #[test]
    fn test_hash_covers_every_field() {
        let base = header().hash();
        let mut h = header();
        h.kernel_mmr_size += 1;
        assert_ne!(h.hash(), base);
        let mut h = header();
        h.leafset_root = Hash32::zero();
        assert_ne!(h.hash(), base);
    }

    #[test]
    fn test_negative_height_rejected() {
        let mut bytes = Vec::new();
        write_varint(&mut bytes, u64::from(u32::MAX));
        bytes.extend(header().to_wire().into_iter().skip(3));
        assert_eq!(
            MwebHeader::from_wire(&bytes),
            Err(MwebError::Decode("mweb header height out of range"))
        );
    }

    #[test]
    fn test_leafset_wire() {
        let msg = MsgMwebLeafset {
            block_hash: Hash32([0x09; 32]),
            leafset: vec![0x01, 0x02, 0x03],
        };
        let bytes = msg.to_wire();
        assert_eq!(bytes.len(), 32 + 1 + 3);
        assert_eq!(MsgMwebLeafset::from_wire(&bytes).unwrap(), msg);
    }
}
