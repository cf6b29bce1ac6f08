//! 32-byte chain hashes.
//!
//! Base-chain objects (transactions, block headers, merkle nodes) are hashed
//! with double SHA-256. MWEB objects (the extension header, the leafset
//! bitmap) are hashed with BLAKE3.

use std::fmt;

use sha2::{Digest, Sha256};

use crate::{MwebError, Result};

/// A 32-byte hash as stored on the wire.
///
/// Displayed byte-reversed, the way block explorers and RPC interfaces print
/// chain hashes.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Hash32(pub [u8; 32]);

impl Hash32 {
    /// The all-zero hash.
    pub const fn zero() -> Self {
        Self([0u8; 32])
    }

    /// SHA256(SHA256(data))
    pub fn sha256d(data: &[u8]) -> Self {
        let first = Sha256::digest(data);
        Self(Sha256::digest(first).into())
    }

    /// BLAKE3-256(data)
    pub fn blake3(data: &[u8]) -> Self {
        Self(*blake3::hash(data).as_bytes())
    }

    /// Parent node of two merkle children: SHA256d(left || right).
    pub fn merkle_parent(left: &Self, right: &Self) -> Self {
        let mut buf = [0u8; 64];
        buf[..32].copy_from_slice(&left.0);
        buf[32..].copy_from_slice(&right.0);
        Self::sha256d(&buf)
    }

    /// Raw bytes in wire order.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Parse from the byte-reversed hex form produced by `Display`.
    pub fn from_hex(s: &str) -> Result<Self> {
        let mut bytes: [u8; 32] = hex::decode(s)
            .map_err(|_| MwebError::Decode("invalid hash hex"))?
            .try_into()
            .map_err(|_| MwebError::Decode("hash must be 32 bytes"))?;
        bytes.reverse();
        Ok(Self(bytes))
    }
}

impl From<[u8; 32]> for Hash32 {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for Hash32 {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Hash32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in self.0.iter().rev() {
            write!(f, "{b:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Hash32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash32({self})")
    }
}
