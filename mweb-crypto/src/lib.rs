//! MWEB Crypto Library
//!
//! Pure Rust implementation of the commitment arithmetic and extension block
//! anchoring checks used by the Mimblewimble extension block (MWEB).
//!
//! - [`codec`]: 33-byte commitment point encoding with quadratic-residue parity
//! - [`pedersen`]: Pedersen commitments and their homomorphic sums
//! - [`switch`]: switch commitments and the blind-switch transform
//! - [`verify`]: HogEx header anchoring and leafset root checks

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(missing_docs)]

pub mod codec;
pub mod constants;
pub mod hash;
pub mod keys;
pub mod merkle;
pub mod pedersen;
pub mod script;
pub mod switch;
pub mod verify;
pub mod wire;

pub use hash::Hash32;
pub use keys::{blind_sum, BlindingFactor, PublicKey};
pub use merkle::{merkle_root, MerkleExtraction, MerkleExtractor, PartialMerkleExtractor, PartialMerkleTree};
pub use pedersen::{commit, commit_sum, generator_h, Commitment};
pub use switch::{switch_commit, switch_commit_with, MwebBlindSwitch, SwitchTransform};
pub use verify::{verify_header, verify_header_with, verify_leafset};
pub use wire::{BlockHeader, MerkleBlock, MsgMwebHeader, MsgMwebLeafset, MwebHeader, Transaction};

// Re-export k256 types for users who need them
pub use k256::{ProjectivePoint, Scalar};

use thiserror::Error;

/// Error types for MWEB crypto operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MwebError {
    /// Commitment bytes do not encode a point on the curve
    #[error("invalid commitment")]
    InvalidCommitment,
    /// A coordinate or scalar is not below its modulus
    #[error("scalar or coordinate overflows its modulus")]
    ScalarOverflow,
    /// The result of a group operation is the point at infinity
    #[error("point at infinity has no encoding")]
    PointAtInfinity,
    /// Invalid public key encoding
    #[error("invalid public key")]
    InvalidPublicKey,
    /// A built-in generator failed to load
    #[error("invalid generator constant")]
    InvalidGenerator,
    /// Partial merkle tree is structurally invalid
    #[error("mwebheader merkle block is malformed: {0}")]
    MalformedMerkleBlock(&'static str),
    /// Recomputed merkle root differs from the block header
    #[error("mwebheader merkle block is bad, computed={computed}, header={expected}")]
    BadMerkleBlock {
        /// Root recomputed from the partial merkle tree
        computed: Hash32,
        /// Root committed to by the block header
        expected: Hash32,
    },
    /// The marker transaction is not flagged as HogEx
    #[error("mwebheader hogex is not hogex, tx={txid}")]
    NotHogEx {
        /// Hash of the offending transaction
        txid: Hash32,
    },
    /// The last matched merkle transaction is not the HogEx
    #[error("tx hash mismatch, hogex={hogex}, last merkle tx={last_match}")]
    TxHashMismatch {
        /// Hash of the supplied HogEx transaction
        hogex: Hash32,
        /// Hash of the last transaction matched in the merkle block
        last_match: Hash32,
    },
    /// The HogEx is not the final transaction of the block
    #[error("tx index mismatch, got={got}, expected={expected}")]
    TxIndexMismatch {
        /// Position of the last matched transaction
        got: u32,
        /// Position of the final transaction in the block
        expected: u32,
    },
    /// The first HogEx output does not pay to the HogAddr of the header
    #[error("HogAddr mismatch, hogex={actual}, expected={expected}")]
    HogAddrMismatch {
        /// Hex of the script found in the first output
        actual: String,
        /// Hex of the canonical HogAddr script
        expected: String,
    },
    /// Leafset bitmap does not hash to the header's leafset root
    #[error("leafset root mismatch, leafset={leafset}, header={header}")]
    LeafsetRootMismatch {
        /// Hash of the supplied leafset bitmap
        leafset: Hash32,
        /// Leafset root recorded in the MWEB header
        header: Hash32,
    },
    /// Wire data could not be decoded
    #[error("decode error: {0}")]
    Decode(&'static str),
}

/// Result type for MWEB crypto operations
pub type Result<T> = std::result::Result<T, MwebError>;
