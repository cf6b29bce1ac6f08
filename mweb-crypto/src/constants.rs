//! Protocol-wide constants for MWEB commitments and header anchoring.

/// Length in bytes of a serialized commitment.
pub const COMMITMENT_LEN: usize = 33;

/// Length in bytes of a SEC1 compressed public key.
pub const PUBLIC_KEY_LEN: usize = 33;

/// Length in bytes of a serialized scalar (blinding factor).
pub const SCALAR_LEN: usize = 32;

/// Parity byte written when the affine y-coordinate is a quadratic residue.
///
/// One is added when it is not.
pub const COMMITMENT_PARITY_BASE: u8 = 0x08;

/// Witness version reserved for the HogAddr output of the HogEx transaction.
pub const HOG_ADDR_WITNESS_VERSION: u8 = 8;

/// Uncompressed coordinates (x || y) of the value generator H.
///
/// Nobody knows the discrete log of H with respect to G.
pub const GENERATOR_H_XY: [u8; 64] = [
    0x50, 0x92, 0x9b, 0x74, 0xc1, 0xa0, 0x49, 0x54, 0xb7, 0x8b, 0x4b, 0x60, 0x35, 0xe9, 0x7a, 0x5e,
    0x07, 0x8a, 0x5a, 0x0f, 0x28, 0xec, 0x96, 0xd5, 0x47, 0xbf, 0xee, 0x9a, 0xce, 0x80, 0x3a, 0xc0,
    0x31, 0xd3, 0xc6, 0x86, 0x39, 0x73, 0x92, 0x6e, 0x04, 0x9e, 0x63, 0x7c, 0xb1, 0xb5, 0xf4, 0x0a,
    0x36, 0xda, 0xc2, 0x8a, 0xf1, 0x76, 0x69, 0x68, 0xc3, 0x0c, 0x23, 0x13, 0xf3, 0xa3, 0x89, 0x04,
];

/// SEC1 compressed encoding of the switch-commitment generator J.
pub const GENERATOR_J_PUB: [u8; 33] = [
    0x02, 0xb8, 0x60, 0xf5, 0x67, 0x95, 0xfc, 0x03, 0xf3, 0xc2, 0x16, 0x85, 0x38, 0x3d, 0x1b, 0x5a,
    0x2f, 0x29, 0x54, 0xf4, 0x9b, 0x7e, 0x39, 0x8b, 0x8d, 0x2a, 0x01, 0x93, 0x93, 0x36, 0x21, 0x15,
    0x5f,
];

/// Upper bound on transactions in a base-chain block.
///
/// Maximum block weight divided by the minimum transaction weight.
pub const MAX_BLOCK_TRANSACTIONS: u32 = 4_000_000 / 240;

/// Largest byte payload accepted for a single length-prefixed wire field.
pub const MAX_WIRE_PAYLOAD: usize = 32 * 1024 * 1024;
