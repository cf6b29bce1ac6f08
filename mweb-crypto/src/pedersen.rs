//! Pedersen Commitments
//!
//! Pedersen commitments hide transaction amounts while allowing verification
//! that inputs equal outputs.
//!
//! ```text
//! C = blind*G + value*H
//!
//! Where:
//!   G = standard secp256k1 generator
//!   H = alternate generator with no known discrete log relative to G
//!   blind = 32-byte blinding factor
//!   value = u64 amount to commit
//! ```
//!
//! Commitments are group elements, so they add:
//! `commit(b1, v1) + commit(b2, v2) == commit(b1 + b2, v1 + v2)`.
//! A balanced transaction is one where the sum of output commitments minus
//! the sum of input commitments is a commitment to zero value.
//!
//! Commitments are serialized with the quadratic-residue parity encoding
//! from [`crate::codec`].

use std::fmt;
use std::sync::OnceLock;

use k256::{
    elliptic_curve::{ops::MulByGenerator, sec1::FromEncodedPoint, PrimeField},
    AffinePoint, EncodedPoint, FieldBytes, ProjectivePoint, Scalar,
};

use crate::codec::{compress, decompress};
use crate::constants::{COMMITMENT_LEN, GENERATOR_H_XY};
use crate::keys::{BlindingFactor, PublicKey};
use crate::{MwebError, Result};

static GENERATOR_H: OnceLock<Option<ProjectivePoint>> = OnceLock::new();

fn load_generator_h() -> Option<ProjectivePoint> {
    let x = FieldBytes::clone_from_slice(&GENERATOR_H_XY[..32]);
    let y = FieldBytes::clone_from_slice(&GENERATOR_H_XY[32..]);
    let encoded = EncodedPoint::from_affine_coordinates(&x, &y, false);
    AffinePoint::from_encoded_point(&encoded)
        .into_option()
        .map(ProjectivePoint::from)
}

/// The value generator H.
///
/// Loaded once per process and shared read-only afterwards.
///
/// # Errors
///
/// Returns `MwebError::InvalidGenerator` if the constant is not on the curve.
pub fn generator_h() -> Result<&'static ProjectivePoint> {
    GENERATOR_H
        .get_or_init(load_generator_h)
        .as_ref()
        .ok_or(MwebError::InvalidGenerator)
}

/// A commitment in its 33-byte wire encoding.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Commitment([u8; COMMITMENT_LEN]);

impl Commitment {
    /// Wrap raw bytes without validating them.
    ///
    /// Validation happens when the commitment is used in arithmetic; see
    /// [`Commitment::to_point`].
    pub const fn from_bytes(bytes: [u8; COMMITMENT_LEN]) -> Self {
        Self(bytes)
    }

    /// Parse and validate a commitment from a slice.
    ///
    /// # Errors
    ///
    /// `MwebError::InvalidCommitment` on a wrong length or undecodable point.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let array: [u8; COMMITMENT_LEN] =
            bytes.try_into().map_err(|_| MwebError::InvalidCommitment)?;
        decompress(&array)?;
        Ok(Self(array))
    }

    /// Encode a point.
    ///
    /// # Errors
    ///
    /// `MwebError::PointAtInfinity` for the identity.
    pub fn from_point(point: &ProjectivePoint) -> Result<Self> {
        compress(point).map(Self)
    }

    /// Decode the committed point.
    ///
    /// # Errors
    ///
    /// `MwebError::InvalidCommitment` when the bytes do not encode a curve
    /// point.
    pub fn to_point(&self) -> Result<ProjectivePoint> {
        decompress(&self.0)
    }

    /// Raw bytes.
    pub fn as_bytes(&self) -> &[u8; COMMITMENT_LEN] {
        &self.0
    }

    /// `self + other`
    ///
    /// # Errors
    ///
    /// Fails if either operand does not decode, or the sum is the identity.
    #[allow(clippy::should_implement_trait)]
    pub fn add(&self, other: &Commitment) -> Result<Commitment> {
        let sum = self.to_point()? + other.to_point()?;
        Self::from_point(&sum)
    }

    /// `self - other`
    ///
    /// # Errors
    ///
    /// Fails if either operand does not decode, or the difference is the
    /// identity (the operands are equal).
    #[allow(clippy::should_implement_trait)]
    pub fn sub(&self, other: &Commitment) -> Result<Commitment> {
        let diff = self.to_point()? + (-other.to_point()?);
        Self::from_point(&diff)
    }

    /// Reinterpret as a public key with the same coordinates.
    ///
    /// # Errors
    ///
    /// Fails if the commitment does not decode.
    pub fn to_public_key(&self) -> Result<PublicKey> {
        PublicKey::from_point(self.to_point()?)
    }

    /// Reinterpret a public key as a commitment with the same coordinates.
    ///
    /// # Errors
    ///
    /// Infallible for a valid key; the `Result` mirrors [`compress`].
    pub fn from_public_key(pk: &PublicKey) -> Result<Self> {
        Self::from_point(pk.point())
    }
}

impl TryFrom<&PublicKey> for Commitment {
    type Error = MwebError;

    fn try_from(pk: &PublicKey) -> Result<Self> {
        Commitment::from_public_key(pk)
    }
}

impl TryFrom<&Commitment> for PublicKey {
    type Error = MwebError;

    fn try_from(commitment: &Commitment) -> Result<Self> {
        commitment.to_public_key()
    }
}

impl fmt::Debug for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Commitment({})", hex::encode(self.0))
    }
}

impl fmt::Display for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

/// Encode a u64 as a scalar: 24 zero bytes then the big-endian value.
fn value_scalar(value: u64) -> Result<Scalar> {
    let mut value_bytes = [0u8; 32];
    value_bytes[24..32].copy_from_slice(&value.to_be_bytes());
    Scalar::from_repr(value_bytes.into())
        .into_option()
        .ok_or(MwebError::ScalarOverflow)
}

/// `blind*G + value*H` as a point.
fn commit_point(blind: &BlindingFactor, value: u64) -> Result<ProjectivePoint> {
    let blind_g = ProjectivePoint::mul_by_generator(blind.scalar());
    let value_h = *generator_h()? * value_scalar(value)?;
    Ok(blind_g + value_h)
}

/// Create a Pedersen commitment to `value` under `blind`.
///
/// No range proof is produced; that is the caller's concern.
///
/// # Errors
///
/// `MwebError::PointAtInfinity` if `blind` and `value` are both zero.
///
/// # Example
///
/// ```
/// use mweb_crypto::{commit, BlindingFactor};
///
/// let blind = BlindingFactor::from_bytes(&[0x01; 32]).unwrap();
/// let c = commit(&blind, 100).unwrap();
/// assert!(c.as_bytes()[0] == 0x08 || c.as_bytes()[0] == 0x09);
/// ```
pub fn commit(blind: &BlindingFactor, value: u64) -> Result<Commitment> {
    Commitment::from_point(&commit_point(blind, value)?)
}

/// Sum of commitments: `positive[0] + ... - negative[0] - ...`
///
/// # Errors
///
/// Fails if any commitment does not decode, or the sum is the identity.
pub fn commit_sum(positive: &[Commitment], negative: &[Commitment]) -> Result<Commitment> {
    let mut acc = ProjectivePoint::IDENTITY;
    for c in positive {
        acc += c.to_point()?;
    }
    for c in negative {
        acc -= c.to_point()?;
    }
    Commitment::from_point(&acc)
}
