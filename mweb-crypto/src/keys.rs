//! Blinding factors and public keys
//!
//! A [`BlindingFactor`] is a scalar mod the group order n. A [`PublicKey`]
//! is a non-identity curve point serialized in standard SEC1 compressed form
//! (`0x02`/`0x03` prefix). Commitments use a different point encoding, see
//! [`crate::codec`].

use std::fmt;
use std::ops::{Add, Neg, Sub};

use k256::{
    elliptic_curve::{
        ops::MulByGenerator,
        sec1::{FromEncodedPoint, ToEncodedPoint},
        Group, PrimeField,
    },
    AffinePoint, EncodedPoint, NonZeroScalar, ProjectivePoint, Scalar,
};
use rand_core::CryptoRngCore;

use crate::constants::{PUBLIC_KEY_LEN, SCALAR_LEN};
use crate::{MwebError, Result};

/// A 256-bit blinding factor, reduced mod the curve order.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct BlindingFactor(Scalar);

impl BlindingFactor {
    /// The zero blind.
    pub const ZERO: Self = Self(Scalar::ZERO);

    /// Parse a big-endian 32-byte scalar.
    ///
    /// # Errors
    ///
    /// Returns `MwebError::ScalarOverflow` if the value is not below n.
    pub fn from_bytes(bytes: &[u8; SCALAR_LEN]) -> Result<Self> {
        Scalar::from_repr((*bytes).into())
            .into_option()
            .map(Self)
            .ok_or(MwebError::ScalarOverflow)
    }

    /// Parse from a slice, checking the length first.
    ///
    /// # Errors
    ///
    /// `MwebError::ScalarOverflow` on a wrong length or out-of-range value.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let array: [u8; SCALAR_LEN] = bytes.try_into().map_err(|_| MwebError::ScalarOverflow)?;
        Self::from_bytes(&array)
    }

    /// Draw a uniformly random non-zero blind.
    pub fn random(rng: &mut impl CryptoRngCore) -> Self {
        Self(*NonZeroScalar::random(rng))
    }

    /// Big-endian 32-byte encoding.
    pub fn to_bytes(&self) -> [u8; SCALAR_LEN] {
        self.0.to_bytes().into()
    }

    /// The underlying scalar.
    pub fn scalar(&self) -> &Scalar {
        &self.0
    }
}

impl From<Scalar> for BlindingFactor {
    fn from(scalar: Scalar) -> Self {
        Self(scalar)
    }
}

impl Add for BlindingFactor {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sub for BlindingFactor {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl Neg for BlindingFactor {
    type Output = Self;

    fn neg(self) -> Self {
        Self(-self.0)
    }
}

// Never print secret material in full.
impl fmt::Debug for BlindingFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BlindingFactor(..)")
    }
}

/// Sum of blinds: `positive[0] + ... - negative[0] - ...`
///
/// This is the scalar counterpart of [`crate::pedersen::commit_sum`]: the
/// blind of a sum of commitments is the same sum of their blinds.
pub fn blind_sum(positive: &[BlindingFactor], negative: &[BlindingFactor]) -> BlindingFactor {
    let pos = positive.iter().fold(Scalar::ZERO, |acc, b| acc + b.0);
    let total = negative.iter().fold(pos, |acc, b| acc - b.0);
    BlindingFactor(total)
}

/// A public key: a curve point other than the identity.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct PublicKey(ProjectivePoint);

impl PublicKey {
    /// `secret * G`
    ///
    /// # Errors
    ///
    /// Returns `MwebError::PointAtInfinity` for the zero scalar.
    pub fn from_secret(secret: &BlindingFactor) -> Result<Self> {
        Self::from_point(ProjectivePoint::mul_by_generator(&secret.0))
    }

    /// Wrap a point.
    ///
    /// # Errors
    ///
    /// Returns `MwebError::PointAtInfinity` for the identity.
    pub fn from_point(point: ProjectivePoint) -> Result<Self> {
        if bool::from(point.is_identity()) {
            return Err(MwebError::PointAtInfinity);
        }
        Ok(Self(point))
    }

    /// Parse a SEC1 compressed key.
    ///
    /// # Errors
    ///
    /// Returns `MwebError::InvalidPublicKey` if the bytes are not a valid
    /// compressed point.
    pub fn from_bytes(bytes: &[u8; PUBLIC_KEY_LEN]) -> Result<Self> {
        let encoded = EncodedPoint::from_bytes(bytes).map_err(|_| MwebError::InvalidPublicKey)?;
        let affine = AffinePoint::from_encoded_point(&encoded)
            .into_option()
            .ok_or(MwebError::InvalidPublicKey)?;
        Self::from_point(affine.into()).map_err(|_| MwebError::InvalidPublicKey)
    }

    /// SEC1 compressed encoding.
    pub fn to_bytes(&self) -> [u8; PUBLIC_KEY_LEN] {
        let encoded = self.0.to_affine().to_encoded_point(true);
        let mut out = [0u8; PUBLIC_KEY_LEN];
        out.copy_from_slice(encoded.as_bytes());
        out
    }

    /// The underlying point.
    pub fn point(&self) -> &ProjectivePoint {
        &self.0
    }

    /// `self * scalar`
    ///
    /// # Errors
    ///
    /// Returns `MwebError::PointAtInfinity` for the zero scalar.
    pub fn mul(&self, scalar: &BlindingFactor) -> Result<Self> {
        Self::from_point(self.0 * scalar.0)
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", hex::encode(self.to_bytes()))
    }
}
