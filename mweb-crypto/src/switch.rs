//! Switch commitments
//!
//! A switch commitment is an ordinary Pedersen commitment whose blind has
//! been bound to the committed value:
//!
//! ```text
//! switch_commit(blind, value) = commit(blind_switch(blind, value), value)
//! ```
//!
//! The transform is pluggable through [`SwitchTransform`]. The MWEB
//! derivation ([`MwebBlindSwitch`]) is:
//!
//! ```text
//! blind' = blind + BLAKE3(commit(blind, value) || SEC1(blind*J))  (mod n)
//! ```
//!
//! where J is a third generator independent of G and H.

use std::sync::OnceLock;

use k256::{elliptic_curve::ops::Reduce, Scalar, U256};

use crate::constants::GENERATOR_J_PUB;
use crate::keys::{BlindingFactor, PublicKey};
use crate::pedersen::{commit, Commitment};
use crate::{MwebError, Result};

static GENERATOR_J: OnceLock<Option<PublicKey>> = OnceLock::new();

/// The switch generator J.
///
/// # Errors
///
/// Returns `MwebError::InvalidGenerator` if the constant is not on the curve.
pub fn generator_j() -> Result<&'static PublicKey> {
    GENERATOR_J
        .get_or_init(|| PublicKey::from_bytes(&GENERATOR_J_PUB).ok())
        .as_ref()
        .ok_or(MwebError::InvalidGenerator)
}

/// Deterministic derivation binding a blind to the value it commits.
pub trait SwitchTransform {
    /// Derive the switched blind for `value`.
    ///
    /// # Errors
    ///
    /// Implementations fail when the derivation hits a degenerate input.
    fn blind_switch(&self, blind: &BlindingFactor, value: u64) -> Result<BlindingFactor>;
}

/// The MWEB blind-switch derivation.
#[derive(Debug, Clone, Copy, Default)]
pub struct MwebBlindSwitch;

impl SwitchTransform for MwebBlindSwitch {
    fn blind_switch(&self, blind: &BlindingFactor, value: u64) -> Result<BlindingFactor> {
        let commitment = commit(blind, value)?;
        let blind_j = generator_j()?.mul(blind)?;

        let mut hasher = blake3::Hasher::new();
        hasher.update(commitment.as_bytes());
        hasher.update(&blind_j.to_bytes());
        let digest: [u8; 32] = *hasher.finalize().as_bytes();

        let tweak = <Scalar as Reduce<U256>>::reduce_bytes(&digest.into());
        Ok(*blind + BlindingFactor::from(tweak))
    }
}

/// Switch commitment using the MWEB derivation.
///
/// # Errors
///
/// `MwebError::PointAtInfinity` for a zero blind.
pub fn switch_commit(blind: &BlindingFactor, value: u64) -> Result<Commitment> {
    switch_commit_with(&MwebBlindSwitch, blind, value)
}

/// Switch commitment using a caller-supplied derivation.
///
/// # Errors
///
/// Propagates failures from the transform and from [`commit`].
pub fn switch_commit_with<T: SwitchTransform + ?Sized>(
    transform: &T,
    blind: &BlindingFactor,
    value: u64,
) -> Result<Commitment> {
    let switched = transform.blind_switch(blind, value)?;
    commit(&switched, value)
}
