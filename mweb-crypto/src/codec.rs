//! Commitment point encoding
//!
//! MWEB serializes commitments as 33 bytes: a parity byte followed by the
//! big-endian x-coordinate.
//!
//! ```text
//! data[0]     = 8 + (1 if y is NOT a quadratic residue else 0)
//! data[1..33] = x
//! ```
//!
//! This is not SEC1 compression. The parity bit records whether y is a
//! quadratic residue mod p, not whether y is odd. The two properties are
//! independent, so the bit must be computed with a square-root test.
//!
//! Decoding recovers `y = sqrt(x³ + 7)`. For p ≡ 3 (mod 4) the field square
//! root `a^((p+1)/4)` is always itself a residue, so the stored bit says
//! whether to negate it.

use k256::{
    elliptic_curve::{
        sec1::{FromEncodedPoint, ToEncodedPoint},
        Group,
    },
    AffinePoint, EncodedPoint, FieldBytes, FieldElement, ProjectivePoint,
};

use crate::constants::{COMMITMENT_LEN, COMMITMENT_PARITY_BASE};
use crate::{MwebError, Result};

/// Whether `y` has a square root in the base field.
pub(crate) fn is_quad(y: &FieldElement) -> bool {
    y.sqrt().is_some().into()
}

/// Encode a point in the 33-byte commitment format.
///
/// # Errors
///
/// Returns `MwebError::PointAtInfinity` for the identity, which has no
/// affine coordinates.
pub fn compress(point: &ProjectivePoint) -> Result<[u8; COMMITMENT_LEN]> {
    if bool::from(point.is_identity()) {
        return Err(MwebError::PointAtInfinity);
    }

    let encoded = point.to_affine().to_encoded_point(false);
    let x = encoded.x().ok_or(MwebError::PointAtInfinity)?;
    let y_bytes = encoded.y().ok_or(MwebError::PointAtInfinity)?;

    let y = FieldElement::from_bytes(y_bytes)
        .into_option()
        .ok_or(MwebError::ScalarOverflow)?;

    let mut out = [0u8; COMMITMENT_LEN];
    out[0] = COMMITMENT_PARITY_BASE;
    if !is_quad(&y) {
        out[0] += 1;
    }
    out[1..].copy_from_slice(x);
    Ok(out)
}

/// Decode a point from the 33-byte commitment format.
///
/// # Errors
///
/// `MwebError::InvalidCommitment` if the parity byte is not 8 or 9, if x is
/// not below the field prime, or if `x³ + 7` has no square root.
pub fn decompress(bytes: &[u8; COMMITMENT_LEN]) -> Result<ProjectivePoint> {
    let negate = match bytes[0] {
        b if b == COMMITMENT_PARITY_BASE => false,
        b if b == COMMITMENT_PARITY_BASE + 1 => true,
        prefix => {
            log::debug!("rejecting commitment with parity byte {prefix:#04x}");
            return Err(MwebError::InvalidCommitment);
        }
    };

    let x_bytes = FieldBytes::clone_from_slice(&bytes[1..]);
    let x = FieldElement::from_bytes(&x_bytes)
        .into_option()
        .ok_or_else(|| {
            log::debug!("rejecting commitment x={}: not below p", hex::encode(&x_bytes));
            MwebError::InvalidCommitment
        })?;

    let y_squared = x * x * x + FieldElement::from(7u64);
    let mut y = y_squared.sqrt().into_option().ok_or_else(|| {
        log::debug!("rejecting commitment x={}: not on the curve", hex::encode(&x_bytes));
        MwebError::InvalidCommitment
    })?;
    if negate {
        y = -y;
    }

    let encoded = EncodedPoint::from_affine_coordinates(&x_bytes, &y.to_bytes(), false);
    let affine = AffinePoint::from_encoded_point(&encoded)
        .into_option()
        .ok_or(MwebError::InvalidCommitment)?;

    Ok(affine.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use k256::{elliptic_curve::ops::MulByGenerator, Scalar};
    use std::sync::Mutex;

    #[test]
    fn test_compress_generator_g() {
        // G has a residue y, so it encodes with 0x08
        let g = ProjectivePoint::GENERATOR;
        let bytes = compress(&g).unwrap();
        assert_eq!(
            hex::encode(bytes),
            "0879be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798"
        );
    }

    #[test]
    fn test_round_trip_multiples_of_g() {
        for k in 1u64..64 {
            let p = ProjectivePoint::mul_by_generator(&Scalar::from(k));
            let bytes = compress(&p).unwrap();
            let back = decompress(&bytes).unwrap();
            assert_eq!(back, p, "round trip failed for {}*G", k);
            assert_eq!(compress(&back).unwrap(), bytes);
        }
    }

    #[test]
    fn test_negation_flips_parity() {
        // -1 is a non-residue mod p, so exactly one of y and -y is a residue
        let p = ProjectivePoint::mul_by_generator(&Scalar::from(7u64));
        let a = compress(&p).unwrap();
        let b = compress(&-p).unwrap();
        assert_eq!(a[1..], b[1..]);
        assert_eq!(a[0] ^ b[0], 1);
    }

    #[test]
    fn test_identity_rejected() {
        assert_eq!(
            compress(&ProjectivePoint::IDENTITY),
            Err(MwebError::PointAtInfinity)
        );
    }

    #[test]
    fn test_bad_prefix_rejected() {
        let mut bytes = compress(&ProjectivePoint::GENERATOR).unwrap();
        bytes[0] = 0x02;
        assert_eq!(decompress(&bytes), Err(MwebError::InvalidCommitment));
    }

    #[test]
    fn test_x_overflow_rejected() {
        let mut bytes = [0xffu8; COMMITMENT_LEN];
        bytes[0] = COMMITMENT_PARITY_BASE;
        assert_eq!(decompress(&bytes), Err(MwebError::InvalidCommitment));
    }

    #[test]
    fn test_off_curve_rejected() {
        // x = 5: 125 + 7 = 132 is not a square mod p
        let mut bytes = [0u8; COMMITMENT_LEN];
        bytes[0] = COMMITMENT_PARITY_BASE;
        bytes[32] = 5;
        assert_eq!(decompress(&bytes), Err(MwebError::InvalidCommitment));
    }

    /// Collects every log line emitted by this test binary.
    struct Capture(Mutex<Vec<String>>);

    impl log::Log for Capture {
        fn enabled(&self, _: &log::Metadata<'_>) -> bool {
            true
        }

        fn log(&self, record: &log::Record<'_>) {
            self.0
                .lock()
                .unwrap()
                .push(format!("{} {}", record.level(), record.args()));
        }

        fn flush(&self) {}
    }

    static CAPTURE: Capture = Capture(Mutex::new(Vec::new()));

    fn logged(needle: &str) -> bool {
        CAPTURE.0.lock().unwrap().iter().any(|line| line.contains(needle))
    }

    #[test]
    fn test_rejections_logged_at_debug() {
        let _ = log::set_logger(&CAPTURE);
        log::set_max_level(log::LevelFilter::Debug);

        let mut bytes = compress(&ProjectivePoint::GENERATOR).unwrap();
        bytes[0] = 0x07;
        assert!(decompress(&bytes).is_err());
        assert!(logged("DEBUG rejecting commitment with parity byte 0x07"));

        let mut off_curve = [0u8; COMMITMENT_LEN];
        off_curve[0] = COMMITMENT_PARITY_BASE;
        off_curve[32] = 5;
        assert!(decompress(&off_curve).is_err());
        assert!(logged(&format!(
            "DEBUG rejecting commitment x={}: not on the curve",
            hex::encode(&off_curve[1..])
        )));
    }
}
