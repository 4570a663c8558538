// zkfeed/zkfeed-circuit/src/gadgets/digest.rs
// Numan Thabit 2026

//! Digest well-formedness and scalar recomposition.
//!
//! The oracle signs a 32-byte response digest. Inside the circuit the
//! digest lives as 32 range-checked byte witnesses; this module rejects
//! the all-zero digest and recomposes the bytes into the three 88-bit
//! big-endian limbs of the secp256k1 scalar the ECDSA gadget consumes,
//! so the signed scalar is constrained byte-for-byte to the digest.

use halo2_base::{
    gates::{
        flex_gate::{GateChip, GateInstructions},
        range::{RangeChip, RangeInstructions},
    },
    AssignedValue, Context,
    QuantumCell::Constant,
};
use halo2curves_axiom::bn256::Fr;
use halo2curves_axiom::secp256k1::Fq;
use thiserror::Error;

/// Byte boundaries of the big-endian limb split: bytes 0..10 form the
/// most significant limb (80 bits), 10..21 and 21..32 the lower two
/// (88 bits each). Limb base is 2^88, matching the secp256k1 chip
/// configuration in [`crate::gadgets::ecdsa`].
const LIMB_SPLITS: [(usize, usize); 3] = [(21, 32), (10, 21), (0, 10)];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DigestError {
    /// Every byte of the digest is zero.
    #[error("digest is all-zero")]
    AllZero,
    /// The digest's big-endian value is not below the secp256k1 scalar
    /// field modulus, so it has no canonical scalar representation.
    #[error("digest value exceeds the secp256k1 scalar field modulus")]
    NotCanonical,
    /// A digest slice was not exactly 32 bytes long.
    #[error("digest must be exactly 32 bytes, got {0}")]
    WrongLength(usize),
}

/// Host-side check run before synthesis; the in-circuit constraints
/// repeat the zero check so a prover cannot bypass it.
pub fn validate_digest(digest: &[u8; 32]) -> Result<Fq, DigestError> {
    if digest.iter().all(|&b| b == 0) {
        return Err(DigestError::AllZero);
    }
    let mut le_bytes = *digest;
    le_bytes.reverse();
    Fq::from_bytes(&le_bytes)
        .into_option()
        .ok_or(DigestError::NotCanonical)
}

/// Check an arbitrary slice before committing it to a fixed digest.
pub fn digest_from_slice(bytes: &[u8]) -> Result<[u8; 32], DigestError> {
    let digest: [u8; 32] = bytes
        .try_into()
        .map_err(|_| DigestError::WrongLength(bytes.len()))?;
    validate_digest(&digest)?;
    Ok(digest)
}

/// Load the digest bytes as witnesses, each range-checked to 8 bits.
pub fn assign_digest_bytes(
    ctx: &mut Context<Fr>,
    range: &RangeChip<Fr>,
    digest: &[u8; 32],
) -> Vec<AssignedValue<Fr>> {
    digest
        .iter()
        .map(|byte| {
            let cell = ctx.load_witness(Fr::from(*byte as u64));
            range.range_check(ctx, cell, 8);
            cell
        })
        .collect()
}

/// Constrain that not every digest byte is zero: the count of zero
/// bytes must stay below 32.
pub fn enforce_nonzero_digest(
    ctx: &mut Context<Fr>,
    gate: &GateChip<Fr>,
    range: &RangeChip<Fr>,
    bytes: &[AssignedValue<Fr>],
) {
    let zero = ctx.load_constant(Fr::zero());
    let flags: Vec<AssignedValue<Fr>> = bytes
        .iter()
        .map(|byte| gate.is_equal(ctx, *byte, zero))
        .collect();
    let zero_count = gate.sum(ctx, flags);
    let cap = ctx.load_constant(Fr::from(bytes.len() as u64));
    let below = range.is_less_than(ctx, zero_count, cap, 8);
    gate.assert_is_const(ctx, &below, &Fr::one());
}

/// Bind the byte witnesses to the scalar's CRT limbs.
///
/// Each limb is recomposed big-endian (`limb = limb * 256 + byte`) from
/// its byte window and constrained equal to the corresponding limb of
/// the loaded scalar. Together with the host-side canonicity check this
/// pins the signed scalar to exactly the digest's big-endian value.
pub fn constrain_scalar_limbs(
    ctx: &mut Context<Fr>,
    gate: &GateChip<Fr>,
    bytes: &[AssignedValue<Fr>],
    scalar_limbs: &[AssignedValue<Fr>],
) {
    debug_assert_eq!(scalar_limbs.len(), LIMB_SPLITS.len());
    for ((start, end), scalar_limb) in LIMB_SPLITS.iter().zip(scalar_limbs.iter()) {
        let mut acc = ctx.load_constant(Fr::zero());
        for byte in &bytes[*start..*end] {
            acc = gate.mul_add(ctx, acc, Constant(Fr::from(256u64)), *byte);
        }
        ctx.constrain_equal(&acc, scalar_limb);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_all_zero_digest() {
        assert_eq!(validate_digest(&[0u8; 32]), Err(DigestError::AllZero));
    }

    #[test]
    fn rejects_digest_above_modulus() {
        assert_eq!(validate_digest(&[0xFF; 32]), Err(DigestError::NotCanonical));
    }

    #[test]
    fn accepts_canonical_digest() {
        let mut digest = [0u8; 32];
        digest[31] = 1;
        assert!(validate_digest(&digest).is_ok());
    }

    #[test]
    fn slice_length_is_checked() {
        assert_eq!(
            digest_from_slice(&[1u8; 31]),
            Err(DigestError::WrongLength(31))
        );
    }

    #[test]
    fn limb_windows_cover_the_digest() {
        let covered: usize = LIMB_SPLITS.iter().map(|(s, e)| e - s).sum();
        assert_eq!(covered, 32);
    }
}
