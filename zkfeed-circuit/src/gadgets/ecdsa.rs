// zkfeed/zkfeed-circuit/src/gadgets/ecdsa.rs
// Numan Thabit 2026

use halo2_base::{
    gates::{range::RangeChip, GateInstructions, RangeInstructions},
    AssignedValue, Context,
};
use halo2_ecc::{
    bigint::ProperCrtUint,
    ecc::{ecdsa::ecdsa_verify_no_pubkey_check, EcPoint},
    fields::FieldChip,
    secp256k1::{FpChip as SecpFpChip, FqChip, Secp256k1Chip},
};
use halo2curves_axiom::{
    bn256::Fr,
    secp256k1::{Fp, Fq, Secp256k1Affine},
};

use crate::gadgets::digest::{self, DigestError};
use crate::gadgets::source::{EcdsaSignature, Secp256k1Pubkey, SourceWitness};

const SECP_LIMB_BITS: usize = 88;
const SECP_NUM_LIMBS: usize = 3;

/// secp256k1 curve constant b = 7 (curve equation: y² = x³ + 7)
const SECP256K1_B: u64 = 7;

/// Errors that can occur while loading ECDSA witness material.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EcdsaError {
    /// The oracle key x-coordinate is not a valid secp256k1 base field element.
    InvalidPubkeyX,
    /// The oracle key y-coordinate is not a valid secp256k1 base field element.
    InvalidPubkeyY,
    /// The oracle key point (x, y) does not lie on the secp256k1 curve.
    PubkeyNotOnCurve,
    /// The signature r component is not a valid secp256k1 scalar field element.
    InvalidSignatureR,
    /// The signature s component is not a valid secp256k1 scalar field element.
    InvalidSignatureS,
    /// The signed digest is malformed (zero, or no canonical scalar).
    MalformedDigest(DigestError),
}

impl std::fmt::Display for EcdsaError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidPubkeyX => write!(
                f,
                "invalid oracle key x-coordinate: value exceeds base field modulus"
            ),
            Self::InvalidPubkeyY => write!(
                f,
                "invalid oracle key y-coordinate: value exceeds base field modulus"
            ),
            Self::PubkeyNotOnCurve => write!(
                f,
                "oracle key is not on the secp256k1 curve: y² ≠ x³ + 7 (mod p)"
            ),
            Self::InvalidSignatureR => write!(
                f,
                "invalid ECDSA signature r component: value exceeds scalar field modulus"
            ),
            Self::InvalidSignatureS => write!(
                f,
                "invalid ECDSA signature s component: value exceeds scalar field modulus"
            ),
            Self::MalformedDigest(err) => write!(f, "malformed signed digest: {}", err),
        }
    }
}

impl std::error::Error for EcdsaError {}

impl From<DigestError> for EcdsaError {
    fn from(err: DigestError) -> Self {
        Self::MalformedDigest(err)
    }
}

/// Verify the oracle's ECDSA signature over the response digest inside
/// the circuit.
///
/// The digest byte witnesses must already be range-checked (see
/// [`digest::assign_digest_bytes`]); their big-endian recomposition is
/// constrained against the scalar the signature is verified for, so the
/// proof attests "this exact digest was signed", not merely "some scalar
/// was signed".
///
/// The oracle key point is validated on the curve twice: host-side with
/// a typed error, and in-circuit as a constraint a malicious prover
/// cannot skip.
pub fn verify_oracle_signature(
    ctx: &mut Context<Fr>,
    range: &RangeChip<Fr>,
    source: &SourceWitness,
    digest_bytes: &[AssignedValue<Fr>],
) -> Result<(), EcdsaError> {
    let fp_chip = SecpFpChip::new(range, SECP_LIMB_BITS, SECP_NUM_LIMBS);
    let fq_chip = FqChip::new(range, SECP_LIMB_BITS, SECP_NUM_LIMBS);
    let ecc_chip = Secp256k1Chip::new(&fp_chip);

    let (x_fp, y_fp) = parse_pubkey_coords(&source.oracle_pubkey)?;
    validate_point_on_curve(&x_fp, &y_fp)?;

    let pk = ecc_chip.load_private::<Secp256k1Affine>(ctx, (x_fp, y_fp));
    constrain_pubkey_on_curve(ctx, &fp_chip, &pk);

    let (r, s) = load_signature(ctx, &fq_chip, &source.signature)?;

    let scalar = digest::validate_digest(&source.message_hash)?;
    let msghash = fq_chip.load_private(ctx, scalar);
    digest::constrain_scalar_limbs(ctx, range.gate(), digest_bytes, msghash.limbs());

    let verified = ecdsa_verify_no_pubkey_check::<Fr, Fp, Fq, Secp256k1Affine>(
        &ecc_chip, ctx, pk, r, s, msghash, 4, 4,
    );
    range.gate().assert_is_const(ctx, &verified, &Fr::one());

    Ok(())
}

fn parse_pubkey_coords(pk: &Secp256k1Pubkey) -> Result<(Fp, Fp), EcdsaError> {
    let x = try_fp_from_bytes(&pk.x).map_err(|_| EcdsaError::InvalidPubkeyX)?;
    let y = try_fp_from_bytes(&pk.y).map_err(|_| EcdsaError::InvalidPubkeyY)?;
    Ok((x, y))
}

/// Host-side on-curve check: y² = x³ + 7 (mod p). The in-circuit
/// counterpart is [`constrain_pubkey_on_curve`].
fn validate_point_on_curve(x: &Fp, y: &Fp) -> Result<(), EcdsaError> {
    let y_squared = y.square();
    let x_cubed = x.square() * x;
    let rhs = x_cubed + Fp::from(SECP256K1_B);
    if y_squared != rhs {
        return Err(EcdsaError::PubkeyNotOnCurve);
    }
    Ok(())
}

/// In-circuit on-curve constraint for the oracle key. Without it, a
/// prover that bypassed the host-side check could feed points from
/// weaker curves into the scalar multiplication.
fn constrain_pubkey_on_curve<'chip>(
    ctx: &mut Context<Fr>,
    fp_chip: &SecpFpChip<'chip, Fr>,
    pk: &EcPoint<Fr, ProperCrtUint<Fr>>,
) {
    let y_squared = fp_chip.mul(ctx, pk.y.clone(), pk.y.clone());
    let x_squared = fp_chip.mul(ctx, pk.x.clone(), pk.x.clone());
    let x_cubed = fp_chip.mul(ctx, x_squared, pk.x.clone());
    let b = fp_chip.load_constant(ctx, Fp::from(SECP256K1_B));
    let rhs = fp_chip.add_no_carry(ctx, x_cubed, b);
    let rhs = fp_chip.carry_mod(ctx, rhs);
    fp_chip.assert_equal(ctx, y_squared, rhs);
}

fn load_signature(
    ctx: &mut Context<Fr>,
    fq_chip: &FqChip<'_, Fr>,
    sig: &EcdsaSignature,
) -> Result<(ProperCrtUint<Fr>, ProperCrtUint<Fr>), EcdsaError> {
    let r_val = try_fq_from_bytes(&sig.r).map_err(|_| EcdsaError::InvalidSignatureR)?;
    let s_val = try_fq_from_bytes(&sig.s).map_err(|_| EcdsaError::InvalidSignatureS)?;
    let r = fq_chip.load_private(ctx, r_val);
    let s = fq_chip.load_private(ctx, s_val);
    Ok((r, s))
}

/// Error returned when a byte array is not a canonical field element.
#[derive(Debug, Clone, Copy)]
pub struct FieldElementError;

/// Big-endian bytes to a secp256k1 scalar field element (Fq), rejecting
/// values at or above the scalar modulus instead of reducing them.
pub fn try_fq_from_bytes(bytes: &[u8; 32]) -> Result<Fq, FieldElementError> {
    let mut le_bytes = *bytes;
    le_bytes.reverse();
    Fq::from_bytes(&le_bytes)
        .into_option()
        .ok_or(FieldElementError)
}

/// Big-endian bytes to a secp256k1 base field element (Fp), rejecting
/// values at or above the base field modulus instead of reducing them.
pub fn try_fp_from_bytes(bytes: &[u8; 32]) -> Result<Fp, FieldElementError> {
    let mut le_bytes = *bytes;
    le_bytes.reverse();
    Fp::from_bytes(&le_bytes)
        .into_option()
        .ok_or(FieldElementError)
}
