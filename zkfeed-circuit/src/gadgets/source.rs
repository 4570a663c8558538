// zkfeed/zkfeed-circuit/src/gadgets/source.rs
// Numan Thabit 2026

use halo2curves_axiom::bn256::Fr;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EcdsaSignature {
    pub r: [u8; 32],
    pub s: [u8; 32],
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct Secp256k1Pubkey {
    pub x: [u8; 32],
    pub y: [u8; 32],
}

/// Private witness for one oracle response: the signed digest, the
/// signature, the signer key, and the decommitment the circuit binds to
/// the public commitment. None of this reaches the ledger.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SourceWitness {
    /// 32-byte digest of the oracle's response payload, big-endian.
    pub message_hash: [u8; 32],
    pub signature: EcdsaSignature,
    pub oracle_pubkey: Secp256k1Pubkey,
    /// Opening of the public commitment.
    #[serde(with = "crate::serde_fr")]
    pub decommitment: Fr,
}
