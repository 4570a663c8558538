//! Bounded string ↔ field-element packing.
//!
//! External identifiers (content-addressed hashes, job names) travel
//! on-ledger as field elements. A single bn254 element holds at most 31
//! bytes, so longer identifiers are split into two packed values by the
//! caller and reassembled after decoding. Packing is little-endian
//! base-256; decoding treats trailing zero bytes as padding.

use halo2curves_axiom::bn256::Fr;
use halo2curves_axiom::ff::{Field, PrimeField};
use thiserror::Error;

use crate::poseidon::poseidon_hash;

/// Bytes that fit in one packed field element. The 32nd byte could push
/// the packed value past the field modulus, so capacity stops at 31.
pub const STRING_CAPACITY: usize = 31;

/// Longest identifier `segment_identifier` accepts (two packed values).
pub const IDENTIFIER_CAPACITY: usize = 2 * STRING_CAPACITY;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StringCodecError {
    /// The input does not fit the fixed packing capacity.
    #[error("{length} bytes exceed the packing capacity of {capacity}")]
    LengthExceeded { length: usize, capacity: usize },
}

/// A byte string of bounded length with a reversible field encoding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StringValue {
    bytes: Vec<u8>,
}

impl StringValue {
    pub fn new(s: &str) -> Result<Self, StringCodecError> {
        Self::from_bytes(s.as_bytes().to_vec())
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, StringCodecError> {
        if bytes.len() > STRING_CAPACITY {
            return Err(StringCodecError::LengthExceeded {
                length: bytes.len(),
                capacity: STRING_CAPACITY,
            });
        }
        Ok(Self { bytes })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Pack the bytes into one field element, little-endian base-256:
    /// byte `i` contributes `b_i · 256^i`.
    pub fn to_field(&self) -> Fr {
        let mut acc = Fr::ZERO;
        let mut base = Fr::ONE;
        let shift = Fr::from(256u64);
        for byte in &self.bytes {
            acc += Fr::from(*byte as u64) * base;
            base *= shift;
        }
        acc
    }

    /// Unpack a field element produced by [`Self::to_field`]. The result
    /// always carries `STRING_CAPACITY` bytes; trailing zeros are
    /// padding and stay in place until [`Self::trimmed`].
    pub fn from_field(value: &Fr) -> Self {
        let repr = value.to_repr();
        Self {
            bytes: repr.as_ref()[..STRING_CAPACITY].to_vec(),
        }
    }

    /// Strip trailing zero padding.
    pub fn trimmed(&self) -> Self {
        let end = self
            .bytes
            .iter()
            .rposition(|&b| b != 0)
            .map_or(0, |idx| idx + 1);
        Self {
            bytes: self.bytes[..end].to_vec(),
        }
    }

    /// Bit view, least-significant bit first within each byte. Used when
    /// a value crosses a boundary that expects raw bits instead of a
    /// packed element.
    pub fn to_bits(&self) -> Vec<bool> {
        let mut bits = Vec::with_capacity(self.bytes.len() * 8);
        for byte in &self.bytes {
            for bit in 0..8 {
                bits.push(byte & (1 << bit) != 0);
            }
        }
        bits
    }

    /// Rebuild from a bit view produced by [`Self::to_bits`]. A partial
    /// trailing byte is dropped, matching the bit-to-byte grouping of
    /// the packing.
    pub fn from_bits(bits: &[bool]) -> Result<Self, StringCodecError> {
        let mut bytes = Vec::with_capacity(bits.len() / 8);
        for chunk in bits.chunks_exact(8) {
            let mut byte = 0u8;
            for (bit_index, bit) in chunk.iter().enumerate() {
                if *bit {
                    byte |= 1 << bit_index;
                }
            }
            bytes.push(byte);
        }
        Self::from_bytes(bytes)
    }

    /// Poseidon commitment over the per-byte field elements; binds an
    /// identifier into commitment material.
    pub fn hash(&self) -> Fr {
        let elements: Vec<Fr> = self
            .bytes
            .iter()
            .map(|byte| Fr::from(*byte as u64))
            .collect();
        poseidon_hash(&elements)
    }
}

impl std::fmt::Display for StringValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.bytes))
    }
}

/// Split an identifier of up to [`IDENTIFIER_CAPACITY`] bytes into the
/// two packed values a request carries. Shorter identifiers leave the
/// second value zero.
pub fn segment_identifier(identifier: &str) -> Result<(Fr, Fr), StringCodecError> {
    let bytes = identifier.as_bytes();
    if bytes.len() > IDENTIFIER_CAPACITY {
        return Err(StringCodecError::LengthExceeded {
            length: bytes.len(),
            capacity: IDENTIFIER_CAPACITY,
        });
    }
    let split = bytes.len().min(STRING_CAPACITY);
    let head = StringValue::from_bytes(bytes[..split].to_vec())?;
    let tail = StringValue::from_bytes(bytes[split..].to_vec())?;
    Ok((head.to_field(), tail.to_field()))
}

/// Reassemble an identifier from its two packed values, stripping the
/// zero padding each segment carries.
pub fn join_identifier(part1: &Fr, part2: &Fr) -> String {
    let head = StringValue::from_field(part1).trimmed();
    let tail = StringValue::from_field(part2).trimmed();
    format!("{}{}", head, tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_CID: &str = "QmbCpnprEGiPZfESXkbXmcXcBEt96TZMpYAxsoEFQNxoEV";

    #[test]
    fn round_trip_within_capacity() {
        for s in ["", "a", "hello world", "0123456789012345678901234567890"] {
            let value = StringValue::new(s).unwrap();
            let decoded = StringValue::from_field(&value.to_field()).trimmed();
            assert_eq!(decoded.as_bytes(), s.as_bytes(), "failed for {:?}", s);
        }
    }

    #[test]
    fn round_trip_all_lengths() {
        for len in 0..=STRING_CAPACITY {
            let s: String = "x".repeat(len);
            let value = StringValue::new(&s).unwrap();
            let decoded = StringValue::from_field(&value.to_field()).trimmed();
            assert_eq!(decoded.as_bytes().len(), len);
        }
    }

    #[test]
    fn encode_rejects_over_capacity() {
        let too_long = "y".repeat(STRING_CAPACITY + 1);
        assert_eq!(
            StringValue::new(&too_long),
            Err(StringCodecError::LengthExceeded {
                length: STRING_CAPACITY + 1,
                capacity: STRING_CAPACITY,
            })
        );
    }

    #[test]
    fn interior_zero_bytes_survive() {
        let value = StringValue::from_bytes(vec![1, 0, 2]).unwrap();
        let decoded = StringValue::from_field(&value.to_field()).trimmed();
        assert_eq!(decoded.as_bytes(), &[1, 0, 2]);
    }

    #[test]
    fn bits_round_trip() {
        let value = StringValue::new("QmYwAPJzv5CZsnA").unwrap();
        let bits = value.to_bits();
        assert_eq!(bits.len(), value.as_bytes().len() * 8);
        let rebuilt = StringValue::from_bits(&bits).unwrap();
        assert_eq!(rebuilt, value);
    }

    #[test]
    fn hash_distinguishes_strings() {
        let a = StringValue::new("QmA").unwrap().hash();
        let b = StringValue::new("QmB").unwrap().hash();
        assert_ne!(a, b);
    }

    #[test]
    fn content_hash_splits_and_rejoins() {
        let (part1, part2) = segment_identifier(SAMPLE_CID).unwrap();
        assert_eq!(join_identifier(&part1, &part2), SAMPLE_CID);
    }

    #[test]
    fn short_identifier_leaves_second_value_zero() {
        let (part1, part2) = segment_identifier("Qm").unwrap();
        assert_ne!(part1, Fr::ZERO);
        assert_eq!(part2, Fr::ZERO);
        assert_eq!(join_identifier(&part1, &part2), "Qm");
    }

    #[test]
    fn identifier_over_capacity_rejected() {
        let too_long = "z".repeat(IDENTIFIER_CAPACITY + 1);
        assert!(segment_identifier(&too_long).is_err());
    }
}
