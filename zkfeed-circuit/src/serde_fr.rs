// zkfeed/zkfeed-circuit/src/serde_fr.rs
// Numan Thabit 2026

//! Serde adapter for bn254 scalars: 0x-prefixed hex of the little-endian
//! `to_repr` bytes, so JSON fixtures stay readable and canonical.

use halo2curves_axiom::bn256::Fr;
use halo2curves_axiom::ff::PrimeField;
use serde::{de, Deserializer, Serializer};
use std::fmt;

pub fn serialize<S>(fr: &Fr, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let repr = fr.to_repr();
    let mut out = String::with_capacity(2 + 64);
    out.push_str("0x");
    for byte in repr.as_ref() {
        out.push_str(&format!("{:02x}", byte));
    }
    serializer.serialize_str(&out)
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<Fr, D::Error>
where
    D: Deserializer<'de>,
{
    struct FrVisitor;

    impl de::Visitor<'_> for FrVisitor {
        type Value = Fr;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a 32-byte hex string (with or without 0x prefix)")
        }

        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            let hex_str = v.strip_prefix("0x").unwrap_or(v);
            if hex_str.len() != 64 {
                return Err(E::custom(format!(
                    "expected 64 hex chars, got {}",
                    hex_str.len()
                )));
            }
            let mut bytes = [0u8; 32];
            for (i, chunk) in hex_str.as_bytes().chunks(2).enumerate() {
                let hi = (chunk[0] as char)
                    .to_digit(16)
                    .ok_or_else(|| E::custom("invalid hex char"))?;
                let lo = (chunk[1] as char)
                    .to_digit(16)
                    .ok_or_else(|| E::custom("invalid hex char"))?;
                bytes[i] = ((hi << 4) | lo) as u8;
            }
            Fr::from_repr(bytes)
                .into_option()
                .ok_or_else(|| E::custom("invalid field element encoding"))
        }
    }

    deserializer.deserialize_str(FrVisitor)
}
