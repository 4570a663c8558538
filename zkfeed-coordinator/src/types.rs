//! Ledger-facing value types.

use std::fmt;
use std::hash::{Hash, Hasher};

use halo2curves_axiom::bn256::Fr;
use serde::{Deserialize, Serialize};
use zkfeed_common::{fr_to_bytes, poseidon_hash};

/// An account address as the ledger stores it: two field-element
/// coordinates. Events carry both coordinates so observers can
/// reconstruct the address.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    #[serde(with = "zkfeed_circuit::serde_fr")]
    pub x: Fr,
    #[serde(with = "zkfeed_circuit::serde_fr")]
    pub y: Fr,
}

impl Address {
    pub fn new(x: Fr, y: Fr) -> Self {
        Self { x, y }
    }

    /// Deterministic address for fixtures and local deployments.
    pub fn from_seed(seed: u64) -> Self {
        let x = Fr::from(seed);
        let y = poseidon_hash(&[x]);
        Self { x, y }
    }

    pub fn to_fields(&self) -> [Fr; 2] {
        [self.x, self.y]
    }

    pub fn from_fields(fields: [Fr; 2]) -> Self {
        Self {
            x: fields[0],
            y: fields[1],
        }
    }
}

impl Hash for Address {
    fn hash<H: Hasher>(&self, state: &mut H) {
        fr_to_bytes(&self.x).hash(state);
        fr_to_bytes(&self.y).hash(state);
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "addr:{}", hex_prefix(&fr_to_bytes(&self.x)))
    }
}

/// Unique request identifier: Poseidon(counter, requester.x). The
/// counter is strictly monotone, so ids never repeat for the lifetime
/// of a coordinator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestId(#[serde(with = "zkfeed_circuit::serde_fr")] pub Fr);

impl RequestId {
    pub fn derive(counter: u64, requester: &Address) -> Self {
        Self(poseidon_hash(&[Fr::from(counter), requester.x]))
    }

    pub fn as_fr(&self) -> &Fr {
        &self.0
    }

    pub fn to_bytes(&self) -> [u8; 32] {
        fr_to_bytes(&self.0)
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "request:{}", hex_prefix(&self.to_bytes()))
    }
}

fn hex_prefix(bytes: &[u8; 32]) -> String {
    let mut out = String::with_capacity(2 + 16);
    out.push_str("0x");
    for byte in bytes.iter().take(8) {
        out.push_str(&format!("{:02x}", byte));
    }
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_fields_round_trip() {
        let addr = Address::from_seed(7);
        assert_eq!(Address::from_fields(addr.to_fields()), addr);
    }

    #[test]
    fn seeded_addresses_differ() {
        assert_ne!(Address::from_seed(1), Address::from_seed(2));
    }

    #[test]
    fn request_ids_differ_per_counter_and_requester() {
        let a = Address::from_seed(1);
        let b = Address::from_seed(2);
        assert_ne!(RequestId::derive(1, &a), RequestId::derive(2, &a));
        assert_ne!(RequestId::derive(1, &a), RequestId::derive(1, &b));
    }

    #[test]
    fn request_id_serde_round_trip() {
        let id = RequestId::derive(1, &Address::from_seed(3));
        let json = serde_json::to_string(&id).unwrap();
        let back: RequestId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
