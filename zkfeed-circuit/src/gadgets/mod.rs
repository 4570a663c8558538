// zkfeed/zkfeed-circuit/src/gadgets/mod.rs
// Numan Thabit 2026

pub mod digest;
pub mod ecdsa;
pub mod poseidon;
pub mod source;
