//! Error taxonomy of the coordinator contract. Every variant aborts the
//! enclosing operation before any state is written, so a failed call
//! leaves ledger state exactly as it was.

use thiserror::Error;
use zkfeed_circuit::gadgets::digest::DigestError;

use crate::token::TokenError;
use crate::types::RequestId;

#[derive(Debug, Error, PartialEq)]
pub enum CoordinatorError {
    /// `initialize` ran on an already-configured coordinator.
    #[error("coordinator is already initialized")]
    AlreadyInitialized,

    /// A state-touching operation ran before `initialize`.
    #[error("coordinator is not initialized")]
    NotInitialized,

    /// Caller does not hold the role the operation requires.
    #[error("caller is not the configured owner")]
    Unauthorized,

    /// The fee transfer was refused by the payment token.
    #[error("fee transfer failed: {0}")]
    InsufficientFunds(#[from] TokenError),

    /// Cryptographic proof verification failed, or the proof is not
    /// bound to the configured oracle key.
    #[error("proof rejected: {0}")]
    InvalidProof(String),

    /// The supplied signature does not verify under the configured
    /// oracle key.
    #[error("signature is not valid for the configured oracle key")]
    InvalidSignature,

    /// The signed digest is zero, mis-sized, or non-canonical.
    #[error("signed digest rejected: {0}")]
    MalformedDigest(#[from] DigestError),

    /// Fulfillment referenced an id with no live pending entry (never
    /// requested, or already fulfilled).
    #[error("no pending request for {0}")]
    UnknownRequest(RequestId),

    /// The supplied membership witness does not open the committed
    /// pending-set root.
    #[error("pending-set witness does not match the committed root")]
    InvalidWitness,
}
