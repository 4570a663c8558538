//! On-ledger coordination layer for proof-gated oracle requests.
//!
//! An application contract ([`Requestor`]) asks the
//! [`RequestCoordinator`] to fetch external data, paying a fee in the
//! configured payment token. The coordinator registers the request in a
//! sparse commitment tree, emits a `Requested` event, and later admits
//! exactly one fulfillment per request, gated on a ZK proof (or, in the
//! lighter variant, a bare signature) that the response digest was
//! signed by the configured oracle key.
//!
//! All state mutation happens inside atomic, serially ordered
//! operations against an explicit [`LedgerHost`]; there is no ambient
//! global state.

pub mod context;
pub mod coordinator;
pub mod error;
pub mod events;
pub mod pending;
pub mod requestor;
pub mod token;
pub mod types;

pub use context::{ExecutionContext, LedgerHost};
pub use coordinator::{
    CircuitVerifier, CoordinatorConfig, FulfillmentVerifier, RequestCoordinator,
};
pub use error::CoordinatorError;
pub use events::{CoordinatorEvent, EventLog, FulfilledEvent, RequestedEvent};
pub use pending::{requester_leaf, PendingRequestTree, PendingWitness, TREE_DEPTH};
pub use requestor::Requestor;
pub use token::{TokenError, TokenLedger};
pub use types::{Address, RequestId};
