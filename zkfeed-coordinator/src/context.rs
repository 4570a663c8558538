//! Execution environment the contracts run against.
//!
//! The host ledger applies each operation as one atomic, serially
//! ordered transaction. Instead of an ambient global network instance,
//! every operation receives the [`ExecutionContext`] it runs under and
//! the [`LedgerHost`] holding the shared collaborators (token ledgers,
//! event log).

use std::collections::HashMap;

use tracing::info;

use crate::events::{CoordinatorEvent, EventLog};
use crate::token::TokenLedger;
use crate::types::Address;

/// Per-transaction context: who signed the transaction being applied.
#[derive(Clone, Copy, Debug)]
pub struct ExecutionContext {
    pub caller: Address,
}

impl ExecutionContext {
    pub fn new(caller: Address) -> Self {
        Self { caller }
    }
}

/// Shared ledger state outside any single contract: the fungible-token
/// ledgers (addressed by token address) and the append-only event log.
#[derive(Debug, Default)]
pub struct LedgerHost {
    tokens: HashMap<Address, TokenLedger>,
    pub events: EventLog,
}

impl LedgerHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// The token ledger at `address`, created empty on first touch. A
    /// token nobody minted simply fails every non-zero transfer.
    pub fn token_mut(&mut self, address: &Address) -> &mut TokenLedger {
        self.tokens.entry(*address).or_default()
    }

    pub fn token(&self, address: &Address) -> Option<&TokenLedger> {
        self.tokens.get(address)
    }

    pub(crate) fn emit(&mut self, event: CoordinatorEvent) {
        match &event {
            CoordinatorEvent::Requested(inner) => {
                info!(request_id = %inner.request_id, requester = %inner.requester, "requested");
            }
            CoordinatorEvent::Fulfilled(inner) => {
                info!(request_id = %inner.request_id, "fulfilled");
            }
        }
        self.events.append(event);
    }
}
