//! Ledger events. The log is append-only: once emitted, an event is
//! owned by the ledger and never mutated.

use halo2curves_axiom::bn256::Fr;
use serde::{Deserialize, Serialize};

use crate::types::{Address, RequestId};

/// Emitted exactly once per accepted `send_request`. Field order is the
/// wire order: id, the two packed identifier values, then the
/// requester's address coordinates.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RequestedEvent {
    pub request_id: RequestId,
    #[serde(with = "zkfeed_circuit::serde_fr")]
    pub identifier_part1: Fr,
    #[serde(with = "zkfeed_circuit::serde_fr")]
    pub identifier_part2: Fr,
    pub requester: Address,
}

impl RequestedEvent {
    /// Flattened field view in emission order, the shape external
    /// observers decode.
    pub fn to_fields(&self) -> [Fr; 5] {
        [
            *self.request_id.as_fr(),
            self.identifier_part1,
            self.identifier_part2,
            self.requester.x,
            self.requester.y,
        ]
    }
}

/// Emitted exactly once per successful fulfillment.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FulfilledEvent {
    pub request_id: RequestId,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum CoordinatorEvent {
    Requested(RequestedEvent),
    Fulfilled(FulfilledEvent),
}

/// Append-only event log owned by the ledger host.
#[derive(Clone, Debug, Default)]
pub struct EventLog {
    entries: Vec<CoordinatorEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn append(&mut self, event: CoordinatorEvent) {
        self.entries.push(event);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CoordinatorEvent> {
        self.entries.iter()
    }

    pub fn requested(&self) -> impl Iterator<Item = &RequestedEvent> {
        self.entries.iter().filter_map(|event| match event {
            CoordinatorEvent::Requested(inner) => Some(inner),
            _ => None,
        })
    }

    pub fn fulfilled(&self) -> impl Iterator<Item = &FulfilledEvent> {
        self.entries.iter().filter_map(|event| match event {
            CoordinatorEvent::Fulfilled(inner) => Some(inner),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requested_event_field_order() {
        let requester = Address::from_seed(9);
        let event = RequestedEvent {
            request_id: RequestId::derive(1, &requester),
            identifier_part1: Fr::from(11u64),
            identifier_part2: Fr::from(22u64),
            requester,
        };
        let fields = event.to_fields();
        assert_eq!(fields[0], *event.request_id.as_fr());
        assert_eq!(fields[1], Fr::from(11u64));
        assert_eq!(fields[2], Fr::from(22u64));
        assert_eq!(fields[3], requester.x);
        assert_eq!(fields[4], requester.y);
    }

    #[test]
    fn log_filters_by_kind() {
        let requester = Address::from_seed(1);
        let id = RequestId::derive(1, &requester);
        let mut log = EventLog::new();
        log.append(CoordinatorEvent::Requested(RequestedEvent {
            request_id: id,
            identifier_part1: Fr::from(1u64),
            identifier_part2: Fr::from(2u64),
            requester,
        }));
        log.append(CoordinatorEvent::Fulfilled(FulfilledEvent { request_id: id }));

        assert_eq!(log.len(), 2);
        assert_eq!(log.requested().count(), 1);
        assert_eq!(log.fulfilled().count(), 1);
        assert_eq!(log.fulfilled().next().unwrap().request_id, id);
    }
}
