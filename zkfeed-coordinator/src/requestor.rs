//! Thin requestor façade consumed by application contracts.
//!
//! Holds nothing but its own address (the requester identity recorded
//! with each request) and the latest answer the oracle delivered.
//! Requests and fulfillments are delegated to the coordinator; the
//! façade re-emits the identifying event locally so observers watching
//! only this contract still see the request id.

use halo2curves_axiom::bn256::Fr;

use crate::context::{ExecutionContext, LedgerHost};
use crate::coordinator::{FulfillmentVerifier, RequestCoordinator};
use crate::error::CoordinatorError;
use crate::events::{CoordinatorEvent, RequestedEvent};
use crate::pending::PendingWitness;
use crate::types::{Address, RequestId};
use zkfeed_common::ProofBundle;

pub struct Requestor {
    /// This contract's own address, used as the requester identity.
    pub address: Address,
    last_response: Option<Fr>,
}

impl Requestor {
    pub fn deploy(address: Address) -> Self {
        Self {
            address,
            last_response: None,
        }
    }

    /// Forward a request for the identifier split across two packed
    /// values. The fee is charged to the transaction caller.
    pub fn send_request<V>(
        &self,
        coordinator: &mut RequestCoordinator<V>,
        host: &mut LedgerHost,
        ctx: &ExecutionContext,
        identifier_part1: Fr,
        identifier_part2: Fr,
    ) -> Result<RequestId, CoordinatorError> {
        let request_id = coordinator.send_request(
            host,
            ctx,
            &self.address,
            identifier_part1,
            identifier_part2,
        )?;
        host.emit(CoordinatorEvent::Requested(RequestedEvent {
            request_id,
            identifier_part1,
            identifier_part2,
            requester: self.address,
        }));
        Ok(request_id)
    }

    /// Accept an oracle response: the coordinator checks the proof and
    /// settles the pending entry, then the attested value becomes the
    /// new latest answer.
    pub fn receive_response<V: FulfillmentVerifier>(
        &mut self,
        coordinator: &mut RequestCoordinator<V>,
        host: &mut LedgerHost,
        ctx: &ExecutionContext,
        request_id: RequestId,
        bundle: &ProofBundle,
        witness: &PendingWitness,
    ) -> Result<(), CoordinatorError> {
        coordinator.record_fulfillment(host, ctx, request_id, bundle, witness)?;
        self.last_response = Some(bundle.public_inputs.data_field);
        Ok(())
    }

    /// The most recent attested response value, if any arrived yet.
    pub fn last_response(&self) -> Option<Fr> {
        self.last_response
    }
}
