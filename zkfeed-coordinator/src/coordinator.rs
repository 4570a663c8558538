//! The request/fulfillment coordinator contract.
//!
//! Lifecycle of a request id: nonexistent → pending → fulfilled, and
//! fulfilled is terminal. There is deliberately no expiry or
//! cancellation path: no revision of this design has one, so a pending
//! request stays claimable until a valid fulfillment lands.
//!
//! Every operation is atomic against ledger state: all fallible checks
//! run before the first mutation, so a rejected transaction leaves the
//! configuration, the counter, the pending root, the token ledgers,
//! and the event log untouched.

use halo2curves_axiom::bn256::Fr;
use halo2curves_axiom::ff::Field;
use k256::ecdsa::signature::hazmat::PrehashVerifier;
use k256::ecdsa::{Signature as K256Signature, VerifyingKey};
use k256::EncodedPoint;
use tracing::{debug, info};

use halo2_proofs_axiom::{plonk, poly::kzg::commitment::ParamsKZG};
use halo2curves_axiom::bn256::{Bn256, G1Affine};
use zkfeed_circuit::gadgets::digest;
use zkfeed_circuit::gadgets::source::{EcdsaSignature, Secp256k1Pubkey};
use zkfeed_common::{oracle_pubkey_hash, ProofBundle, VerifierArtifacts};

use crate::context::{ExecutionContext, LedgerHost};
use crate::error::CoordinatorError;
use crate::events::{CoordinatorEvent, FulfilledEvent, RequestedEvent};
use crate::pending::{requester_leaf, PendingRequestTree, PendingWitness};
use crate::types::{Address, RequestId};

/// Checks a proof bundle. The production implementation wraps the
/// trusted-setup artifacts; contract-logic tests substitute a stub so
/// they never pay for key generation.
pub trait FulfillmentVerifier {
    fn verify_bundle(&self, bundle: &ProofBundle) -> anyhow::Result<bool>;
}

/// Verifier backed by KZG params and the circuit's verifying key.
#[derive(Clone, Debug)]
pub struct CircuitVerifier {
    params: ParamsKZG<Bn256>,
    vk: plonk::VerifyingKey<G1Affine>,
}

impl CircuitVerifier {
    pub fn new(params: ParamsKZG<Bn256>, vk: plonk::VerifyingKey<G1Affine>) -> Self {
        Self { params, vk }
    }

    pub fn from_artifacts(artifacts: &VerifierArtifacts) -> Self {
        Self {
            params: artifacts.params.clone(),
            vk: artifacts.vk.clone(),
        }
    }
}

impl FulfillmentVerifier for CircuitVerifier {
    fn verify_bundle(&self, bundle: &ProofBundle) -> anyhow::Result<bool> {
        zkfeed_verifier::verify_bundle(&self.params, &self.vk, bundle)
    }
}

/// Coordinator configuration: one live copy per instance, every slot
/// mutable only by the owner.
#[derive(Clone, Debug)]
pub struct CoordinatorConfig {
    /// secp256k1 key whose signatures (or proofs thereof) admit
    /// fulfillments.
    pub oracle_key: Secp256k1Pubkey,
    /// Address of the payment-token ledger fees move on.
    pub token: Address,
    /// Fee charged per request, in token base units.
    pub fee_price: u64,
    /// Destination of collected fees.
    pub treasury: Address,
    /// Holder of the configuration-mutation role.
    pub owner: Address,
}

struct CoordinatorState {
    config: CoordinatorConfig,
    /// Strictly monotone; request ids derive from it.
    request_counter: u64,
    /// Committed root of the pending-request set. This is the slot the
    /// ledger persists; the index below only mirrors it.
    pending_root: Fr,
    /// Off-ledger mirror of the pending tree, kept to serve witnesses.
    index: PendingRequestTree,
}

pub struct RequestCoordinator<V> {
    state: Option<CoordinatorState>,
    verifier: V,
}

impl<V> RequestCoordinator<V> {
    /// Deploy an uninitialized instance. The host platform's deploy
    /// hook guarantees `initialize` can run at most once afterwards.
    pub fn deploy(verifier: V) -> Self {
        Self {
            state: None,
            verifier,
        }
    }

    /// One-time setup of all configuration slots.
    pub fn initialize(&mut self, config: CoordinatorConfig) -> Result<(), CoordinatorError> {
        if self.state.is_some() {
            return Err(CoordinatorError::AlreadyInitialized);
        }
        info!(owner = %config.owner, fee_price = config.fee_price, "coordinator initialized");
        self.state = Some(CoordinatorState {
            config,
            request_counter: 0,
            pending_root: PendingRequestTree::new().root(),
            index: PendingRequestTree::new(),
        });
        Ok(())
    }

    fn state(&self) -> Result<&CoordinatorState, CoordinatorError> {
        self.state.as_ref().ok_or(CoordinatorError::NotInitialized)
    }

    fn state_mut(&mut self) -> Result<&mut CoordinatorState, CoordinatorError> {
        self.state.as_mut().ok_or(CoordinatorError::NotInitialized)
    }

    fn owned_state_mut(
        &mut self,
        ctx: &ExecutionContext,
    ) -> Result<&mut CoordinatorState, CoordinatorError> {
        let state = self
            .state
            .as_mut()
            .ok_or(CoordinatorError::NotInitialized)?;
        if ctx.caller != state.config.owner {
            return Err(CoordinatorError::Unauthorized);
        }
        Ok(state)
    }

    pub fn config(&self) -> Result<&CoordinatorConfig, CoordinatorError> {
        Ok(&self.state()?.config)
    }

    pub fn fee_price(&self) -> Result<u64, CoordinatorError> {
        Ok(self.state()?.config.fee_price)
    }

    pub fn request_counter(&self) -> Result<u64, CoordinatorError> {
        Ok(self.state()?.request_counter)
    }

    pub fn pending_root(&self) -> Result<Fr, CoordinatorError> {
        Ok(self.state()?.pending_root)
    }

    pub fn is_pending(&self, id: &RequestId) -> Result<bool, CoordinatorError> {
        Ok(self.state()?.index.contains(id))
    }

    /// Merkle opening for `id`, served from the off-ledger index. This
    /// is what an oracle attaches to its fulfillment transaction.
    pub fn pending_witness(&self, id: &RequestId) -> Result<PendingWitness, CoordinatorError> {
        Ok(self.state()?.index.witness(id))
    }

    /// Replaces only the fee slot. Owner only.
    pub fn set_fee_price(
        &mut self,
        ctx: &ExecutionContext,
        fee_price: u64,
    ) -> Result<(), CoordinatorError> {
        self.owned_state_mut(ctx)?.config.fee_price = fee_price;
        Ok(())
    }

    /// Replaces only the treasury slot. Owner only.
    pub fn set_treasury(
        &mut self,
        ctx: &ExecutionContext,
        treasury: Address,
    ) -> Result<(), CoordinatorError> {
        self.owned_state_mut(ctx)?.config.treasury = treasury;
        Ok(())
    }

    /// Replaces only the owner slot. Owner only.
    pub fn set_owner(
        &mut self,
        ctx: &ExecutionContext,
        owner: Address,
    ) -> Result<(), CoordinatorError> {
        self.owned_state_mut(ctx)?.config.owner = owner;
        Ok(())
    }

    /// Replaces only the token-address slot. Owner only.
    pub fn set_token(
        &mut self,
        ctx: &ExecutionContext,
        token: Address,
    ) -> Result<(), CoordinatorError> {
        self.owned_state_mut(ctx)?.config.token = token;
        Ok(())
    }

    /// Admit a new request: charge the caller the current fee, register
    /// the pending entry, announce it to off-chain observers.
    ///
    /// `requester` is the identity recorded with the request (the
    /// contract the answer is for); the fee is always charged to the
    /// transaction caller.
    pub fn send_request(
        &mut self,
        host: &mut LedgerHost,
        ctx: &ExecutionContext,
        requester: &Address,
        identifier_part1: Fr,
        identifier_part2: Fr,
    ) -> Result<RequestId, CoordinatorError> {
        let state = self.state_mut()?;
        let fee_price = state.config.fee_price;
        let treasury = state.config.treasury;
        let token = state.config.token;

        let counter = state.request_counter + 1;
        let request_id = RequestId::derive(counter, requester);
        let leaf = requester_leaf(requester);

        // The only step that can fail; nothing is mutated before it.
        host.token_mut(&token)
            .transfer(&ctx.caller, &treasury, fee_price)?;

        state.request_counter = counter;
        state.index.insert(&request_id, leaf);
        state.pending_root = state.index.root();
        debug!(%request_id, counter, "pending request registered");

        host.emit(CoordinatorEvent::Requested(RequestedEvent {
            request_id,
            identifier_part1,
            identifier_part2,
            requester: *requester,
        }));

        Ok(request_id)
    }

    /// Settle a pending request with a fulfillment proof.
    ///
    /// The bundle must be bound to the configured oracle key (its
    /// public key-hash input) and must verify; the witness must open
    /// the committed pending root to a live leaf for `request_id`.
    pub fn record_fulfillment(
        &mut self,
        host: &mut LedgerHost,
        _ctx: &ExecutionContext,
        request_id: RequestId,
        bundle: &ProofBundle,
        witness: &PendingWitness,
    ) -> Result<(), CoordinatorError>
    where
        V: FulfillmentVerifier,
    {
        let expected_key_hash = oracle_pubkey_hash(&self.state()?.config.oracle_key);
        if bundle.public_inputs.oracle_key_hash != expected_key_hash {
            return Err(CoordinatorError::InvalidProof(
                "proof is not bound to the configured oracle key".into(),
            ));
        }

        let verified = self
            .verifier
            .verify_bundle(bundle)
            .map_err(|err| CoordinatorError::InvalidProof(err.to_string()))?;
        if !verified {
            return Err(CoordinatorError::InvalidProof(
                "proof verification failed".into(),
            ));
        }

        self.settle_pending(host, request_id, witness)
    }

    /// The lighter fulfillment variant: a bare oracle signature over
    /// the response digest, verified natively instead of via proof.
    /// Trades the proof's succinctness and privacy for simplicity.
    pub fn record_signed_fulfillment(
        &mut self,
        host: &mut LedgerHost,
        _ctx: &ExecutionContext,
        request_id: RequestId,
        digest_bytes: &[u8; 32],
        signature: &EcdsaSignature,
        witness: &PendingWitness,
    ) -> Result<(), CoordinatorError> {
        digest::validate_digest(digest_bytes)?;

        let oracle_key = self.state()?.config.oracle_key;
        verify_prehash_signature(&oracle_key, digest_bytes, signature)?;

        self.settle_pending(host, request_id, witness)
    }

    /// Shared tail of both fulfillment paths: prove membership, clear
    /// the leaf, move the root forward, announce.
    fn settle_pending(
        &mut self,
        host: &mut LedgerHost,
        request_id: RequestId,
        witness: &PendingWitness,
    ) -> Result<(), CoordinatorError> {
        let state = self.state_mut()?;

        if witness.request_id != request_id || !witness.verify(&state.pending_root) {
            return Err(CoordinatorError::InvalidWitness);
        }
        if witness.leaf == Fr::ZERO {
            return Err(CoordinatorError::UnknownRequest(request_id));
        }

        let new_root = witness.compute_root(Fr::ZERO);
        state.index.remove(&request_id);
        debug_assert_eq!(state.index.root(), new_root);
        state.pending_root = new_root;
        debug!(%request_id, "pending request settled");

        host.emit(CoordinatorEvent::Fulfilled(FulfilledEvent { request_id }));
        Ok(())
    }
}

fn verify_prehash_signature(
    oracle_key: &Secp256k1Pubkey,
    digest_bytes: &[u8; 32],
    signature: &EcdsaSignature,
) -> Result<(), CoordinatorError> {
    let point = EncodedPoint::from_affine_coordinates(
        &oracle_key.x.into(),
        &oracle_key.y.into(),
        false,
    );
    let verifying_key =
        VerifyingKey::from_encoded_point(&point).map_err(|_| CoordinatorError::InvalidSignature)?;
    let signature = K256Signature::from_scalars(signature.r, signature.s)
        .map_err(|_| CoordinatorError::InvalidSignature)?;
    verifying_key
        .verify_prehash(digest_bytes, &signature)
        .map_err(|_| CoordinatorError::InvalidSignature)
}

#[cfg(test)]
mod tests {
    use super::*;
    use k256::ecdsa::{signature::hazmat::PrehashSigner, SigningKey};
    use zkfeed_common::PublicInputs;

    /// Stub verifier for contract-logic tests; the real pipeline is
    /// exercised in tests/end_to_end.rs.
    struct StaticVerifier(bool);

    impl FulfillmentVerifier for StaticVerifier {
        fn verify_bundle(&self, _bundle: &ProofBundle) -> anyhow::Result<bool> {
            Ok(self.0)
        }
    }

    const FEE: u64 = 10_000;

    struct Harness {
        coordinator: RequestCoordinator<StaticVerifier>,
        host: LedgerHost,
        owner: Address,
        treasury: Address,
        token: Address,
        requester: Address,
        oracle_sk: SigningKey,
    }

    fn oracle_signing_key() -> SigningKey {
        let mut sk_bytes = [0u8; 32];
        sk_bytes[31] = 0x42;
        SigningKey::from_bytes(&sk_bytes.into()).expect("static key")
    }

    fn oracle_pubkey(sk: &SigningKey) -> Secp256k1Pubkey {
        let encoded = sk.verifying_key().to_encoded_point(false);
        let mut x = [0u8; 32];
        let mut y = [0u8; 32];
        x.copy_from_slice(encoded.x().expect("x"));
        y.copy_from_slice(encoded.y().expect("y"));
        Secp256k1Pubkey { x, y }
    }

    fn harness_with_verifier(verifier: StaticVerifier) -> Harness {
        let owner = Address::from_seed(1);
        let treasury = Address::from_seed(2);
        let token = Address::from_seed(3);
        let requester = Address::from_seed(4);
        let oracle_sk = oracle_signing_key();

        let mut coordinator = RequestCoordinator::deploy(verifier);
        coordinator
            .initialize(CoordinatorConfig {
                oracle_key: oracle_pubkey(&oracle_sk),
                token,
                fee_price: FEE,
                treasury,
                owner,
            })
            .unwrap();

        let mut host = LedgerHost::new();
        host.token_mut(&token).mint(&requester, FEE * 10);

        Harness {
            coordinator,
            host,
            owner,
            treasury,
            token,
            requester,
            oracle_sk,
        }
    }

    fn harness() -> Harness {
        harness_with_verifier(StaticVerifier(true))
    }

    fn send_sample_request(h: &mut Harness) -> RequestId {
        let ctx = ExecutionContext::new(h.requester);
        h.coordinator
            .send_request(
                &mut h.host,
                &ctx,
                &h.requester,
                Fr::from(11u64),
                Fr::from(22u64),
            )
            .unwrap()
    }

    fn oracle_bundle(h: &Harness) -> ProofBundle {
        ProofBundle::new(
            vec![0xAB; 64],
            PublicInputs {
                commitment: Fr::from(77u64),
                data_field: Fr::from(4_200u64),
                oracle_key_hash: oracle_pubkey_hash(&h.coordinator.config().unwrap().oracle_key),
            },
        )
    }

    #[test]
    fn initialize_is_one_shot() {
        let mut h = harness();
        let config = h.coordinator.config().unwrap().clone();
        assert_eq!(
            h.coordinator.initialize(config),
            Err(CoordinatorError::AlreadyInitialized)
        );
    }

    #[test]
    fn operations_require_initialization() {
        let mut coordinator = RequestCoordinator::deploy(StaticVerifier(true));
        let ctx = ExecutionContext::new(Address::from_seed(1));
        assert_eq!(
            coordinator.set_fee_price(&ctx, 1),
            Err(CoordinatorError::NotInitialized)
        );
        let mut host = LedgerHost::new();
        assert_eq!(
            coordinator
                .send_request(
                    &mut host,
                    &ctx,
                    &Address::from_seed(2),
                    Fr::ZERO,
                    Fr::ZERO
                )
                .unwrap_err(),
            CoordinatorError::NotInitialized
        );
    }

    #[test]
    fn owner_updates_fee_price() {
        let mut h = harness();
        let ctx = ExecutionContext::new(h.owner);
        h.coordinator.set_fee_price(&ctx, 200).unwrap();
        assert_eq!(h.coordinator.fee_price().unwrap(), 200);
    }

    #[test]
    fn non_owner_setters_are_rejected() {
        let mut h = harness();
        let intruder = ExecutionContext::new(Address::from_seed(99));
        assert_eq!(
            h.coordinator.set_fee_price(&intruder, 1),
            Err(CoordinatorError::Unauthorized)
        );
        assert_eq!(
            h.coordinator.set_treasury(&intruder, Address::from_seed(98)),
            Err(CoordinatorError::Unauthorized)
        );
        assert_eq!(
            h.coordinator.set_owner(&intruder, Address::from_seed(98)),
            Err(CoordinatorError::Unauthorized)
        );
        assert_eq!(
            h.coordinator.set_token(&intruder, Address::from_seed(98)),
            Err(CoordinatorError::Unauthorized)
        );
        assert_eq!(h.coordinator.fee_price().unwrap(), FEE);
    }

    #[test]
    fn ownership_transfer_hands_over_the_role() {
        let mut h = harness();
        let new_owner = Address::from_seed(50);
        let ctx = ExecutionContext::new(h.owner);
        h.coordinator.set_owner(&ctx, new_owner).unwrap();

        // old owner is now locked out, new owner is not
        assert_eq!(
            h.coordinator.set_fee_price(&ctx, 1),
            Err(CoordinatorError::Unauthorized)
        );
        let new_ctx = ExecutionContext::new(new_owner);
        h.coordinator.set_fee_price(&new_ctx, 1).unwrap();
    }

    #[test]
    fn send_request_charges_fee_and_registers_pending() {
        let mut h = harness();
        let request_id = send_sample_request(&mut h);

        assert_eq!(
            h.host.token(&h.token).unwrap().balance_of(&h.treasury),
            FEE
        );
        assert!(h.coordinator.is_pending(&request_id).unwrap());
        assert_eq!(h.coordinator.request_counter().unwrap(), 1);

        // first request id is Poseidon(1, requester.x)
        assert_eq!(request_id, RequestId::derive(1, &h.requester));

        let event = h.host.events.requested().next().unwrap();
        let fields = event.to_fields();
        assert_eq!(fields[0], *request_id.as_fr());
        assert_eq!(fields[1], Fr::from(11u64));
        assert_eq!(fields[2], Fr::from(22u64));
        assert_eq!(fields[3], h.requester.x);
        assert_eq!(fields[4], h.requester.y);
    }

    #[test]
    fn request_ids_are_unique_across_calls() {
        let mut h = harness();
        let first = send_sample_request(&mut h);
        let second = send_sample_request(&mut h);
        assert_ne!(first, second);
        assert!(h.coordinator.is_pending(&first).unwrap());
        assert!(h.coordinator.is_pending(&second).unwrap());
    }

    #[test]
    fn failed_fee_transfer_leaves_no_trace() {
        let mut h = harness();
        let broke = Address::from_seed(77);
        let ctx = ExecutionContext::new(broke);
        let root_before = h.coordinator.pending_root().unwrap();

        let err = h
            .coordinator
            .send_request(&mut h.host, &ctx, &broke, Fr::ZERO, Fr::ZERO)
            .unwrap_err();
        assert!(matches!(err, CoordinatorError::InsufficientFunds(_)));

        assert_eq!(h.coordinator.request_counter().unwrap(), 0);
        assert_eq!(h.coordinator.pending_root().unwrap(), root_before);
        assert!(h.host.events.is_empty());
        assert_eq!(h.host.token(&h.token).unwrap().balance_of(&h.treasury), 0);
    }

    #[test]
    fn fulfillment_settles_exactly_once() {
        let mut h = harness();
        let request_id = send_sample_request(&mut h);
        let bundle = oracle_bundle(&h);
        let witness = h.coordinator.pending_witness(&request_id).unwrap();
        let ctx = ExecutionContext::new(h.requester);

        h.coordinator
            .record_fulfillment(&mut h.host, &ctx, request_id, &bundle, &witness)
            .unwrap();
        assert!(!h.coordinator.is_pending(&request_id).unwrap());
        assert_eq!(h.host.events.fulfilled().count(), 1);

        // replay with a fresh (now zero-leaf) witness
        let stale = h.coordinator.pending_witness(&request_id).unwrap();
        assert_eq!(
            h.coordinator
                .record_fulfillment(&mut h.host, &ctx, request_id, &bundle, &stale)
                .unwrap_err(),
            CoordinatorError::UnknownRequest(request_id)
        );
    }

    #[test]
    fn fulfillment_rejects_foreign_key_binding() {
        let mut h = harness();
        let request_id = send_sample_request(&mut h);
        let mut bundle = oracle_bundle(&h);
        bundle.public_inputs.oracle_key_hash += Fr::ONE;
        let witness = h.coordinator.pending_witness(&request_id).unwrap();
        let ctx = ExecutionContext::new(h.requester);

        let err = h
            .coordinator
            .record_fulfillment(&mut h.host, &ctx, request_id, &bundle, &witness)
            .unwrap_err();
        assert!(matches!(err, CoordinatorError::InvalidProof(_)));
        assert!(h.coordinator.is_pending(&request_id).unwrap());
    }

    #[test]
    fn fulfillment_rejects_failed_proof() {
        let mut h = harness_with_verifier(StaticVerifier(false));
        let request_id = send_sample_request(&mut h);
        let bundle = oracle_bundle(&h);
        let witness = h.coordinator.pending_witness(&request_id).unwrap();
        let ctx = ExecutionContext::new(h.requester);

        let err = h
            .coordinator
            .record_fulfillment(&mut h.host, &ctx, request_id, &bundle, &witness)
            .unwrap_err();
        assert!(matches!(err, CoordinatorError::InvalidProof(_)));
        assert!(h.coordinator.is_pending(&request_id).unwrap());
        assert_eq!(h.host.events.fulfilled().count(), 0);
    }

    #[test]
    fn fulfillment_rejects_stale_witness() {
        let mut h = harness();
        let first = send_sample_request(&mut h);
        let witness_before_second = h.coordinator.pending_witness(&first).unwrap();
        let _second = send_sample_request(&mut h);
        let bundle = oracle_bundle(&h);
        let ctx = ExecutionContext::new(h.requester);

        assert_eq!(
            h.coordinator
                .record_fulfillment(&mut h.host, &ctx, first, &bundle, &witness_before_second)
                .unwrap_err(),
            CoordinatorError::InvalidWitness
        );
    }

    #[test]
    fn signed_fulfillment_accepts_the_oracle() {
        let mut h = harness();
        let request_id = send_sample_request(&mut h);
        let witness = h.coordinator.pending_witness(&request_id).unwrap();
        let ctx = ExecutionContext::new(h.requester);

        let mut digest_bytes = [0u8; 32];
        digest_bytes[0] = 0x17;
        digest_bytes[31] = 0x46;
        let signature: k256::ecdsa::Signature =
            h.oracle_sk.sign_prehash(&digest_bytes).unwrap();
        let (r, s) = {
            let bytes = signature.to_bytes();
            let mut r = [0u8; 32];
            let mut s = [0u8; 32];
            r.copy_from_slice(&bytes[..32]);
            s.copy_from_slice(&bytes[32..]);
            (r, s)
        };

        h.coordinator
            .record_signed_fulfillment(
                &mut h.host,
                &ctx,
                request_id,
                &digest_bytes,
                &EcdsaSignature { r, s },
                &witness,
            )
            .unwrap();
        assert!(!h.coordinator.is_pending(&request_id).unwrap());
    }

    #[test]
    fn signed_fulfillment_rejects_other_keys() {
        let mut h = harness();
        let request_id = send_sample_request(&mut h);
        let witness = h.coordinator.pending_witness(&request_id).unwrap();
        let ctx = ExecutionContext::new(h.requester);

        let mut stranger_bytes = [0u8; 32];
        stranger_bytes[31] = 0x43;
        let stranger = SigningKey::from_bytes(&stranger_bytes.into()).unwrap();
        let mut digest_bytes = [0u8; 32];
        digest_bytes[31] = 0x01;
        let signature: k256::ecdsa::Signature = stranger.sign_prehash(&digest_bytes).unwrap();
        let (r, s) = {
            let bytes = signature.to_bytes();
            let mut r = [0u8; 32];
            let mut s = [0u8; 32];
            r.copy_from_slice(&bytes[..32]);
            s.copy_from_slice(&bytes[32..]);
            (r, s)
        };

        assert_eq!(
            h.coordinator
                .record_signed_fulfillment(
                    &mut h.host,
                    &ctx,
                    request_id,
                    &digest_bytes,
                    &EcdsaSignature { r, s },
                    &witness,
                )
                .unwrap_err(),
            CoordinatorError::InvalidSignature
        );
        assert!(h.coordinator.is_pending(&request_id).unwrap());
    }

    #[test]
    fn signed_fulfillment_rejects_zero_digest() {
        let mut h = harness();
        let request_id = send_sample_request(&mut h);
        let witness = h.coordinator.pending_witness(&request_id).unwrap();
        let ctx = ExecutionContext::new(h.requester);

        let err = h
            .coordinator
            .record_signed_fulfillment(
                &mut h.host,
                &ctx,
                request_id,
                &[0u8; 32],
                &EcdsaSignature {
                    r: [1u8; 32],
                    s: [1u8; 32],
                },
                &witness,
            )
            .unwrap_err();
        assert!(matches!(err, CoordinatorError::MalformedDigest(_)));
    }
}
