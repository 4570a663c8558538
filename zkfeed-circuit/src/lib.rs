// zkfeed/zkfeed-circuit/src/lib.rs
// Numan Thabit 2026

//! Proof circuit for oracle response fulfillment.
//!
//! The circuit proves, without revealing the signature or the digest,
//! that the oracle signed a well-formed 32-byte response digest under
//! the key whose Poseidon hash is exposed publicly, and that the private
//! decommitment opens the public commitment. Its three instance columns
//! are, in order: the commitment, the attested response value, and the
//! oracle key hash.

pub mod serde_fr;

pub mod gadgets;

use halo2_base::{
    gates::{
        circuit::builder::BaseCircuitBuilder,
        circuit::{BaseCircuitParams, BaseConfig, CircuitBuilderStage},
        range::RangeChip,
        GateChip, GateInstructions, RangeInstructions,
    },
    AssignedValue, Context,
    QuantumCell::Constant,
};
use halo2_proofs_axiom::{
    circuit::{Layouter, SimpleFloorPlanner},
    plonk::{Circuit, ConstraintSystem, Error},
};
use halo2curves_axiom::bn256::Fr;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::gadgets::ecdsa::EcdsaError;
use crate::gadgets::source::{Secp256k1Pubkey, SourceWitness};

const DEFAULT_K: usize = 19;
const DEFAULT_LOOKUP_BITS: usize = 18;
const NUM_INSTANCE_COLUMNS: usize = 3;
const DEFAULT_ADVICE_PER_PHASE: usize = 4;
const DEFAULT_FIXED_COLUMNS: usize = 1;
const DEFAULT_LOOKUP_ADVICE_PER_PHASE: usize = 1;

fn default_params() -> BaseCircuitParams {
    BaseCircuitParams {
        k: DEFAULT_K,
        num_advice_per_phase: vec![DEFAULT_ADVICE_PER_PHASE],
        num_fixed: DEFAULT_FIXED_COLUMNS,
        num_lookup_advice_per_phase: vec![DEFAULT_LOOKUP_ADVICE_PER_PHASE],
        lookup_bits: Some(DEFAULT_LOOKUP_BITS),
        num_instance_columns: NUM_INSTANCE_COLUMNS,
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PublicInputs {
    /// Commitment published before proof generation; the private
    /// decommitment must open it.
    #[serde(with = "crate::serde_fr")]
    pub commitment: Fr,
    /// The attested response value carried to the requestor.
    #[serde(with = "crate::serde_fr")]
    pub data_field: Fr,
    /// Poseidon(oracle_pubkey.x, oracle_pubkey.y); the coordinator
    /// compares this against its configured oracle key.
    #[serde(with = "crate::serde_fr")]
    pub oracle_key_hash: Fr,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ZkfeedCircuitInput {
    pub source: SourceWitness,
    pub public: PublicInputs,
}

#[derive(Clone, Debug)]
pub struct ZkfeedCircuit {
    pub input: Option<ZkfeedCircuitInput>,
    params: BaseCircuitParams,
}

impl Default for ZkfeedCircuit {
    fn default() -> Self {
        Self {
            input: None,
            params: default_params(),
        }
    }
}

impl ZkfeedCircuit {
    pub fn new(input: Option<ZkfeedCircuitInput>) -> Self {
        Self {
            input,
            params: default_params(),
        }
    }
}

pub fn public_instances(public: &PublicInputs) -> Vec<Vec<Fr>> {
    vec![
        vec![public.commitment],
        vec![public.data_field],
        vec![public.oracle_key_hash],
    ]
}

impl Circuit<Fr> for ZkfeedCircuit {
    type Config = BaseConfig<Fr>;
    type FloorPlanner = SimpleFloorPlanner;
    type Params = BaseCircuitParams;

    fn params(&self) -> Self::Params {
        self.params.clone()
    }

    fn without_witnesses(&self) -> Self {
        Self {
            input: None,
            params: self.params.clone(),
        }
    }

    fn configure_with_params(
        meta: &mut ConstraintSystem<Fr>,
        params: Self::Params,
    ) -> Self::Config {
        BaseConfig::configure(meta, params)
    }

    fn configure(_: &mut ConstraintSystem<Fr>) -> Self::Config {
        unreachable!("ZkfeedCircuit must be configured with explicit parameters")
    }

    fn synthesize(&self, config: Self::Config, layouter: impl Layouter<Fr>) -> Result<(), Error> {
        let stage = if self.input.is_some() {
            CircuitBuilderStage::Mock
        } else {
            CircuitBuilderStage::Keygen
        };

        let input = self.input.as_ref().unwrap_or(&SAMPLE_INPUT);

        let mut builder = BaseCircuitBuilder::<Fr>::from_stage(stage)
            .use_params(self.params.clone())
            .use_instance_columns(self.params.num_instance_columns);

        if let Some(bits) = self.params.lookup_bits {
            builder = builder.use_lookup_bits(bits);
        }

        build_constraints(&mut builder, input).map_err(|_| Error::Synthesis)?;
        <BaseCircuitBuilder<Fr> as Circuit<Fr>>::synthesize(&builder, config, layouter)
    }
}

static SAMPLE_INPUT: Lazy<ZkfeedCircuitInput> = Lazy::new(|| {
    serde_json::from_str(include_str!("sample_input.json")).expect("valid sample circuit input")
});

fn build_constraints(
    builder: &mut BaseCircuitBuilder<Fr>,
    input: &ZkfeedCircuitInput,
) -> Result<(), EcdsaError> {
    let range = builder.range_chip();
    let gate = range.gate();

    let source = &input.source;
    let pub_in = &input.public;

    let ctx = builder.main(0);

    let commitment = ctx.load_witness(pub_in.commitment);
    let data_field = ctx.load_witness(pub_in.data_field);
    let oracle_key_hash = ctx.load_witness(pub_in.oracle_key_hash);

    // Digest validity: bytes range-checked, all-zero digest rejected.
    let digest_bytes = crate::gadgets::digest::assign_digest_bytes(ctx, &range, &source.message_hash);
    crate::gadgets::digest::enforce_nonzero_digest(ctx, gate, &range, &digest_bytes);

    // Commitment binding: the private opening must equal the public value.
    let decommitment = ctx.load_witness(source.decommitment);
    ctx.constrain_equal(&decommitment, &commitment);

    // Signature check over the digest-derived scalar.
    crate::gadgets::ecdsa::verify_oracle_signature(ctx, &range, source, &digest_bytes)?;

    // Key binding: the signer is exposed only as a Poseidon hash.
    let (pubkey_x, pubkey_y) = assign_pubkey_coords(ctx, gate, &range, &source.oracle_pubkey);
    let computed_key_hash = crate::gadgets::poseidon::poseidon_hash2(ctx, gate, pubkey_x, pubkey_y);
    ctx.constrain_equal(&computed_key_hash, &oracle_key_hash);

    expose_public_inputs(builder, [commitment, data_field, oracle_key_hash]);
    Ok(())
}

fn expose_public_inputs(
    builder: &mut BaseCircuitBuilder<Fr>,
    values: [AssignedValue<Fr>; NUM_INSTANCE_COLUMNS],
) {
    for (idx, value) in values.into_iter().enumerate() {
        builder.assigned_instances[idx].push(value);
    }
}

fn fr_from_be_bytes(
    ctx: &mut Context<Fr>,
    gate: &GateChip<Fr>,
    range: &RangeChip<Fr>,
    bytes: &[u8; 32],
) -> AssignedValue<Fr> {
    let mut acc = ctx.load_constant(Fr::zero());
    let base = Constant(Fr::from(256u64));
    for byte in bytes.iter() {
        let byte_val = ctx.load_witness(Fr::from(*byte as u64));
        range.range_check(ctx, byte_val, 8);
        acc = gate.mul_add(ctx, acc, base, byte_val);
    }
    acc
}

fn assign_pubkey_coords(
    ctx: &mut Context<Fr>,
    gate: &GateChip<Fr>,
    range: &RangeChip<Fr>,
    pubkey: &Secp256k1Pubkey,
) -> (AssignedValue<Fr>, AssignedValue<Fr>) {
    let x = fr_from_be_bytes(ctx, gate, range, &pubkey.x);
    let y = fr_from_be_bytes(ctx, gate, range, &pubkey.y);
    (x, y)
}
