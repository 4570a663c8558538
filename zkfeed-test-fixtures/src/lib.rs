//! Shared test fixtures: a deterministic oracle keypair, a signed
//! response digest, and real proving artifacts built once per test
//! process and reused by every integration test.
//!
//! Building the artifacts runs a full trusted setup at `TEST_K`, which
//! is slow; everything behind [`fixtures`] is therefore lazy and
//! shared.

use std::sync::Arc;

use anyhow::{Context, Result};
use halo2curves_axiom::bn256::Fr;
use k256::ecdsa::signature::hazmat::PrehashSigner;
use k256::ecdsa::{Signature, SigningKey, VerifyingKey};
use once_cell::sync::OnceCell;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use sha2::{Digest, Sha256};
use zkfeed_circuit::gadgets::source::{EcdsaSignature, Secp256k1Pubkey, SourceWitness};
use zkfeed_circuit::{PublicInputs, ZkfeedCircuitInput};
use zkfeed_common::{
    oracle_pubkey_hash, poseidon_hash, reduce_be_bytes_to_fr, serialize_params,
    serialize_proving_key, serialize_verifying_key, ArtifactFile, ArtifactManifest, ProofBundle,
    CIRCUIT_VERSION, MANIFEST_VERSION,
};
use zkfeed_prover::{prove_with_public_inputs, setup, ProverParams};

const TEST_K: u32 = 19;
const CREATED_AT_UNIX: u64 = 1_700_000_000;
const ORACLE_SK_BYTES: [u8; 32] = [
    0x4f, 0x3e, 0xdf, 0x98, 0x3a, 0xc6, 0x36, 0xa6, 0x5a, 0x84, 0x2c, 0xe7, 0xc7, 0x8d, 0x9a,
    0xa7, 0x06, 0xd3, 0xb1, 0x13, 0xbc, 0xe9, 0xc4, 0x6f, 0x30, 0xd7, 0xd2, 0x17, 0x15, 0xb2,
    0x3b, 0x1d,
];
const SAMPLE_PAYLOAD: &[u8] = b"{\"pair\":\"MINA/USD\",\"price_micros\":4200000000}";
const SAMPLE_DATA_FIELD: u64 = 4_200_000_000;

static FIXTURES: OnceCell<TestFixtures> = OnceCell::new();

/// Pre-generated proving artifacts, witness inputs, and a proof bundle
/// reused across tests.
pub struct TestFixtures {
    params: Arc<ProverParams>,
    manifest: ArtifactManifest,
    params_bytes: Vec<u8>,
    vk_bytes: Vec<u8>,
    pk_bytes: Vec<u8>,
    proof: Vec<u8>,
    bundle: ProofBundle,
    public_inputs: PublicInputs,
    witness_json: String,
    oracle_pubkey: Secp256k1Pubkey,
}

impl TestFixtures {
    /// Clone the prover params handle so each test can own an `Arc`.
    pub fn prover_params(&self) -> Arc<ProverParams> {
        Arc::clone(&self.params)
    }

    pub fn manifest(&self) -> &ArtifactManifest {
        &self.manifest
    }

    pub fn params_bytes(&self) -> &[u8] {
        &self.params_bytes
    }

    pub fn vk_bytes(&self) -> &[u8] {
        &self.vk_bytes
    }

    pub fn pk_bytes(&self) -> &[u8] {
        &self.pk_bytes
    }

    pub fn proof(&self) -> &[u8] {
        &self.proof
    }

    pub fn bundle(&self) -> &ProofBundle {
        &self.bundle
    }

    pub fn public_inputs(&self) -> &PublicInputs {
        &self.public_inputs
    }

    pub fn witness_json(&self) -> &str {
        &self.witness_json
    }

    pub fn oracle_pubkey(&self) -> &Secp256k1Pubkey {
        &self.oracle_pubkey
    }
}

/// Return lazily constructed test fixtures shared across crates.
pub fn fixtures() -> &'static TestFixtures {
    FIXTURES.get_or_init(|| build_fixtures().expect("failed to build zkfeed test fixtures"))
}

/// The deterministic oracle signing key every fixture is signed with.
pub fn oracle_signing_key() -> SigningKey {
    SigningKey::from_bytes(&ORACLE_SK_BYTES.into()).expect("static oracle key")
}

pub fn oracle_pubkey() -> Secp256k1Pubkey {
    derive_pubkey(&oracle_signing_key())
}

/// sha-256 digest of a response payload; the value the oracle signs.
pub fn response_digest(payload: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(payload);
    hasher.finalize().into()
}

/// Deterministic pseudo-random payload for volume tests.
pub fn random_payload(seed: u64, len: usize) -> Vec<u8> {
    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    (0..len).map(|_| rng.gen()).collect()
}

/// Commitment convention used by the fixtures: bind the digest and the
/// attested value together. The circuit itself only checks that the
/// decommitment opens the commitment; this convention is the caller's.
pub fn response_commitment(digest: &[u8; 32], data_field: Fr) -> Fr {
    poseidon_hash(&[reduce_be_bytes_to_fr(digest), data_field])
}

/// Build a complete, satisfiable circuit input for `payload` signed by
/// the fixture oracle.
pub fn build_input(payload: &[u8], data_field: Fr) -> Result<ZkfeedCircuitInput> {
    let signing_key = oracle_signing_key();
    let digest = response_digest(payload);
    let (sig_r, sig_s) = sign_digest(&signing_key, &digest)?;
    let pubkey = derive_pubkey(&signing_key);
    let commitment = response_commitment(&digest, data_field);

    Ok(ZkfeedCircuitInput {
        source: SourceWitness {
            message_hash: digest,
            signature: EcdsaSignature { r: sig_r, s: sig_s },
            oracle_pubkey: pubkey,
            decommitment: commitment,
        },
        public: PublicInputs {
            commitment,
            data_field,
            oracle_key_hash: oracle_pubkey_hash(&pubkey),
        },
    })
}

fn build_fixtures() -> Result<TestFixtures> {
    let input = build_input(SAMPLE_PAYLOAD, Fr::from(SAMPLE_DATA_FIELD))?;
    let witness_json = serde_json::to_string(&input).context("serialize witness json")?;

    let prover_params = setup(TEST_K);

    let params_bytes = serialize_params(&prover_params.params).context("serialize params")?;
    let vk_bytes = serialize_verifying_key(&prover_params.vk).context("serialize vk")?;
    let pk_bytes = serialize_proving_key(&prover_params.pk).context("serialize pk")?;

    let manifest = ArtifactManifest {
        manifest_version: MANIFEST_VERSION,
        circuit_version: CIRCUIT_VERSION,
        k: TEST_K,
        created_at_unix: CREATED_AT_UNIX,
        params: ArtifactFile::from_bytes("params.bin", &params_bytes),
        vk: ArtifactFile::from_bytes("vk.bin", &vk_bytes),
        pk: ArtifactFile::from_bytes("pk.bin", &pk_bytes),
    };

    let (proof, public_inputs) =
        prove_with_public_inputs(&prover_params.params, &prover_params.pk, input);

    Ok(TestFixtures {
        params: Arc::new(prover_params),
        manifest,
        params_bytes,
        vk_bytes,
        pk_bytes,
        proof: proof.clone(),
        bundle: ProofBundle::new(proof, public_inputs.clone()),
        public_inputs,
        witness_json,
        oracle_pubkey: oracle_pubkey(),
    })
}

fn sign_digest(signing_key: &SigningKey, digest: &[u8; 32]) -> Result<([u8; 32], [u8; 32])> {
    let signature: Signature = signing_key
        .sign_prehash(digest)
        .context("failed to sign response digest")?;
    let bytes = signature.to_bytes();
    let mut r = [0u8; 32];
    let mut s = [0u8; 32];
    r.copy_from_slice(&bytes[..32]);
    s.copy_from_slice(&bytes[32..]);
    Ok((r, s))
}

fn derive_pubkey(signing_key: &SigningKey) -> Secp256k1Pubkey {
    let verifying_key = VerifyingKey::from(signing_key);
    let encoded = verifying_key.to_encoded_point(false);
    let mut x = [0u8; 32];
    let mut y = [0u8; 32];
    x.copy_from_slice(encoded.x().expect("x coordinate"));
    y.copy_from_slice(encoded.y().expect("y coordinate"));
    Secp256k1Pubkey { x, y }
}
