//! Shared types and helpers for the zkfeed workspace: proof bundles,
//! trusted-setup artifact handling, field codecs, the native Poseidon
//! hash, and the bounded string packing used for request identifiers.

pub mod poseidon;
pub mod string;

use std::{
    fs,
    io::Cursor,
    path::{Path, PathBuf},
};

use anyhow::{anyhow, ensure, Context, Result};
use halo2_proofs_axiom::{
    plonk::{self, Circuit},
    poly::{commitment::Params, kzg::commitment::ParamsKZG},
    SerdeFormat,
};
use halo2curves_axiom::{
    bn256::{Bn256, Fr, G1Affine},
    ff::{Field, PrimeField},
};
use serde::{Deserialize, Serialize};
use zkfeed_circuit::{gadgets::source::Secp256k1Pubkey, public_instances, ZkfeedCircuit};

pub use poseidon::poseidon_hash;
pub use zkfeed_circuit::{PublicInputs, ZkfeedCircuitInput};

/// Number of instance columns the circuit exposes:
/// commitment, data field, oracle key hash.
pub const PUBLIC_INPUT_COUNT: usize = 3;

pub const CIRCUIT_VERSION: u32 = 1;
pub const MANIFEST_VERSION: u32 = 1;
pub const MANIFEST_FILE: &str = "manifest.json";

/// A proof plus everything a verifier needs to check it, minus the
/// trusted-setup artifacts themselves.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProofBundle {
    pub circuit_version: u32,
    pub proof: Vec<u8>,
    pub public_inputs: PublicInputs,
}

impl ProofBundle {
    pub fn new(proof: Vec<u8>, public_inputs: PublicInputs) -> Self {
        Self {
            circuit_version: CIRCUIT_VERSION,
            proof,
            public_inputs,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ArtifactFile {
    pub path: String,
    pub blake3: String,
    pub size: u64,
}

impl ArtifactFile {
    pub fn from_bytes(path: impl Into<String>, bytes: &[u8]) -> Self {
        Self {
            path: path.into(),
            blake3: hash_bytes_hex(bytes),
            size: bytes.len() as u64,
        }
    }

    fn resolve_path(&self, base_dir: &Path) -> PathBuf {
        base_dir.join(&self.path)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ArtifactManifest {
    pub manifest_version: u32,
    pub circuit_version: u32,
    pub k: u32,
    pub created_at_unix: u64,
    pub params: ArtifactFile,
    pub vk: ArtifactFile,
    pub pk: ArtifactFile,
}

#[derive(Clone, Debug)]
pub struct VerifierArtifacts {
    pub manifest: ArtifactManifest,
    pub params_bytes: Vec<u8>,
    pub vk_bytes: Vec<u8>,
    pub params: ParamsKZG<Bn256>,
    pub vk: plonk::VerifyingKey<G1Affine>,
}

#[derive(Clone, Debug)]
pub struct ProverArtifacts {
    pub manifest: ArtifactManifest,
    pub params_bytes: Vec<u8>,
    pub vk_bytes: Vec<u8>,
    pub pk_bytes: Vec<u8>,
    pub params: ParamsKZG<Bn256>,
    pub vk: plonk::VerifyingKey<G1Affine>,
    pub pk: plonk::ProvingKey<G1Affine>,
}

pub fn serialize_params(params: &ParamsKZG<Bn256>) -> Result<Vec<u8>> {
    let mut buf = vec![];
    params
        .write(&mut buf)
        .context("failed to serialize KZG params")?;
    Ok(buf)
}

pub fn deserialize_params(bytes: &[u8]) -> Result<ParamsKZG<Bn256>> {
    let mut reader = Cursor::new(bytes);
    ParamsKZG::<Bn256>::read(&mut reader).context("failed to deserialize KZG params")
}

pub fn serialize_verifying_key(vk: &plonk::VerifyingKey<G1Affine>) -> Result<Vec<u8>> {
    let mut buf = vec![];
    vk.write(&mut buf, SerdeFormat::Processed)
        .context("failed to serialize verifying key")?;
    Ok(buf)
}

pub fn deserialize_verifying_key(bytes: &[u8]) -> Result<plonk::VerifyingKey<G1Affine>> {
    let params = ZkfeedCircuit::default().params();
    let mut reader = Cursor::new(bytes);
    plonk::VerifyingKey::read::<_, ZkfeedCircuit>(&mut reader, SerdeFormat::Processed, params)
        .context("failed to deserialize verifying key")
}

pub fn serialize_proving_key(pk: &plonk::ProvingKey<G1Affine>) -> Result<Vec<u8>> {
    let mut buf = vec![];
    pk.write(&mut buf, SerdeFormat::Processed)
        .context("failed to serialize proving key")?;
    Ok(buf)
}

pub fn deserialize_proving_key(bytes: &[u8]) -> Result<plonk::ProvingKey<G1Affine>> {
    let params = ZkfeedCircuit::default().params();
    let mut reader = Cursor::new(bytes);
    plonk::ProvingKey::read::<_, ZkfeedCircuit>(&mut reader, SerdeFormat::Processed, params)
        .context("failed to deserialize proving key")
}

pub fn public_inputs_to_instances(inputs: &PublicInputs) -> Vec<Vec<Fr>> {
    public_instances(inputs)
}

pub fn instances_to_public_inputs(instances: &[Vec<Fr>]) -> Result<PublicInputs> {
    ensure!(
        instances.len() == PUBLIC_INPUT_COUNT,
        "expected {} instance columns, got {}",
        PUBLIC_INPUT_COUNT,
        instances.len()
    );
    Ok(PublicInputs {
        commitment: first_instance(instances, 0, "commitment")?,
        data_field: first_instance(instances, 1, "data_field")?,
        oracle_key_hash: first_instance(instances, 2, "oracle_key_hash")?,
    })
}

pub fn serialize_public_inputs(inputs: &PublicInputs) -> Result<Vec<u8>> {
    serde_json::to_vec(inputs).context("failed to serialize public inputs")
}

pub fn deserialize_public_inputs(bytes: &[u8]) -> Result<PublicInputs> {
    serde_json::from_slice(bytes).context("failed to deserialize public inputs")
}

pub fn write_manifest(path: impl AsRef<Path>, manifest: &ArtifactManifest) -> Result<()> {
    let json = serde_json::to_vec_pretty(manifest).context("failed to serialize manifest")?;
    fs::write(path.as_ref(), json).context("failed to write manifest")
}

pub fn read_manifest(path: impl AsRef<Path>) -> Result<ArtifactManifest> {
    let bytes = fs::read(path.as_ref()).context("failed to read manifest file")?;
    serde_json::from_slice(&bytes).context("failed to parse manifest json")
}

pub fn load_verifier_artifacts(path: impl AsRef<Path>) -> Result<VerifierArtifacts> {
    let manifest_path = path.as_ref();
    let (manifest, params_bytes, vk_bytes, _) = load_artifact_bytes(manifest_path)?;

    let params = deserialize_params(&params_bytes)?;
    let vk = deserialize_verifying_key(&vk_bytes)?;

    Ok(VerifierArtifacts {
        manifest,
        params_bytes,
        vk_bytes,
        params,
        vk,
    })
}

pub fn load_prover_artifacts(path: impl AsRef<Path>) -> Result<ProverArtifacts> {
    let manifest_path = path.as_ref();
    let (manifest, params_bytes, vk_bytes, pk_bytes) = load_artifact_bytes(manifest_path)?;

    let params = deserialize_params(&params_bytes)?;
    let vk = deserialize_verifying_key(&vk_bytes)?;
    let pk = deserialize_proving_key(&pk_bytes)?;

    Ok(ProverArtifacts {
        manifest,
        params_bytes,
        vk_bytes,
        pk_bytes,
        params,
        vk,
        pk,
    })
}

pub fn hash_bytes_hex(bytes: &[u8]) -> String {
    blake3::hash(bytes).to_hex().to_string()
}

pub fn fr_from_bytes(bytes: &[u8; 32]) -> Result<Fr> {
    Fr::from_bytes(bytes)
        .into_option()
        .ok_or_else(|| anyhow!("invalid bn256 scalar encoding"))
}

pub fn fr_to_bytes(fr: &Fr) -> [u8; 32] {
    let repr = fr.to_repr();
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(repr.as_ref());
    bytes
}

/// Reduce big-endian bytes into Fr; values above the modulus wrap. Used
/// for key coordinates and digests that must land in the scalar field,
/// matching the in-circuit byte recomposition.
pub fn reduce_be_bytes_to_fr(bytes: &[u8; 32]) -> Fr {
    let mut acc = Fr::ZERO;
    let base = Fr::from(256u64);
    for byte in bytes.iter() {
        acc = acc * base + Fr::from(*byte as u64);
    }
    acc
}

/// Poseidon hash of the oracle key's affine coordinates; the public
/// binding between a proof and the key it attests for.
pub fn oracle_pubkey_hash(pubkey: &Secp256k1Pubkey) -> Fr {
    let x = reduce_be_bytes_to_fr(&pubkey.x);
    let y = reduce_be_bytes_to_fr(&pubkey.y);
    poseidon_hash(&[x, y])
}

pub fn oracle_pubkey_hash_bytes(pubkey: &Secp256k1Pubkey) -> [u8; 32] {
    fr_to_bytes(&oracle_pubkey_hash(pubkey))
}

fn first_instance(instances: &[Vec<Fr>], column: usize, label: &str) -> Result<Fr> {
    let col = instances
        .get(column)
        .with_context(|| format!("missing instance column '{}'", label))?;
    col.first()
        .copied()
        .with_context(|| format!("column '{}' has no rows", label))
}

fn load_artifact_bytes(
    manifest_path: &Path,
) -> Result<(ArtifactManifest, Vec<u8>, Vec<u8>, Vec<u8>)> {
    let manifest = read_manifest(manifest_path)?;
    ensure_manifest_compat(&manifest)?;
    let base_dir = manifest_dir(manifest_path);

    let params_bytes = read_artifact_file(&base_dir, &manifest.params, "params")?;
    let vk_bytes = read_artifact_file(&base_dir, &manifest.vk, "verifying key")?;
    let pk_bytes = read_artifact_file(&base_dir, &manifest.pk, "proving key")?;

    Ok((manifest, params_bytes, vk_bytes, pk_bytes))
}

fn read_artifact_file(base_dir: &Path, entry: &ArtifactFile, label: &str) -> Result<Vec<u8>> {
    let path = entry.resolve_path(base_dir);
    let bytes = fs::read(&path)
        .with_context(|| format!("failed to read {} at {}", label, path.display()))?;
    ensure!(
        bytes.len() as u64 == entry.size,
        "{} size mismatch, manifest recorded {} bytes but found {}",
        label,
        entry.size,
        bytes.len(),
    );
    ensure_hash(&bytes, &entry.blake3, label)?;
    Ok(bytes)
}

fn ensure_hash(bytes: &[u8], expected_hex: &str, label: &str) -> Result<()> {
    let actual = hash_bytes_hex(bytes);
    ensure!(
        actual == expected_hex,
        "{} hash mismatch, expected {} but computed {}",
        label,
        expected_hex,
        actual
    );
    Ok(())
}

fn manifest_dir(path: &Path) -> PathBuf {
    path.parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}

fn ensure_manifest_compat(manifest: &ArtifactManifest) -> Result<()> {
    ensure!(
        manifest.manifest_version == MANIFEST_VERSION,
        "unsupported manifest version {}, expected {}",
        manifest.manifest_version,
        MANIFEST_VERSION
    );
    ensure!(
        manifest.circuit_version == CIRCUIT_VERSION,
        "circuit version mismatch: manifest {} vs crate {}",
        manifest.circuit_version,
        CIRCUIT_VERSION
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_public_inputs() -> PublicInputs {
        PublicInputs {
            commitment: Fr::from(123_456_789u64),
            data_field: Fr::from(4_200_000_000u64),
            oracle_key_hash: Fr::from(987_654_321u64),
        }
    }

    #[test]
    fn public_inputs_round_trip_through_instances() {
        let public = sample_public_inputs();
        let instances = public_inputs_to_instances(&public);
        let reconstructed = instances_to_public_inputs(&instances).unwrap();
        assert_eq!(reconstructed.commitment, public.commitment);
        assert_eq!(reconstructed.data_field, public.data_field);
        assert_eq!(reconstructed.oracle_key_hash, public.oracle_key_hash);
    }

    #[test]
    fn instances_with_wrong_column_count_rejected() {
        let bad_instances = vec![vec![Fr::ONE]; PUBLIC_INPUT_COUNT - 1];
        assert!(instances_to_public_inputs(&bad_instances).is_err());
    }

    #[test]
    fn fr_bytes_round_trip() {
        let value = Fr::from(2024u64);
        let bytes = fr_to_bytes(&value);
        let reconstructed = fr_from_bytes(&bytes).unwrap();
        assert_eq!(value, reconstructed);
    }

    #[test]
    fn public_inputs_bytes_round_trip() {
        let public = sample_public_inputs();
        let bytes = serialize_public_inputs(&public).unwrap();
        let decoded = deserialize_public_inputs(&bytes).unwrap();
        assert_eq!(decoded.commitment, public.commitment);
        assert_eq!(decoded.data_field, public.data_field);
    }

    #[test]
    fn proof_bundle_json_round_trip() {
        let bundle = ProofBundle::new(vec![1, 2, 3], sample_public_inputs());
        let json = serde_json::to_string(&bundle).unwrap();
        let decoded: ProofBundle = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded.circuit_version, CIRCUIT_VERSION);
        assert_eq!(decoded.proof, bundle.proof);
        assert_eq!(decoded.public_inputs.commitment, bundle.public_inputs.commitment);
    }

    #[test]
    fn oracle_pubkey_hash_depends_on_both_coordinates() {
        let base = Secp256k1Pubkey {
            x: [1u8; 32],
            y: [2u8; 32],
        };
        let mut other = base;
        other.y[31] ^= 1;
        assert_ne!(oracle_pubkey_hash(&base), oracle_pubkey_hash(&other));
    }
}
