use std::{
    fs,
    path::{Path, PathBuf},
    time::SystemTime,
};

use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use halo2curves_axiom::bn256::Fr;
use k256::ecdsa::{signature::hazmat::PrehashSigner, Signature, SigningKey, VerifyingKey};
use k256::SecretKey;
use serde::Serialize;
use sha2::{Digest, Sha256};
use zkfeed_circuit::{
    gadgets::source::{EcdsaSignature, Secp256k1Pubkey, SourceWitness},
    PublicInputs, ZkfeedCircuitInput,
};
use zkfeed_common::{
    oracle_pubkey_hash, poseidon_hash, reduce_be_bytes_to_fr, serialize_params,
    serialize_proving_key, serialize_public_inputs, serialize_verifying_key, write_manifest,
    ArtifactFile, ArtifactManifest, ProofBundle, CIRCUIT_VERSION, MANIFEST_FILE, MANIFEST_VERSION,
};
use zkfeed_prover::{prove_with_public_inputs, setup};

const DEFAULT_OUTPUT_DIR: &str = "artifacts/ci";
const WITNESS_FILENAME: &str = "witness.sample.json";
const PROOF_BUNDLE_FILENAME: &str = "proof_bundle.json";
const PROOF_BIN_FILENAME: &str = "proof.bin";
const PUBLIC_INPUTS_JSON_FILENAME: &str = "public_inputs.json";
const PUBLIC_INPUTS_BIN_FILENAME: &str = "public_inputs.bin";
const PROVENANCE_FILENAME: &str = "manifest.provenance.json";
const PARAMS_FILENAME: &str = "params.bin";
const VK_FILENAME: &str = "vk.bin";
const PK_FILENAME: &str = "pk.bin";
const SAMPLE_SK_HEX: &str = "4f3edf983ac636a65a842ce7c78d9aa706d3b113bce9c46f30d7d21715b23b1d";
const SAMPLE_PAYLOAD: &[u8] = b"{\"pair\":\"MINA/USD\",\"price_micros\":4200000000}";
const SAMPLE_DATA_FIELD: u64 = 4_200_000_000;

#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the trusted setup and materialize every artifact a prover or
    /// verifier deployment needs, plus a sample proof bundle.
    GenArtifacts(GenArtifactsArgs),
}

#[derive(Args)]
struct GenArtifactsArgs {
    /// Directory to write generated artifacts and fixtures into.
    #[arg(long, default_value = DEFAULT_OUTPUT_DIR)]
    output_dir: PathBuf,
    /// Circuit size exponent `k` for the trusted setup.
    #[arg(long, default_value_t = 19)]
    k: u32,
    /// Skip proving the sample witness (artifact generation only).
    #[arg(long)]
    skip_proof: bool,
}

fn main() -> Result<()> {
    let args = Cli::parse();
    match args.command {
        Commands::GenArtifacts(opts) => run_gen_artifacts(opts),
    }
}

fn run_gen_artifacts(args: GenArtifactsArgs) -> Result<()> {
    let artifacts_dir = workspace_root().join(&args.output_dir);
    if artifacts_dir.exists() {
        fs::remove_dir_all(&artifacts_dir)
            .with_context(|| format!("failed to clean {}", artifacts_dir.display()))?;
    }
    fs::create_dir_all(&artifacts_dir)
        .with_context(|| format!("failed to create {}", artifacts_dir.display()))?;

    println!(
        "⭐️ Generating trusted setup artifacts (k = {}) in {}",
        args.k,
        artifacts_dir.display()
    );
    let prover_params = setup(args.k);

    let params_bytes = serialize_params(&prover_params.params)?;
    let vk_bytes = serialize_verifying_key(&prover_params.vk)?;
    let pk_bytes = serialize_proving_key(&prover_params.pk)?;

    fs::write(artifacts_dir.join(PARAMS_FILENAME), &params_bytes)
        .context("failed to write params")?;
    fs::write(artifacts_dir.join(VK_FILENAME), &vk_bytes).context("failed to write vk")?;
    fs::write(artifacts_dir.join(PK_FILENAME), &pk_bytes).context("failed to write pk")?;

    let manifest = ArtifactManifest {
        manifest_version: MANIFEST_VERSION,
        circuit_version: CIRCUIT_VERSION,
        k: args.k,
        created_at_unix: unix_now(),
        params: ArtifactFile::from_bytes(PARAMS_FILENAME, &params_bytes),
        vk: ArtifactFile::from_bytes(VK_FILENAME, &vk_bytes),
        pk: ArtifactFile::from_bytes(PK_FILENAME, &pk_bytes),
    };
    let manifest_path = artifacts_dir.join(MANIFEST_FILE);
    write_manifest(&manifest_path, &manifest)?;
    write_provenance(&manifest, &artifacts_dir)?;

    println!("🧪 Writing deterministic sample witness");
    let sample_input = generate_sample_input()?;
    write_json(&artifacts_dir.join(WITNESS_FILENAME), &sample_input)?;

    if args.skip_proof {
        println!("⚠️ Skipping sample proof because --skip-proof was set");
        return Ok(());
    }

    println!("🧾 Proving the sample witness");
    let (proof, public_inputs) =
        prove_with_public_inputs(&prover_params.params, &prover_params.pk, sample_input);
    fs::write(artifacts_dir.join(PROOF_BIN_FILENAME), &proof)
        .context("failed to write proof bytes")?;
    write_json(
        &artifacts_dir.join(PUBLIC_INPUTS_JSON_FILENAME),
        &public_inputs,
    )?;
    fs::write(
        artifacts_dir.join(PUBLIC_INPUTS_BIN_FILENAME),
        serialize_public_inputs(&public_inputs)?,
    )
    .context("failed to write public inputs bytes")?;
    write_json(
        &artifacts_dir.join(PROOF_BUNDLE_FILENAME),
        &ProofBundle::new(proof, public_inputs),
    )?;

    println!(
        "\nDone! Artifacts are available under {}",
        artifacts_dir.display()
    );
    Ok(())
}

fn write_provenance(manifest: &ArtifactManifest, artifacts_dir: &Path) -> Result<()> {
    #[derive(Serialize)]
    struct Provenance<'a> {
        manifest_version: u32,
        circuit_version: u32,
        k: u32,
        params_hash: &'a str,
        vk_hash: &'a str,
        pk_hash: &'a str,
        generated_at_unix: u64,
        generated_at_iso8601: String,
    }

    let provenance = Provenance {
        manifest_version: manifest.manifest_version,
        circuit_version: manifest.circuit_version,
        k: manifest.k,
        params_hash: &manifest.params.blake3,
        vk_hash: &manifest.vk.blake3,
        pk_hash: &manifest.pk.blake3,
        generated_at_unix: unix_now(),
        generated_at_iso8601: Utc::now().to_rfc3339(),
    };
    write_json(&artifacts_dir.join(PROVENANCE_FILENAME), &provenance)
}

fn generate_sample_input() -> Result<ZkfeedCircuitInput> {
    let signing_key = sample_signing_key()?;
    let digest = response_digest(SAMPLE_PAYLOAD);
    let signature = sign_digest(&signing_key, &digest)?;
    let oracle_pubkey = derive_pubkey(&signing_key)?;

    let data_field = Fr::from(SAMPLE_DATA_FIELD);
    let commitment = poseidon_hash(&[reduce_be_bytes_to_fr(&digest), data_field]);

    Ok(ZkfeedCircuitInput {
        source: SourceWitness {
            message_hash: digest,
            signature,
            oracle_pubkey,
            decommitment: commitment,
        },
        public: PublicInputs {
            commitment,
            data_field,
            oracle_key_hash: oracle_pubkey_hash(&oracle_pubkey),
        },
    })
}

fn response_digest(payload: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(payload);
    hasher.finalize().into()
}

fn sign_digest(signing_key: &SigningKey, digest: &[u8; 32]) -> Result<EcdsaSignature> {
    let signature: Signature = signing_key
        .sign_prehash(digest)
        .context("failed to sign sample digest")?;
    let bytes = signature.to_bytes();
    let mut r = [0u8; 32];
    let mut s = [0u8; 32];
    r.copy_from_slice(&bytes[..32]);
    s.copy_from_slice(&bytes[32..]);
    Ok(EcdsaSignature { r, s })
}

fn sample_signing_key() -> Result<SigningKey> {
    let bytes_vec =
        hex::decode(SAMPLE_SK_HEX).context("failed to decode sample signing key hex")?;
    let bytes: [u8; 32] = bytes_vec
        .try_into()
        .map_err(|_| anyhow!("sample signing key must be 32 bytes"))?;
    let secret =
        SecretKey::from_bytes(&bytes.into()).context("invalid sample signing key bytes")?;
    Ok(SigningKey::from(secret))
}

fn derive_pubkey(signing_key: &SigningKey) -> Result<Secp256k1Pubkey> {
    let verifying_key = VerifyingKey::from(signing_key);
    let encoded = verifying_key.to_encoded_point(false);
    let mut x = [0u8; 32];
    let mut y = [0u8; 32];
    x.copy_from_slice(encoded.x().ok_or_else(|| anyhow!("missing x coordinate"))?);
    y.copy_from_slice(encoded.y().ok_or_else(|| anyhow!("missing y coordinate"))?);
    Ok(Secp256k1Pubkey { x, y })
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

fn write_json(path: &Path, value: &impl Serialize) -> Result<()> {
    let data = serde_json::to_vec_pretty(value)
        .with_context(|| format!("failed to serialize {}", path.display()))?;
    fs::write(path, data).with_context(|| format!("failed to write {}", path.display()))
}

fn workspace_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .expect("xtask should live inside the workspace root")
        .to_path_buf()
}
