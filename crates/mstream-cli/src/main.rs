// crates/mstream-cli/src/main.rs

#![forbid(unsafe_code)]
#![deny(
    rust_2018_idioms,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo
)]

mod proof_file;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use mstream_crypto::{Digest, DomainHasher, HashKind};
use mstream_merkle::{build_reader_proof, reader_root, DEFAULT_SEGMENT_SIZE};
use proof_file::{read_proof_auto, write_proof_auto, ProofFile, PROOF_FILE_VERSION};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(
    name = "mstream",
    about = "Streaming Merkle roots and inclusion proofs",
    long_about = "Streaming Merkle roots and inclusion proofs.\n\nSplits a file into fixed-size segments, commits them to a binary Merkle root in one pass, and produces/verifies inclusion proofs for single segments.",
    version = env!("CARGO_PKG_VERSION"),
    disable_help_subcommand = true
)]
struct Cli {
    /// Hash primitive for leaves and interior nodes
    #[arg(long, global = true, value_enum, env = "MSTREAM_HASH", default_value_t = HashOpt::Blake3)]
    hash: HashOpt,

    /// Segment (leaf) size in bytes; the last segment is zero-padded
    #[arg(long, global = true, env = "MSTREAM_SEGMENT_SIZE", default_value_t = DEFAULT_SEGMENT_SIZE)]
    segment_size: usize,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Print the Merkle root of a file
    Root {
        /// Input file
        #[arg(long)]
        input: PathBuf,
    },

    /// Build an inclusion proof for one segment of a file
    Prove {
        /// Input file
        #[arg(long)]
        input: PathBuf,

        /// Zero-based segment index to prove
        #[arg(long)]
        index: u64,

        /// Output path for the proof (JSON/CBOR by extension)
        #[arg(long, default_value = "proof.json")]
        out: PathBuf,
    },

    /// Verify a proof file
    Verify {
        /// Input proof (JSON/CBOR)
        #[arg(long)]
        proof: PathBuf,

        /// Expected root (hex); defaults to the root recorded in the proof
        #[arg(long)]
        root: Option<Digest>,
    },
}

/// Hash primitive selection.
#[derive(Copy, Clone, Debug, ValueEnum)]
enum HashOpt {
    /// BLAKE3-256
    Blake3,
    /// SHA3-256 (Keccak)
    #[value(name = "sha3-256")]
    Sha3_256,
}

impl From<HashOpt> for HashKind {
    fn from(h: HashOpt) -> Self {
        match h {
            HashOpt::Blake3 => Self::Blake3,
            HashOpt::Sha3_256 => Self::Sha3_256,
        }
    }
}

fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let kind = HashKind::from(cli.hash);
    let segment_size = cli.segment_size;

    match cli.cmd {
        Cmd::Root { input } => root_cmd(&input, kind, segment_size),
        Cmd::Prove { input, index, out } => prove_cmd(&input, kind, segment_size, index, &out),
        Cmd::Verify { proof, root } => verify_cmd(&proof, kind, root),
    }
}

/// Initialize tracing with an env-driven filter (default INFO).
fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_level(true)
        .with_writer(std::io::stderr)
        .compact();

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}

/// Ensure the parent directory for a file exists.
fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("creating parent directory {}", dir.display()))?;
        }
    }
    Ok(())
}

fn open_input(path: &Path) -> Result<BufReader<File>> {
    let f = File::open(path).with_context(|| format!("open {}", path.display()))?;
    Ok(BufReader::new(f))
}

fn root_cmd(input: &Path, kind: HashKind, segment_size: usize) -> Result<()> {
    let rdr = open_input(input)?;
    let rr = reader_root(rdr, DomainHasher::new(kind.primitive()), segment_size)
        .with_context(|| format!("hashing {}", input.display()))?;

    info!(
        input = %input.display(),
        hash = %kind,
        segment_size,
        leaves = rr.leaves,
        "computed root"
    );
    println!("root:   {}", rr.root);
    println!("leaves: {}", rr.leaves);
    Ok(())
}

fn prove_cmd(
    input: &Path,
    kind: HashKind,
    segment_size: usize,
    index: u64,
    out: &Path,
) -> Result<()> {
    let rdr = open_input(input)?;
    let rp = build_reader_proof(rdr, DomainHasher::new(kind.primitive()), segment_size, index)
        .with_context(|| format!("proving segment {index} of {}", input.display()))?;

    let file = ProofFile {
        version: PROOF_FILE_VERSION,
        hash: kind,
        segment_size,
        root: rp.root,
        segment: rp.segment,
        proof: rp.proof,
    };

    ensure_parent_dir(out)?;
    write_proof_auto(out, &file).with_context(|| format!("writing {}", out.display()))?;

    info!(
        index,
        leaves = file.proof.leaf_count,
        steps = file.proof.len(),
        out = %out.display(),
        "wrote proof"
    );
    println!("{}", file.root);
    Ok(())
}

fn verify_cmd(path: &Path, requested: HashKind, root: Option<Digest>) -> Result<()> {
    let file = read_proof_auto(path).with_context(|| format!("reading {}", path.display()))?;

    if file.version != PROOF_FILE_VERSION {
        bail!(
            "unsupported proof file version {} (expected {PROOF_FILE_VERSION})",
            file.version
        );
    }
    if file.segment.len() != file.segment_size {
        bail!(
            "segment is {} bytes but the proof was built with {}-byte segments",
            file.segment.len(),
            file.segment_size
        );
    }
    if requested != file.hash {
        warn!(requested = %requested, recorded = %file.hash, "using the proof's hash primitive");
    }

    let root = root.unwrap_or(file.root);
    let mut hasher = DomainHasher::new(file.hash.primitive());
    let ok = file
        .proof
        .verify(&file.segment, &root, &mut hasher)
        .context("verifying proof")?;

    if !ok {
        bail!("proof does not verify against root {root}");
    }

    info!(
        index = file.proof.leaf_index,
        leaves = file.proof.leaf_count,
        hash = %file.hash,
        "proof verified"
    );
    println!("OK");
    Ok(())
}
