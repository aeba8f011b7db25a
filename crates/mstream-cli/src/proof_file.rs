// crates/mstream-cli/src/proof_file.rs

//! On-disk proof bundle: everything `verify` needs in one file.
//!
//! JSON or CBOR, chosen by extension. Unknown/missing extensions are
//! rejected for reads and default to JSON for writes.

use anyhow::{Context, Result};
use mstream_crypto::{Digest, HashKind};
use mstream_merkle::Proof;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// Format version for [`ProofFile`].
pub const PROOF_FILE_VERSION: u32 = 1;

/// Self-contained inclusion proof.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProofFile {
    /// Schema/encoding version.
    pub version: u32,
    /// Primitive the tree was built with.
    pub hash: HashKind,
    /// Leaf size in bytes.
    pub segment_size: usize,
    /// Root the proof was produced against.
    pub root: Digest,
    /// The proven segment, zero-padded to `segment_size`.
    #[serde(with = "hex::serde")]
    pub segment: Vec<u8>,
    /// Sibling path.
    pub proof: Proof,
}

/// Read from **JSON**.
pub fn read_proof_json<P: AsRef<Path>>(path: P) -> Result<ProofFile> {
    let path_ref = path.as_ref();
    let f = File::open(path_ref).with_context(|| format!("open {}", path_ref.display()))?;
    let rdr = BufReader::new(f);
    serde_json::from_reader(rdr).with_context(|| "deserialize JSON proof")
}

/// Write to **JSON** (pretty).
pub fn write_proof_json<P: AsRef<Path>>(path: P, v: &ProofFile) -> Result<()> {
    let path_ref = path.as_ref();
    let f = File::create(path_ref).with_context(|| format!("create {}", path_ref.display()))?;
    let mut w = BufWriter::new(f);
    serde_json::to_writer_pretty(&mut w, v).with_context(|| "serialize JSON proof")?;
    w.flush().with_context(|| "flush JSON writer")?;
    Ok(())
}

/// Read from **CBOR**.
pub fn read_proof_cbor<P: AsRef<Path>>(path: P) -> Result<ProofFile> {
    let path_ref = path.as_ref();
    let f = File::open(path_ref).with_context(|| format!("open {}", path_ref.display()))?;
    let mut rdr = BufReader::new(f);
    ciborium::de::from_reader(&mut rdr).with_context(|| "deserialize CBOR proof")
}

/// Write to **CBOR**.
pub fn write_proof_cbor<P: AsRef<Path>>(path: P, v: &ProofFile) -> Result<()> {
    let path_ref = path.as_ref();
    let f = File::create(path_ref).with_context(|| format!("create {}", path_ref.display()))?;
    let mut w = BufWriter::new(f);
    ciborium::ser::into_writer(v, &mut w).with_context(|| "serialize CBOR proof")?;
    w.flush().with_context(|| "flush CBOR writer")?;
    Ok(())
}

/// Auto-detect read by extension `.json` / `.cbor` (case-insensitive).
pub fn read_proof_auto<P: AsRef<Path>>(path: P) -> Result<ProofFile> {
    match ext_lower(path.as_ref()).as_deref() {
        Some("json") => read_proof_json(path),
        Some("cbor") => read_proof_cbor(path),
        Some(other) => anyhow::bail!("unsupported proof extension: {other}"),
        None => anyhow::bail!("path has no extension (expected .json or .cbor)"),
    }
}

/// Auto-detect write (defaults to JSON if unknown).
pub fn write_proof_auto<P: AsRef<Path>>(path: P, v: &ProofFile) -> Result<()> {
    match ext_lower(path.as_ref()).as_deref() {
        Some("cbor") => write_proof_cbor(path, v),
        _ => write_proof_json(path, v),
    }
}

#[inline]
fn ext_lower(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
}
