// crates/mstream-merkle/src/lib.rs

//! Streaming Merkle commitments over fixed-size segments.
//!
//! Segments arrive one at a time and are folded into a [`SubtreeStack`] of
//! at most `O(log n)` perfect subtrees; the full tree is never materialized.
//! A [`StreamTree`] can additionally watch one leaf index and record the
//! sibling path for it, yielding an inclusion [`Proof`] alongside the root.
//!
//! ```
//! use mstream_merkle::{Blake3, DomainHasher, StreamTree};
//!
//! let mut tree = StreamTree::with_segment_size(DomainHasher::new(Blake3::new()), 4)?;
//! tree.set_index(2)?;
//! for seg in [b"aaaa".as_slice(), b"bbbb".as_slice(), b"cc".as_slice()] {
//!     tree.push(seg)?;
//! }
//! let (root, proof) = tree.prove()?;
//!
//! let mut hasher = DomainHasher::new(Blake3::new());
//! assert!(proof.verify(b"cc\0\0", &root, &mut hasher)?);
//! # Ok::<(), mstream_merkle::MerkleError>(())
//! ```
//!
//! Tree shape: equal-height subtrees merge eagerly while pushing; on
//! finalize the remaining subtrees are folded right-to-left, so the left
//! child of every node covers the largest power of two strictly below its
//! leaf count. An unpaired subtree is carried up, never hashed with itself.

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(
    missing_docs,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::missing_errors_doc,
    clippy::module_name_repetitions,
    clippy::doc_markdown
)]

/// Error type shared by every operation in this crate.
pub mod error;
/// Inclusion proofs and the verifier.
pub mod proof;
/// `std::io::Read` segment supplier and reader-driven helpers.
pub mod reader;
/// Sibling-path recorder driven by stack merges.
pub mod recorder;
/// In-memory level-by-level tree (reference construction).
pub mod reference;
/// Bounded-memory stack of perfect subtrees.
pub mod stack;
/// The streaming tree builder.
pub mod tree;

pub use error::{MerkleError, MerkleResult};
pub use proof::{expected_proof_len, verify_proof, Proof, ProofStep, Side};
pub use reader::{build_reader_proof, reader_root, ReaderProof, ReaderRoot, SegmentReader};
pub use recorder::ProofRecorder;
pub use reference::MerkleTree;
pub use stack::{MergeObserver, Subtree, SubtreeStack};
pub use tree::{pad_segment, StreamTree, DEFAULT_SEGMENT_SIZE};

pub use mstream_crypto::{
    AnyPrimitive, Blake3, Digest, DomainHasher, HashError, HashKind, HashPrimitive, MerkleHasher,
    Sha3_256,
};
