// crates/mstream-crypto/src/lib.rs

//! Crypto substrate for streaming Merkle commitments.
//!
//! - [`HashPrimitive`]: the raw hash capability (arbitrary bytes → 32-byte
//!   [`Digest`]). BLAKE3 and SHA3-256 implementations ship here.
//! - [`MerkleHasher`]: the tree-facing adapter with *distinct* leaf and node
//!   operations. [`DomainHasher`] implements it over any primitive by
//!   prefixing a one-byte [`Domain`] tag, so a leaf digest can never be
//!   replayed as an internal node (and vice versa).
//!
//! Primitives take `&mut self`: each tree builder owns its own instance
//! (clone one per builder when running several concurrently).

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
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]

/// Fixed-length digest type with hex display/serde.
pub mod digest;
/// Domain-separated leaf/node hashing over a primitive.
pub mod hasher;
/// Hash primitives (BLAKE3, SHA3-256) and runtime selection.
pub mod primitive;

pub use digest::{Digest, DIGEST_LEN};
pub use hasher::{Domain, DomainHasher, MerkleHasher};
pub use primitive::{AnyPrimitive, Blake3, HashKind, HashPrimitive, Sha3_256};

use thiserror::Error;

/// Failure reported by an underlying hash primitive.
///
/// The shipped primitives are infallible; the variant exists so hardware or
/// remote-backed primitives can surface errors instead of panicking.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HashError {
    /// The primitive could not produce a digest.
    #[error("hash primitive `{primitive}` failed: {reason}")]
    Primitive {
        /// Name of the failing primitive.
        primitive: &'static str,
        /// Human-readable cause.
        reason: String,
    },
}
