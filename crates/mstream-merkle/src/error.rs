//! Error kinds for tree construction, proving, and verification.

use mstream_crypto::HashError;
use thiserror::Error;

/// Result alias for this crate.
pub type MerkleResult<T> = Result<T, MerkleError>;

/// Everything that can go wrong. Errors never accompany a partial result.
#[derive(Debug, Error)]
pub enum MerkleError {
    /// API misuse (index set twice or after a push, prove without index,
    /// oversized segment, push after a short final segment, zero segment size).
    #[error("invalid usage: {0}")]
    InvalidUsage(String),

    /// The builder was already finalized by `root`/`prove`, or poisoned by
    /// a hash failure.
    #[error("tree is closed: it was already finalized")]
    ClosedTree,

    /// Proof requested for a leaf the stream never reached.
    #[error("leaf index {index} out of range: tree has {leaves} leaves")]
    IndexOutOfRange {
        /// Requested leaf index.
        index: u64,
        /// Leaves actually pushed.
        leaves: u64,
    },

    /// The hash primitive failed; passed through unchanged.
    #[error(transparent)]
    HashPrimitiveFailure(#[from] HashError),

    /// Proof shape is inconsistent with its claimed index and leaf count.
    #[error("malformed proof: {0}")]
    MalformedProof(String),

    /// The segment source failed (distinct from end of input).
    #[error("segment read failed: {0}")]
    Io(#[from] std::io::Error),
}

impl MerkleError {
    /// Whether this error reports caller misuse rather than bad data or I/O.
    #[must_use]
    pub const fn is_usage_error(&self) -> bool {
        matches!(self, Self::InvalidUsage(_) | Self::ClosedTree)
    }

    pub(crate) fn usage(msg: impl Into<String>) -> Self {
        Self::InvalidUsage(msg.into())
    }
}
