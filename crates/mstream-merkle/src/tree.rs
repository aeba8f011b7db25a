//! The streaming tree builder.
//!
//! A [`StreamTree`] is created per computation, fed segments in stream
//! order by a single producer, and finalized exactly once by
//! [`StreamTree::root`] or [`StreamTree::prove`]. It owns its hasher, so
//! independent builders on different threads share nothing.

use crate::error::{MerkleError, MerkleResult};
use crate::proof::Proof;
use crate::recorder::ProofRecorder;
use crate::stack::SubtreeStack;
use mstream_crypto::{Digest, HashError, MerkleHasher};
use std::borrow::Cow;
use tracing::{debug, trace};

/// Segment size used by [`StreamTree::new`].
pub const DEFAULT_SEGMENT_SIZE: usize = 64;

/// Zero-pad a short final segment to `segment_size`.
///
/// Full-size (or oversized) input is returned borrowed and untouched.
#[must_use]
pub fn pad_segment(segment: &[u8], segment_size: usize) -> Cow<'_, [u8]> {
    if segment.len() >= segment_size {
        return Cow::Borrowed(segment);
    }
    let mut padded = Vec::with_capacity(segment_size);
    padded.extend_from_slice(segment);
    padded.resize(segment_size, 0);
    Cow::Owned(padded)
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Phase {
    /// Accepting full segments.
    Open,
    /// A short (final) segment was pushed; only finalization remains.
    Ended,
    /// Finalized or poisoned by a hash failure.
    Closed,
}

/// Streaming Merkle tree builder with optional proof recording.
#[derive(Debug)]
pub struct StreamTree<M> {
    hasher: M,
    segment_size: usize,
    stack: SubtreeStack,
    recorder: Option<ProofRecorder>,
    phase: Phase,
}

impl<M: MerkleHasher> StreamTree<M> {
    /// Empty builder with [`DEFAULT_SEGMENT_SIZE`].
    #[must_use]
    pub const fn new(hasher: M) -> Self {
        Self {
            hasher,
            segment_size: DEFAULT_SEGMENT_SIZE,
            stack: SubtreeStack::new(),
            recorder: None,
            phase: Phase::Open,
        }
    }

    /// Empty builder for `segment_size`-byte leaves (must be non-zero).
    pub fn with_segment_size(hasher: M, segment_size: usize) -> MerkleResult<Self> {
        if segment_size == 0 {
            return Err(MerkleError::usage("segment size must be non-zero"));
        }
        Ok(Self {
            segment_size,
            ..Self::new(hasher)
        })
    }

    /// Leaf size in bytes.
    #[inline]
    #[must_use]
    pub const fn segment_size(&self) -> usize {
        self.segment_size
    }

    /// Leaves pushed so far.
    #[inline]
    #[must_use]
    pub const fn leaf_count(&self) -> u64 {
        self.stack.leaf_count()
    }

    /// The index fixed by [`Self::set_index`], if any.
    #[must_use]
    pub fn proof_index(&self) -> Option<u64> {
        self.recorder.as_ref().map(ProofRecorder::target)
    }

    /// Whether the builder has been finalized (or poisoned).
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.phase == Phase::Closed
    }

    /// Fix the leaf to prove. Must precede the first push and be called once.
    pub fn set_index(&mut self, index: u64) -> MerkleResult<()> {
        self.ensure_not_closed()?;
        if let Some(rec) = &self.recorder {
            return Err(MerkleError::usage(format!(
                "proof index already set to {}",
                rec.target()
            )));
        }
        if self.leaf_count() > 0 {
            return Err(MerkleError::usage(format!(
                "proof index must be set before the first push ({} leaves pushed)",
                self.leaf_count()
            )));
        }
        self.recorder = Some(ProofRecorder::new(index));
        Ok(())
    }

    /// Feed the next segment.
    ///
    /// A segment shorter than the segment size is zero-padded and must be
    /// the last one pushed.
    pub fn push(&mut self, segment: &[u8]) -> MerkleResult<()> {
        match self.phase {
            Phase::Closed => return Err(MerkleError::ClosedTree),
            Phase::Ended => {
                return Err(MerkleError::usage(
                    "only the final segment may be shorter than the segment size",
                ))
            }
            Phase::Open => {}
        }
        if segment.len() > self.segment_size {
            return Err(MerkleError::usage(format!(
                "segment of {} bytes exceeds segment size {}",
                segment.len(),
                self.segment_size
            )));
        }

        let short = segment.len() < self.segment_size;
        let padded = pad_segment(segment, self.segment_size);
        let leaf = self.hasher.hash_leaf(&padded);
        let leaf = self.poison_on_err(leaf)?;

        let index = self.stack.leaf_count();
        if let Some(rec) = &mut self.recorder {
            rec.observe_leaf(index, leaf);
        }
        let pushed = self
            .stack
            .push_leaf(&mut self.hasher, leaf, &mut self.recorder);
        self.poison_on_err(pushed)?;

        if short {
            trace!(index, len = segment.len(), "short final segment padded");
            self.phase = Phase::Ended;
        }
        Ok(())
    }

    /// Finalize and return the root. The builder is closed afterwards.
    pub fn root(&mut self) -> MerkleResult<Digest> {
        self.ensure_not_closed()?;
        self.phase = Phase::Closed;
        let root = self.stack.finalize(&mut self.hasher, &mut ())?;
        debug!(leaves = self.leaf_count(), %root, "tree finalized");
        Ok(root)
    }

    /// Finalize and return the root plus the proof for the index fixed by
    /// [`Self::set_index`].
    ///
    /// Usage and range checks run first; if they fail the builder stays
    /// open.
    pub fn prove(&mut self) -> MerkleResult<(Digest, Proof)> {
        self.ensure_not_closed()?;
        let index = self
            .proof_index()
            .ok_or_else(|| MerkleError::usage("prove called without set_index"))?;
        let leaves = self.leaf_count();
        if index >= leaves {
            return Err(MerkleError::IndexOutOfRange { index, leaves });
        }

        self.phase = Phase::Closed;
        let root = self.stack.finalize(&mut self.hasher, &mut self.recorder)?;
        let proof = self
            .recorder
            .take()
            .and_then(|rec| rec.finish(leaves))
            .ok_or(MerkleError::IndexOutOfRange { index, leaves })?;
        debug!(leaves, index, steps = proof.len(), %root, "proof built");
        Ok((root, proof))
    }

    fn ensure_not_closed(&self) -> MerkleResult<()> {
        if self.phase == Phase::Closed {
            return Err(MerkleError::ClosedTree);
        }
        Ok(())
    }

    fn poison_on_err<T>(&mut self, r: Result<T, HashError>) -> MerkleResult<T> {
        r.map_err(|e| {
            self.phase = Phase::Closed;
            MerkleError::from(e)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mstream_crypto::{Blake3, DomainHasher};

    fn tree(segment_size: usize) -> StreamTree<DomainHasher<Blake3>> {
        StreamTree::with_segment_size(DomainHasher::new(Blake3::new()), segment_size).unwrap()
    }

    #[test]
    fn zero_segment_size_is_rejected() {
        let err = StreamTree::with_segment_size(DomainHasher::new(Blake3::new()), 0).unwrap_err();
        assert!(matches!(err, MerkleError::InvalidUsage(_)));
    }

    #[test]
    fn oversized_segment_is_rejected_without_side_effects() {
        let mut t = tree(4);
        assert!(matches!(t.push(b"abcde"), Err(MerkleError::InvalidUsage(_))));
        assert_eq!(t.leaf_count(), 0);
        t.push(b"abcd").unwrap();
        assert_eq!(t.leaf_count(), 1);
    }

    #[test]
    fn nothing_may_follow_a_short_segment() {
        let mut t = tree(4);
        t.push(b"ab").unwrap();
        assert!(matches!(t.push(b"cdef"), Err(MerkleError::InvalidUsage(_))));
        assert_eq!(t.leaf_count(), 1);
        // Finalizing is still fine.
        t.root().unwrap();
    }

    #[test]
    fn set_index_rules() {
        let mut t = tree(4);
        t.set_index(0).unwrap();
        assert!(matches!(t.set_index(1), Err(MerkleError::InvalidUsage(_))));
        assert_eq!(t.proof_index(), Some(0));

        let mut t = tree(4);
        t.push(b"abcd").unwrap();
        assert!(matches!(t.set_index(0), Err(MerkleError::InvalidUsage(_))));

        let mut t = tree(4);
        t.root().unwrap();
        assert!(matches!(t.set_index(0), Err(MerkleError::ClosedTree)));
    }

    #[test]
    fn failed_prove_checks_leave_builder_open() {
        let mut t = tree(4);
        t.push(b"abcd").unwrap();
        assert!(matches!(t.prove(), Err(MerkleError::InvalidUsage(_))));
        assert!(!t.is_closed());
        t.push(b"efgh").unwrap();
        assert_eq!(t.leaf_count(), 2);
    }

    #[test]
    fn pad_segment_only_touches_short_input() {
        assert!(matches!(pad_segment(b"abcd", 4), Cow::Borrowed(_)));
        assert_eq!(&*pad_segment(b"xy", 4), b"xy\0\0");
        assert_eq!(&*pad_segment(b"", 3), b"\0\0\0");
    }
}
