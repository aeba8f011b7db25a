//! In-memory Merkle tree built level by level.
//!
//! Holds every level, so memory is `O(n)`; use it when the segments are
//! already in memory or as an independent cross-check of [`crate::StreamTree`].
//! An unpaired trailing node is promoted unchanged to the next level, which
//! produces the same shape (and root) as the streaming fold.

use crate::error::{MerkleError, MerkleResult};
use crate::proof::{Proof, ProofStep, Side};
use crate::tree::pad_segment;
use mstream_crypto::{Digest, MerkleHasher};

/// Very small Merkle tree over padded segments.
#[derive(Clone, Debug)]
pub struct MerkleTree {
    /// `levels[0]` are leaf digests; the last level holds the root alone.
    levels: Vec<Vec<Digest>>,
    root: Digest,
}

impl MerkleTree {
    /// Hash and combine `segments` (same padding rules as the streaming
    /// builder: only the last may be short; none may exceed `segment_size`).
    pub fn from_segments<M, I>(hasher: &mut M, segment_size: usize, segments: I) -> MerkleResult<Self>
    where
        M: MerkleHasher + ?Sized,
        I: IntoIterator,
        I::Item: AsRef<[u8]>,
    {
        if segment_size == 0 {
            return Err(MerkleError::usage("segment size must be non-zero"));
        }
        let mut leaves = Vec::new();
        let mut ended = false;
        for seg in segments {
            let seg = seg.as_ref();
            if ended {
                return Err(MerkleError::usage(
                    "only the final segment may be shorter than the segment size",
                ));
            }
            if seg.len() > segment_size {
                return Err(MerkleError::usage(format!(
                    "segment of {} bytes exceeds segment size {segment_size}",
                    seg.len()
                )));
            }
            ended = seg.len() < segment_size;
            leaves.push(hasher.hash_leaf(&pad_segment(seg, segment_size))?);
        }
        Self::from_leaf_digests(hasher, leaves)
    }

    /// Build from already-hashed leaves.
    pub fn from_leaf_digests<M>(hasher: &mut M, leaves: Vec<Digest>) -> MerkleResult<Self>
    where
        M: MerkleHasher + ?Sized,
    {
        if leaves.is_empty() {
            return Ok(Self {
                levels: vec![leaves],
                root: hasher.hash_empty()?,
            });
        }
        let mut levels = vec![leaves];
        while let Some(lvl) = levels.last().filter(|l| l.len() > 1) {
            let mut next = Vec::with_capacity(lvl.len().div_ceil(2));
            for pair in lvl.chunks(2) {
                if let [l, r] = pair {
                    next.push(hasher.hash_node(l, r)?);
                } else {
                    // Promote odd node (left-balanced).
                    next.push(pair[0]);
                }
            }
            levels.push(next);
        }
        let root = levels
            .last()
            .and_then(|l| l.first())
            .copied()
            .ok_or_else(|| MerkleError::usage("tree has no levels"))?;
        Ok(Self { levels, root })
    }

    /// The root digest.
    #[inline]
    #[must_use]
    pub const fn root(&self) -> Digest {
        self.root
    }

    /// Number of leaves.
    #[must_use]
    pub fn leaf_count(&self) -> u64 {
        self.levels.first().map_or(0, |l| l.len() as u64)
    }

    /// Inclusion proof for leaf `index`.
    pub fn open(&self, index: u64) -> MerkleResult<Proof> {
        let leaves = self.leaf_count();
        if index >= leaves {
            return Err(MerkleError::IndexOutOfRange { index, leaves });
        }
        let mut idx = usize::try_from(index)
            .map_err(|_| MerkleError::IndexOutOfRange { index, leaves })?;
        let leaf_digest = self.levels[0][idx];
        let mut steps = Vec::new();
        for lvl in &self.levels[..self.levels.len() - 1] {
            let sib = idx ^ 1;
            // A promoted node has no sibling at this level.
            if sib < lvl.len() {
                let side = if idx & 1 == 0 { Side::Right } else { Side::Left };
                steps.push(ProofStep {
                    sibling: lvl[sib],
                    side,
                });
            }
            idx >>= 1;
        }
        Ok(Proof {
            leaf_index: index,
            leaf_count: leaves,
            leaf_digest,
            steps,
        })
    }
}
