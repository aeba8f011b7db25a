//! Inclusion proofs and their verification.
//!
//! A proof is the ordered list of siblings from the leaf up to the root,
//! each tagged with the side it is combined on. Verification recomputes the
//! path and compares against the expected root; it is pure apart from the
//! hasher it is handed.

use crate::error::{MerkleError, MerkleResult};
use mstream_crypto::{Digest, HashError, MerkleHasher};
use serde::{Deserialize, Serialize};

/// Which side of the running hash a sibling is combined on.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// `hash_node(sibling, current)`
    Left,
    /// `hash_node(current, sibling)`
    Right,
}

impl Side {
    /// The other side.
    #[must_use]
    pub const fn flip(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }
}

/// One level of an inclusion proof.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofStep {
    /// Digest of the sibling subtree.
    pub sibling: Digest,
    /// Where the sibling sits.
    pub side: Side,
}

/// Inclusion proof for one leaf, ordered root-ward.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proof {
    /// Position of the proven leaf.
    pub leaf_index: u64,
    /// Total leaves in the tree the proof was built from.
    pub leaf_count: u64,
    /// `hash_leaf` of the (padded) leaf segment.
    pub leaf_digest: Digest,
    /// Siblings, leaf-most first.
    pub steps: Vec<ProofStep>,
}

impl Proof {
    /// Number of steps (the leaf's depth).
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether the proof has no steps (single-leaf tree).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Check that `leaf` (the padded segment) is included under `root`.
    ///
    /// Also returns `false` if `leaf` does not hash to [`Self::leaf_digest`].
    pub fn verify<M>(&self, leaf: &[u8], root: &Digest, hasher: &mut M) -> MerkleResult<bool>
    where
        M: MerkleHasher + ?Sized,
    {
        check_shape(self.steps.len(), self.leaf_index, self.leaf_count)?;
        if hasher.hash_leaf(leaf)? != self.leaf_digest {
            return Ok(false);
        }
        Ok(fold_path(self.leaf_digest, &self.steps, hasher)? == *root)
    }

    /// Like [`Self::verify`] but trusts the stored leaf digest.
    pub fn verify_digest<M>(&self, root: &Digest, hasher: &mut M) -> MerkleResult<bool>
    where
        M: MerkleHasher + ?Sized,
    {
        check_shape(self.steps.len(), self.leaf_index, self.leaf_count)?;
        Ok(fold_path(self.leaf_digest, &self.steps, hasher)? == *root)
    }
}

/// Verify that `leaf` sits at `index` in a `total`-leaf tree with root
/// `expected_root`.
///
/// `leaf` is hashed as given; pass the zero-padded segment for a short
/// final leaf. Returns `Ok(false)` on a digest mismatch and
/// [`MerkleError::MalformedProof`] when the step count cannot belong to
/// `(index, total)`.
pub fn verify_proof<M>(
    leaf: &[u8],
    steps: &[ProofStep],
    index: u64,
    total: u64,
    expected_root: &Digest,
    hasher: &mut M,
) -> MerkleResult<bool>
where
    M: MerkleHasher + ?Sized,
{
    check_shape(steps.len(), index, total)?;
    let leaf_digest = hasher.hash_leaf(leaf)?;
    Ok(fold_path(leaf_digest, steps, hasher)? == *expected_root)
}

/// Depth of leaf `index` in a `total`-leaf tree, i.e. the exact number of
/// steps its proof must have. `None` if `index >= total`.
#[must_use]
pub const fn expected_proof_len(index: u64, total: u64) -> Option<usize> {
    if index >= total {
        return None;
    }
    let (mut i, mut n, mut len) = (index, total, 0usize);
    while n > 1 {
        // Left child covers the largest power of two strictly below n.
        let k = 1u64 << (63 - (n - 1).leading_zeros());
        if i < k {
            return Some(len + 1 + k.trailing_zeros() as usize);
        }
        len += 1;
        i -= k;
        n -= k;
    }
    Some(len)
}

fn check_shape(len: usize, index: u64, total: u64) -> MerkleResult<()> {
    match expected_proof_len(index, total) {
        None => Err(MerkleError::MalformedProof(format!(
            "leaf index {index} is not below leaf count {total}"
        ))),
        Some(want) if want != len => Err(MerkleError::MalformedProof(format!(
            "expected {want} steps for leaf {index} of {total}, got {len}"
        ))),
        Some(_) => Ok(()),
    }
}

fn fold_path<M>(leaf: Digest, steps: &[ProofStep], hasher: &mut M) -> Result<Digest, HashError>
where
    M: MerkleHasher + ?Sized,
{
    steps.iter().try_fold(leaf, |cur, step| match step.side {
        Side::Left => hasher.hash_node(&step.sibling, &cur),
        Side::Right => hasher.hash_node(&cur, &step.sibling),
    })
}
