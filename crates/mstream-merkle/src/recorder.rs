//! Records the sibling path of one target leaf while the stack merges.
//!
//! The tracked node is whichever subtree currently covers the target index.
//! Every merge that consumes it contributes exactly one [`ProofStep`]: the
//! other child becomes the sibling, on the side it sits relative to the
//! tracked node. Merges elsewhere in the stream are ignored, so the recorder
//! holds `O(depth)` digests.

use crate::proof::{Proof, ProofStep, Side};
use crate::stack::{MergeObserver, Subtree};
use mstream_crypto::Digest;

/// Path recorder for a single leaf index fixed up front.
#[derive(Clone, Debug)]
pub struct ProofRecorder {
    target: u64,
    leaf_digest: Option<Digest>,
    steps: Vec<ProofStep>,
}

impl ProofRecorder {
    /// Watch leaf `target`.
    #[must_use]
    pub const fn new(target: u64) -> Self {
        Self {
            target,
            leaf_digest: None,
            steps: Vec::new(),
        }
    }

    /// The watched leaf index.
    #[inline]
    #[must_use]
    pub const fn target(&self) -> u64 {
        self.target
    }

    /// Steps recorded so far, leaf-most first.
    #[must_use]
    pub fn steps(&self) -> &[ProofStep] {
        &self.steps
    }

    /// Note the digest of leaf `index` as it is pushed.
    pub fn observe_leaf(&mut self, index: u64, digest: Digest) {
        if index == self.target {
            self.leaf_digest = Some(digest);
        }
    }

    /// Package the path once the stack has been finalized.
    ///
    /// `None` if the target leaf never arrived.
    #[must_use]
    pub fn finish(self, leaf_count: u64) -> Option<Proof> {
        let leaf_digest = self.leaf_digest?;
        Some(Proof {
            leaf_index: self.target,
            leaf_count,
            leaf_digest,
            steps: self.steps,
        })
    }
}

impl MergeObserver for ProofRecorder {
    fn on_merge(&mut self, left: &Subtree, right: &Subtree) {
        if right.contains(self.target) {
            self.steps.push(ProofStep {
                sibling: left.digest,
                side: Side::Left,
            });
        } else if left.contains(self.target) {
            self.steps.push(ProofStep {
                sibling: right.digest,
                side: Side::Right,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sub(byte: u8, start: u64, leaves: u64) -> Subtree {
        Subtree {
            digest: Digest::new([byte; 32]),
            height: leaves.trailing_zeros(),
            start,
            leaves,
        }
    }

    #[test]
    fn records_only_merges_on_the_path() {
        let mut rec = ProofRecorder::new(2);
        rec.on_merge(&sub(1, 0, 1), &sub(2, 1, 1)); // [0,1]: off path
        assert!(rec.steps().is_empty());

        rec.on_merge(&sub(3, 2, 1), &sub(4, 3, 1)); // target is left
        rec.on_merge(&sub(5, 0, 2), &sub(6, 2, 2)); // target is right
        assert_eq!(
            rec.steps(),
            &[
                ProofStep {
                    sibling: Digest::new([4; 32]),
                    side: Side::Right,
                },
                ProofStep {
                    sibling: Digest::new([5; 32]),
                    side: Side::Left,
                },
            ]
        );
    }

    #[test]
    fn unreached_target_yields_no_proof() {
        let mut rec = ProofRecorder::new(9);
        rec.observe_leaf(0, Digest::default());
        assert!(rec.finish(1).is_none());
    }
}
