//! Bounded-memory subtree stack ("binary counter" construction).
//!
//! After `n` pushes the stack holds one perfect subtree per set bit of `n`,
//! tallest at the bottom. Pushing a leaf adds a height-0 entry and merges
//! the top two entries while their heights match; [`SubtreeStack::finalize`]
//! then folds what remains from the top down.
//!
//! ## Invariants
//! - Heights strictly decrease from bottom to top between operations.
//! - Entries cover consecutive, disjoint leaf ranges in push order.
//! - A merge computes the parent digest *before* touching the stack, so a
//!   hash failure leaves the stack exactly as it was.

use mstream_crypto::{Digest, HashError, MerkleHasher};

/// One entry on the stack: a subtree digest plus the leaf range it covers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Subtree {
    /// Root digest of the subtree.
    pub digest: Digest,
    /// 0 for a single leaf.
    pub height: u32,
    /// Index of the first covered leaf.
    pub start: u64,
    /// Number of covered leaves.
    pub leaves: u64,
}

impl Subtree {
    /// A single leaf at `index`.
    #[inline]
    #[must_use]
    pub const fn leaf(digest: Digest, index: u64) -> Self {
        Self {
            digest,
            height: 0,
            start: index,
            leaves: 1,
        }
    }

    /// Whether leaf `index` lies inside this subtree.
    #[inline]
    #[must_use]
    pub const fn contains(&self, index: u64) -> bool {
        index >= self.start && index - self.start < self.leaves
    }
}

/// Hook invoked on every merge, before the parent replaces its children.
pub trait MergeObserver {
    /// `left` was pushed earlier than `right`; both are about to be combined.
    fn on_merge(&mut self, left: &Subtree, right: &Subtree);
}

impl MergeObserver for () {
    fn on_merge(&mut self, _left: &Subtree, _right: &Subtree) {}
}

impl<T: MergeObserver> MergeObserver for Option<T> {
    fn on_merge(&mut self, left: &Subtree, right: &Subtree) {
        if let Some(obs) = self {
            obs.on_merge(left, right);
        }
    }
}

/// Stack of completed subtrees.
#[derive(Clone, Debug, Default)]
pub struct SubtreeStack {
    nodes: Vec<Subtree>,
    leaves: u64,
}

impl SubtreeStack {
    /// Empty stack.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            nodes: Vec::new(),
            leaves: 0,
        }
    }

    /// Total leaves pushed so far.
    #[inline]
    #[must_use]
    pub const fn leaf_count(&self) -> u64 {
        self.leaves
    }

    /// Number of subtrees currently held.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether nothing has been pushed.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Entries from bottom (oldest, tallest) to top.
    #[must_use]
    pub fn subtrees(&self) -> &[Subtree] {
        &self.nodes
    }

    /// Push one leaf digest and merge equal-height subtrees.
    pub fn push_leaf<M, O>(
        &mut self,
        hasher: &mut M,
        leaf: Digest,
        observer: &mut O,
    ) -> Result<(), HashError>
    where
        M: MerkleHasher + ?Sized,
        O: MergeObserver + ?Sized,
    {
        self.nodes.push(Subtree::leaf(leaf, self.leaves));
        self.leaves += 1;
        while self.top_heights_match() {
            self.merge_top(hasher, observer)?;
        }
        debug_assert!(self.heights_decreasing());
        Ok(())
    }

    /// Fold the remaining subtrees into the root.
    ///
    /// The top entry is always the right child, so an unpaired subtree is
    /// carried up unchanged. An empty stack yields `hasher.hash_empty()`.
    pub fn finalize<M, O>(&mut self, hasher: &mut M, observer: &mut O) -> Result<Digest, HashError>
    where
        M: MerkleHasher + ?Sized,
        O: MergeObserver + ?Sized,
    {
        while self.nodes.len() > 1 {
            self.merge_top(hasher, observer)?;
        }
        match self.nodes.last() {
            Some(root) => Ok(root.digest),
            None => hasher.hash_empty(),
        }
    }

    /// Strict height decrease bottom→top (the stack invariant).
    #[must_use]
    pub fn heights_decreasing(&self) -> bool {
        self.nodes.windows(2).all(|w| w[0].height > w[1].height)
    }

    fn top_heights_match(&self) -> bool {
        match self.nodes.as_slice() {
            [.., a, b] => a.height == b.height,
            _ => false,
        }
    }

    fn merge_top<M, O>(&mut self, hasher: &mut M, observer: &mut O) -> Result<(), HashError>
    where
        M: MerkleHasher + ?Sized,
        O: MergeObserver + ?Sized,
    {
        let n = self.nodes.len();
        let (left, right) = (self.nodes[n - 2], self.nodes[n - 1]);
        let digest = hasher.hash_node(&left.digest, &right.digest)?;
        observer.on_merge(&left, &right);
        self.nodes.truncate(n - 2);
        self.nodes.push(Subtree {
            digest,
            height: left.height.max(right.height) + 1,
            start: left.start,
            leaves: left.leaves + right.leaves,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mstream_crypto::{Blake3, DomainHasher};

    fn leaf(h: &mut DomainHasher<Blake3>, i: u64) -> Digest {
        h.hash_leaf(&i.to_le_bytes()).unwrap()
    }

    #[test]
    fn stack_tracks_set_bits_of_count() {
        let mut h = DomainHasher::new(Blake3::new());
        let mut st = SubtreeStack::new();
        for i in 0..37u64 {
            let d = leaf(&mut h, i);
            st.push_leaf(&mut h, d, &mut ()).unwrap();
            let n = i + 1;
            assert_eq!(st.len(), n.count_ones() as usize, "n = {n}");
            assert!(st.heights_decreasing());
            let heights: Vec<u32> = st.subtrees().iter().map(|s| s.height).collect();
            let expected: Vec<u32> = (0..64u32).rev().filter(|b| (n >> b) & 1 == 1).collect();
            assert_eq!(heights, expected);
            // Coverage is contiguous and complete.
            let mut next = 0;
            for s in st.subtrees() {
                assert_eq!(s.start, next);
                assert_eq!(s.leaves, 1 << s.height);
                next += s.leaves;
            }
            assert_eq!(next, n);
        }
    }

    #[test]
    fn three_leaves_carry_odd_one_forward() {
        let mut h = DomainHasher::new(Blake3::new());
        let (a, b, c) = (leaf(&mut h, 0), leaf(&mut h, 1), leaf(&mut h, 2));
        let mut st = SubtreeStack::new();
        for d in [a, b, c] {
            st.push_leaf(&mut h, d, &mut ()).unwrap();
        }
        let ab = h.hash_node(&a, &b).unwrap();
        assert_eq!(st.finalize(&mut h, &mut ()).unwrap(), h.hash_node(&ab, &c).unwrap());
    }

    #[test]
    fn empty_stack_finalizes_to_sentinel() {
        let mut h = DomainHasher::new(Blake3::new());
        let mut st = SubtreeStack::new();
        assert_eq!(st.finalize(&mut h, &mut ()).unwrap(), h.hash_empty().unwrap());
    }

    #[derive(Default)]
    struct Count(usize);

    impl MergeObserver for Count {
        fn on_merge(&mut self, left: &Subtree, right: &Subtree) {
            assert_eq!(left.start + left.leaves, right.start);
            self.0 += 1;
        }
    }

    #[test]
    fn n_leaves_take_n_minus_one_merges() {
        let mut h = DomainHasher::new(Blake3::new());
        let mut st = SubtreeStack::new();
        let mut obs = Count::default();
        for i in 0..11 {
            let d = leaf(&mut h, i);
            st.push_leaf(&mut h, d, &mut obs).unwrap();
        }
        st.finalize(&mut h, &mut obs).unwrap();
        assert_eq!(obs.0, 10);
    }
}
