//! Leaf/node hashing with domain separation.

use crate::{Digest, HashError, HashPrimitive};

/// Tree-facing hash capability.
///
/// Leaf and node hashing are separate operations so that no digest produced
/// by one can stand in for the other inside a proof.
pub trait MerkleHasher {
    /// Digest of one (already padded) leaf segment.
    fn hash_leaf(&mut self, data: &[u8]) -> Result<Digest, HashError>;

    /// Digest of an internal node from its ordered children.
    fn hash_node(&mut self, left: &Digest, right: &Digest) -> Result<Digest, HashError>;

    /// Root of a tree with zero leaves.
    fn hash_empty(&mut self) -> Result<Digest, HashError>;
}

/// Domain tags prepended to every hashed message.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Domain {
    /// Leaf segment.
    Leaf,
    /// Internal node (two child digests).
    Node,
}

impl Domain {
    /// The one-byte prefix for this domain.
    #[inline]
    #[must_use]
    pub const fn prefix(self) -> u8 {
        match self {
            Self::Leaf => 0x00,
            Self::Node => 0x01,
        }
    }
}

/// [`MerkleHasher`] over any [`HashPrimitive`]:
///
/// - leaf  = `P(0x00 ‖ data)`
/// - node  = `P(0x01 ‖ left ‖ right)`
/// - empty = `P("")`, the only message without a prefix byte, so the
///   empty-tree sentinel never coincides with a leaf or node digest.
#[derive(Clone, Debug, Default)]
pub struct DomainHasher<P> {
    primitive: P,
}

impl<P: HashPrimitive> DomainHasher<P> {
    /// Wrap a primitive.
    #[must_use]
    pub const fn new(primitive: P) -> Self {
        Self { primitive }
    }
}

impl<P: HashPrimitive> MerkleHasher for DomainHasher<P> {
    fn hash_leaf(&mut self, data: &[u8]) -> Result<Digest, HashError> {
        let prefix = [Domain::Leaf.prefix()];
        self.primitive.digest(&[&prefix[..], data])
    }

    fn hash_node(&mut self, left: &Digest, right: &Digest) -> Result<Digest, HashError> {
        let prefix = [Domain::Node.prefix()];
        self.primitive
            .digest(&[&prefix[..], &left.as_bytes()[..], &right.as_bytes()[..]])
    }

    fn hash_empty(&mut self) -> Result<Digest, HashError> {
        self.primitive.digest(&[])
    }
}

impl<M: MerkleHasher + ?Sized> MerkleHasher for &mut M {
    fn hash_leaf(&mut self, data: &[u8]) -> Result<Digest, HashError> {
        (**self).hash_leaf(data)
    }

    fn hash_node(&mut self, left: &Digest, right: &Digest) -> Result<Digest, HashError> {
        (**self).hash_node(left, right)
    }

    fn hash_empty(&mut self) -> Result<Digest, HashError> {
        (**self).hash_empty()
    }
}
