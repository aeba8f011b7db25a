//! Reader-driven helpers: chunk a byte stream into segments and feed them
//! to a [`StreamTree`].
//!
//! Each segment is filled completely before it is yielded, so only the last
//! one can be short. The tree zero-pads it; callers never pad themselves.

use crate::error::{MerkleError, MerkleResult};
use crate::proof::Proof;
use crate::tree::{pad_segment, StreamTree};
use mstream_crypto::{Digest, MerkleHasher};
use std::io::{self, ErrorKind, Read};
use tracing::debug;

/// Owning iterator over fixed-size segments of a reader.
///
/// Yields `Err` for a hard read failure (and stops); returns `None` at end
/// of input. An empty input yields no segments.
#[derive(Debug)]
pub struct SegmentReader<R> {
    inner: R,
    segment_size: usize,
    done: bool,
}

impl<R: Read> SegmentReader<R> {
    /// Wrap `inner`; `segment_size` must be non-zero.
    pub fn new(inner: R, segment_size: usize) -> MerkleResult<Self> {
        if segment_size == 0 {
            return Err(MerkleError::usage("segment size must be non-zero"));
        }
        Ok(Self {
            inner,
            segment_size,
            done: false,
        })
    }

    /// Read until `buf` is full or the reader is exhausted.
    fn fill(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.inner.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
        Ok(filled)
    }
}

impl<R: Read> Iterator for SegmentReader<R> {
    type Item = io::Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let mut buf = vec![0u8; self.segment_size];
        match self.fill(&mut buf) {
            Ok(0) => {
                self.done = true;
                None
            }
            Ok(n) => {
                if n < self.segment_size {
                    self.done = true;
                    buf.truncate(n);
                }
                Some(Ok(buf))
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

/// Root plus proof produced from a reader.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReaderProof {
    /// Merkle root over every segment of the stream.
    pub root: Digest,
    /// Inclusion proof for the requested segment.
    pub proof: Proof,
    /// The requested segment, zero-padded to the segment size.
    pub segment: Vec<u8>,
}

/// Root of a whole stream and the number of leaves it was built from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReaderRoot {
    /// Merkle root over every segment of the stream.
    pub root: Digest,
    /// Segments read, the short last one included.
    pub leaves: u64,
}

/// Merkle root of everything `reader` yields, in `segment_size` leaves.
pub fn reader_root<R, M>(reader: R, hasher: M, segment_size: usize) -> MerkleResult<ReaderRoot>
where
    R: Read,
    M: MerkleHasher,
{
    let mut tree = StreamTree::with_segment_size(hasher, segment_size)?;
    for seg in SegmentReader::new(reader, segment_size)? {
        tree.push(&seg?)?;
    }
    let leaves = tree.leaf_count();
    debug!(leaves, segment_size, "reader exhausted");
    let root = tree.root()?;
    Ok(ReaderRoot { root, leaves })
}

/// Root of the stream and an inclusion proof for segment `index`.
///
/// Fails with [`MerkleError::IndexOutOfRange`] if the stream has fewer than
/// `index + 1` segments.
pub fn build_reader_proof<R, M>(
    reader: R,
    hasher: M,
    segment_size: usize,
    index: u64,
) -> MerkleResult<ReaderProof>
where
    R: Read,
    M: MerkleHasher,
{
    let mut tree = StreamTree::with_segment_size(hasher, segment_size)?;
    tree.set_index(index)?;
    let mut target = None;
    for seg in SegmentReader::new(reader, segment_size)? {
        let seg = seg?;
        if tree.leaf_count() == index {
            target = Some(pad_segment(&seg, segment_size).into_owned());
        }
        tree.push(&seg)?;
    }
    debug!(leaves = tree.leaf_count(), segment_size, index, "reader exhausted");
    let (root, proof) = tree.prove()?;
    let segment = target.ok_or(MerkleError::IndexOutOfRange {
        index,
        leaves: proof.leaf_count,
    })?;
    Ok(ReaderProof {
        root,
        proof,
        segment,
    })
}
