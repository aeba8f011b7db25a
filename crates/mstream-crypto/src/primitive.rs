//! Raw hash primitives.
//!
//! A primitive maps an ordered list of byte slices (hashed as one
//! concatenated message) to a [`Digest`]. It knows nothing about trees; the
//! leaf/node framing lives in [`crate::hasher`].

use crate::{Digest, HashError, DIGEST_LEN};
use serde::{Deserialize, Serialize};
use sha3::Digest as _;
use std::fmt;
use std::str::FromStr;

/// Deterministic hash capability supplied to the tree.
///
/// `&mut self` lets implementations keep and reuse internal state; callers
/// must give each builder its own instance.
pub trait HashPrimitive {
    /// Stable identifier (e.g. `"blake3"`).
    fn name(&self) -> &'static str;

    /// Hash `parts` in order as a single message.
    fn digest(&mut self, parts: &[&[u8]]) -> Result<Digest, HashError>;
}

/// BLAKE3 (default primitive).
#[derive(Clone, Debug, Default)]
pub struct Blake3 {
    st: blake3::Hasher,
}

impl Blake3 {
    /// Fresh BLAKE3 primitive.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl HashPrimitive for Blake3 {
    fn name(&self) -> &'static str {
        HashKind::Blake3.as_str()
    }

    fn digest(&mut self, parts: &[&[u8]]) -> Result<Digest, HashError> {
        self.st.reset();
        for p in parts {
            self.st.update(p);
        }
        Ok(Digest::new(*self.st.finalize().as_bytes()))
    }
}

/// SHA3-256 (Keccak, FIPS 202).
#[derive(Clone, Debug, Default)]
pub struct Sha3_256 {
    st: sha3::Sha3_256,
}

impl Sha3_256 {
    /// Fresh SHA3-256 primitive.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl HashPrimitive for Sha3_256 {
    fn name(&self) -> &'static str {
        HashKind::Sha3_256.as_str()
    }

    fn digest(&mut self, parts: &[&[u8]]) -> Result<Digest, HashError> {
        for p in parts {
            self.st.update(p);
        }
        let out = self.st.finalize_reset();
        let mut bytes = [0u8; DIGEST_LEN];
        bytes.copy_from_slice(&out);
        Ok(Digest::new(bytes))
    }
}

/// Names of the shipped primitives, for configuration surfaces.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HashKind {
    /// BLAKE3.
    #[default]
    #[serde(rename = "blake3")]
    Blake3,
    /// SHA3-256.
    #[serde(rename = "sha3-256")]
    Sha3_256,
}

impl HashKind {
    /// Borrow the canonical string.
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Blake3 => "blake3",
            Self::Sha3_256 => "sha3-256",
        }
    }

    /// Instantiate a fresh primitive of this kind.
    #[must_use]
    pub fn primitive(self) -> AnyPrimitive {
        match self {
            Self::Blake3 => AnyPrimitive::Blake3(Blake3::new()),
            Self::Sha3_256 => AnyPrimitive::Sha3_256(Sha3_256::new()),
        }
    }
}

impl fmt::Display for HashKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HashKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "blake3" => Ok(Self::Blake3),
            "sha3-256" | "sha3_256" | "sha3" => Ok(Self::Sha3_256),
            other => Err(format!("unknown hash primitive: {other} (expected blake3 or sha3-256)")),
        }
    }
}

/// Runtime-selected primitive (see [`HashKind::primitive`]).
#[derive(Clone, Debug)]
pub enum AnyPrimitive {
    /// BLAKE3.
    Blake3(Blake3),
    /// SHA3-256.
    Sha3_256(Sha3_256),
}

impl HashPrimitive for AnyPrimitive {
    fn name(&self) -> &'static str {
        match self {
            Self::Blake3(p) => p.name(),
            Self::Sha3_256(p) => p.name(),
        }
    }

    fn digest(&mut self, parts: &[&[u8]]) -> Result<Digest, HashError> {
        match self {
            Self::Blake3(p) => p.digest(parts),
            Self::Sha3_256(p) => p.digest(parts),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn parts_hash_as_one_message() {
        let mut b = Blake3::new();
        let split = b.digest(&[b"hello ".as_slice(), b"world".as_slice()]).unwrap();
        let whole = b.digest(&[b"hello world".as_slice()]).unwrap();
        assert_eq!(split, whole);
        assert_eq!(whole.to_bytes(), *blake3::hash(b"hello world").as_bytes());

        let mut s = Sha3_256::new();
        assert_eq!(
            s.digest(&[b"hello ".as_slice(), b"world".as_slice()]).unwrap(),
            s.digest(&[b"hello world".as_slice()]).unwrap()
        );
    }

    #[test]
    fn state_does_not_leak_between_calls() {
        let mut s = Sha3_256::new();
        let first = s.digest(&[b"abc".as_slice()]).unwrap();
        let _ = s.digest(&[b"something else".as_slice()]).unwrap();
        assert_eq!(s.digest(&[b"abc".as_slice()]).unwrap(), first);
    }

    #[test]
    fn sha3_known_vector() {
        // SHA3-256("abc")
        let mut s = Sha3_256::new();
        assert_eq!(
            s.digest(&[b"abc".as_slice()]).unwrap().to_hex(),
            "3a985da74fe225b2045c172d6bd390bd855f086e3e9d525b46bfe24511431532"
        );
    }

    #[test]
    fn kind_parses_and_dispatches() {
        assert_eq!("BLAKE3".parse::<HashKind>().unwrap(), HashKind::Blake3);
        assert_eq!("sha3-256".parse::<HashKind>().unwrap(), HashKind::Sha3_256);
        assert!("md5".parse::<HashKind>().is_err());

        let mut any = HashKind::Sha3_256.primitive();
        assert_eq!(any.name(), "sha3-256");
        assert_eq!(
            any.digest(&[b"x".as_slice()]).unwrap(),
            Sha3_256::new().digest(&[b"x".as_slice()]).unwrap()
        );
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 64,
            .. ProptestConfig::default()
        })]

        #[test]
        fn any_split_hashes_like_the_whole(
            msg in proptest::collection::vec(any::<u8>(), 0..256),
            cut in any::<usize>(),
            sha3 in any::<bool>(),
        ) {
            let kind = if sha3 { HashKind::Sha3_256 } else { HashKind::Blake3 };
            let mut p = kind.primitive();
            let cut = cut % (msg.len() + 1);
            let (head, tail) = msg.split_at(cut);
            let split = p.digest(&[head, tail]).unwrap();
            let whole = p.digest(&[msg.as_slice()]).unwrap();
            prop_assert_eq!(split, whole);
        }
    }
}
