#![no_main]
use ciborium::de::from_reader;
use libfuzzer_sys::fuzz_target;
use mstream_merkle::{Blake3, Digest, DomainHasher, Proof};

// Arbitrary CBOR-decoded proofs must be rejected or accepted, never panic.
fuzz_target!(|data: &[u8]| {
    if let Ok(proof) = from_reader::<Proof, _>(data) {
        let mut h = DomainHasher::new(Blake3::new());
        let _ = proof.verify_digest(&Digest::default(), &mut h);
        let _ = proof.verify(data, &proof.leaf_digest, &mut h);
    }
});
