use sha2::{Digest, Sha256};

/// Size of a content digest in bytes.
pub const DIGEST_SIZE: usize = 32;

/// Computes the SHA-256 digest of a byte sequence.
///
/// Used by the chain engine as the inner hash over envelope bytes, bounding
/// the outer chain-link hash input to a fixed size regardless of envelope
/// length.
pub fn content_digest(bytes: &[u8]) -> [u8; DIGEST_SIZE] {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hasher.finalize().into()
}
