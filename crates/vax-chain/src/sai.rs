use std::fmt;

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use vax_canonical::content_digest;

use crate::actor::GenesisSalt;
use crate::errors::ChainError;

/// Size of a sequential action identifier in bytes.
pub const SAI_SIZE: usize = 32;
/// Size of the genesis salt in bytes.
pub const GENESIS_SALT_SIZE: usize = 16;

const GENESIS_DOMAIN: &[u8] = b"VAX-GENESIS";
pub(crate) const CHAIN_DOMAIN: &[u8] = b"VAX-SAI";

/// A sequential action identifier: a 32-byte chain-position digest.
///
/// Equality is constant-time; identifiers are compared against attacker
/// supplied values on the admission path.
#[derive(Clone, Copy)]
pub struct Sai([u8; SAI_SIZE]);

impl Sai {
    /// Wraps a 32-byte digest.
    pub fn new(bytes: [u8; SAI_SIZE]) -> Self {
        Self(bytes)
    }

    /// Parses an identifier from a byte slice, checking its length.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ChainError> {
        let array: [u8; SAI_SIZE] = bytes.try_into().map_err(|_| {
            ChainError::InvalidInput(format!(
                "action identifier must be {SAI_SIZE} bytes, got {}",
                bytes.len()
            ))
        })?;
        Ok(Self(array))
    }

    /// The raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; SAI_SIZE] {
        &self.0
    }
}

impl PartialEq for Sai {
    fn eq(&self, other: &Self) -> bool {
        self.0.ct_eq(&other.0).into()
    }
}

impl Eq for Sai {}

impl fmt::Display for Sai {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Sai {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sai({self})")
    }
}

/// Derives the genesis identifier anchoring a new chain:
/// `SHA-256("VAX-GENESIS" || actor_id || salt)`.
///
/// Infallible: [`GenesisSalt`] carries the length invariant, so untrusted
/// salt bytes are length-checked once, at [`GenesisSalt::from_bytes`]. The
/// salt is fresh entropy so that the same actor can own multiple independent
/// chains.
pub fn genesis_sai(actor_id: &str, salt: &GenesisSalt) -> Sai {
    let mut hasher = Sha256::new();
    hasher.update(GENESIS_DOMAIN);
    hasher.update(actor_id.as_bytes());
    hasher.update(salt.as_bytes());
    Sai(hasher.finalize().into())
}

/// Derives the identifier of the next action in a chain:
/// `SHA-256("VAX-SAI" || prev || SHA-256(envelope_bytes))`.
///
/// The envelope is hashed once before entering the outer digest, so the
/// identifier commits to the envelope content without its length entering the
/// domain-separated stream.
pub fn chain_sai(prev: &Sai, envelope_bytes: &[u8]) -> Result<Sai, ChainError> {
    if envelope_bytes.is_empty() {
        return Err(ChainError::InvalidInput(
            "envelope bytes must not be empty".to_string(),
        ));
    }
    let inner = content_digest(envelope_bytes);
    let mut hasher = Sha256::new();
    hasher.update(CHAIN_DOMAIN);
    hasher.update(prev.as_bytes());
    hasher.update(inner);
    Ok(Sai(hasher.finalize().into()))
}
