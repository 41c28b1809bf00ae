use std::fmt;

use crate::errors::ChainError;
use crate::sai::{Sai, GENESIS_SALT_SIZE};

/// The user/device pair a chain is anchored to.
///
/// Chains are per-device: the same user on two devices owns two chains.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActorIdentity {
    /// Stable user identifier.
    pub user_id: String,
    /// Stable device identifier.
    pub device_id: String,
}

impl ActorIdentity {
    /// Constructs an actor identity.
    pub fn new(user_id: impl Into<String>, device_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            device_id: device_id.into(),
        }
    }

    /// The canonical `user:device` form hashed into the genesis identifier.
    pub fn actor_id(&self) -> String {
        format!("{}:{}", self.user_id, self.device_id)
    }
}

impl fmt::Display for ActorIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.user_id, self.device_id)
    }
}

/// Fresh entropy mixed into a chain's genesis identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenesisSalt([u8; GENESIS_SALT_SIZE]);

impl GenesisSalt {
    /// Wraps 16 salt bytes.
    pub fn new(bytes: [u8; GENESIS_SALT_SIZE]) -> Self {
        Self(bytes)
    }

    /// Parses a salt from a byte slice, checking its length.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ChainError> {
        let array: [u8; GENESIS_SALT_SIZE] = bytes.try_into().map_err(|_| {
            ChainError::InvalidInput(format!(
                "genesis salt must be {GENESIS_SALT_SIZE} bytes, got {}",
                bytes.len()
            ))
        })?;
        Ok(Self(array))
    }

    /// The raw salt bytes.
    pub fn as_bytes(&self) -> &[u8; GENESIS_SALT_SIZE] {
        &self.0
    }
}

/// One admitted action: its position, content, and identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct ChainLink {
    /// Identifier of the preceding action (or the genesis identifier).
    pub prev: Sai,
    /// Canonical envelope bytes the identifier commits to.
    pub envelope_bytes: Vec<u8>,
    /// This action's identifier.
    pub id: Sai,
}

/// The verifier's view of where a chain currently ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainHead {
    last_admitted: Sai,
    height: u64,
}

impl ChainHead {
    /// Starts a head at the genesis identifier, before any action.
    pub fn new(genesis: Sai) -> Self {
        Self {
            last_admitted: genesis,
            height: 0,
        }
    }

    /// The identifier the next action must chain from.
    pub fn current(&self) -> &Sai {
        &self.last_admitted
    }

    /// Number of actions admitted so far.
    pub fn height(&self) -> u64 {
        self.height
    }

    /// Moves the head forward to a newly admitted identifier.
    pub fn advance(&mut self, id: Sai) {
        self.last_admitted = id;
        self.height += 1;
    }
}
