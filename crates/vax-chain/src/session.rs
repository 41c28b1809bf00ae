//! Counter-bound session mode.
//!
//! In session mode every identifier additionally commits to a generation
//! index derived from a session key and a strictly-increasing counter, so a
//! captured action cannot be replayed into a different slot even by a party
//! that knows the chain layout.

use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use tracing::warn;
use vax_canonical::content_digest;
use vax_schema::{parse_envelope, validate_data, ActionEnvelope, ActionSchema};

use crate::actor::ChainHead;
use crate::errors::ChainError;
use crate::sai::{Sai, CHAIN_DOMAIN};
use crate::verify::verify_continuity;

/// Size of a session chain key in bytes.
pub const K_CHAIN_SIZE: usize = 32;
/// Size of a generation index in bytes.
pub const GI_SIZE: usize = 32;

const GI_DOMAIN: &[u8] = b"VAX-GI";

type HmacSha256 = Hmac<Sha256>;

/// Derives the generation index for a counter slot:
/// `HMAC-SHA-256(k_chain, "VAX-GI" || counter_be)`.
pub fn compute_gi(k_chain: &[u8; K_CHAIN_SIZE], counter: u16) -> [u8; GI_SIZE] {
    let mut mac =
        HmacSha256::new_from_slice(k_chain).expect("HMAC accepts any key length");
    mac.update(GI_DOMAIN);
    mac.update(&counter.to_be_bytes());
    mac.finalize().into_bytes().into()
}

/// Derives a session-mode identifier:
/// `SHA-256("VAX-SAI" || prev || SHA-256(envelope_bytes) || gi)`.
///
/// The extra generation index is the only difference from the plain chain
/// derivation, so plain and session identifiers for the same action never
/// collide.
pub fn session_sai(
    prev: &Sai,
    envelope_bytes: &[u8],
    gi: &[u8; GI_SIZE],
) -> Result<Sai, ChainError> {
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
    hasher.update(gi);
    Ok(Sai::new(hasher.finalize().into()))
}

/// Where a session currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Key established, counter not yet agreed.
    Connected,
    /// Counter agreed with the producer.
    Synced,
    /// A submission is being verified.
    Proposing,
    /// The last submission was admitted.
    Committed,
    /// The last submission was rejected; the counter did not move.
    Rejected,
}

/// Verifier-side session: holds the session key, the last accepted counter,
/// and the chain head, and admits actions one counter slot at a time.
#[derive(Debug, Clone)]
pub struct SessionVerifier {
    k_chain: [u8; K_CHAIN_SIZE],
    counter: u16,
    head: ChainHead,
    state: SessionState,
}

impl SessionVerifier {
    /// Opens a session over an established key and the current chain head.
    pub fn new(k_chain: [u8; K_CHAIN_SIZE], head: ChainHead) -> Self {
        Self {
            k_chain,
            counter: 0,
            head,
            state: SessionState::Connected,
        }
    }

    /// Resynchronizes after a reconnect: agrees on the last counter both
    /// sides have seen and the identifier the next action must chain from.
    pub fn sync(&mut self, counter: u16, prev: Sai) {
        self.counter = counter;
        self.head = ChainHead::new(prev);
        self.state = SessionState::Synced;
    }

    /// The last accepted counter.
    pub fn counter(&self) -> u16 {
        self.counter
    }

    /// The session's view of the chain head.
    pub fn head(&self) -> &ChainHead {
        &self.head
    }

    /// Current session state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Verifies one session-mode submission.
    ///
    /// Requires a prior [`sync`](Self::sync): a freshly connected session has
    /// no agreed counter to sequence against. The counter must be exactly one
    /// past the last accepted value; gaps and replays are rejected before any
    /// hashing happens. On success the counter and head both advance.
    pub fn verify(
        &mut self,
        prev: &Sai,
        submitted: &Sai,
        envelope_bytes: &[u8],
        schema: &ActionSchema,
        counter: u16,
    ) -> Result<ActionEnvelope, ChainError> {
        if self.state == SessionState::Connected {
            return Err(ChainError::InvalidInput(
                "session must be synced before verification".to_string(),
            ));
        }
        self.state = SessionState::Proposing;
        let result = self.verify_inner(prev, submitted, envelope_bytes, schema, counter);
        match &result {
            Ok(_) => {
                self.counter = counter;
                self.head.advance(*submitted);
                self.state = SessionState::Committed;
            }
            Err(_) => {
                self.state = SessionState::Rejected;
            }
        }
        result
    }

    fn verify_inner(
        &self,
        prev: &Sai,
        submitted: &Sai,
        envelope_bytes: &[u8],
        schema: &ActionSchema,
        counter: u16,
    ) -> Result<ActionEnvelope, ChainError> {
        if self.counter == u16::MAX {
            return Err(ChainError::CounterOverflow);
        }
        let expected = self.counter + 1;
        if counter != expected {
            warn!(expected, submitted = counter, "session counter out of sequence");
            return Err(ChainError::InvalidCounter {
                expected,
                submitted: counter,
            });
        }

        if envelope_bytes.is_empty() {
            return Err(ChainError::InvalidInput(
                "envelope bytes must not be empty".to_string(),
            ));
        }
        let envelope = parse_envelope(envelope_bytes)
            .map_err(|err| ChainError::InvalidInput(err.to_string()))?;

        verify_continuity(self.head.current(), prev).map_err(|err| {
            warn!(head = %self.head.current(), "submitted prev does not match the session head");
            err
        })?;

        validate_data(&envelope.sdto, schema)?;

        let gi = compute_gi(&self.k_chain, counter);
        let recomputed = session_sai(prev, envelope_bytes, &gi)?;
        if recomputed != *submitted {
            warn!(expected = %recomputed, "session identifier mismatch");
            return Err(ChainError::SaiMismatch);
        }
        Ok(envelope)
    }
}
