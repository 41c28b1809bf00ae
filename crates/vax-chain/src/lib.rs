//! Hash-chained action identifiers and the VAX admission pipeline.
//!
//! Each actor's history is a chain of sequential action identifiers (SAIs):
//! a genesis identifier anchors the chain to a `user:device` pair plus fresh
//! salt, and every admitted action derives its identifier from the previous
//! one and a digest of its canonical envelope bytes. Re-deriving the chain
//! from genesis detects any insertion, removal, reorder, or edit.
//!
//! [`verify::verify_action`] runs the full admission pipeline: canonical
//! parse, continuity against the chain head, schema validation, and
//! constant-time identifier comparison. [`session::SessionVerifier`] layers
//! a keyed, counter-bound derivation on top for transports that need replay
//! protection beyond chain order.
//!
#![deny(missing_docs)]

/// Actor identity, genesis salt, and chain head bookkeeping.
pub mod actor;
/// Error taxonomy for identifier derivation and admission.
pub mod errors;
/// Sequential action identifier derivation.
pub mod sai;
/// Counter-bound session mode.
pub mod session;
/// Envelope signing seam.
pub mod signer;
/// The admission pipeline.
pub mod verify;

pub use actor::{ActorIdentity, ChainHead, ChainLink, GenesisSalt};
pub use errors::ChainError;
pub use sai::{chain_sai, genesis_sai, Sai, GENESIS_SALT_SIZE, SAI_SIZE};
pub use session::{
    compute_gi, session_sai, SessionState, SessionVerifier, GI_SIZE, K_CHAIN_SIZE,
};
pub use signer::EnvelopeSigner;
pub use verify::{verify_action, verify_action_bytes, verify_continuity, VerifyStage};
