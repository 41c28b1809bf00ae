use thiserror::Error;
use vax_schema::SchemaError;

/// Failures raised while computing identifiers or admitting actions.
#[derive(Debug, Error)]
pub enum ChainError {
    /// Malformed input: wrong-length salt or identifier bytes, an empty or
    /// unparseable envelope.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The submitted previous identifier does not match the chain head.
    #[error("previous action identifier does not match the chain head")]
    InvalidPrevSai,

    /// The submitted identifier does not match the recomputed one.
    #[error("submitted action identifier does not match the recomputed value")]
    SaiMismatch,

    /// The envelope fields violated the action schema.
    #[error(transparent)]
    Validation(#[from] SchemaError),

    /// A session counter was submitted out of sequence.
    #[error("invalid session counter: expected {expected}, got {submitted}")]
    InvalidCounter {
        /// The counter the verifier required.
        expected: u16,
        /// The counter the producer submitted.
        submitted: u16,
    },

    /// The session counter space is exhausted; the session must be re-keyed.
    #[error("session counter overflow")]
    CounterOverflow,
}
