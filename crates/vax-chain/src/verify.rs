use tracing::{debug, warn};
use vax_schema::{parse_envelope, validate_data, ActionEnvelope, ActionSchema};

use crate::actor::ChainHead;
use crate::errors::ChainError;
use crate::sai::{chain_sai, Sai};

/// How far an action made it through the admission pipeline. Attached to
/// log events so rejected submissions can be triaged by stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyStage {
    /// Raw bytes received, nothing checked yet.
    Received,
    /// Envelope bytes parsed as canonical form.
    Parsed,
    /// Claimed previous identifier matches the chain head.
    ContinuityChecked,
    /// Envelope fields satisfy the action schema.
    SchemaValidated,
    /// Recomputed identifier matches the submitted one.
    HashVerified,
    /// Action accepted; the head may advance.
    Admitted,
}

/// Constant-time check that a claimed previous identifier matches the
/// expected one.
pub fn verify_continuity(expected: &Sai, claimed: &Sai) -> Result<(), ChainError> {
    if expected == claimed {
        Ok(())
    } else {
        Err(ChainError::InvalidPrevSai)
    }
}

/// Runs the full admission pipeline over one submitted action.
///
/// Checks, in order: the envelope parses as byte-exact canonical form, the
/// claimed previous identifier matches the chain head, the fields satisfy
/// the schema, and the recomputed identifier matches the submitted one. The
/// identifier comparisons are constant-time. On success the decoded envelope
/// is returned; advancing the head is the caller's decision.
pub fn verify_action(
    head: &ChainHead,
    prev: &Sai,
    submitted: &Sai,
    envelope_bytes: &[u8],
    schema: &ActionSchema,
) -> Result<ActionEnvelope, ChainError> {
    if envelope_bytes.is_empty() {
        return Err(ChainError::InvalidInput(
            "envelope bytes must not be empty".to_string(),
        ));
    }

    let envelope = parse_envelope(envelope_bytes).map_err(|err| {
        debug!(stage = ?VerifyStage::Received, %err, "envelope rejected");
        ChainError::InvalidInput(err.to_string())
    })?;
    debug!(stage = ?VerifyStage::Parsed, action_type = %envelope.action_type, "envelope parsed");

    if let Err(err) = verify_continuity(head.current(), prev) {
        warn!(
            stage = ?VerifyStage::ContinuityChecked,
            head = %head.current(),
            "submitted prev does not match the chain head"
        );
        return Err(err);
    }

    if let Err(err) = validate_data(&envelope.sdto, schema) {
        debug!(stage = ?VerifyStage::SchemaValidated, %err, "schema validation failed");
        return Err(ChainError::Validation(err));
    }

    let recomputed = chain_sai(prev, envelope_bytes)?;
    if recomputed != *submitted {
        warn!(
            stage = ?VerifyStage::HashVerified,
            expected = %recomputed,
            "submitted identifier does not match the recomputed value"
        );
        return Err(ChainError::SaiMismatch);
    }

    debug!(stage = ?VerifyStage::Admitted, id = %recomputed, "action admitted");
    Ok(envelope)
}

/// [`verify_action`] over raw identifier slices, length-checking both before
/// entering the pipeline.
pub fn verify_action_bytes(
    head: &ChainHead,
    prev: &[u8],
    submitted: &[u8],
    envelope_bytes: &[u8],
    schema: &ActionSchema,
) -> Result<ActionEnvelope, ChainError> {
    let prev = Sai::from_bytes(prev)?;
    let submitted = Sai::from_bytes(submitted)?;
    verify_action(head, &prev, &submitted, envelope_bytes, schema)
}
