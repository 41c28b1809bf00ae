//! Chain derivation and admission pipeline tests.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use vax_chain::{
    chain_sai, compute_gi, genesis_sai, session_sai, verify_action, verify_action_bytes,
    ActorIdentity, ChainError, ChainHead, ChainLink, EnvelopeSigner, GenesisSalt, Sai,
    SessionState, SessionVerifier,
};
use vax_schema::{ActionBuilder, ActionSchema, SchemaBuilder};

fn test_salt() -> GenesisSalt {
    let bytes: Vec<u8> = (0xa1u8..=0xb0).collect();
    GenesisSalt::from_bytes(&bytes).unwrap()
}

fn transfer_schema() -> ActionSchema {
    SchemaBuilder::new()
        .set_string_length("name", 1, 50)
        .set_number_range("amount", "0", "1000000")
        .build()
}

fn transfer_envelope(amount: f64) -> Vec<u8> {
    ActionBuilder::new("transfer", transfer_schema())
        .set("name", "alice")
        .set("amount", amount)
        .finalize_at(1234567890)
        .unwrap()
}

#[test]
fn genesis_matches_fixed_vector() {
    let actor = ActorIdentity::new("user123", "device456");
    assert_eq!(actor.actor_id(), "user123:device456");
    let genesis = genesis_sai(&actor.actor_id(), &test_salt());
    assert_eq!(
        genesis.to_string(),
        "afc50728cd79e805a8ae06875a1ddf78ca11b0d56ec300b160fb71f50ce658c3"
    );
}

#[test]
fn genesis_salt_length_is_enforced() {
    let err = GenesisSalt::from_bytes(&[0u8; 8]).unwrap_err();
    assert!(matches!(err, ChainError::InvalidInput(_)));
    assert!(GenesisSalt::from_bytes(&[0u8; 17]).is_err());
    assert!(GenesisSalt::from_bytes(&[0u8; 16]).is_ok());
}

#[test]
fn genesis_is_salt_and_actor_sensitive() {
    let a = genesis_sai("user123:device456", &test_salt());
    let b = genesis_sai("user123:device457", &test_salt());
    let c = genesis_sai("user123:device456", &GenesisSalt::new([0u8; 16]));
    assert_ne!(a, b);
    assert_ne!(a, c);
}

#[test]
fn chain_derivation_is_deterministic() {
    let prev = genesis_sai("user123:device456", &test_salt());
    let envelope = transfer_envelope(500.0);
    let x = chain_sai(&prev, &envelope).unwrap();
    let y = chain_sai(&prev, &envelope).unwrap();
    assert_eq!(x, y);
    assert_ne!(x, prev);

    let other = chain_sai(&prev, &transfer_envelope(501.0)).unwrap();
    assert_ne!(x, other);
}

#[test]
fn chain_rejects_empty_envelope() {
    let prev = genesis_sai("user123:device456", &test_salt());
    assert!(matches!(
        chain_sai(&prev, b""),
        Err(ChainError::InvalidInput(_))
    ));
}

#[test]
fn admission_pipeline_accepts_a_valid_chain() {
    let genesis = genesis_sai("user123:device456", &test_salt());
    let mut head = ChainHead::new(genesis);
    let schema = transfer_schema();

    for amount in [500.0, 501.0, 502.0] {
        let prev = *head.current();
        let envelope = transfer_envelope(amount);
        let id = chain_sai(&prev, &envelope).unwrap();
        let parsed = verify_action(&head, &prev, &id, &envelope, &schema).unwrap();
        assert_eq!(parsed.action_type, "transfer");
        head.advance(id);
    }
    assert_eq!(head.height(), 3);
}

#[test]
fn admission_rejects_stale_prev() {
    let genesis = genesis_sai("user123:device456", &test_salt());
    let mut head = ChainHead::new(genesis);
    let schema = transfer_schema();

    let envelope = transfer_envelope(500.0);
    let id = chain_sai(&genesis, &envelope).unwrap();
    verify_action(&head, &genesis, &id, &envelope, &schema).unwrap();
    head.advance(id);

    // Re-submitting against the old head is a fork attempt.
    let replay_id = chain_sai(&genesis, &envelope).unwrap();
    let err = verify_action(&head, &genesis, &replay_id, &envelope, &schema).unwrap_err();
    assert!(matches!(err, ChainError::InvalidPrevSai));
}

#[test]
fn admission_rejects_wrong_identifier() {
    let genesis = genesis_sai("user123:device456", &test_salt());
    let head = ChainHead::new(genesis);
    let schema = transfer_schema();

    let envelope = transfer_envelope(500.0);
    let mut bytes = *chain_sai(&genesis, &envelope).unwrap().as_bytes();
    bytes[0] ^= 0x01;
    let forged = Sai::new(bytes);
    let err = verify_action(&head, &genesis, &forged, &envelope, &schema).unwrap_err();
    assert!(matches!(err, ChainError::SaiMismatch));
}

#[test]
fn admission_rejects_garbage_envelope() {
    let genesis = genesis_sai("user123:device456", &test_salt());
    let head = ChainHead::new(genesis);
    let schema = transfer_schema();

    let err = verify_action(&head, &genesis, &genesis, b"not json", &schema).unwrap_err();
    assert!(matches!(err, ChainError::InvalidInput(_)));

    let err = verify_action(&head, &genesis, &genesis, b"", &schema).unwrap_err();
    assert!(matches!(err, ChainError::InvalidInput(_)));
}

#[test]
fn admission_rejects_schema_violations() {
    let genesis = genesis_sai("user123:device456", &test_salt());
    let head = ChainHead::new(genesis);

    // A permissive build-side schema lets the envelope exist; the verifier
    // side enforces the real bounds.
    let permissive = SchemaBuilder::new()
        .set_string_length("name", 1, 50)
        .set_number_range("amount", "0", "99999999")
        .build();
    let envelope = ActionBuilder::new("transfer", permissive)
        .set("name", "alice")
        .set("amount", 2000000.0)
        .finalize_at(1234567890)
        .unwrap();
    let id = chain_sai(&genesis, &envelope).unwrap();
    let err = verify_action(&head, &genesis, &id, &envelope, &transfer_schema()).unwrap_err();
    assert!(matches!(err, ChainError::Validation(_)));

    // The builder path never lets such an envelope exist in the first place.
    assert!(ActionBuilder::new("transfer", transfer_schema())
        .set("name", "alice")
        .set("amount", 2000000.0)
        .finalize_at(1234567890)
        .is_err());
}

#[test]
fn byte_slice_entry_point_length_checks() {
    let genesis = genesis_sai("user123:device456", &test_salt());
    let head = ChainHead::new(genesis);
    let schema = transfer_schema();
    let envelope = transfer_envelope(500.0);
    let id = chain_sai(&genesis, &envelope).unwrap();

    let parsed = verify_action_bytes(
        &head,
        genesis.as_bytes(),
        id.as_bytes(),
        &envelope,
        &schema,
    )
    .unwrap();
    assert_eq!(parsed.timestamp, 1234567890);

    let err = verify_action_bytes(&head, &[0u8; 31], id.as_bytes(), &envelope, &schema)
        .unwrap_err();
    assert!(matches!(err, ChainError::InvalidInput(_)));
    let err = verify_action_bytes(&head, genesis.as_bytes(), &[0u8; 33], &envelope, &schema)
        .unwrap_err();
    assert!(matches!(err, ChainError::InvalidInput(_)));
}

#[test]
fn session_admits_sequential_counters() {
    let genesis = genesis_sai("user123:device456", &test_salt());
    let k_chain = [0x42u8; 32];
    let mut session = SessionVerifier::new(k_chain, ChainHead::new(genesis));
    assert_eq!(session.state(), SessionState::Connected);
    session.sync(0, genesis);
    assert_eq!(session.state(), SessionState::Synced);
    let schema = transfer_schema();

    for counter in [1u16, 2] {
        let prev = *session.head().current();
        let envelope = transfer_envelope(500.0 + f64::from(counter));
        let gi = compute_gi(&k_chain, counter);
        let id = session_sai(&prev, &envelope, &gi).unwrap();
        session
            .verify(&prev, &id, &envelope, &schema, counter)
            .unwrap();
        assert_eq!(session.state(), SessionState::Committed);
        assert_eq!(session.counter(), counter);
    }
    assert_eq!(session.head().height(), 2);
}

#[test]
fn session_requires_sync_before_verification() {
    let genesis = genesis_sai("user123:device456", &test_salt());
    let k_chain = [0x42u8; 32];
    let mut session = SessionVerifier::new(k_chain, ChainHead::new(genesis));
    let schema = transfer_schema();

    let envelope = transfer_envelope(500.0);
    let gi = compute_gi(&k_chain, 1);
    let id = session_sai(&genesis, &envelope, &gi).unwrap();
    let err = session
        .verify(&genesis, &id, &envelope, &schema, 1)
        .unwrap_err();
    assert!(matches!(err, ChainError::InvalidInput(_)));
    assert_eq!(session.state(), SessionState::Connected);

    // The same submission is admitted once the session is synced.
    session.sync(0, genesis);
    session
        .verify(&genesis, &id, &envelope, &schema, 1)
        .unwrap();
    assert_eq!(session.state(), SessionState::Committed);
}

#[test]
fn session_rejects_counter_gaps_and_replays() {
    let genesis = genesis_sai("user123:device456", &test_salt());
    let k_chain = [0x42u8; 32];
    let mut session = SessionVerifier::new(k_chain, ChainHead::new(genesis));
    session.sync(0, genesis);
    let schema = transfer_schema();

    let prev = *session.head().current();
    let envelope = transfer_envelope(500.0);
    let gi = compute_gi(&k_chain, 3);
    let id = session_sai(&prev, &envelope, &gi).unwrap();
    let err = session
        .verify(&prev, &id, &envelope, &schema, 3)
        .unwrap_err();
    assert!(matches!(
        err,
        ChainError::InvalidCounter {
            expected: 1,
            submitted: 3
        }
    ));
    assert_eq!(session.state(), SessionState::Rejected);
    // A rejected submission must not move the counter or the head.
    assert_eq!(session.counter(), 0);
    assert_eq!(session.head().height(), 0);
}

#[test]
fn session_counter_overflow_requires_rekey() {
    let genesis = genesis_sai("user123:device456", &test_salt());
    let k_chain = [0x42u8; 32];
    let mut session = SessionVerifier::new(k_chain, ChainHead::new(genesis));
    session.sync(u16::MAX, genesis);
    let schema = transfer_schema();

    let prev = *session.head().current();
    let envelope = transfer_envelope(500.0);
    let gi = compute_gi(&k_chain, 0);
    let id = session_sai(&prev, &envelope, &gi).unwrap();
    let err = session.verify(&prev, &id, &envelope, &schema, 0).unwrap_err();
    assert!(matches!(err, ChainError::CounterOverflow));
}

#[test]
fn session_and_chain_identifiers_are_domain_separated() {
    let prev = genesis_sai("user123:device456", &test_salt());
    let envelope = transfer_envelope(500.0);
    let plain = chain_sai(&prev, &envelope).unwrap();
    let gi = compute_gi(&[0x42u8; 32], 1);
    let bound = session_sai(&prev, &envelope, &gi).unwrap();
    assert_ne!(plain, bound);

    // Different keys and different counters each move the identifier.
    let other_key = session_sai(&prev, &envelope, &compute_gi(&[0x43u8; 32], 1)).unwrap();
    let other_slot = session_sai(&prev, &envelope, &compute_gi(&[0x42u8; 32], 2)).unwrap();
    assert_ne!(bound, other_key);
    assert_ne!(bound, other_slot);
}

#[test]
fn rederiving_links_from_genesis_detects_tampering() {
    let genesis = genesis_sai("user123:device456", &test_salt());
    let mut links = Vec::new();
    let mut prev = genesis;
    for amount in [500.0, 501.0, 502.0] {
        let envelope_bytes = transfer_envelope(amount);
        let id = chain_sai(&prev, &envelope_bytes).unwrap();
        links.push(ChainLink {
            prev,
            envelope_bytes,
            id,
        });
        prev = id;
    }

    let rederives = |links: &[ChainLink]| -> bool {
        let mut cursor = genesis;
        for link in links {
            if link.prev != cursor || chain_sai(&cursor, &link.envelope_bytes).unwrap() != link.id
            {
                return false;
            }
            cursor = link.id;
        }
        true
    };
    assert!(rederives(&links));

    // Editing a middle envelope breaks rederivation at that link.
    let mut edited = links.clone();
    edited[1].envelope_bytes = transfer_envelope(999.0);
    assert!(!rederives(&edited));

    // So does dropping or reordering a link.
    let mut dropped = links.clone();
    dropped.remove(1);
    assert!(!rederives(&dropped));
    let mut reordered = links.clone();
    reordered.swap(1, 2);
    assert!(!rederives(&reordered));
}

struct MacSigner {
    key: [u8; 32],
}

impl EnvelopeSigner for MacSigner {
    type Error = std::convert::Infallible;

    fn sign(&self, envelope_bytes: &[u8]) -> Result<Vec<u8>, Self::Error> {
        let mut mac = Hmac::<Sha256>::new_from_slice(&self.key).unwrap();
        mac.update(envelope_bytes);
        Ok(mac.finalize().into_bytes().to_vec())
    }

    fn key_id(&self) -> &str {
        "test-mac-key"
    }
}

#[test]
fn signatures_travel_beside_envelope_bytes() {
    let signer = MacSigner { key: [0x11; 32] };
    let envelope = transfer_envelope(500.0);
    let signature = signer.sign(&envelope).unwrap();
    assert_eq!(signer.key_id(), "test-mac-key");
    assert_eq!(signature.len(), 32);

    // Signing never alters what the identifier commits to.
    let prev = genesis_sai("user123:device456", &test_salt());
    let before = chain_sai(&prev, &envelope).unwrap();
    let after = chain_sai(&prev, &envelope).unwrap();
    assert_eq!(before, after);
}

#[test]
fn sai_parses_only_exact_hex_width() {
    let genesis = genesis_sai("user123:device456", &test_salt());
    let hex_form = genesis.to_string();
    assert_eq!(hex_form.len(), 64);
    let bytes = hex::decode(&hex_form).unwrap();
    let round = Sai::from_bytes(&bytes).unwrap();
    assert_eq!(round, genesis);
    assert!(Sai::from_bytes(&bytes[..31]).is_err());
}
