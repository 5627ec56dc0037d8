//! Property-based tests for message construction and verification
//!
//! These tests verify that every message the factory builds parses back to
//! the same record, that its identity is the digest of its raw bytes, and
//! that author identities are stable.

use bytes::Bytes;
use proptest::prelude::*;
use tandem_crypto::MessageDigest;
use tandem_proto::{
    AuthorFactory, Environment, MessageFactory, MessageId, MessageLimits, MessageVerifier,
};

#[derive(Clone)]
struct TestEnv {
    now: u64,
    salt: u8,
}

impl Environment for TestEnv {
    fn current_time_millis(&self) -> u64 {
        self.now
    }

    fn random_bytes(&self, buffer: &mut [u8]) {
        buffer.fill(self.salt);
    }
}

/// Strategy for subjects within the default limit (at most 100 UTF-8 bytes)
fn arbitrary_subject() -> impl Strategy<Value = String> {
    "\\PC{0,25}"
}

/// Strategy for optional parent ids
fn arbitrary_parent() -> impl Strategy<Value = Option<MessageId>> {
    prop::option::of(any::<[u8; 32]>().prop_map(|seed| MessageId::new(MessageDigest::digest(&seed))))
}

#[test]
fn prop_unsigned_message_roundtrip() {
    proptest!(|(
        parent in arbitrary_parent(),
        subject in arbitrary_subject(),
        body in prop::collection::vec(any::<u8>(), 0..2048),
        now in 0u64..(1 << 62),
        salt in any::<u8>()
    )| {
        let factory = MessageFactory::new(TestEnv { now, salt }, MessageLimits::default());
        let message = factory.create_message(parent, None, None, None, None, &subject, &body).unwrap();

        let id = message.id();
        let digest = MessageDigest::digest(message.raw());
        let body_bytes = message.body();

        // PROPERTY: Identity is the digest of the raw bytes
        prop_assert_eq!(id.as_bytes(), &digest);

        // PROPERTY: Body offset points at the body
        prop_assert_eq!(body_bytes.as_ref(), body.as_slice());

        // PROPERTY: Verification reproduces the record
        let verified = MessageVerifier::default().verify(message.raw().clone()).unwrap();
        prop_assert_eq!(verified, message);
    });
}

#[test]
fn prop_truncation_never_verifies() {
    proptest!(|(
        body in prop::collection::vec(any::<u8>(), 0..256),
        cut in any::<prop::sample::Index>()
    )| {
        let factory = MessageFactory::new(TestEnv { now: 1, salt: 2 }, MessageLimits::default());
        let message = factory.create_message(None, None, None, None, None, "s", &body).unwrap();
        let raw = message.raw();
        let len = cut.index(raw.len());

        // PROPERTY: No strict prefix of a message is a valid message
        prop_assert!(MessageVerifier::default().verify(Bytes::copy_from_slice(&raw[..len])).is_err());
    });
}

#[test]
fn prop_author_identity_idempotent() {
    proptest!(|(
        name in "\\PC{0,12}",
        public_key in prop::collection::vec(any::<u8>(), 0..100)
    )| {
        let factory = AuthorFactory::default();

        let first = factory.create_author(&name, &public_key).unwrap();
        let second = factory.create_author(&name, &public_key).unwrap();

        // PROPERTY: Same inputs give the same identity
        prop_assert_eq!(first.id(), second.id());
    });
}
