//! Property-based tests for key derivation and the tag/frame codec
//!
//! These tests check the derivation invariants for arbitrary secrets and
//! contexts: determinism, label separation, rotation one-wayness, and the
//! tag and frame round trips.

use std::collections::HashSet;

use proptest::prelude::*;
use tandem_crypto::{
    AesTagCipher, FrameCipher, KeyLabel, Secret, TAG_LENGTH, decode_tag, derive_frame_key,
    derive_key, derive_next_secret, derive_tag_key, encode_tag, frame_iv,
};

/// Strategy for arbitrary 32-byte secrets
fn arbitrary_secret() -> impl Strategy<Value = [u8; 32]> {
    any::<[u8; 32]>()
}

#[test]
fn prop_derive_key_is_deterministic() {
    proptest!(|(bytes in arbitrary_secret(), context in any::<u32>())| {
        let first = Secret::new(bytes);
        let second = Secret::new(bytes);

        for label in KeyLabel::ALL {
            let first_key = derive_key(&first, label, context);
            let second_key = derive_key(&second, label, context);

            // PROPERTY: Same (secret, label, context) always yields the same key
            prop_assert_eq!(first_key.as_bytes(), second_key.as_bytes());
        }
    });
}

#[test]
fn prop_labels_never_collide() {
    proptest!(|(bytes in arbitrary_secret(), context in any::<u32>())| {
        let secret = Secret::new(bytes);

        let keys: HashSet<[u8; 32]> = KeyLabel::ALL
            .iter()
            .map(|&label| *derive_key(&secret, label, context).as_bytes())
            .collect();

        // PROPERTY: Six labels give six distinct keys
        prop_assert_eq!(keys.len(), KeyLabel::ALL.len());
    });
}

#[test]
fn prop_frame_keys_reproducible() {
    proptest!(|(
        bytes in arbitrary_secret(),
        connection in any::<u32>(),
        alice in any::<bool>(),
        initiator in any::<bool>()
    )| {
        let secret = Secret::new(bytes);
        let connection = u64::from(connection);

        let first = derive_frame_key(&secret, connection, alice, initiator).unwrap();
        let second = derive_frame_key(&secret, connection, alice, initiator).unwrap();

        // PROPERTY: Two invocations produce byte-identical frame keys
        prop_assert_eq!(first.as_bytes(), second.as_bytes());
    });
}

#[test]
fn prop_rotation_never_revisits_earlier_secret() {
    proptest!(|(bytes in arbitrary_secret(), periods in 1usize..16)| {
        let mut secret = Secret::new(bytes);
        let mut seen = HashSet::new();
        seen.insert(*secret.as_bytes());

        for period in 0..periods as u64 {
            secret.rotate(period).unwrap();

            // PROPERTY: Every rotated secret is fresh
            prop_assert!(seen.insert(*secret.as_bytes()));
        }
    });
}

#[test]
fn prop_rotation_not_undone_by_reapplication() {
    proptest!(|(bytes in arbitrary_secret(), period in any::<u32>())| {
        let root = Secret::new(bytes);
        let next = derive_next_secret(&root, u64::from(period)).unwrap();

        // PROPERTY: Rotating the later secret does not lead back to the root,
        // for the same period or the one before it
        let again = derive_next_secret(&next, u64::from(period)).unwrap();
        prop_assert_ne!(again.as_bytes(), root.as_bytes());

        if let Some(previous) = period.checked_sub(1) {
            let back = derive_next_secret(&next, u64::from(previous)).unwrap();
            prop_assert_ne!(back.as_bytes(), root.as_bytes());
        }
    });
}

#[test]
fn prop_tag_roundtrip() {
    proptest!(|(bytes in arbitrary_secret(), connection in any::<u32>(), alice in any::<bool>())| {
        let key = derive_tag_key(&Secret::new(bytes), alice);
        let mut tag = [0u8; TAG_LENGTH];

        encode_tag(&mut tag, &AesTagCipher, &key, u64::from(connection)).unwrap();

        // PROPERTY: Decoding with the same key recovers the connection number
        prop_assert_eq!(decode_tag(&tag, &AesTagCipher, &key).unwrap(), Some(connection));
    });
}

#[test]
fn prop_tag_wrong_key_not_recognized() {
    proptest!(|(bytes in arbitrary_secret(), connection in any::<u32>())| {
        let secret = Secret::new(bytes);
        let ours = derive_tag_key(&secret, true);
        let theirs = derive_tag_key(&secret, false);
        let mut tag = [0u8; TAG_LENGTH];

        encode_tag(&mut tag, &AesTagCipher, &ours, u64::from(connection)).unwrap();

        // PROPERTY: The other side's tag key does not recognize our tag
        prop_assert_eq!(decode_tag(&tag, &AesTagCipher, &theirs).unwrap(), None);
    });
}

#[test]
fn prop_frame_roundtrip() {
    proptest!(|(
        bytes in arbitrary_secret(),
        frame_number in any::<u32>(),
        aad in prop::collection::vec(any::<u8>(), 0..64),
        plaintext in prop::collection::vec(any::<u8>(), 0..1024)
    )| {
        let key = derive_frame_key(&Secret::new(bytes), 0, true, false).unwrap();
        let cipher = FrameCipher::new(&key);
        let iv = frame_iv(u64::from(frame_number)).unwrap();

        let sealed = cipher.encrypt(&iv, &aad, &plaintext);

        // PROPERTY: Opening with the same key, IV and AAD returns the plaintext
        prop_assert_eq!(cipher.decrypt(&iv, &aad, &sealed).unwrap(), plaintext);
    });
}
