//! Fuzz target for key derivation and the tag/frame codec
//!
//! # Strategy
//!
//! - Arbitrary secrets (wrong lengths included) and labels
//! - Boundary periods and connection numbers (0, u32::MAX, beyond)
//! - Tag round trips and frame seal/open with corrupted ciphertext
//!
//! # Invariants
//!
//! - Derivation is deterministic (same inputs → same output)
//! - Out-of-range inputs return errors, never panic
//! - Tag decode recovers the encoded connection number
//! - Corrupted frames fail authentication

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use tandem_crypto::{
    counter_mode_kdf, decode_tag, derive_frame_key, derive_next_secret, derive_tag_key,
    encode_tag, frame_iv, AesTagCipher, CryptoError, FrameCipher, Secret, TAG_LENGTH,
};

#[derive(Debug, Clone, Arbitrary)]
struct DerivationScenario {
    /// Raw secret bytes (any length)
    secret: Vec<u8>,
    /// KDF label (any length)
    label: Vec<u8>,
    /// Counter-mode context
    context: u32,
    /// Rotation period (may exceed u32)
    period: u64,
    /// Connection number (may exceed u32)
    connection: u64,
    /// Role flags
    alice: bool,
    initiator: bool,
    /// Frame payload and corruption position
    payload: Vec<u8>,
    corrupt_at: u16,
}

fuzz_target!(|scenario: DerivationScenario| {
    let first = counter_mode_kdf(&scenario.secret, &scenario.label, scenario.context);
    let second = counter_mode_kdf(&scenario.secret, &scenario.label, scenario.context);
    assert_eq!(first, second);

    match &first {
        Err(CryptoError::InvalidSecretLength { .. }) => assert_ne!(scenario.secret.len(), 32),
        Err(CryptoError::LabelTooLong { .. }) => assert!(scenario.label.len() + 4 >= 16),
        Err(other) => panic!("unexpected KDF error: {other}"),
        Ok(_) => {}
    }

    let Ok(secret) = Secret::from_slice(&scenario.secret) else {
        return;
    };

    let next = derive_next_secret(&secret, scenario.period);
    assert_eq!(next.is_ok(), scenario.period <= u64::from(u32::MAX));

    let tag_key = derive_tag_key(&secret, scenario.alice);
    let mut tag = [0u8; TAG_LENGTH];
    match encode_tag(&mut tag, &AesTagCipher, &tag_key, scenario.connection) {
        Ok(()) => {
            let decoded = decode_tag(&tag, &AesTagCipher, &tag_key).ok().flatten();
            assert_eq!(decoded.map(u64::from), Some(scenario.connection));
        }
        Err(err) => assert!(matches!(err, CryptoError::OutOfRange { .. })),
    }

    let Ok(frame_key) =
        derive_frame_key(&secret, scenario.connection, scenario.alice, scenario.initiator)
    else {
        return;
    };
    let cipher = FrameCipher::new(&frame_key);
    let Ok(iv) = frame_iv(u64::from(scenario.context)) else {
        return;
    };

    let mut sealed = cipher.encrypt(&iv, &tag, &scenario.payload);
    assert_eq!(cipher.decrypt(&iv, &tag, &sealed).ok().as_deref(), Some(&scenario.payload[..]));

    let index = usize::from(scenario.corrupt_at) % sealed.len();
    sealed[index] ^= 0x80;
    assert_eq!(cipher.decrypt(&iv, &tag, &sealed), Err(CryptoError::AuthenticationFailed));
});
