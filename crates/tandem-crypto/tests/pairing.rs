//! End-to-end pairing between two simulated devices
//!
//! Both devices generate agreement keys, derive the initial secret from each
//! other's public key, and then check that every derived artifact lines up:
//! confirmation codes, tag keys across sides, and frame keys per direction.

use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use tandem_crypto::{
    AesTagCipher, FrameCipher, InvitationState, PseudoRandom, TAG_LENGTH, decode_tag,
    derive_confirmation_codes, derive_frame_key, derive_initial_secret, derive_tag_key,
    encode_tag, frame_iv, generate_agreement_key_pair, generate_invitation_code,
};

#[test]
fn two_devices_pair_and_exchange_a_frame() {
    let mut rng = ChaCha20Rng::seed_from_u64(2024);

    let alice_code = generate_invitation_code(&mut rng);
    let bob_code = generate_invitation_code(&mut rng);

    // Both sides seed the shared stream the same way
    let alice_stream = PseudoRandom::new(alice_code, bob_code).next_bytes(32);
    let bob_stream = PseudoRandom::new(alice_code, bob_code).next_bytes(32);
    assert_eq!(alice_stream, bob_stream);

    let alice_keys = generate_agreement_key_pair(&mut rng).unwrap();
    let bob_keys = generate_agreement_key_pair(&mut rng).unwrap();

    let mut alice_secret =
        derive_initial_secret(&bob_keys.public_key_bytes(), &alice_keys, true).unwrap();
    let mut bob_secret =
        derive_initial_secret(&alice_keys.public_key_bytes(), &bob_keys, false).unwrap();

    let (alice_confirm, bob_confirm) = derive_confirmation_codes(&alice_secret);
    assert_eq!(derive_confirmation_codes(&bob_secret), (alice_confirm, bob_confirm));

    let alice_state = InvitationState::new(alice_code, bob_code)
        .with_confirmation_codes(alice_confirm, bob_confirm)
        .with_local_comparison(true)
        .with_remote_comparison(true);
    assert!(alice_state.is_confirmed());

    // Alice opens connection 3: bob recognizes it with alice's tag key
    let mut tag = [0u8; TAG_LENGTH];
    encode_tag(&mut tag, &AesTagCipher, &derive_tag_key(&alice_secret, true), 3).unwrap();
    let expected = derive_tag_key(&bob_secret, true);
    assert_eq!(decode_tag(&tag, &AesTagCipher, &expected).unwrap(), Some(3));

    // Alice seals with her initiator key, bob opens with the same derivation
    let sealing = FrameCipher::new(&derive_frame_key(&alice_secret, 3, true, true).unwrap());
    let opening = FrameCipher::new(&derive_frame_key(&bob_secret, 3, true, true).unwrap());
    let iv = frame_iv(0).unwrap();

    let sealed = sealing.encrypt(&iv, &tag, b"first frame");
    assert_eq!(opening.decrypt(&iv, &tag, &sealed).unwrap(), b"first frame");

    // After rotation both sides still agree, and old frame keys no longer match
    alice_secret.rotate(1).unwrap();
    bob_secret.rotate(1).unwrap();
    assert_eq!(alice_secret.as_bytes(), bob_secret.as_bytes());

    let rotated = FrameCipher::new(&derive_frame_key(&bob_secret, 3, true, true).unwrap());
    assert!(rotated.decrypt(&iv, &tag, &sealed).is_err());
}
