//! Key derivation: secrets to keys, and secrets to secrets
//!
//! Two KDFs are used:
//!
//! - A counter-mode KDF built on AES-256-CTR (NIST SP 800-108, section 5.1)
//!   for everything derived from an established secret: tag keys, frame
//!   keys, rotated secrets and confirmation codes.
//! - A concatenation KDF built on the message digest (NIST SP 800-56A,
//!   section 5.8) that turns the raw Diffie-Hellman output into the first
//!   secret of a pairing.
//!
//! ```text
//! ECDH raw secret
//!        │
//!        ▼ concatenation KDF ("FIRST", alice info, bob info)
//! Secret (period 0) ──▶ tag keys, frame keys, confirmation codes
//!        │
//!        ▼ counter-mode KDF ("ROTATE", period)
//! Secret (period 1) ──▶ ...
//! ```
//!
//! # Security
//!
//! - Role separation: each [`KeyLabel`] partitions the key space, so tag and
//!   frame keys for different roles never coincide
//! - Determinism: both peers compute identical keys from the same inputs
//!   without exchanging them
//! - Forward secrecy: rotation is one-way, a later secret does not reveal an
//!   earlier one

use ctr::cipher::{KeyIvInit, StreamCipher};
use tracing::debug;
use zeroize::{Zeroize, Zeroizing};

use crate::{
    digest::MessageDigest,
    error::CryptoError,
    keys::{self, AgreementKeyPair},
    secret::{ErasableKey, SECRET_KEY_BYTES, Secret},
};

type Aes256Ctr = ctr::Ctr128BE<aes::Aes256>;

/// Size of the counter block the label and context are packed into
const KEY_DERIVATION_IV_BYTES: usize = 16;

/// Size of the big-endian context field
const CONTEXT_BYTES: usize = 4;

/// Label for the first secret of a pairing
const FIRST: &[u8] = b"FIRST\0";

/// Label for secret rotation
const ROTATE: &[u8] = b"ROTATE\0";

/// Label for confirmation codes
pub(crate) const CODE: &[u8] = b"CODE\0";

/// Labels partitioning derived keys by role.
///
/// "A" and "B" are the two sides of a pairing (alice and bob); frame keys are
/// further split by which side initiated the connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyLabel {
    /// Tag key of side A
    TagA,
    /// Tag key of side B
    TagB,
    /// Frame key of side A on connections A initiated
    FrameAInitiator,
    /// Frame key of side A on connections B initiated
    FrameAResponder,
    /// Frame key of side B on connections A initiated
    FrameBInitiator,
    /// Frame key of side B on connections B initiated
    FrameBResponder,
}

impl KeyLabel {
    /// Every directional label.
    pub const ALL: [Self; 6] = [
        Self::TagA,
        Self::TagB,
        Self::FrameAInitiator,
        Self::FrameAResponder,
        Self::FrameBInitiator,
        Self::FrameBResponder,
    ];

    /// Tag label for one side.
    pub fn tag(alice: bool) -> Self {
        if alice { Self::TagA } else { Self::TagB }
    }

    /// Frame label for one side and initiator role.
    pub fn frame(alice: bool, initiator: bool) -> Self {
        match (alice, initiator) {
            (true, true) => Self::FrameAInitiator,
            (true, false) => Self::FrameAResponder,
            (false, true) => Self::FrameBInitiator,
            (false, false) => Self::FrameBResponder,
        }
    }

    /// Label bytes fed to the counter-mode KDF.
    pub fn as_bytes(self) -> &'static [u8] {
        match self {
            Self::TagA => b"A_TAG\0",
            Self::TagB => b"B_TAG\0",
            Self::FrameAInitiator => b"A_FRAME_A\0",
            Self::FrameAResponder => b"A_FRAME_B\0",
            Self::FrameBInitiator => b"B_FRAME_A\0",
            Self::FrameBResponder => b"B_FRAME_B\0",
        }
    }
}

/// Counter-mode KDF.
///
/// The initial counter block is `label || BE32(context) || zeros`; the
/// trailing zero bytes are the space the CTR counter increments through.
/// Encrypting 32 zero bytes under the secret yields the output.
///
/// # Errors
///
/// - `InvalidSecretLength` if the secret is not 32 bytes
/// - `LabelTooLong` if the label and context leave no byte for the counter
pub fn counter_mode_kdf(
    secret: &[u8],
    label: &[u8],
    context: u32,
) -> Result<[u8; SECRET_KEY_BYTES], CryptoError> {
    if secret.len() != SECRET_KEY_BYTES {
        return Err(CryptoError::InvalidSecretLength {
            expected: SECRET_KEY_BYTES,
            actual: secret.len(),
        });
    }

    if label.len() + CONTEXT_BYTES >= KEY_DERIVATION_IV_BYTES {
        return Err(CryptoError::LabelTooLong {
            len: label.len(),
            max: KEY_DERIVATION_IV_BYTES - CONTEXT_BYTES - 1,
        });
    }

    let mut iv = [0u8; KEY_DERIVATION_IV_BYTES];
    iv[..label.len()].copy_from_slice(label);
    iv[label.len()..label.len() + CONTEXT_BYTES].copy_from_slice(&context.to_be_bytes());

    let Ok(mut cipher) = Aes256Ctr::new_from_slices(secret, &iv) else {
        unreachable!("secret and IV lengths checked above");
    };

    let mut output = [0u8; SECRET_KEY_BYTES];
    cipher.apply_keystream(&mut output);
    Ok(output)
}

/// Concatenation KDF.
///
/// Hashes `len(raw) || raw || len(label) || label || len(initiator) ||
/// initiator || len(responder) || responder` (one-byte lengths) and keeps the
/// first 32 bytes of the digest.
///
/// # Errors
///
/// - `OutOfRange` if a field is longer than 255 bytes
pub fn concatenation_kdf(
    raw_secret: &[u8],
    label: &[u8],
    initiator_info: &[u8],
    responder_info: &[u8],
) -> Result<[u8; SECRET_KEY_BYTES], CryptoError> {
    let mut digest = MessageDigest::new();
    for field in [raw_secret, label, initiator_info, responder_info] {
        let len = u8::try_from(field.len()).map_err(|_| CryptoError::OutOfRange {
            what: "KDF field length",
            value: field.len() as u64,
        })?;
        digest.update(&[len]);
        digest.update(field);
    }

    let mut hash = digest.finalize();
    let mut output = [0u8; SECRET_KEY_BYTES];
    output.copy_from_slice(&hash[..SECRET_KEY_BYTES]);
    hash.zeroize();
    Ok(output)
}

/// Derive the first secret of a pairing from a key agreement.
///
/// `alice` selects which side's public-key hash is the initiator info. Both
/// peers must agree on the roles out of band; if they do not, their secrets
/// silently differ.
///
/// # Errors
///
/// - `InvalidPublicKey` / `CurveMismatch` if their public key does not parse
pub fn derive_initial_secret(
    their_public_key: &[u8],
    our_key_pair: &AgreementKeyPair,
    alice: bool,
) -> Result<Secret, CryptoError> {
    let theirs = keys::parse_public_key(their_public_key)?;

    let our_hash = MessageDigest::digest(&our_key_pair.public_key_bytes());
    let their_hash = MessageDigest::digest(their_public_key);
    let (alice_info, bob_info) =
        if alice { (&our_hash, &their_hash) } else { (&their_hash, &our_hash) };

    let raw_secret: Zeroizing<Vec<u8>> = our_key_pair.agree(&theirs);
    let cooked = concatenation_kdf(&raw_secret, FIRST, alice_info, bob_info)?;
    drop(raw_secret);

    debug!(alice, "derived initial secret");
    Ok(Secret::new(cooked))
}

/// Derive the secret for rotation `period` from the current secret.
///
/// # Errors
///
/// - `OutOfRange` if `period` exceeds `u32::MAX`
pub fn derive_next_secret(secret: &Secret, period: u64) -> Result<Secret, CryptoError> {
    let period = u32::try_from(period)
        .map_err(|_| CryptoError::OutOfRange { what: "period", value: period })?;

    let next = counter_mode_kdf(secret.as_bytes(), ROTATE, period)?;

    debug!(period, "derived next secret");
    Ok(Secret::new(next))
}

/// Derive the key for `label` and `context`.
pub fn derive_key(secret: &Secret, label: KeyLabel, context: u32) -> ErasableKey {
    let Ok(key) = counter_mode_kdf(secret.as_bytes(), label.as_bytes(), context) else {
        unreachable!("secrets are 32 bytes and every key label fits the counter block");
    };
    ErasableKey::new(key)
}

/// Derive the tag key for one side of a pairing.
pub fn derive_tag_key(secret: &Secret, alice: bool) -> ErasableKey {
    derive_key(secret, KeyLabel::tag(alice), 0)
}

/// Derive the frame key for one side, one connection and one direction.
///
/// # Errors
///
/// - `OutOfRange` if `connection` exceeds `u32::MAX`
pub fn derive_frame_key(
    secret: &Secret,
    connection: u64,
    alice: bool,
    initiator: bool,
) -> Result<ErasableKey, CryptoError> {
    let connection = u32::try_from(connection)
        .map_err(|_| CryptoError::OutOfRange { what: "connection", value: connection })?;

    Ok(derive_key(secret, KeyLabel::frame(alice, initiator), connection))
}
