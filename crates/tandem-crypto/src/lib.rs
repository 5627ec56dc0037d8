//! Tandem Cryptographic Core
//!
//! Key agreement, key derivation and symmetric encryption for a pair of
//! devices. Derivations are pure functions of their inputs; callers provide
//! the random source so tests can run deterministically.
//!
//! # Key Lifecycle
//!
//! Two devices pair by exchanging agreement public keys. Each derives the
//! same initial secret, then per-purpose keys from it. The secret is rotated
//! once per period, and everything below it is re-derived.
//!
//! ```text
//! ECDH (P-384) raw secret
//!        │
//!        ▼
//! Concatenation KDF → Secret (period 0)
//!        │                 │
//!        │                 ├─▶ Tag keys (A, B)         → connection tags
//!        │                 ├─▶ Frame keys (per conn.)  → AES-256-GCM frames
//!        │                 └─▶ Confirmation codes
//!        ▼
//! Counter-mode KDF ("ROTATE", period) → Secret (period 1) → ...
//! ```
//!
//! # Security
//!
//! Forward Secrecy:
//! - Rotation is one-way: a later secret does not reveal an earlier one
//! - Superseded secrets are overwritten in place ([`Secret::rotate`])
//! - Derived keys are zeroed when dropped ([`ErasableKey`])
//!
//! Role Separation:
//! - Six distinct labels partition tag and frame keys by side and initiator
//! - Both peers compute matching keys without exchanging them
//!
//! Authenticity:
//! - AES-256-GCM frames; a failed tag rejects the frame
//! - Every generated or parsed public key is checked against the reference
//!   P-384 parameters

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod codes;
pub mod curve;
pub mod digest;
pub mod error;
pub mod frame;
pub mod invitation;
pub mod kdf;
pub mod keys;
pub mod pseudo_random;
pub mod secret;
pub mod tag;

pub use codes::{CODE_BITS, derive_confirmation_codes, generate_invitation_code, read_uint};
pub use curve::check_reference_curve;
pub use digest::{DIGEST_LENGTH, MessageDigest};
pub use error::CryptoError;
pub use frame::{FrameCipher, IV_LENGTH, MAC_LENGTH, frame_iv};
pub use invitation::InvitationState;
pub use kdf::{
    KeyLabel, concatenation_kdf, counter_mode_kdf, derive_frame_key, derive_initial_secret,
    derive_key, derive_next_secret, derive_tag_key,
};
pub use keys::{
    AgreementKeyPair, MAX_SIGNATURE_BYTES, PUBLIC_KEY_BYTES, PrivateKey, SignatureKeyPair, Signer,
    encode_public_key, generate_agreement_key_pair, generate_signature_key_pair,
    parse_public_key, sign, verify_signature,
};
pub use p384::PublicKey;
pub use pseudo_random::PseudoRandom;
pub use secret::{ErasableKey, SECRET_KEY_BYTES, Secret};
pub use tag::{AesTagCipher, TAG_LENGTH, TagCipher, decode_tag, encode_tag};
