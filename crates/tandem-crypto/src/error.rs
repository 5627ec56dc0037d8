//! Error types for the cryptographic core

use thiserror::Error;

/// Errors from key agreement, key derivation and tag/frame operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// Secret is not usable as a 256-bit key
    #[error("invalid secret length: expected {expected}, got {actual}")]
    InvalidSecretLength {
        /// Required secret length
        expected: usize,
        /// Length that was supplied
        actual: usize,
    },

    /// KDF label leaves no room for the context and block counter
    #[error("label too long: {len} bytes, at most {max}")]
    LabelTooLong {
        /// Label length
        len: usize,
        /// Longest label that fits
        max: usize,
    },

    /// Period, connection or frame number outside the unsigned 32-bit range,
    /// or a length that does not fit its prefix
    #[error("{what} out of range: {value}")]
    OutOfRange {
        /// Which quantity was rejected
        what: &'static str,
        /// Rejected value
        value: u64,
    },

    /// Tag buffer shorter than a tag
    #[error("invalid tag buffer: need {expected} bytes, got {actual}")]
    InvalidTagLength {
        /// Tag length
        expected: usize,
        /// Buffer length
        actual: usize,
    },

    /// Cipher did not process exactly the expected number of bytes
    #[error("cipher misconfigured: processed {actual} bytes, expected {expected}")]
    CipherMisconfigured {
        /// Bytes that should have been processed
        expected: usize,
        /// Bytes the cipher reported
        actual: usize,
    },

    /// Public key bytes could not be decoded
    #[error("invalid public key: {reason}")]
    InvalidPublicKey {
        /// Why decoding failed
        reason: String,
    },

    /// Signature bytes are not a DER-encoded ECDSA signature
    #[error("invalid signature encoding")]
    InvalidSignatureEncoding,

    /// Signing backend failed to produce a signature
    #[error("signing failed")]
    SigningFailed,

    /// Signature did not verify under the given public key
    #[error("signature verification failed")]
    InvalidSignature,

    /// Domain parameters do not match the reference curve
    #[error("curve parameter mismatch: {parameter}")]
    CurveMismatch {
        /// First parameter found to differ
        parameter: &'static str,
    },

    /// AEAD authentication tag did not verify
    #[error("frame authentication failed")]
    AuthenticationFailed,
}

impl CryptoError {
    /// Returns true if this error is fatal (security-relevant)
    ///
    /// Fatal errors reject the connection or message outright. The remaining
    /// errors are argument or encoding errors the caller can correct.
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::AuthenticationFailed => true,
            Self::CurveMismatch { .. } => true,
            Self::InvalidSignature => true,
            Self::SigningFailed => true,

            Self::InvalidSecretLength { .. } => false,
            Self::LabelTooLong { .. } => false,
            Self::OutOfRange { .. } => false,
            Self::InvalidTagLength { .. } => false,
            Self::CipherMisconfigured { .. } => false,
            Self::InvalidPublicKey { .. } => false,
            Self::InvalidSignatureEncoding => false,
        }
    }
}
