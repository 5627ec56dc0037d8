//! Error types for message construction and parsing
//!
//! Argument errors are reported before any byte is written, so a failed
//! construction never leaves a partial message behind.

use tandem_crypto::CryptoError;
use thiserror::Error;

/// Result alias for protocol operations
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Errors from building, encoding or verifying messages
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Arguments violate a construction rule (e.g. author without key)
    #[error("invalid argument: {reason}")]
    InvalidArgument {
        /// Rule that was violated
        reason: &'static str,
    },

    /// Subject exceeds the configured limit (UTF-8 bytes)
    #[error("subject too long: {len} bytes (max {max})")]
    SubjectTooLong {
        /// Encoded subject length
        len: usize,
        /// Limit
        max: usize,
    },

    /// Body exceeds the configured limit
    #[error("body too long: {len} bytes (max {max})")]
    BodyTooLong {
        /// Body length
        len: usize,
        /// Limit
        max: usize,
    },

    /// Signature exceeds the configured limit
    #[error("signature too long: {len} bytes (max {max})")]
    SignatureTooLong {
        /// Signature length
        len: usize,
        /// Limit
        max: usize,
    },

    /// Author or group name exceeds the configured limit
    #[error("name too long: {len} bytes (max {max})")]
    NameTooLong {
        /// Encoded name length
        len: usize,
        /// Limit
        max: usize,
    },

    /// Public key exceeds the configured limit
    #[error("public key too long: {len} bytes (max {max})")]
    PublicKeyTooLong {
        /// Key length
        len: usize,
        /// Limit
        max: usize,
    },

    /// Encoded packet grew past the packet limit
    #[error("packet too large: {size} bytes (max {max})")]
    PacketTooLarge {
        /// Bytes written so far
        size: usize,
        /// Limit
        max: usize,
    },

    /// Input is not a valid canonical encoding
    #[error("malformed encoding at offset {offset}: {reason}")]
    Malformed {
        /// Byte offset where parsing failed
        offset: usize,
        /// What was wrong
        reason: &'static str,
    },

    /// A message signature did not verify
    #[error("invalid {signer} signature")]
    InvalidSignature {
        /// Which signature failed ("author" or "group")
        signer: &'static str,
    },

    /// Underlying cryptographic failure
    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),
}

impl ProtocolError {
    /// Returns true if this error is fatal (security-relevant)
    ///
    /// A message failing a fatal check is rejected outright; it is never
    /// re-verified under weaker rules.
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::InvalidSignature { .. } => true,
            Self::Crypto(err) => err.is_fatal(),
            _ => false,
        }
    }
}
