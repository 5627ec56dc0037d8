//! Frame encryption using AES-256-GCM
//!
//! Every transport frame is sealed under the frame key for its (direction,
//! connection) pair. The IV carries the frame number, so a key never sees
//! the same IV twice within a connection.
//!
//! # Security
//!
//! - A failed authentication tag is [`CryptoError::AuthenticationFailed`],
//!   which is fatal: the frame is rejected and never retried under another
//!   key

use aes_gcm::{
    Aes256Gcm, Nonce,
    aead::{Aead, KeyInit, Payload},
};
use tracing::warn;

use crate::{error::CryptoError, secret::ErasableKey};

/// Authentication tag length (16 bytes)
pub const MAC_LENGTH: usize = 16;

/// GCM IV length (12 bytes)
pub const IV_LENGTH: usize = 12;

/// Authenticated cipher keyed by one frame key.
pub struct FrameCipher {
    cipher: Aes256Gcm,
}

impl FrameCipher {
    /// Cipher ready to seal and open frames under `frame_key`.
    pub fn new(frame_key: &ErasableKey) -> Self {
        Self { cipher: Aes256Gcm::new(frame_key.as_bytes().into()) }
    }

    /// Seal `plaintext`. The output is the ciphertext followed by the
    /// 16-byte authentication tag.
    pub fn encrypt(&self, iv: &[u8; IV_LENGTH], aad: &[u8], plaintext: &[u8]) -> Vec<u8> {
        let payload = Payload { msg: plaintext, aad };
        let Ok(ciphertext) = self.cipher.encrypt(Nonce::from_slice(iv), payload) else {
            unreachable!("AES-GCM encryption cannot fail for frame-sized inputs");
        };
        ciphertext
    }

    /// Open a sealed frame.
    ///
    /// # Errors
    ///
    /// - `AuthenticationFailed` if the key, IV, AAD or ciphertext do not
    ///   match what was sealed
    pub fn decrypt(
        &self,
        iv: &[u8; IV_LENGTH],
        aad: &[u8],
        ciphertext: &[u8],
    ) -> Result<Vec<u8>, CryptoError> {
        let payload = Payload { msg: ciphertext, aad };
        self.cipher.decrypt(Nonce::from_slice(iv), payload).map_err(|_| {
            warn!(len = ciphertext.len(), "frame authentication failed");
            CryptoError::AuthenticationFailed
        })
    }
}

/// IV for `frame_number`: big-endian frame number followed by zeros.
///
/// # Errors
///
/// - `OutOfRange` if `frame_number` exceeds `u32::MAX`
pub fn frame_iv(frame_number: u64) -> Result<[u8; IV_LENGTH], CryptoError> {
    let frame_number = u32::try_from(frame_number)
        .map_err(|_| CryptoError::OutOfRange { what: "frame number", value: frame_number })?;

    let mut iv = [0u8; IV_LENGTH];
    iv[..4].copy_from_slice(&frame_number.to_be_bytes());
    Ok(iv)
}
