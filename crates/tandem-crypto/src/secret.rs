//! Owned secret material that is zeroed when released
//!
//! # Security Properties
//!
//! - Zeroing: `Secret` and `ErasableKey` overwrite their bytes on drop
//! - Single owner: neither type is `Clone`, so key material is never silently
//!   duplicated
//! - Forward Secrecy: [`Secret::rotate`] overwrites the superseded secret in
//!   place

use std::fmt;

use zeroize::Zeroize;

use crate::{error::CryptoError, kdf};

/// Length of secrets and derived keys (256 bits)
pub const SECRET_KEY_BYTES: usize = 32;

/// Root secret of one established pairing.
///
/// Created once per pairing by [`kdf::derive_initial_secret`] and superseded
/// at every rotation period.
pub struct Secret {
    bytes: [u8; SECRET_KEY_BYTES],
}

impl Secret {
    /// Wrap 32 bytes of secret material.
    pub fn new(bytes: [u8; SECRET_KEY_BYTES]) -> Self {
        Self { bytes }
    }

    /// Copy secret material out of a slice.
    ///
    /// # Errors
    ///
    /// - `InvalidSecretLength` if the slice is not exactly 32 bytes
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CryptoError> {
        let bytes: [u8; SECRET_KEY_BYTES] =
            bytes.try_into().map_err(|_| CryptoError::InvalidSecretLength {
                expected: SECRET_KEY_BYTES,
                actual: bytes.len(),
            })?;
        Ok(Self { bytes })
    }

    /// Raw secret bytes.
    pub fn as_bytes(&self) -> &[u8; SECRET_KEY_BYTES] {
        &self.bytes
    }

    /// Replace this secret with the secret for `period`.
    ///
    /// The previous value is zeroed before the new one is stored, so only the
    /// ratcheted secret survives.
    ///
    /// # Errors
    ///
    /// - `OutOfRange` if `period` exceeds `u32::MAX`; the secret is unchanged
    pub fn rotate(&mut self, period: u64) -> Result<(), CryptoError> {
        let next = kdf::derive_next_secret(self, period)?;
        self.bytes.zeroize();
        self.bytes = next.bytes;
        Ok(())
    }
}

impl Drop for Secret {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(..)")
    }
}

/// Symmetric key derived from a `(secret, label, context)` triple.
///
/// Owned exclusively by the component that requested it. Dropping the key,
/// or calling [`ErasableKey::erase`], zeroes it.
pub struct ErasableKey {
    key: [u8; SECRET_KEY_BYTES],
}

impl ErasableKey {
    /// Wrap 32 bytes of key material.
    pub fn new(key: [u8; SECRET_KEY_BYTES]) -> Self {
        Self { key }
    }

    /// 32-byte AES-256 key.
    pub fn as_bytes(&self) -> &[u8; SECRET_KEY_BYTES] {
        &self.key
    }

    /// Zero the key now rather than at end of scope.
    pub fn erase(self) {
        drop(self);
    }
}

impl Drop for ErasableKey {
    fn drop(&mut self) {
        self.key.zeroize();
    }
}

impl fmt::Debug for ErasableKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ErasableKey(..)")
    }
}
