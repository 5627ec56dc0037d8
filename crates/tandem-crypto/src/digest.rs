//! Message digest used for identities and key derivation
//!
//! SHA-384 applied twice, `h(h(m))`, so that digests are not open to length
//! extension.

use sha2::{Digest, Sha384};

use crate::secret::SECRET_KEY_BYTES;

/// Digest output length (48 bytes)
pub const DIGEST_LENGTH: usize = 48;

// The concatenation KDF truncates a digest to a secret, so a shorter digest
// would leave the backend unusable.
const _: () = assert!(DIGEST_LENGTH >= SECRET_KEY_BYTES);

/// Incremental double SHA-384.
#[derive(Clone, Default)]
pub struct MessageDigest {
    inner: Sha384,
}

impl MessageDigest {
    /// Create an empty digest.
    pub fn new() -> Self {
        Self::default()
    }

    /// Absorb more input.
    pub fn update(&mut self, data: &[u8]) {
        self.inner.update(data);
    }

    /// Finish and return the 48-byte digest.
    pub fn finalize(self) -> [u8; DIGEST_LENGTH] {
        let first = self.inner.finalize();
        let second = Sha384::digest(first);
        let mut out = [0u8; DIGEST_LENGTH];
        out.copy_from_slice(&second);
        out
    }

    /// Digest a single buffer.
    pub fn digest(data: &[u8]) -> [u8; DIGEST_LENGTH] {
        let mut digest = Self::new();
        digest.update(data);
        digest.finalize()
    }
}
