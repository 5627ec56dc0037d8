//! Connection tags
//!
//! A tag is the first 16 bytes of a connection: the connection number,
//! encrypted under the sender's tag key. The receiver recognizes an incoming
//! connection by decrypting candidate tags with the tag keys it expects,
//! without any other metadata on the wire.
//!
//! ```text
//! plaintext: [ BE32 connection | 12 zero bytes ]
//! tag:       AES-256(tag key, plaintext)
//! ```

use aes::{
    Aes256, Block,
    cipher::{BlockDecrypt, BlockEncrypt, KeyInit},
};
use tracing::{debug, warn};
use zeroize::Zeroize;

use crate::{
    error::CryptoError,
    secret::{ErasableKey, SECRET_KEY_BYTES},
};

/// Tag length in bytes (one AES block)
pub const TAG_LENGTH: usize = 16;

/// Bytes of the tag holding the connection number
const CONNECTION_BYTES: usize = 4;

/// Block cipher in ECB mode without padding.
///
/// Only whole blocks are processed; implementations return how many bytes
/// they actually transformed so misconfigured ciphers can be caught.
pub trait TagCipher {
    /// Encrypt whole blocks of `data` in place under `key`.
    fn encrypt_blocks(&self, key: &[u8; SECRET_KEY_BYTES], data: &mut [u8]) -> usize;

    /// Decrypt whole blocks of `data` in place under `key`.
    fn decrypt_blocks(&self, key: &[u8; SECRET_KEY_BYTES], data: &mut [u8]) -> usize;
}

/// AES-256 tag cipher.
#[derive(Debug, Clone, Copy, Default)]
pub struct AesTagCipher;

impl TagCipher for AesTagCipher {
    fn encrypt_blocks(&self, key: &[u8; SECRET_KEY_BYTES], data: &mut [u8]) -> usize {
        let cipher = Aes256::new(key.into());
        let mut processed = 0;
        for block in data.chunks_exact_mut(TAG_LENGTH) {
            cipher.encrypt_block(Block::from_mut_slice(block));
            processed += TAG_LENGTH;
        }
        processed
    }

    fn decrypt_blocks(&self, key: &[u8; SECRET_KEY_BYTES], data: &mut [u8]) -> usize {
        let cipher = Aes256::new(key.into());
        let mut processed = 0;
        for block in data.chunks_exact_mut(TAG_LENGTH) {
            cipher.decrypt_block(Block::from_mut_slice(block));
            processed += TAG_LENGTH;
        }
        processed
    }
}

/// Write the tag for `connection` into the first 16 bytes of `tag`.
///
/// Bytes of `tag` past the first 16 are left untouched.
///
/// # Errors
///
/// - `InvalidTagLength` if `tag` is shorter than 16 bytes
/// - `OutOfRange` if `connection` exceeds `u32::MAX`
/// - `CipherMisconfigured` if the cipher did not encrypt exactly 16 bytes
pub fn encode_tag(
    tag: &mut [u8],
    cipher: &impl TagCipher,
    tag_key: &ErasableKey,
    connection: u64,
) -> Result<(), CryptoError> {
    if tag.len() < TAG_LENGTH {
        return Err(CryptoError::InvalidTagLength { expected: TAG_LENGTH, actual: tag.len() });
    }
    let connection = u32::try_from(connection)
        .map_err(|_| CryptoError::OutOfRange { what: "connection", value: connection })?;

    let block = &mut tag[..TAG_LENGTH];
    block.fill(0);
    block[..CONNECTION_BYTES].copy_from_slice(&connection.to_be_bytes());

    let processed = cipher.encrypt_blocks(tag_key.as_bytes(), block);
    if processed != TAG_LENGTH {
        // Never leave the plaintext connection number behind
        block.fill(0);
        warn!(processed, "tag cipher processed an unexpected byte count");
        return Err(CryptoError::CipherMisconfigured { expected: TAG_LENGTH, actual: processed });
    }

    Ok(())
}

/// Recover the connection number from a tag, if `tag_key` produced it.
///
/// Returns `None` when the decrypted padding is not all zero, which means the
/// tag was made under another key.
///
/// # Errors
///
/// - `InvalidTagLength` if `tag` is shorter than 16 bytes
/// - `CipherMisconfigured` if the cipher did not decrypt exactly 16 bytes
pub fn decode_tag(
    tag: &[u8],
    cipher: &impl TagCipher,
    tag_key: &ErasableKey,
) -> Result<Option<u32>, CryptoError> {
    let Some(tag) = tag.get(..TAG_LENGTH) else {
        return Err(CryptoError::InvalidTagLength { expected: TAG_LENGTH, actual: tag.len() });
    };

    let mut block = [0u8; TAG_LENGTH];
    block.copy_from_slice(tag);

    let processed = cipher.decrypt_blocks(tag_key.as_bytes(), &mut block);
    if processed != TAG_LENGTH {
        warn!(processed, "tag cipher processed an unexpected byte count");
        return Err(CryptoError::CipherMisconfigured { expected: TAG_LENGTH, actual: processed });
    }

    let recognized = block[CONNECTION_BYTES..].iter().all(|&b| b == 0);
    let mut connection_bytes = [0u8; CONNECTION_BYTES];
    connection_bytes.copy_from_slice(&block[..CONNECTION_BYTES]);
    block.zeroize();

    if !recognized {
        debug!("tag not recognized");
        return Ok(None);
    }

    Ok(Some(u32::from_be_bytes(connection_bytes)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{kdf, secret::Secret};

    fn tag_key() -> ErasableKey {
        let mut bytes = [0u8; 32];
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = i as u8;
        }
        kdf::derive_tag_key(&Secret::new(bytes), true)
    }

    /// Claims to process half a block.
    struct HalfBlockCipher;

    impl TagCipher for HalfBlockCipher {
        fn encrypt_blocks(&self, _key: &[u8; SECRET_KEY_BYTES], _data: &mut [u8]) -> usize {
            TAG_LENGTH / 2
        }

        fn decrypt_blocks(&self, _key: &[u8; SECRET_KEY_BYTES], _data: &mut [u8]) -> usize {
            TAG_LENGTH / 2
        }
    }

    #[test]
    fn known_answer() {
        let mut tag = [0xEEu8; TAG_LENGTH];
        encode_tag(&mut tag, &AesTagCipher, &tag_key(), 0x0102_0304).unwrap();
        assert_eq!(hex::encode(tag), "fd96ce8bdc64fe1d7889457c33a86950");
    }

    #[test]
    fn round_trip() {
        let key = tag_key();
        let mut tag = [0u8; TAG_LENGTH];

        encode_tag(&mut tag, &AesTagCipher, &key, 42).unwrap();

        assert_eq!(decode_tag(&tag, &AesTagCipher, &key).unwrap(), Some(42));
    }

    #[test]
    fn wrong_key_is_not_recognized() {
        let mut tag = [0u8; TAG_LENGTH];
        encode_tag(&mut tag, &AesTagCipher, &tag_key(), 42).unwrap();

        let other = kdf::derive_tag_key(&Secret::new([9u8; 32]), true);
        assert_eq!(decode_tag(&tag, &AesTagCipher, &other).unwrap(), None);
    }

    #[test]
    fn longer_buffer_keeps_trailing_bytes() {
        let mut buf = [0xAAu8; TAG_LENGTH + 4];
        encode_tag(&mut buf, &AesTagCipher, &tag_key(), 1).unwrap();

        assert_eq!(buf[TAG_LENGTH..], [0xAA; 4]);
        assert_eq!(decode_tag(&buf, &AesTagCipher, &tag_key()).unwrap(), Some(1));
    }

    #[test]
    fn short_buffer_rejected() {
        let mut tag = [0u8; TAG_LENGTH - 1];
        let result = encode_tag(&mut tag, &AesTagCipher, &tag_key(), 1);
        assert_eq!(result, Err(CryptoError::InvalidTagLength { expected: 16, actual: 15 }));

        let result = decode_tag(&tag, &AesTagCipher, &tag_key());
        assert_eq!(result, Err(CryptoError::InvalidTagLength { expected: 16, actual: 15 }));
    }

    #[test]
    fn connection_out_of_range() {
        let mut tag = [0u8; TAG_LENGTH];
        let result = encode_tag(&mut tag, &AesTagCipher, &tag_key(), 1 << 32);
        assert!(matches!(result, Err(CryptoError::OutOfRange { what: "connection", .. })));

        encode_tag(&mut tag, &AesTagCipher, &tag_key(), u64::from(u32::MAX)).unwrap();
    }

    #[test]
    fn misconfigured_cipher_detected() {
        let mut tag = [0xEEu8; TAG_LENGTH];
        let result = encode_tag(&mut tag, &HalfBlockCipher, &tag_key(), 0x0102_0304);
        assert_eq!(result, Err(CryptoError::CipherMisconfigured { expected: 16, actual: 8 }));
        assert_eq!(tag, [0u8; TAG_LENGTH]);

        let result = decode_tag(&tag, &HalfBlockCipher, &tag_key());
        assert_eq!(result, Err(CryptoError::CipherMisconfigured { expected: 16, actual: 8 }));
    }
}
