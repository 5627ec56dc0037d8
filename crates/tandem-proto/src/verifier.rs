//! Parsing and verification of received messages
//!
//! The verifier is the inverse of [`MessageFactory`](crate::MessageFactory):
//! it parses the raw encoding, checks each signature over exactly the bytes
//! its signer saw, and recomputes every identity from the bytes themselves.
//!
//! # Security
//!
//! - Every length is bounded by [`MessageLimits`] before bytes are taken
//! - A signature that does not verify is [`ProtocolError::InvalidSignature`],
//!   which is fatal
//! - A signature must be present exactly when its signer is: an authored
//!   message without an author signature is malformed, not unsigned

use bytes::Bytes;
use tandem_crypto::{CryptoError, MessageDigest, verify_signature};
use tracing::warn;

use crate::{
    errors::{ProtocolError, Result},
    ids::{AuthorId, GroupId, MessageId, UNIQUE_ID_LENGTH},
    message::Message,
    reader::Reader,
    types::{MessageLimits, SALT_LENGTH, StructId},
};

/// Checks raw messages received from peers.
#[derive(Debug, Clone, Copy, Default)]
pub struct MessageVerifier {
    limits: MessageLimits,
}

/// Public key and digest of an embedded author or group.
struct Signer<'a> {
    public_key: Option<&'a [u8]>,
    digest: [u8; UNIQUE_ID_LENGTH],
}

impl MessageVerifier {
    /// Verifier enforcing `limits`.
    pub fn new(limits: MessageLimits) -> Self {
        Self { limits }
    }

    /// Parse and verify a raw message.
    ///
    /// # Errors
    ///
    /// - `PacketTooLarge` if `raw` exceeds the packet limit
    /// - `Malformed` if `raw` is not a canonical message encoding
    /// - `InvalidSignature` if the author or group signature does not verify
    /// - `Crypto` if an embedded public key does not parse
    pub fn verify(&self, raw: Bytes) -> Result<Message> {
        let limits = &self.limits;
        if raw.len() > limits.max_packet_length {
            return Err(ProtocolError::PacketTooLarge {
                size: raw.len(),
                max: limits.max_packet_length,
            });
        }

        let mut reader = Reader::new(&raw);
        reader.read_struct_id(StructId::Message)?;

        let parent = if reader.has_null() {
            reader.read_null()?;
            None
        } else {
            let offset = reader.position();
            let bytes = reader.read_bytes(UNIQUE_ID_LENGTH)?;
            Some(MessageId::from_slice(bytes).map_err(|_| ProtocolError::Malformed {
                offset,
                reason: "parent id must be 48 bytes",
            })?)
        };

        let group = self.read_group(&mut reader, &raw)?;
        let author = self.read_author(&mut reader, &raw)?;

        let subject = reader.read_string(limits.max_subject_length)?.to_owned();

        let offset = reader.position();
        let timestamp = u64::try_from(reader.read_int64()?)
            .map_err(|_| ProtocolError::Malformed { offset, reason: "negative timestamp" })?;

        let offset = reader.position();
        if reader.read_bytes(SALT_LENGTH)?.len() != SALT_LENGTH {
            return Err(ProtocolError::Malformed { offset, reason: "salt must be 8 bytes" });
        }

        let body_length = reader.read_bytes(limits.max_body_length)?.len();
        let body_start = reader.position() - body_length;

        let author_signed_len = reader.position();
        let author_signature = self.read_signature(&mut reader)?;
        let group_signed_len = reader.position();
        let group_signature = self.read_signature(&mut reader)?;

        if !reader.is_at_end() {
            return Err(ProtocolError::Malformed {
                offset: reader.position(),
                reason: "trailing bytes",
            });
        }

        let author_key = author.as_ref().and_then(|author| author.public_key);
        check_signature(
            "author",
            author_key,
            &raw[..author_signed_len],
            author_signature,
            author_signed_len,
        )?;

        let group_key = group.as_ref().and_then(|group| group.public_key);
        check_signature(
            "group",
            group_key,
            &raw[..group_signed_len],
            group_signature,
            group_signed_len,
        )?;

        let group_id = group.map(|group| GroupId::new(group.digest));
        let author_id = author.map(|author| AuthorId::new(author.digest));

        Ok(Message {
            id: MessageId::new(MessageDigest::digest(&raw)),
            parent,
            group_id,
            author_id,
            subject,
            timestamp,
            raw,
            body_start,
            body_length,
        })
    }

    /// `null | struct GROUP { name, public_key | null }`
    fn read_group<'a>(
        &self,
        reader: &mut Reader<'a>,
        raw: &'a [u8],
    ) -> Result<Option<Signer<'a>>> {
        if reader.has_null() {
            reader.read_null()?;
            return Ok(None);
        }

        let start = reader.position();
        reader.read_struct_id(StructId::Group)?;
        reader.read_string(self.limits.max_group_name_length)?;
        let public_key = if reader.has_null() {
            reader.read_null()?;
            None
        } else {
            Some(reader.read_bytes(self.limits.max_public_key_length)?)
        };

        let digest = MessageDigest::digest(&raw[start..reader.position()]);
        Ok(Some(Signer { public_key, digest }))
    }

    /// `null | struct AUTHOR { name, public_key }`
    fn read_author<'a>(
        &self,
        reader: &mut Reader<'a>,
        raw: &'a [u8],
    ) -> Result<Option<Signer<'a>>> {
        if reader.has_null() {
            reader.read_null()?;
            return Ok(None);
        }

        let start = reader.position();
        reader.read_struct_id(StructId::Author)?;
        reader.read_string(self.limits.max_author_name_length)?;
        let public_key = reader.read_bytes(self.limits.max_public_key_length)?;

        let digest = MessageDigest::digest(&raw[start..reader.position()]);
        Ok(Some(Signer { public_key: Some(public_key), digest }))
    }

    fn read_signature<'a>(&self, reader: &mut Reader<'a>) -> Result<Option<&'a [u8]>> {
        if reader.has_null() {
            reader.read_null()?;
            return Ok(None);
        }
        Ok(Some(reader.read_bytes(self.limits.max_signature_length)?))
    }
}

/// A signature must be present exactly when there is a key to check it.
fn check_signature(
    signer: &'static str,
    public_key: Option<&[u8]>,
    signed: &[u8],
    signature: Option<&[u8]>,
    offset: usize,
) -> Result<()> {
    match (public_key, signature) {
        (None, None) => Ok(()),
        (Some(_), None) => {
            Err(ProtocolError::Malformed { offset, reason: "missing signature" })
        },
        (None, Some(_)) => {
            Err(ProtocolError::Malformed { offset, reason: "signature without signer" })
        },
        (Some(public_key), Some(signature)) => {
            verify_signature(public_key, signed, signature).map_err(|err| match err {
                CryptoError::InvalidSignature | CryptoError::InvalidSignatureEncoding => {
                    warn!(signer, "message signature rejected");
                    ProtocolError::InvalidSignature { signer }
                },
                other => ProtocolError::Crypto(other),
            })
        },
    }
}
