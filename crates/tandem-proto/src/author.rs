//! Authors: a name bound to a signature public key

use tracing::debug;

use crate::{
    consumer::DigestingConsumer,
    errors::{ProtocolError, Result},
    ids::AuthorId,
    types::{MessageLimits, StructId},
    writer::Writer,
};

/// Pseudonymous author of messages.
///
/// The id is the digest of the encoded `(name, public_key)` pair; no
/// signature is involved, so anyone can compute it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    id: AuthorId,
    name: String,
    public_key: Vec<u8>,
}

impl Author {
    /// Content-addressed identity.
    pub fn id(&self) -> AuthorId {
        self.id
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Encoded signature public key.
    pub fn public_key(&self) -> &[u8] {
        &self.public_key
    }
}

/// Builds [`Author`] records.
#[derive(Debug, Clone, Copy, Default)]
pub struct AuthorFactory {
    limits: MessageLimits,
}

impl AuthorFactory {
    /// Factory enforcing `limits`.
    pub fn new(limits: MessageLimits) -> Self {
        Self { limits }
    }

    /// Create an author from a name and an encoded public key.
    ///
    /// Calling this twice with the same inputs yields the same id.
    ///
    /// # Errors
    ///
    /// - `NameTooLong` / `PublicKeyTooLong` if an input exceeds its limit
    pub fn create_author(&self, name: &str, public_key: &[u8]) -> Result<Author> {
        check_author(&self.limits, name, public_key)?;

        let mut writer = Writer::new();
        let digesting = writer.attach(DigestingConsumer::new());
        write_author(&mut writer, name, public_key)?;
        let id = AuthorId::new(writer.detach(digesting)?.finalize());

        debug!(%id, "created author");
        Ok(Author { id, name: name.to_owned(), public_key: public_key.to_vec() })
    }
}

pub(crate) fn check_author(limits: &MessageLimits, name: &str, public_key: &[u8]) -> Result<()> {
    if name.len() > limits.max_author_name_length {
        return Err(ProtocolError::NameTooLong {
            len: name.len(),
            max: limits.max_author_name_length,
        });
    }
    if public_key.len() > limits.max_public_key_length {
        return Err(ProtocolError::PublicKeyTooLong {
            len: public_key.len(),
            max: limits.max_public_key_length,
        });
    }
    Ok(())
}

/// `struct AUTHOR { string name, bytes public_key }`
pub(crate) fn write_author(writer: &mut Writer, name: &str, public_key: &[u8]) -> Result<()> {
    writer.write_struct_id(StructId::Author)?;
    writer.write_string(name)?;
    writer.write_bytes(public_key)
}

#[cfg(test)]
mod tests {
    use tandem_crypto::MessageDigest;

    use super::*;

    #[test]
    fn id_is_digest_of_encoding() {
        let author = AuthorFactory::default().create_author("alice", &[7u8; 49]).unwrap();

        let mut expected = vec![0xC1, 0x85];
        expected.extend_from_slice(b"alice");
        expected.extend_from_slice(&[0xF6, 49]);
        expected.extend_from_slice(&[7u8; 49]);

        assert_eq!(author.id().as_bytes(), &MessageDigest::digest(&expected));
        assert_eq!(author.name(), "alice");
        assert_eq!(author.public_key(), &[7u8; 49]);
    }

    #[test]
    fn same_inputs_same_id() {
        let factory = AuthorFactory::default();
        let first = factory.create_author("bob", &[1, 2, 3]).unwrap();
        let second = factory.create_author("bob", &[1, 2, 3]).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn different_key_different_id() {
        let factory = AuthorFactory::default();
        let first = factory.create_author("bob", &[1, 2, 3]).unwrap();
        let second = factory.create_author("bob", &[1, 2, 4]).unwrap();

        assert_ne!(first.id(), second.id());
    }

    #[test]
    fn limits_enforced() {
        let factory = AuthorFactory::default();

        let name = "n".repeat(51);
        assert_eq!(
            factory.create_author(&name, &[0]),
            Err(ProtocolError::NameTooLong { len: 51, max: 50 })
        );
        assert_eq!(
            factory.create_author("ok", &[0u8; 101]),
            Err(ProtocolError::PublicKeyTooLong { len: 101, max: 100 })
        );
    }
}
