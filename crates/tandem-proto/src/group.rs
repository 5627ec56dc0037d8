//! Groups: a named message board, optionally restricted by a public key
//!
//! A group with a public key only accepts messages signed by the matching
//! private key. A group without one is open to anyone.

use tracing::debug;

use crate::{
    consumer::DigestingConsumer,
    errors::{ProtocolError, Result},
    ids::GroupId,
    types::{MessageLimits, StructId},
    writer::Writer,
};

/// Group that messages can be posted to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    id: GroupId,
    name: String,
    public_key: Option<Vec<u8>>,
}

impl Group {
    /// Content-addressed identity.
    pub fn id(&self) -> GroupId {
        self.id
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Encoded public key of a restricted group.
    pub fn public_key(&self) -> Option<&[u8]> {
        self.public_key.as_deref()
    }

    /// Whether posts must carry a group signature.
    pub fn is_restricted(&self) -> bool {
        self.public_key.is_some()
    }
}

/// Builds [`Group`] records.
#[derive(Debug, Clone, Copy, Default)]
pub struct GroupFactory {
    limits: MessageLimits,
}

impl GroupFactory {
    /// Factory enforcing `limits`.
    pub fn new(limits: MessageLimits) -> Self {
        Self { limits }
    }

    /// Create a group; pass a public key to restrict posting.
    ///
    /// # Errors
    ///
    /// - `NameTooLong` / `PublicKeyTooLong` if an input exceeds its limit
    pub fn create_group(&self, name: &str, public_key: Option<&[u8]>) -> Result<Group> {
        check_group(&self.limits, name, public_key)?;

        let mut writer = Writer::new();
        let digesting = writer.attach(DigestingConsumer::new());
        write_group(&mut writer, name, public_key)?;
        let id = GroupId::new(writer.detach(digesting)?.finalize());

        debug!(%id, restricted = public_key.is_some(), "created group");
        Ok(Group { id, name: name.to_owned(), public_key: public_key.map(<[u8]>::to_vec) })
    }
}

pub(crate) fn check_group(
    limits: &MessageLimits,
    name: &str,
    public_key: Option<&[u8]>,
) -> Result<()> {
    if name.len() > limits.max_group_name_length {
        return Err(ProtocolError::NameTooLong {
            len: name.len(),
            max: limits.max_group_name_length,
        });
    }
    if let Some(key) = public_key
        && key.len() > limits.max_public_key_length
    {
        return Err(ProtocolError::PublicKeyTooLong {
            len: key.len(),
            max: limits.max_public_key_length,
        });
    }
    Ok(())
}

/// `struct GROUP { string name, bytes public_key | null }`
pub(crate) fn write_group(
    writer: &mut Writer,
    name: &str,
    public_key: Option<&[u8]>,
) -> Result<()> {
    writer.write_struct_id(StructId::Group)?;
    writer.write_string(name)?;
    match public_key {
        Some(key) => writer.write_bytes(key),
        None => writer.write_null(),
    }
}

#[cfg(test)]
mod tests {
    use tandem_crypto::MessageDigest;

    use super::*;

    #[test]
    fn open_group_encoding() {
        let group = GroupFactory::default().create_group("news", None).unwrap();

        let expected = [0xC3, 0x84, b'n', b'e', b'w', b's', 0xF2];
        assert_eq!(group.id().as_bytes(), &MessageDigest::digest(&expected));
        assert!(!group.is_restricted());
    }

    #[test]
    fn key_changes_id() {
        let factory = GroupFactory::default();
        let open = factory.create_group("news", None).unwrap();
        let restricted = factory.create_group("news", Some(&[1, 2, 3])).unwrap();

        assert_ne!(open.id(), restricted.id());
        assert_eq!(restricted.public_key(), Some(&[1u8, 2, 3][..]));
    }

    #[test]
    fn name_limit_enforced() {
        let name = "g".repeat(51);
        assert_eq!(
            GroupFactory::default().create_group(&name, None),
            Err(ProtocolError::NameTooLong { len: 51, max: 50 })
        );
    }
}
