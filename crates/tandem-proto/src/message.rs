//! Signed, content-addressed messages
//!
//! A message is built in one forward pass over the writer. The consumers
//! attached along the way count, hash and sign the bytes as they are
//! written, so nothing is serialized twice.
//!
//! ```text
//! MESSAGE parent group author subject timestamp salt body │ author-sig │ group-sig
//! ├──────────────── author signature covers ──────────────┤
//! ├──────────────── group signature covers ──────────────────────────┤
//! ├──────────────── message id (digest) covers ─────────────────────────────────┤
//! ```

use bytes::Bytes;
use tandem_crypto::PrivateKey;
use tracing::debug;

use crate::{
    author::{self, Author},
    consumer::{CountingConsumer, DigestingConsumer, SigningConsumer},
    env::Environment,
    errors::{ProtocolError, Result},
    group::{self, Group},
    ids::{AuthorId, GroupId, MessageId},
    types::{MessageLimits, SALT_LENGTH, StructId},
    writer::Writer,
};

/// Immutable message.
///
/// # Invariants
///
/// - `id` is the digest of `raw`, signatures included
/// - `raw[body_start..body_start + body_length]` is the body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub(crate) id: MessageId,
    pub(crate) parent: Option<MessageId>,
    pub(crate) group_id: Option<GroupId>,
    pub(crate) author_id: Option<AuthorId>,
    pub(crate) subject: String,
    pub(crate) timestamp: u64,
    pub(crate) raw: Bytes,
    pub(crate) body_start: usize,
    pub(crate) body_length: usize,
}

impl Message {
    /// Content-addressed identity.
    pub fn id(&self) -> MessageId {
        self.id
    }

    /// Message this one replies to.
    pub fn parent(&self) -> Option<MessageId> {
        self.parent
    }

    /// Group the message was posted to.
    pub fn group_id(&self) -> Option<GroupId> {
        self.group_id
    }

    /// Author who signed the message.
    pub fn author_id(&self) -> Option<AuthorId> {
        self.author_id
    }

    /// Subject or content type.
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Creation time, milliseconds since the Unix epoch.
    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    /// Complete canonical encoding.
    pub fn raw(&self) -> &Bytes {
        &self.raw
    }

    /// Offset of the body within the raw encoding.
    pub fn body_start(&self) -> usize {
        self.body_start
    }

    /// Body length.
    pub fn body_length(&self) -> usize {
        self.body_length
    }

    /// The body, sharing the raw buffer.
    pub fn body(&self) -> Bytes {
        self.raw.slice(self.body_start..self.body_start + self.body_length)
    }
}

/// Builds [`Message`] records.
#[derive(Debug, Clone)]
pub struct MessageFactory<E: Environment> {
    env: E,
    limits: MessageLimits,
}

impl<E: Environment> MessageFactory<E> {
    /// Factory reading time and salts from `env` and enforcing `limits`.
    pub fn new(env: E, limits: MessageLimits) -> Self {
        Self { env, limits }
    }

    /// Build, sign and hash a message in a single pass.
    ///
    /// Every combination of absent group, author and keys is allowed, as long
    /// as an author comes with its key and a group has a key exactly when it
    /// is restricted.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` if an author and its key, or a restricted group
    ///   and its key, are not supplied together
    /// - `SubjectTooLong` / `BodyTooLong` if an input exceeds its limit
    /// - `SignatureTooLong` if a signature exceeds the limit
    /// - `PacketTooLarge` if the encoding exceeds the packet limit
    ///
    /// Argument errors are detected before any byte is written.
    #[allow(clippy::too_many_arguments)]
    pub fn create_message(
        &self,
        parent: Option<MessageId>,
        group: Option<&Group>,
        group_key: Option<&PrivateKey>,
        author: Option<&Author>,
        author_key: Option<&PrivateKey>,
        subject: &str,
        body: &[u8],
    ) -> Result<Message> {
        if author.is_some() != author_key.is_some() {
            return Err(ProtocolError::InvalidArgument {
                reason: "author and author key must be supplied together",
            });
        }
        if group.is_some_and(Group::is_restricted) != group_key.is_some() {
            return Err(ProtocolError::InvalidArgument {
                reason: "group key must be supplied exactly for a restricted group",
            });
        }
        if subject.len() > self.limits.max_subject_length {
            return Err(ProtocolError::SubjectTooLong {
                len: subject.len(),
                max: self.limits.max_subject_length,
            });
        }
        if body.len() > self.limits.max_body_length {
            return Err(ProtocolError::BodyTooLong {
                len: body.len(),
                max: self.limits.max_body_length,
            });
        }
        if let Some(group) = group {
            group::check_group(&self.limits, group.name(), group.public_key())?;
        }
        if let Some(author) = author {
            author::check_author(&self.limits, author.name(), author.public_key())?;
        }

        let mut writer = Writer::new();
        let counting = writer.attach(CountingConsumer::new(self.limits.max_packet_length));
        let digesting = writer.attach(DigestingConsumer::new());
        let author_signing = author_key.map(|key| writer.attach(SigningConsumer::new(key)));
        let group_signing = group_key.map(|key| writer.attach(SigningConsumer::new(key)));

        writer.write_struct_id(StructId::Message)?;
        match parent {
            Some(parent) => writer.write_bytes(parent.as_bytes())?,
            None => writer.write_null()?,
        }
        match group {
            Some(group) => group::write_group(&mut writer, group.name(), group.public_key())?,
            None => writer.write_null()?,
        }
        match author {
            Some(author) => author::write_author(&mut writer, author.name(), author.public_key())?,
            None => writer.write_null()?,
        }
        writer.write_string(subject)?;
        let timestamp = self.env.current_time_millis();
        writer.write_int64(timestamp as i64)?;
        let mut salt = [0u8; SALT_LENGTH];
        self.env.random_bytes(&mut salt);
        writer.write_bytes(&salt)?;
        writer.write_bytes(body)?;
        let body_start = writer.consumer(&counting)?.count() - body.len();

        // Each signer is detached before its signature is written, so the
        // group signature covers the author signature and the digest covers
        // both.
        match author_signing {
            Some(handle) => {
                let signature = writer.detach(handle)?.sign()?;
                self.check_signature(&signature)?;
                writer.write_bytes(&signature)?;
            },
            None => writer.write_null()?,
        }
        match group_signing {
            Some(handle) => {
                let signature = writer.detach(handle)?.sign()?;
                self.check_signature(&signature)?;
                writer.write_bytes(&signature)?;
            },
            None => writer.write_null()?,
        }

        let id = MessageId::new(writer.detach(digesting)?.finalize());
        let counted = writer.detach(counting)?.count();
        let raw = writer.into_bytes();
        debug_assert_eq!(counted, raw.len());

        debug!(
            %id,
            len = raw.len(),
            authored = author.is_some(),
            group_signed = group_key.is_some(),
            "created message"
        );

        Ok(Message {
            id,
            parent,
            group_id: group.map(Group::id),
            author_id: author.map(Author::id),
            subject: subject.to_owned(),
            timestamp,
            raw,
            body_start,
            body_length: body.len(),
        })
    }

    fn check_signature(&self, signature: &[u8]) -> Result<()> {
        if signature.len() > self.limits.max_signature_length {
            return Err(ProtocolError::SignatureTooLong {
                len: signature.len(),
                max: self.limits.max_signature_length,
            });
        }
        Ok(())
    }
}
