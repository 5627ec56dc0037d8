//! Tandem Protocol Records
//!
//! Canonical binary encoding and the records built on it: authors, groups
//! and signed, content-addressed messages.
//!
//! # Architecture
//!
//! - Writer: struct-tagged big-endian encoder with attachable consumers
//! - Consumers: counting, digesting and signing observers of the byte stream
//! - Factories: build authors, groups and messages in a single pass
//! - Verifier: parses received messages and checks signatures and identities
//!
//! Building a message attaches a counter and a digest, then one signer per
//! present key. Each signer is detached right before its signature is
//! written, and the digest only after both signatures, so a message id
//! always covers its signatures.
//!
//! # Security
//!
//! - Identities are digests of the exact bytes, never assigned
//! - Argument errors are reported before any byte is written
//! - Parsing bounds every length before reading

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod author;
pub mod consumer;
pub mod env;
pub mod errors;
pub mod group;
pub mod ids;
pub mod message;
pub mod reader;
pub mod types;
pub mod verifier;
pub mod writer;

pub use author::{Author, AuthorFactory};
pub use consumer::{
    Consumer, ConsumerHandle, CountingConsumer, DigestingConsumer, SigningConsumer, Sink,
};
pub use env::{Environment, SystemEnv};
pub use errors::{ProtocolError, Result};
pub use group::{Group, GroupFactory};
pub use ids::{AuthorId, GroupId, MessageId, UNIQUE_ID_LENGTH};
pub use message::{Message, MessageFactory};
pub use reader::Reader;
pub use types::{
    MAX_AUTHOR_NAME_LENGTH, MAX_BODY_LENGTH, MAX_GROUP_NAME_LENGTH, MAX_PACKET_LENGTH,
    MAX_PUBLIC_KEY_LENGTH, MAX_SIGNATURE_LENGTH, MAX_SUBJECT_LENGTH, MessageLimits, SALT_LENGTH,
    StructId,
};
pub use verifier::MessageVerifier;
pub use writer::Writer;
