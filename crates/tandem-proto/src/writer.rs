//! Canonical encoder
//!
//! Writes the struct-tagged binary encoding into an in-memory buffer. Every
//! byte passes through the attached consumers before it reaches the buffer,
//! so counting, hashing and signing happen in the same single pass as
//! serialization.

use std::{
    marker::PhantomData,
    sync::atomic::{AtomicU64, Ordering},
};

use bytes::{BufMut, Bytes, BytesMut};

use crate::{
    consumer::{Consumer, ConsumerHandle, Sink},
    errors::{ProtocolError, Result},
    types::{StructId, tag},
};

/// Lengths of strings below this use the one-byte short form
const SHORT_LENGTH_LIMIT: usize = 16;

/// Source of writer ids; handles carry the id of the writer that issued them
static NEXT_WRITER_ID: AtomicU64 = AtomicU64::new(0);

/// Canonical encoder with attachable consumers.
///
/// # Invariants
///
/// - A consumer sees exactly the bytes written between its attach and its
///   detach, in order
/// - Slots are never reused, so a handle always names the consumer it was
///   issued for
/// - A handle is only honoured by the writer that issued it
pub struct Writer {
    id: u64,
    out: BytesMut,
    consumers: Vec<Option<Consumer>>,
}

impl Default for Writer {
    fn default() -> Self {
        Self::new()
    }
}

impl Writer {
    /// Empty writer with no consumers.
    pub fn new() -> Self {
        Self {
            id: NEXT_WRITER_ID.fetch_add(1, Ordering::Relaxed),
            out: BytesMut::new(),
            consumers: Vec::new(),
        }
    }

    /// Attach a consumer; it sees every byte written from now on.
    pub fn attach<T: Sink>(&mut self, consumer: T) -> ConsumerHandle<T> {
        self.consumers.push(Some(consumer.into()));
        ConsumerHandle { writer: self.id, index: self.consumers.len() - 1, _kind: PhantomData }
    }

    /// Detach a consumer and hand it back.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` if the handle was issued by another writer
    pub fn detach<T: Sink>(&mut self, handle: ConsumerHandle<T>) -> Result<T> {
        self.check_owner(handle.writer)?;
        self.consumers
            .get_mut(handle.index)
            .and_then(Option::take)
            .and_then(T::from_consumer)
            .ok_or(ProtocolError::InvalidArgument {
                reason: "consumer handle does not belong to this writer",
            })
    }

    /// Borrow an attached consumer, e.g. to read a running count.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` if the handle was issued by another writer
    pub fn consumer<T: Sink>(&self, handle: &ConsumerHandle<T>) -> Result<&T> {
        self.check_owner(handle.writer)?;
        self.consumers
            .get(handle.index)
            .and_then(Option::as_ref)
            .and_then(T::from_consumer_ref)
            .ok_or(ProtocolError::InvalidArgument {
                reason: "consumer handle does not belong to this writer",
            })
    }

    /// Bytes written so far.
    pub fn len(&self) -> usize {
        self.out.len()
    }

    /// Whether nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.out.is_empty()
    }

    /// Finish writing and return the encoded bytes.
    ///
    /// Consumers still attached are dropped.
    pub fn into_bytes(self) -> Bytes {
        self.out.freeze()
    }

    /// Write an absent value.
    pub fn write_null(&mut self) -> Result<()> {
        self.put(&[tag::NULL])
    }

    /// Write the start of a struct.
    pub fn write_struct_id(&mut self, id: StructId) -> Result<()> {
        let id = id.to_u8();
        if id < 32 {
            self.put(&[tag::SHORT_STRUCT | id])
        } else {
            self.put(&[tag::STRUCT, id])
        }
    }

    /// Write a full-width 64-bit integer.
    pub fn write_int64(&mut self, value: i64) -> Result<()> {
        let mut buf = [0u8; 9];
        buf[0] = tag::INT64;
        buf[1..].copy_from_slice(&value.to_be_bytes());
        self.put(&buf)
    }

    /// Write a UTF-8 string.
    pub fn write_string(&mut self, value: &str) -> Result<()> {
        let bytes = value.as_bytes();
        if bytes.len() < SHORT_LENGTH_LIMIT {
            self.put(&[tag::SHORT_STRING | bytes.len() as u8])?;
        } else {
            self.put(&[tag::STRING])?;
            self.write_length(bytes.len())?;
        }
        self.put(bytes)
    }

    /// Write a byte string.
    pub fn write_bytes(&mut self, value: &[u8]) -> Result<()> {
        if value.len() < SHORT_LENGTH_LIMIT {
            self.put(&[tag::SHORT_BYTES | value.len() as u8])?;
        } else {
            self.put(&[tag::BYTES])?;
            self.write_length(value.len())?;
        }
        self.put(value)
    }

    /// Lengths use the smallest integer form that holds them.
    fn write_length(&mut self, len: usize) -> Result<()> {
        if len <= usize::from(tag::MAX_INLINE_INT) {
            self.put(&[len as u8])
        } else if let Ok(len) = i16::try_from(len) {
            let [a, b] = len.to_be_bytes();
            self.put(&[tag::INT16, a, b])
        } else if let Ok(len) = i32::try_from(len) {
            let [a, b, c, d] = len.to_be_bytes();
            self.put(&[tag::INT32, a, b, c, d])
        } else {
            self.write_int64(len as i64)
        }
    }

    fn check_owner(&self, writer: u64) -> Result<()> {
        if writer != self.id {
            return Err(ProtocolError::InvalidArgument {
                reason: "consumer handle does not belong to this writer",
            });
        }
        Ok(())
    }

    fn put(&mut self, bytes: &[u8]) -> Result<()> {
        for consumer in self.consumers.iter_mut().flatten() {
            consumer.write(bytes)?;
        }
        self.out.put_slice(bytes);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consumer::{CountingConsumer, DigestingConsumer};

    fn encode(f: impl FnOnce(&mut Writer) -> Result<()>) -> Vec<u8> {
        let mut writer = Writer::new();
        f(&mut writer).unwrap();
        writer.into_bytes().to_vec()
    }

    #[test]
    fn scalar_encodings() {
        assert_eq!(encode(Writer::write_null), [0xF2]);
        assert_eq!(encode(|w| w.write_struct_id(StructId::Message)), [0xC4]);
        assert_eq!(
            encode(|w| w.write_int64(0x0102_0304_0506_0708)),
            [0xFA, 1, 2, 3, 4, 5, 6, 7, 8]
        );
        assert_eq!(encode(|w| w.write_int64(-1)), [0xFA, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF]);
    }

    #[test]
    fn short_and_long_strings() {
        assert_eq!(encode(|w| w.write_string("")), [0x80]);
        assert_eq!(encode(|w| w.write_string("abc")), [0x83, b'a', b'b', b'c']);

        let fifteen = "a".repeat(15);
        assert_eq!(encode(|w| w.write_string(&fifteen))[0], 0x8F);

        let sixteen = "a".repeat(16);
        assert_eq!(encode(|w| w.write_string(&sixteen))[..2], [0xF7, 16]);
    }

    #[test]
    fn length_forms() {
        assert_eq!(encode(|w| w.write_bytes(&[0u8; 127]))[..2], [0xF6, 0x7F]);
        assert_eq!(encode(|w| w.write_bytes(&[0u8; 128]))[..4], [0xF6, 0xFC, 0x00, 0x80]);
        assert_eq!(encode(|w| w.write_bytes(&[0u8; 40_000]))[..6], [0xF6, 0xFB, 0x00, 0x00, 0x9C, 0x40]);
        assert_eq!(encode(|w| w.write_bytes(&[1, 2]))[..], [0x92, 1, 2]);
    }

    #[test]
    fn consumer_sees_only_attached_span() {
        let mut writer = Writer::new();
        writer.write_null().unwrap();

        let counting = writer.attach(CountingConsumer::new(100));
        writer.write_string("abc").unwrap();
        assert_eq!(writer.consumer(&counting).unwrap().count(), 4);
        let counting = writer.detach(counting).unwrap();

        writer.write_null().unwrap();

        assert_eq!(counting.count(), 4);
        assert_eq!(writer.len(), 6);
    }

    #[test]
    fn digest_covers_written_bytes() {
        let mut writer = Writer::new();
        let digesting = writer.attach(DigestingConsumer::new());
        writer.write_bytes(b"hello").unwrap();
        let digest = writer.detach(digesting).unwrap().finalize();

        let raw = writer.into_bytes();
        assert_eq!(digest, tandem_crypto::MessageDigest::digest(&raw));
    }

    #[test]
    fn counting_limit_stops_writes() {
        let mut writer = Writer::new();
        let _counting = writer.attach(CountingConsumer::new(3));

        let err = writer.write_bytes(b"four").unwrap_err();
        assert_eq!(err, ProtocolError::PacketTooLarge { size: 5, max: 3 });
    }

    #[test]
    fn foreign_handle_rejected() {
        let mut ours = Writer::new();
        let mut theirs = Writer::new();
        let _first = theirs.attach(CountingConsumer::new(1));
        let handle = theirs.attach(DigestingConsumer::new());

        assert!(matches!(ours.detach(handle), Err(ProtocolError::InvalidArgument { .. })));
    }

    #[test]
    fn foreign_handle_with_matching_slot_rejected() {
        let mut ours = Writer::new();
        let own = ours.attach(CountingConsumer::new(100));
        ours.write_null().unwrap();

        // Same slot index and same consumer kind, issued by another writer
        let mut theirs = Writer::new();
        let foreign = theirs.attach(CountingConsumer::new(100));

        assert!(matches!(ours.consumer(&foreign), Err(ProtocolError::InvalidArgument { .. })));
        assert!(matches!(ours.detach(foreign), Err(ProtocolError::InvalidArgument { .. })));

        // Our own consumer is still attached and saw our byte
        assert_eq!(ours.detach(own).unwrap().count(), 1);
    }
}
