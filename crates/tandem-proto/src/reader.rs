//! Canonical decoder
//!
//! Parses the encoding produced by [`Writer`](crate::Writer) from untrusted
//! input. Every read is bounds-checked and every length is checked against a
//! caller-supplied maximum before any bytes are taken.
//!
//! Only the minimal form of each value is accepted. Identities are digests of
//! encoded bytes, so a second spelling of the same record would give it a
//! second id.

use crate::{
    errors::{ProtocolError, Result},
    types::{StructId, tag},
};

/// Struct ids below this must use the short form
const SHORT_STRUCT_LIMIT: u8 = 32;

/// Lengths below this must use the short string and byte string forms
const SHORT_LENGTH_LIMIT: usize = 16;

/// Cursor over an encoded buffer.
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> Reader<'a> {
    /// Start reading at the beginning of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    /// Offset of the next unread byte.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Whether every byte has been consumed.
    pub fn is_at_end(&self) -> bool {
        self.position == self.data.len()
    }

    /// Whether the next value is null.
    pub fn has_null(&self) -> bool {
        self.peek() == Some(tag::NULL)
    }

    /// Read a null.
    pub fn read_null(&mut self) -> Result<()> {
        self.expect_tag(tag::NULL, "expected null")
    }

    /// Read the start of a struct with the given id.
    pub fn read_struct_id(&mut self, id: StructId) -> Result<()> {
        let start = self.position;
        let found = match self.take_byte()? {
            t if t & tag::SHORT_STRUCT_MASK == tag::SHORT_STRUCT => t & !tag::SHORT_STRUCT_MASK,
            tag::STRUCT => match self.take_byte()? {
                found if found < SHORT_STRUCT_LIMIT => {
                    return Err(malformed(start, "non-minimal struct id"));
                },
                found => found,
            },
            _ => return Err(malformed(start, "expected struct")),
        };
        if found != id.to_u8() {
            return Err(malformed(start, "unexpected struct id"));
        }
        Ok(())
    }

    /// Read a full-width 64-bit integer.
    pub fn read_int64(&mut self) -> Result<i64> {
        self.expect_tag(tag::INT64, "expected int64")?;
        let mut buf = [0u8; 8];
        buf.copy_from_slice(self.take(8)?);
        Ok(i64::from_be_bytes(buf))
    }

    /// Read a UTF-8 string of at most `max` bytes.
    pub fn read_string(&mut self, max: usize) -> Result<&'a str> {
        let start = self.position;
        let len = match self.take_byte()? {
            t if t & tag::SHORT_MASK == tag::SHORT_STRING => usize::from(t & !tag::SHORT_MASK),
            tag::STRING => self.read_long_length(start)?,
            _ => return Err(malformed(start, "expected string")),
        };
        if len > max {
            return Err(malformed(start, "string too long"));
        }
        std::str::from_utf8(self.take(len)?).map_err(|_| malformed(start, "invalid UTF-8"))
    }

    /// Read a byte string of at most `max` bytes.
    pub fn read_bytes(&mut self, max: usize) -> Result<&'a [u8]> {
        let start = self.position;
        let len = match self.take_byte()? {
            t if t & tag::SHORT_MASK == tag::SHORT_BYTES => usize::from(t & !tag::SHORT_MASK),
            tag::BYTES => self.read_long_length(start)?,
            _ => return Err(malformed(start, "expected bytes")),
        };
        if len > max {
            return Err(malformed(start, "byte string too long"));
        }
        self.take(len)
    }

    /// Length after a long-form string or byte string tag; shorter lengths
    /// must use the short form.
    fn read_long_length(&mut self, start: usize) -> Result<usize> {
        let len = self.read_length()?;
        if len < SHORT_LENGTH_LIMIT {
            return Err(malformed(start, "non-minimal length"));
        }
        Ok(len)
    }

    /// Length in the smallest integer form that holds it.
    fn read_length(&mut self) -> Result<usize> {
        let start = self.position;
        // Smallest value each form may carry
        let (len, min): (i64, i64) = match self.take_byte()? {
            t if t <= tag::MAX_INLINE_INT => (i64::from(t), 0),
            tag::INT16 => {
                let mut buf = [0u8; 2];
                buf.copy_from_slice(self.take(2)?);
                (i64::from(i16::from_be_bytes(buf)), i64::from(tag::MAX_INLINE_INT) + 1)
            },
            tag::INT32 => {
                let mut buf = [0u8; 4];
                buf.copy_from_slice(self.take(4)?);
                (i64::from(i32::from_be_bytes(buf)), i64::from(i16::MAX) + 1)
            },
            tag::INT64 => {
                let mut buf = [0u8; 8];
                buf.copy_from_slice(self.take(8)?);
                (i64::from_be_bytes(buf), i64::from(i32::MAX) + 1)
            },
            _ => return Err(malformed(start, "expected length")),
        };
        if len < 0 {
            return Err(malformed(start, "negative length"));
        }
        if len < min {
            return Err(malformed(start, "non-minimal length"));
        }
        usize::try_from(len).map_err(|_| malformed(start, "length out of range"))
    }

    fn expect_tag(&mut self, expected: u8, reason: &'static str) -> Result<()> {
        let start = self.position;
        if self.take_byte()? != expected {
            return Err(malformed(start, reason));
        }
        Ok(())
    }

    fn peek(&self) -> Option<u8> {
        self.data.get(self.position).copied()
    }

    fn take_byte(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        let end = self
            .position
            .checked_add(len)
            .filter(|&end| end <= self.data.len())
            .ok_or(malformed(self.position, "unexpected end of input"))?;
        let data = self.data;
        let bytes = &data[self.position..end];
        self.position = end;
        Ok(bytes)
    }
}

fn malformed(offset: usize, reason: &'static str) -> ProtocolError {
    ProtocolError::Malformed { offset, reason }
}
