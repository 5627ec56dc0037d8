//! Protocol constants, encoding tags and message limits

/// Length of the random salt in every message
pub const SALT_LENGTH: usize = 8;

/// Largest encoded packet
pub const MAX_PACKET_LENGTH: usize = 1 << 20;

/// Largest message body; leaves room for the other fields in a packet
pub const MAX_BODY_LENGTH: usize = MAX_PACKET_LENGTH - 1024;

/// Largest message subject (UTF-8 bytes)
pub const MAX_SUBJECT_LENGTH: usize = 100;

/// Largest encoded signature
pub const MAX_SIGNATURE_LENGTH: usize = 120;

/// Largest author name (UTF-8 bytes)
pub const MAX_AUTHOR_NAME_LENGTH: usize = 50;

/// Largest group name (UTF-8 bytes)
pub const MAX_GROUP_NAME_LENGTH: usize = 50;

/// Largest encoded public key
pub const MAX_PUBLIC_KEY_LENGTH: usize = 100;

/// Type tags of the canonical encoding.
///
/// Multi-byte values follow their tag in big-endian order. Short forms pack a
/// small length or struct id into the low bits of the tag.
pub mod tag {
    /// 64-bit signed integer
    pub const INT64: u8 = 0xFA;
    /// 32-bit signed integer
    pub const INT32: u8 = 0xFB;
    /// 16-bit signed integer
    pub const INT16: u8 = 0xFC;
    /// 8-bit signed integer
    pub const INT8: u8 = 0xFD;
    /// Absent value
    pub const NULL: u8 = 0xF2;
    /// Struct with a one-byte id
    pub const STRUCT: u8 = 0xF1;
    /// Byte string with a length prefix
    pub const BYTES: u8 = 0xF6;
    /// UTF-8 string with a length prefix
    pub const STRING: u8 = 0xF7;
    /// Struct with id below 32 (`0xC0 | id`)
    pub const SHORT_STRUCT: u8 = 0xC0;
    /// Byte string shorter than 16 (`0x90 | len`)
    pub const SHORT_BYTES: u8 = 0x90;
    /// UTF-8 string shorter than 16 (`0x80 | len`)
    pub const SHORT_STRING: u8 = 0x80;

    /// Mask selecting the tag of a short struct
    pub const SHORT_STRUCT_MASK: u8 = 0xE0;
    /// Mask selecting the tag of a short string or byte string
    pub const SHORT_MASK: u8 = 0xF0;
    /// Largest non-negative integer encoded in the tag byte itself
    pub const MAX_INLINE_INT: u8 = 0x7F;
}

/// Struct ids of the protocol records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum StructId {
    /// An author: name, public key
    Author = 1,
    /// A group: name, optional public key
    Group = 3,
    /// A message
    Message = 4,
}

impl StructId {
    /// Wire value of the id.
    pub fn to_u8(self) -> u8 {
        self as u8
    }
}

/// Size limits applied when building and verifying records.
///
/// Both peers must use the same limits, so the defaults are the protocol
/// constants above.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageLimits {
    /// Largest subject (UTF-8 bytes)
    pub max_subject_length: usize,
    /// Largest body
    pub max_body_length: usize,
    /// Largest signature
    pub max_signature_length: usize,
    /// Largest encoded packet
    pub max_packet_length: usize,
    /// Largest author name
    pub max_author_name_length: usize,
    /// Largest group name
    pub max_group_name_length: usize,
    /// Largest public key
    pub max_public_key_length: usize,
}

impl Default for MessageLimits {
    fn default() -> Self {
        Self {
            max_subject_length: MAX_SUBJECT_LENGTH,
            max_body_length: MAX_BODY_LENGTH,
            max_signature_length: MAX_SIGNATURE_LENGTH,
            max_packet_length: MAX_PACKET_LENGTH,
            max_author_name_length: MAX_AUTHOR_NAME_LENGTH,
            max_group_name_length: MAX_GROUP_NAME_LENGTH,
            max_public_key_length: MAX_PUBLIC_KEY_LENGTH,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_limits_match_constants() {
        let limits = MessageLimits::default();
        assert_eq!(limits.max_subject_length, 100);
        assert_eq!(limits.max_body_length, (1 << 20) - 1024);
        assert_eq!(limits.max_signature_length, 120);
    }

    #[test]
    fn struct_ids_fit_short_form() {
        for id in [StructId::Author, StructId::Group, StructId::Message] {
            assert!(id.to_u8() < 32);
        }
    }
}
