//! Content-addressed identifiers
//!
//! Every identifier is the message digest of a record's canonical encoding,
//! so equal records always have equal ids.

use std::fmt;

use tandem_crypto::DIGEST_LENGTH;

use crate::errors::{ProtocolError, Result};

/// Length of every identifier (48 bytes)
pub const UNIQUE_ID_LENGTH: usize = DIGEST_LENGTH;

macro_rules! unique_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name([u8; UNIQUE_ID_LENGTH]);

        impl $name {
            /// Wrap a digest.
            pub fn new(bytes: [u8; UNIQUE_ID_LENGTH]) -> Self {
                Self(bytes)
            }

            /// Copy an id out of a slice.
            ///
            /// # Errors
            ///
            /// - `Malformed` if the slice is not exactly 48 bytes
            pub fn from_slice(bytes: &[u8]) -> Result<Self> {
                let bytes = bytes.try_into().map_err(|_| ProtocolError::Malformed {
                    offset: 0,
                    reason: "identifier must be 48 bytes",
                })?;
                Ok(Self(bytes))
            }

            /// Raw digest bytes.
            pub fn as_bytes(&self) -> &[u8; UNIQUE_ID_LENGTH] {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                for byte in &self.0 {
                    write!(f, "{byte:02x}")?;
                }
                Ok(())
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                // Eight bytes are plenty to tell ids apart in logs
                write!(f, concat!(stringify!($name), "("))?;
                for byte in &self.0[..8] {
                    write!(f, "{byte:02x}")?;
                }
                write!(f, "..)")
            }
        }
    };
}

unique_id! {
    /// Identity of a message: digest of its raw bytes, signatures included
    MessageId
}

unique_id! {
    /// Identity of an author: digest of its encoded name and public key
    AuthorId
}

unique_id! {
    /// Identity of a group: digest of its encoded name and public key
    GroupId
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_full_hex() {
        let id = MessageId::new([0xAB; UNIQUE_ID_LENGTH]);
        assert_eq!(id.to_string(), "ab".repeat(UNIQUE_ID_LENGTH));
    }

    #[test]
    fn debug_is_abbreviated() {
        let id = AuthorId::new([0x01; UNIQUE_ID_LENGTH]);
        assert_eq!(format!("{id:?}"), "AuthorId(0101010101010101..)");
    }

    #[test]
    fn from_slice_checks_length() {
        assert!(GroupId::from_slice(&[0u8; UNIQUE_ID_LENGTH]).is_ok());
        assert!(matches!(
            GroupId::from_slice(&[0u8; UNIQUE_ID_LENGTH - 1]),
            Err(ProtocolError::Malformed { .. })
        ));
    }
}
