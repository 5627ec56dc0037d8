//! Byte consumers attached to a [`Writer`](crate::Writer)
//!
//! A consumer sees every byte written while it is attached. Three kinds are
//! used during message construction: a counter (offsets and the packet
//! limit), a running digest (the message id) and a running signature.
//!
//! Consumers live in an explicit list of slots owned by the writer rather
//! than a chain of wrappers. Attach order and detach timing decide which
//! bytes each consumer covers, so they stay visible in the code that builds
//! a message.

use std::marker::PhantomData;

use tandem_crypto::{DIGEST_LENGTH, MessageDigest, PrivateKey, Signer};

use crate::errors::{ProtocolError, Result};

/// Counts bytes and fails once the limit is exceeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountingConsumer {
    count: usize,
    limit: usize,
}

impl CountingConsumer {
    /// Counter that rejects more than `limit` bytes.
    pub fn new(limit: usize) -> Self {
        Self { count: 0, limit }
    }

    /// Bytes seen so far.
    pub fn count(&self) -> usize {
        self.count
    }

    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        self.count += bytes.len();
        if self.count > self.limit {
            return Err(ProtocolError::PacketTooLarge { size: self.count, max: self.limit });
        }
        Ok(())
    }
}

/// Feeds bytes into a message digest.
#[derive(Clone, Default)]
pub struct DigestingConsumer {
    digest: MessageDigest,
}

impl DigestingConsumer {
    /// Consumer with an empty digest.
    pub fn new() -> Self {
        Self::default()
    }

    /// Digest of every byte seen.
    pub fn finalize(self) -> [u8; DIGEST_LENGTH] {
        self.digest.finalize()
    }
}

/// Feeds bytes into a signature under one private key.
#[derive(Clone)]
pub struct SigningConsumer {
    signer: Signer,
}

impl SigningConsumer {
    /// Consumer signing under `key`.
    pub fn new(key: &PrivateKey) -> Self {
        Self { signer: Signer::new(key) }
    }

    /// Signature over every byte seen (DER).
    ///
    /// # Errors
    ///
    /// - `Crypto(SigningFailed)` if the backend cannot sign
    pub fn sign(self) -> Result<Vec<u8>> {
        Ok(self.signer.sign()?)
    }
}

/// One slot of a writer's consumer list.
pub enum Consumer {
    /// Byte counter
    Counting(CountingConsumer),
    /// Running digest
    Digesting(DigestingConsumer),
    /// Running signature
    Signing(SigningConsumer),
}

impl Consumer {
    pub(crate) fn write(&mut self, bytes: &[u8]) -> Result<()> {
        match self {
            Self::Counting(counting) => counting.write(bytes),
            Self::Digesting(digesting) => {
                digesting.digest.update(bytes);
                Ok(())
            },
            Self::Signing(signing) => {
                signing.signer.update(bytes);
                Ok(())
            },
        }
    }
}

/// A concrete consumer kind that can be stored in a [`Consumer`] slot.
pub trait Sink: Into<Consumer> + Sized {
    /// Take the concrete consumer back out of its slot.
    fn from_consumer(consumer: Consumer) -> Option<Self>;

    /// Borrow the concrete consumer in its slot.
    fn from_consumer_ref(consumer: &Consumer) -> Option<&Self>;
}

impl From<CountingConsumer> for Consumer {
    fn from(consumer: CountingConsumer) -> Self {
        Self::Counting(consumer)
    }
}

impl From<DigestingConsumer> for Consumer {
    fn from(consumer: DigestingConsumer) -> Self {
        Self::Digesting(consumer)
    }
}

impl From<SigningConsumer> for Consumer {
    fn from(consumer: SigningConsumer) -> Self {
        Self::Signing(consumer)
    }
}

impl Sink for CountingConsumer {
    fn from_consumer(consumer: Consumer) -> Option<Self> {
        match consumer {
            Consumer::Counting(counting) => Some(counting),
            _ => None,
        }
    }

    fn from_consumer_ref(consumer: &Consumer) -> Option<&Self> {
        match consumer {
            Consumer::Counting(counting) => Some(counting),
            _ => None,
        }
    }
}

impl Sink for DigestingConsumer {
    fn from_consumer(consumer: Consumer) -> Option<Self> {
        match consumer {
            Consumer::Digesting(digesting) => Some(digesting),
            _ => None,
        }
    }

    fn from_consumer_ref(consumer: &Consumer) -> Option<&Self> {
        match consumer {
            Consumer::Digesting(digesting) => Some(digesting),
            _ => None,
        }
    }
}

impl Sink for SigningConsumer {
    fn from_consumer(consumer: Consumer) -> Option<Self> {
        match consumer {
            Consumer::Signing(signing) => Some(signing),
            _ => None,
        }
    }

    fn from_consumer_ref(consumer: &Consumer) -> Option<&Self> {
        match consumer {
            Consumer::Signing(signing) => Some(signing),
            _ => None,
        }
    }
}

/// Ticket for an attached consumer.
///
/// Neither `Clone` nor `Copy`: detaching consumes the handle, so a consumer
/// can be detached once and never re-attached to the same stream position.
#[derive(Debug)]
#[must_use = "a consumer that is never detached cannot be read"]
pub struct ConsumerHandle<T> {
    pub(crate) writer: u64,
    pub(crate) index: usize,
    pub(crate) _kind: PhantomData<fn() -> T>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counting_enforces_limit() {
        let mut counting = CountingConsumer::new(4);
        counting.write(&[0; 4]).unwrap();
        assert_eq!(counting.count(), 4);

        let err = counting.write(&[0]).unwrap_err();
        assert_eq!(err, ProtocolError::PacketTooLarge { size: 5, max: 4 });
    }

    #[test]
    fn slot_round_trip_preserves_kind() {
        let slot: Consumer = CountingConsumer::new(10).into();
        assert!(DigestingConsumer::from_consumer(slot).is_none());

        let slot: Consumer = DigestingConsumer::new().into();
        assert!(DigestingConsumer::from_consumer(slot).is_some());
    }

    #[test]
    fn digesting_matches_message_digest() {
        let mut slot: Consumer = DigestingConsumer::new().into();
        slot.write(b"ab").unwrap();
        slot.write(b"c").unwrap();

        let digesting = DigestingConsumer::from_consumer(slot).unwrap();
        assert_eq!(digesting.finalize(), MessageDigest::digest(b"abc"));
    }
}
