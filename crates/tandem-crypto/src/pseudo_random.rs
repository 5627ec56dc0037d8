//! Deterministic byte stream shared by two peers
//!
//! Seeded with both invitation codes, so each side of a pairing produces the
//! same stream without further communication.

use zeroize::Zeroize;

use crate::digest::{DIGEST_LENGTH, MessageDigest};

/// Bytes handed out per state; the other half seeds the next state
const OUTPUT_BYTES: usize = DIGEST_LENGTH / 2;

/// Digest-based pseudo-random stream.
///
/// The state is a digest. Its first half is output and its second half is
/// hashed to form the next state, so earlier output cannot be recovered from
/// the current state.
pub struct PseudoRandom {
    state: [u8; DIGEST_LENGTH],
    offset: usize,
}

impl PseudoRandom {
    /// Seed the stream with two 32-bit values.
    pub fn new(seed1: u32, seed2: u32) -> Self {
        let mut digest = MessageDigest::new();
        digest.update(&seed1.to_be_bytes());
        digest.update(&seed2.to_be_bytes());
        Self { state: digest.finalize(), offset: 0 }
    }

    /// Next `len` bytes of the stream.
    pub fn next_bytes(&mut self, len: usize) -> Vec<u8> {
        let mut out = Vec::with_capacity(len);
        while out.len() < len {
            if self.offset == OUTPUT_BYTES {
                let next = MessageDigest::digest(&self.state[OUTPUT_BYTES..]);
                self.state.zeroize();
                self.state = next;
                self.offset = 0;
            }
            let take = (OUTPUT_BYTES - self.offset).min(len - out.len());
            out.extend_from_slice(&self.state[self.offset..self.offset + take]);
            self.offset += take;
        }
        out
    }
}

impl Drop for PseudoRandom {
    fn drop(&mut self) {
        self.state.zeroize();
    }
}
