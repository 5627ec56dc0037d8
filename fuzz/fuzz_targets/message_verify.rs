//! Fuzz target for MessageVerifier::verify
//!
//! This fuzzer feeds arbitrary byte sequences to the message verifier to find:
//! - Parser crashes or panics
//! - Length prefixes that read past the buffer
//! - Body offsets that point outside the raw encoding
//!
//! The fuzzer should NEVER panic. All invalid inputs should return an error.

#![no_main]

use bytes::Bytes;
use libfuzzer_sys::fuzz_target;
use tandem_crypto::MessageDigest;
use tandem_proto::MessageVerifier;

fuzz_target!(|data: &[u8]| {
    let Ok(message) = MessageVerifier::default().verify(Bytes::copy_from_slice(data)) else {
        return;
    };

    // Anything accepted must be self-consistent
    assert_eq!(message.id().as_bytes(), &MessageDigest::digest(data));
    assert_eq!(message.body().len(), message.body_length());
    assert!(message.body_start() + message.body_length() <= data.len());
});
