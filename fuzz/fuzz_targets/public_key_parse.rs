//! Fuzz target for public key parsing
//!
//! Every accepted key must be a compressed point on the reference curve and
//! must re-encode to exactly the input bytes.

#![no_main]

use libfuzzer_sys::fuzz_target;
use tandem_crypto::{curve, encode_public_key, parse_public_key};

fuzz_target!(|data: &[u8]| {
    let Ok(public_key) = parse_public_key(data) else {
        return;
    };

    assert!(curve::check_public_key(&public_key).is_ok());
    assert_eq!(encode_public_key(&public_key), data);
});
