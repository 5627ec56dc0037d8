//! Short numeric codes compared by humans during pairing
//!
//! Invitation codes are drawn from the random source and read aloud to the
//! peer. Confirmation codes are derived from the shared secret once key
//! agreement completes; if both sides display the same pair, no one sits in
//! the middle.

use rand::{CryptoRng, RngCore};

use crate::{
    error::CryptoError,
    kdf::{self, CODE},
    secret::{ErasableKey, Secret},
};

/// Bit width of invitation and confirmation codes
pub const CODE_BITS: u32 = 19;

/// Bytes needed to hold `CODE_BITS` bits
const CODE_BYTES: usize = CODE_BITS.div_ceil(8) as usize;

/// Read the first `bits` bits of `bytes`, most significant bit first, as an
/// unsigned integer.
///
/// # Errors
///
/// - `OutOfRange` if `bits` exceeds 32 or the bytes hold fewer than `bits`
pub fn read_uint(bytes: &[u8], bits: u32) -> Result<u32, CryptoError> {
    if bits > u32::BITS || bytes.len() * 8 < bits as usize {
        return Err(CryptoError::OutOfRange { what: "bit count", value: u64::from(bits) });
    }

    let mut value = 0u32;
    for i in 0..bits as usize {
        let bit = (bytes[i / 8] >> (7 - i % 8)) & 1;
        value = (value << 1) | u32::from(bit);
    }
    Ok(value)
}

/// Draw a fresh invitation code.
pub fn generate_invitation_code(rng: &mut (impl RngCore + CryptoRng)) -> u32 {
    let mut bytes = [0u8; CODE_BYTES];
    rng.fill_bytes(&mut bytes);
    code_from(&bytes)
}

/// Derive the `(alice, bob)` confirmation codes from a pairing secret.
///
/// Each side displays its own code and checks the other against what the
/// peer reads out.
pub fn derive_confirmation_codes(secret: &Secret) -> (u32, u32) {
    let alice = confirmation_key(secret, 0);
    let bob = confirmation_key(secret, 1);

    let codes = (code_from(alice.as_bytes()), code_from(bob.as_bytes()));
    alice.erase();
    bob.erase();
    codes
}

fn confirmation_key(secret: &Secret, context: u32) -> ErasableKey {
    let Ok(key) = kdf::counter_mode_kdf(secret.as_bytes(), CODE, context) else {
        unreachable!("secrets are 32 bytes and the code label fits the counter block");
    };
    ErasableKey::new(key)
}

fn code_from(bytes: &[u8]) -> u32 {
    let Ok(code) = read_uint(bytes, CODE_BITS) else {
        unreachable!("callers pass at least CODE_BYTES bytes");
    };
    code
}
