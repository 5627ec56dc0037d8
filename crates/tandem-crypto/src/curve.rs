//! NIST P-384 reference parameters and domain-parameter checks
//!
//! Parameters are from "Suite B Implementer's Guide to NIST SP 800-56A",
//! section A.2. Every generated or parsed public key is checked against them,
//! so a backend that silently uses another curve is caught at the first key.

use p384::{
    AffinePoint, FieldBytes, FieldElement, NistP384, PublicKey,
    elliptic_curve::{
        Curve, PrimeCurve, PrimeField, bigint::Encoding, sec1::ToEncodedPoint,
    },
};

use crate::error::CryptoError;

/// Coordinate and scalar length in bytes
pub const P384_BYTES: usize = 48;

/// Field prime q
pub const P384_Q: [u8; P384_BYTES] = [
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xfe, 0xff, 0xff, 0xff, 0xff,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xff, 0xff, 0xff, 0xff,
];

/// Curve coefficient a (q - 3)
pub const P384_A: [u8; P384_BYTES] = [
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xfe, 0xff, 0xff, 0xff, 0xff,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xff, 0xff, 0xff, 0xfc,
];

/// Curve coefficient b
pub const P384_B: [u8; P384_BYTES] = [
    0xb3, 0x31, 0x2f, 0xa7, 0xe2, 0x3e, 0xe7, 0xe4, 0x98, 0x8e, 0x05, 0x6b,
    0xe3, 0xf8, 0x2d, 0x19, 0x18, 0x1d, 0x9c, 0x6e, 0xfe, 0x81, 0x41, 0x12,
    0x03, 0x14, 0x08, 0x8f, 0x50, 0x13, 0x87, 0x5a, 0xc6, 0x56, 0x39, 0x8d,
    0x8a, 0x2e, 0xd1, 0x9d, 0x2a, 0x85, 0xc8, 0xed, 0xd3, 0xec, 0x2a, 0xef,
];

/// Base point x-coordinate
pub const P384_G_X: [u8; P384_BYTES] = [
    0xaa, 0x87, 0xca, 0x22, 0xbe, 0x8b, 0x05, 0x37, 0x8e, 0xb1, 0xc7, 0x1e,
    0xf3, 0x20, 0xad, 0x74, 0x6e, 0x1d, 0x3b, 0x62, 0x8b, 0xa7, 0x9b, 0x98,
    0x59, 0xf7, 0x41, 0xe0, 0x82, 0x54, 0x2a, 0x38, 0x55, 0x02, 0xf2, 0x5d,
    0xbf, 0x55, 0x29, 0x6c, 0x3a, 0x54, 0x5e, 0x38, 0x72, 0x76, 0x0a, 0xb7,
];

/// Base point y-coordinate
pub const P384_G_Y: [u8; P384_BYTES] = [
    0x36, 0x17, 0xde, 0x4a, 0x96, 0x26, 0x2c, 0x6f, 0x5d, 0x9e, 0x98, 0xbf,
    0x92, 0x92, 0xdc, 0x29, 0xf8, 0xf4, 0x1d, 0xbd, 0x28, 0x9a, 0x14, 0x7c,
    0xe9, 0xda, 0x31, 0x13, 0xb5, 0xf0, 0xb8, 0xc0, 0x0a, 0x60, 0xb1, 0xce,
    0x1d, 0x7e, 0x81, 0x9d, 0x7a, 0x43, 0x1d, 0x7c, 0x90, 0xea, 0x0e, 0x5f,
];

/// Order n of the base point
pub const P384_N: [u8; P384_BYTES] = [
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0xc7, 0x63, 0x4d, 0x81, 0xf4, 0x37, 0x2d, 0xdf, 0x58, 0x1a, 0x0d, 0xb2,
    0x48, 0xb0, 0xa7, 0x7a, 0xec, 0xec, 0x19, 0x6a, 0xcc, 0xc5, 0x29, 0x73,
];

/// Cofactor h
pub const P384_H: u32 = 1;

// A prime-order curve has cofactor 1.
const _: () = assert!(P384_H == 1);
fn assert_prime_order<C: PrimeCurve>() {}

/// Check the backend's curve against the reference parameters.
///
/// # Errors
///
/// - `CurveMismatch` naming the first parameter that differs
pub fn check_reference_curve() -> Result<(), CryptoError> {
    assert_prime_order::<NistP384>();

    // The backend field accepts exactly the residues below q.
    let mut below_q = P384_Q;
    below_q[P384_BYTES - 1] -= 1;
    if field_element(&P384_Q).is_some() || field_element(&below_q).is_none() {
        return Err(CryptoError::CurveMismatch { parameter: "field prime" });
    }

    if NistP384::ORDER.to_be_bytes() != P384_N {
        return Err(CryptoError::CurveMismatch { parameter: "order" });
    }

    let generator = AffinePoint::GENERATOR.to_encoded_point(false);
    let (Some(x), Some(y)) = (generator.x(), generator.y()) else {
        return Err(CryptoError::CurveMismatch { parameter: "base point" });
    };
    if x.as_slice() != P384_G_X.as_slice() || y.as_slice() != P384_G_Y.as_slice() {
        return Err(CryptoError::CurveMismatch { parameter: "base point" });
    }

    // A base point equal to the reference and satisfying the reference
    // equation pins the coefficients the backend uses for its group law.
    if !on_reference_curve(&P384_G_X, &P384_G_Y) {
        return Err(CryptoError::CurveMismatch { parameter: "coefficients" });
    }

    Ok(())
}

/// Check that a public key lies on the reference curve.
///
/// # Errors
///
/// - `CurveMismatch` if the backend or the point disagrees with the reference
pub fn check_public_key(public_key: &PublicKey) -> Result<(), CryptoError> {
    check_reference_curve()?;

    let point = public_key.to_encoded_point(false);
    let (Some(x), Some(y)) = (point.x(), point.y()) else {
        return Err(CryptoError::CurveMismatch { parameter: "point at infinity" });
    };

    let mut x_bytes = [0u8; P384_BYTES];
    let mut y_bytes = [0u8; P384_BYTES];
    x_bytes.copy_from_slice(x);
    y_bytes.copy_from_slice(y);

    if !on_reference_curve(&x_bytes, &y_bytes) {
        return Err(CryptoError::CurveMismatch { parameter: "public point" });
    }

    Ok(())
}

/// y^2 = x^3 + ax + b over the reference field.
fn on_reference_curve(x: &[u8; P384_BYTES], y: &[u8; P384_BYTES]) -> bool {
    let (Some(x), Some(y), Some(a), Some(b)) = (
        field_element(x),
        field_element(y),
        field_element(&P384_A),
        field_element(&P384_B),
    ) else {
        return false;
    };

    y.square() == x.square() * x + a * x + b
}

fn field_element(bytes: &[u8; P384_BYTES]) -> Option<FieldElement> {
    Option::from(FieldElement::from_repr(FieldBytes::clone_from_slice(bytes)))
}
