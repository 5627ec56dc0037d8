//! P-384 key pairs for key agreement (ECDH) and signing (ECDSA)
//!
//! Both kinds of key pair live on the same fixed curve. Public keys are
//! exported in the compressed SEC1 encoding whatever the backend's default,
//! so keys have one canonical, minimal form on every platform.
//!
//! # Security
//!
//! - Every generated key is checked against the reference curve before it is
//!   returned ([`crate::curve::check_public_key`])
//! - Parsed keys must be valid compressed points on the reference curve
//! - The raw Diffie-Hellman output is zeroed on drop

use p384::{
    PublicKey, SecretKey,
    ecdsa::{
        Signature, SigningKey, VerifyingKey,
        signature::{DigestSigner, DigestVerifier},
    },
    elliptic_curve::sec1::ToEncodedPoint,
};
use rand::{CryptoRng, RngCore};
use sha2::{Digest, Sha384};
use tracing::{debug, error};
use zeroize::Zeroizing;

use crate::{curve, error::CryptoError};

/// Length of a compressed SEC1 public key (tag byte + x-coordinate)
pub const PUBLIC_KEY_BYTES: usize = 49;

/// Longest DER-encoded P-384 ECDSA signature
pub const MAX_SIGNATURE_BYTES: usize = 104;

/// Key pair for elliptic-curve Diffie-Hellman.
pub struct AgreementKeyPair {
    secret: SecretKey,
    public: PublicKey,
}

impl AgreementKeyPair {
    /// Public half.
    pub fn public_key(&self) -> &PublicKey {
        &self.public
    }

    /// Public half in canonical (compressed) encoding.
    pub fn public_key_bytes(&self) -> Vec<u8> {
        encode_public_key(&self.public)
    }

    /// Raw shared secret: the x-coordinate of the shared point.
    pub(crate) fn agree(&self, theirs: &PublicKey) -> Zeroizing<Vec<u8>> {
        let shared = p384::ecdh::diffie_hellman(self.secret.to_nonzero_scalar(), theirs.as_affine());
        Zeroizing::new(shared.raw_secret_bytes().to_vec())
    }
}

/// Signing half of a signature key pair.
#[derive(Clone)]
pub struct PrivateKey {
    inner: SigningKey,
}

/// Key pair for ECDSA signatures.
pub struct SignatureKeyPair {
    private: PrivateKey,
    public: PublicKey,
}

impl SignatureKeyPair {
    /// Public half.
    pub fn public_key(&self) -> &PublicKey {
        &self.public
    }

    /// Public half in canonical (compressed) encoding.
    pub fn public_key_bytes(&self) -> Vec<u8> {
        encode_public_key(&self.public)
    }

    /// Private half.
    pub fn private_key(&self) -> &PrivateKey {
        &self.private
    }
}

/// Generate an agreement key pair.
///
/// # Errors
///
/// - `CurveMismatch` if the generated key is not on the reference curve. This
///   means the backend is unusable and is fatal.
pub fn generate_agreement_key_pair(
    rng: &mut (impl RngCore + CryptoRng),
) -> Result<AgreementKeyPair, CryptoError> {
    let secret = SecretKey::random(rng);
    let public = secret.public_key();

    if let Err(err) = curve::check_public_key(&public) {
        error!(%err, "generated agreement key is not on the reference curve");
        return Err(err);
    }

    debug!("generated agreement key pair");
    Ok(AgreementKeyPair { secret, public })
}

/// Generate a signature key pair.
///
/// # Errors
///
/// - `CurveMismatch` if the generated key is not on the reference curve
pub fn generate_signature_key_pair(
    rng: &mut (impl RngCore + CryptoRng),
) -> Result<SignatureKeyPair, CryptoError> {
    let signing = SigningKey::random(rng);
    let public = PublicKey::from(signing.verifying_key());

    if let Err(err) = curve::check_public_key(&public) {
        error!(%err, "generated signature key is not on the reference curve");
        return Err(err);
    }

    debug!("generated signature key pair");
    Ok(SignatureKeyPair { private: PrivateKey { inner: signing }, public })
}

/// Canonical encoding of a public key (compressed SEC1, 49 bytes).
pub fn encode_public_key(public_key: &PublicKey) -> Vec<u8> {
    public_key.to_encoded_point(true).as_bytes().to_vec()
}

/// Decode a public key from its canonical encoding.
///
/// # Errors
///
/// - `InvalidPublicKey` if the length or point tag is wrong, or the point is
///   not on the curve
/// - `CurveMismatch` if the backend disagrees with the reference curve
pub fn parse_public_key(bytes: &[u8]) -> Result<PublicKey, CryptoError> {
    if bytes.len() != PUBLIC_KEY_BYTES {
        return Err(CryptoError::InvalidPublicKey {
            reason: format!("expected {PUBLIC_KEY_BYTES} bytes, got {}", bytes.len()),
        });
    }

    if !matches!(bytes.first(), Some(0x02 | 0x03)) {
        return Err(CryptoError::InvalidPublicKey {
            reason: "not a compressed point".to_string(),
        });
    }

    let public_key = PublicKey::from_sec1_bytes(bytes).map_err(|_| {
        CryptoError::InvalidPublicKey { reason: "point is not on the curve".to_string() }
    })?;

    curve::check_public_key(&public_key)?;
    Ok(public_key)
}

/// Streaming ECDSA signer (SHA-384).
///
/// Data may be fed in any number of pieces; the signature covers their
/// concatenation.
#[derive(Clone)]
pub struct Signer {
    key: SigningKey,
    digest: Sha384,
}

impl Signer {
    /// Start a signature under `key`.
    pub fn new(key: &PrivateKey) -> Self {
        Self { key: key.inner.clone(), digest: Sha384::new() }
    }

    /// Absorb more signed data.
    pub fn update(&mut self, data: &[u8]) {
        self.digest.update(data);
    }

    /// Finish and return the DER-encoded signature.
    ///
    /// # Errors
    ///
    /// - `SigningFailed` if the backend cannot produce a signature
    pub fn sign(self) -> Result<Vec<u8>, CryptoError> {
        let signature: Signature =
            self.key.try_sign_digest(self.digest).map_err(|_| CryptoError::SigningFailed)?;
        Ok(signature.to_der().as_bytes().to_vec())
    }
}

/// Sign a complete buffer.
///
/// # Errors
///
/// - `SigningFailed` if the backend cannot produce a signature
pub fn sign(key: &PrivateKey, data: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let mut signer = Signer::new(key);
    signer.update(data);
    signer.sign()
}

/// Verify a DER-encoded signature over `data`.
///
/// # Errors
///
/// - `InvalidPublicKey` / `CurveMismatch` if the public key does not parse
/// - `InvalidSignatureEncoding` if the signature is not DER
/// - `InvalidSignature` if the signature does not verify
pub fn verify_signature(
    public_key: &[u8],
    data: &[u8],
    signature: &[u8],
) -> Result<(), CryptoError> {
    let public_key = parse_public_key(public_key)?;
    let verifying_key = VerifyingKey::from(public_key);
    let signature =
        Signature::from_der(signature).map_err(|_| CryptoError::InvalidSignatureEncoding)?;

    verifying_key
        .verify_digest(Sha384::new_with_prefix(data), &signature)
        .map_err(|_| CryptoError::InvalidSignature)
}
