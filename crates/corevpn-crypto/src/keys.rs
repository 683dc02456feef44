//! Ed25519 key pair handling with a derived X25519 equivalent.
//!
//! The service identifies a client key pair by its "fingerprint": the
//! base64-encoded SHA-512 hash of the pair's X25519 public key. A client
//! holds a single long-lived Ed25519 seed; the X25519 keys used for
//! WireGuard are derived from it with the standard Ed25519-to-Curve25519
//! mapping, so the fingerprint stays stable across process restarts as
//! long as the seed is persisted.

use base64::Engine;
use curve25519_dalek::edwards::CompressedEdwardsY;
use curve25519_dalek::montgomery::MontgomeryPoint;
use der::pem::LineEnding;
use ed25519_dalek::{SigningKey, VerifyingKey};
use pkcs8::{DecodePrivateKey, EncodePrivateKey};
use sha2::{Digest, Sha512};
use spki::{DecodePublicKey, EncodePublicKey};
use zeroize::Zeroize;

use crate::{CryptoError, Result};

const ED25519_SEED_LEN: usize = 32;

/// One Ed25519 key pair plus its derived X25519 equivalent.
///
/// Ephemeral by design: constructed during a certificate refresh (or at
/// deserialization, from the persisted seed), used to compute a fingerprint
/// or produce encodings, then dropped.
pub struct KeyHandler {
    signing_key: SigningKey,
    x25519_secret: [u8; 32],
    x25519_public: [u8; 32],
}

impl KeyHandler {
    /// Generate a fresh random Ed25519 key pair.
    pub fn generate() -> Self {
        let signing_key = SigningKey::generate(&mut rand::rngs::OsRng);
        Self::from_signing_key(signing_key)
    }

    /// Reconstruct a key pair deterministically from a raw 32-byte Ed25519 seed.
    pub fn from_seed(seed: &[u8]) -> Result<Self> {
        let seed: [u8; ED25519_SEED_LEN] = seed.try_into().map_err(|_| {
            CryptoError::KeyDecode(format!(
                "ed25519 seed must be {ED25519_SEED_LEN} bytes, got {}",
                seed.len()
            ))
        })?;
        Ok(Self::from_signing_key(SigningKey::from_bytes(&seed)))
    }

    /// Parse a PKCS#8 PEM-encoded Ed25519 private key.
    pub fn from_pkcs8_pem(pem: &str) -> Result<Self> {
        let signing_key =
            SigningKey::from_pkcs8_pem(pem).map_err(|e| CryptoError::KeyDecode(e.to_string()))?;
        Ok(Self::from_signing_key(signing_key))
    }

    fn from_signing_key(signing_key: SigningKey) -> Self {
        let seed = signing_key.to_bytes();
        let verifying_key = signing_key.verifying_key();
        let x25519_secret = derive_x25519_secret(&seed);
        let x25519_public = ed25519_public_to_x25519(&verifying_key);
        Self { signing_key, x25519_secret, x25519_public }
    }

    /// Ed25519 secret key (the 32-byte seed), raw bytes.
    pub fn ed25519_secret_bytes(&self) -> [u8; 32] {
        self.signing_key.to_bytes()
    }

    /// Ed25519 secret key, base64-encoded.
    pub fn ed25519_secret_base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(self.ed25519_secret_bytes())
    }

    /// Ed25519 secret key as a PKCS#8 PEM document.
    ///
    /// This is the value used as the OpenVPN private key.
    pub fn ed25519_secret_pem(&self) -> Result<String> {
        self.signing_key
            .to_pkcs8_pem(LineEnding::LF)
            .map(|pem| pem.to_string())
            .map_err(|e| CryptoError::KeyDecode(e.to_string()))
    }

    /// Ed25519 public key, raw bytes.
    pub fn ed25519_public_bytes(&self) -> [u8; 32] {
        self.signing_key.verifying_key().to_bytes()
    }

    /// Ed25519 public key, base64-encoded.
    pub fn ed25519_public_base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(self.ed25519_public_bytes())
    }

    /// Ed25519 public key as a SubjectPublicKeyInfo PEM document.
    ///
    /// This is the value sent to the API as `ClientPublicKey` when requesting a certificate.
    pub fn ed25519_public_pem(&self) -> Result<String> {
        self.signing_key
            .verifying_key()
            .to_public_key_pem(LineEnding::LF)
            .map_err(|e| CryptoError::KeyDecode(e.to_string()))
    }

    /// X25519 secret scalar, raw bytes.
    pub fn x25519_secret_bytes(&self) -> [u8; 32] {
        self.x25519_secret
    }

    /// X25519 secret scalar, base64-encoded. This is the WireGuard private key.
    pub fn x25519_secret_base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(self.x25519_secret)
    }

    /// X25519 public key, raw bytes.
    pub fn x25519_public_bytes(&self) -> [u8; 32] {
        self.x25519_public
    }

    /// X25519 public key, base64-encoded.
    pub fn x25519_public_base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(self.x25519_public)
    }

    /// The service fingerprint for this key pair's X25519 public key.
    pub fn fingerprint(&self) -> String {
        Self::fingerprint_of(&self.x25519_public)
    }

    /// base64( SHA-512( x25519_pub_bytes ) ), the service's fingerprint format.
    pub fn fingerprint_of(x25519_public: &[u8; 32]) -> String {
        let digest = Sha512::digest(x25519_public);
        base64::engine::general_purpose::STANDARD.encode(digest)
    }
}

impl Drop for KeyHandler {
    fn drop(&mut self) {
        self.x25519_secret.zeroize();
    }
}

/// Clamp the first 32 bytes of `SHA-512(ed25519_seed)` per the Curve25519 rule.
///
/// Equivalent to libsodium's `crypto_sign_ed25519_sk_to_curve25519`.
fn derive_x25519_secret(ed25519_seed: &[u8; 32]) -> [u8; 32] {
    let mut hash = Sha512::digest(ed25519_seed);
    let mut scalar = [0u8; 32];
    scalar.copy_from_slice(&hash[..32]);
    scalar[0] &= 248;
    scalar[31] &= 127;
    scalar[31] |= 64;
    hash.zeroize();
    scalar
}

/// Convert an Ed25519 public point to its Montgomery (X25519) form.
///
/// This is the birational Edwards-to-Montgomery map, not a second
/// independent scalar multiplication: for a given seed, the Montgomery
/// u-coordinate produced here must agree with the X25519 public key
/// obtained by scalar-multiplying the clamped secret by the base point
/// (see the `key_derivation_agreement` test below).
pub fn ed25519_public_to_x25519(verifying_key: &VerifyingKey) -> [u8; 32] {
    let compressed = CompressedEdwardsY(verifying_key.to_bytes());
    let edwards_point = compressed
        .decompress()
        .expect("ed25519_dalek::VerifyingKey is always a valid compressed Edwards point");
    let montgomery: MontgomeryPoint = edwards_point.to_montgomery();
    montgomery.to_bytes()
}

/// Parse a raw 32-byte Ed25519 public key and reduce it to X25519 form.
pub fn ed25519_public_bytes_to_x25519(bytes: &[u8; 32]) -> Result<[u8; 32]> {
    let verifying_key =
        VerifyingKey::from_bytes(bytes).map_err(|e| CryptoError::CertificateDecode(e.to_string()))?;
    Ok(ed25519_public_to_x25519(&verifying_key))
}
