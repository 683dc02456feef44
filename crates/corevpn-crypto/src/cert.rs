//! X.509 certificate parsing.
//!
//! This module only reads certificates handed back by the API; it never
//! issues or signs one. Issuance happens server-side.

use base64::Engine;
use chrono::{DateTime, Utc};
use der::Decode;
use ed25519_dalek::VerifyingKey;
use x509_cert::Certificate as X509Certificate;

use crate::keys::{ed25519_public_to_x25519, KeyHandler};
use crate::{CryptoError, Result};

/// A parsed X.509 certificate returned by the VPN certificate endpoint.
///
/// Holds only what the refresh policy needs: the validity window, the raw
/// PEM (for handing to the OpenVPN/WireGuard stack unmodified), and the
/// certified public key (used to re-derive the service fingerprint).
#[derive(Debug, Clone)]
pub struct Certificate {
    pem: String,
    not_before: DateTime<Utc>,
    not_after: DateTime<Utc>,
    subject_public_key: Vec<u8>,
}

impl Certificate {
    /// Parse a PEM-encoded X.509 certificate.
    pub fn from_pem(pem: &str) -> Result<Self> {
        let parsed =
            pem::parse(pem).map_err(|e| CryptoError::CertificateDecode(e.to_string()))?;
        let cert = X509Certificate::from_der(parsed.contents())
            .map_err(|e| CryptoError::CertificateDecode(e.to_string()))?;

        let validity = &cert.tbs_certificate.validity;
        let not_before = DateTime::<Utc>::from(validity.not_before.to_system_time());
        let not_after = DateTime::<Utc>::from(validity.not_after.to_system_time());

        let subject_public_key = cert
            .tbs_certificate
            .subject_public_key_info
            .subject_public_key
            .raw_bytes()
            .to_vec();

        Ok(Self {
            pem: pem.to_string(),
            not_before,
            not_after,
            subject_public_key,
        })
    }

    /// Start of the certificate's validity window.
    pub fn not_before(&self) -> DateTime<Utc> {
        self.not_before
    }

    /// End of the certificate's validity window.
    pub fn not_after(&self) -> DateTime<Utc> {
        self.not_after
    }

    /// Whether `now` falls within `[not_before, not_after]`.
    pub fn is_currently_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.not_before <= now && now <= self.not_after
    }

    /// Whether the certificate is valid as of the current wall-clock time.
    pub fn is_currently_valid(&self) -> bool {
        self.is_currently_valid_at(Utc::now())
    }

    /// Seconds remaining until `not_after`, relative to `now`. Negative once expired.
    pub fn remaining_validity_seconds_at(&self, now: DateTime<Utc>) -> i64 {
        (self.not_after - now).num_seconds()
    }

    /// Seconds remaining until `not_after`, relative to the current wall-clock time.
    pub fn remaining_validity_seconds(&self) -> i64 {
        self.remaining_validity_seconds_at(Utc::now())
    }

    /// Total validity window length, in seconds.
    pub fn duration_seconds(&self) -> i64 {
        (self.not_after - self.not_before).num_seconds()
    }

    /// The original PEM text.
    pub fn pem(&self) -> &str {
        &self.pem
    }

    /// Re-derive the service fingerprint from the certificate's public key.
    ///
    /// The certified key is Ed25519 (32 raw bytes); it is reduced to its
    /// X25519 (Montgomery) form before hashing, exactly as `KeyHandler`
    /// derives a fingerprint from a local secret, so a certificate issued
    /// for a given key pair reports the same fingerprint that pair computes
    /// locally.
    pub fn service_fingerprint(&self) -> Result<String> {
        let bytes: [u8; 32] = self.subject_public_key.as_slice().try_into().map_err(|_| {
            CryptoError::CertificateDecode(format!(
                "certified public key must be 32 bytes, got {}",
                self.subject_public_key.len()
            ))
        })?;
        let verifying_key = VerifyingKey::from_bytes(&bytes)
            .map_err(|e| CryptoError::CertificateDecode(e.to_string()))?;
        let x25519_public = ed25519_public_to_x25519(&verifying_key);
        Ok(KeyHandler::fingerprint_of(&x25519_public))
    }

    /// The certified Ed25519 public key, base64-encoded.
    pub fn subject_public_key_base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(&self.subject_public_key)
    }
}
