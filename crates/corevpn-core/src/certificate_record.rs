//! Wire record for `POST /vpn/v1/certificate`.

use serde::{Deserialize, Serialize};

/// The certificate record as returned by the certificate endpoint.
///
/// Field names are bit-exact with the wire format and must not be renamed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct VPNCertificate {
    /// Serial number of the issued certificate.
    pub serial_number: String,
    /// Service-defined fingerprint of the client key the certificate was issued for.
    pub client_key_fingerprint: String,
    /// The client's Ed25519 public key, in SubjectPublicKeyInfo PEM, as sent in the request.
    pub client_key: String,
    /// The issued X.509 certificate, in PEM.
    pub certificate: String,
    /// Certificate expiration epoch (seconds).
    pub expiration_time: i64,
    /// Epoch (seconds) after which the client should proactively refresh; always < expiration.
    pub refresh_time: i64,
    /// Certificate mode (e.g. the key usage/auth mode it was issued for).
    pub mode: String,
    /// Device name the certificate was issued for.
    pub device_name: String,
    /// Mode of the accompanying server public key.
    pub server_public_key_mode: String,
    /// The server's public key, matching `server_public_key_mode`.
    pub server_public_key: String,
}

/// Request body for `POST /vpn/v1/certificate`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CertificateRequest {
    /// The client's Ed25519 public key, as a SubjectPublicKeyInfo PEM document.
    pub client_public_key: String,
    /// Requested validity duration, formatted as `"<N> min"`.
    pub duration: String,
    /// Opaque feature-flag payload, omitted when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub features: Option<serde_json::Value>,
}

/// Default requested certificate validity, in minutes.
pub const DEFAULT_CERTIFICATE_DURATION_MINUTES: u32 = 1440;

impl CertificateRequest {
    /// Build a request for the default validity duration.
    pub fn new(client_public_key: String) -> Self {
        Self::with_duration(client_public_key, DEFAULT_CERTIFICATE_DURATION_MINUTES)
    }

    /// Build a request for an explicit validity duration, in minutes.
    pub fn with_duration(client_public_key: String, duration_minutes: u32) -> Self {
        Self {
            client_public_key,
            duration: format!("{duration_minutes} min"),
            features: None,
        }
    }

    /// Attach an opaque feature-flag payload to the request.
    pub fn with_features(mut self, features: serde_json::Value) -> Self {
        self.features = Some(features);
        self
    }
}
