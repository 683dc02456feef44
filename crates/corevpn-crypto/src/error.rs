//! Cryptographic error types

use thiserror::Error;

/// Result type for cryptographic operations
pub type Result<T> = std::result::Result<T, CryptoError>;

/// Cryptographic errors
#[derive(Debug, Error)]
pub enum CryptoError {
    /// An Ed25519 seed or PKCS#8 PEM key could not be decoded
    #[error("key decode error: {0}")]
    KeyDecode(String),

    /// An X.509 certificate PEM blob could not be decoded or was malformed
    #[error("certificate decode error: {0}")]
    CertificateDecode(String),
}
