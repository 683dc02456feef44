//! The semantic error taxonomy for the credential/certificate lifecycle engine.
//!
//! This wraps each collaborator crate's own error type and adds the kinds
//! that only make sense at the session layer: bundle absence, expiry, the
//! refresh window, and fingerprint mismatch.

use thiserror::Error;

/// Result type for session-core operations.
pub type Result<T> = std::result::Result<T, SessionError>;

/// Errors produced by the credential/certificate lifecycle engine.
#[derive(Debug, Error)]
pub enum SessionError {
    /// No bundle is loaded at all.
    #[error("no credential bundle is available; call refresh() first")]
    NotAvailable,

    /// A bundle is present but `now > not_after`.
    #[error("certificate bundle has expired")]
    Expired,

    /// A bundle is present but remaining validity is at or below the accessor's floor.
    #[error("certificate bundle needs a refresh")]
    NeedsRefresh,

    /// The secrets' derived fingerprint disagrees with the certificate's.
    #[error("certificate and secrets fingerprints do not match")]
    FingerprintMismatch,

    /// An X.509 certificate PEM blob or an Ed25519 key could not be decoded.
    /// Carries the underlying `CryptoError`, which distinguishes the two cases.
    #[error(transparent)]
    Crypto(#[from] corevpn_crypto::CryptoError),

    /// A wire record could not be decoded.
    #[error(transparent)]
    Deserialize(#[from] corevpn_core::CoreError),

    /// The client-configuration record could not be decoded.
    #[error(transparent)]
    ClientConfigDecode(#[from] corevpn_config::ClientConfigError),

    /// The transport or remote API reported a non-success outcome.
    #[error("api error (status {status}): {message}")]
    ApiError {
        /// HTTP-style status code, or a collaborator-defined equivalent.
        status: u16,
        /// Remote error message or code.
        message: String,
    },

    /// The session's token/cookies are no longer valid; the caller must re-login.
    #[error("authentication required")]
    AuthenticationNeeded,

    /// The keyring or ancillary-cache collaborator failed.
    #[error("persistence error: {0}")]
    Persistence(String),

    /// A raw JSON value did not match the persisted-state layout.
    #[error("malformed persisted account state: {0}")]
    MalformedState(String),
}

impl From<corevpn_auth::AuthError> for SessionError {
    fn from(err: corevpn_auth::AuthError) -> Self {
        match err {
            corevpn_auth::AuthError::AuthenticationNeeded => SessionError::AuthenticationNeeded,
            corevpn_auth::AuthError::ApiError { status, message } => {
                SessionError::ApiError { status, message }
            }
            corevpn_auth::AuthError::InvalidTwoFactorCode => {
                SessionError::ApiError { status: 422, message: err.to_string() }
            }
        }
    }
}

impl From<serde_json::Error> for SessionError {
    fn from(err: serde_json::Error) -> Self {
        SessionError::MalformedState(err.to_string())
    }
}

impl From<toml::de::Error> for SessionError {
    fn from(err: toml::de::Error) -> Self {
        SessionError::MalformedState(err.to_string())
    }
}
