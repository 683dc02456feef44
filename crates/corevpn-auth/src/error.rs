//! Authentication error types

use thiserror::Error;

/// Result type for authentication operations
pub type Result<T> = std::result::Result<T, AuthError>;

/// Errors surfaced by the authenticated-session collaborator.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    /// The session's token/cookies are no longer valid; the caller must re-login.
    #[error("authentication required")]
    AuthenticationNeeded,

    /// The transport or remote API reported a non-success outcome.
    #[error("api error (status {status}): {message}")]
    ApiError {
        /// HTTP-style status code, or a collaborator-defined equivalent.
        status: u16,
        /// Remote error message or code.
        message: String,
    },

    /// A two-factor code was rejected.
    #[error("two-factor code rejected")]
    InvalidTwoFactorCode,
}
