//! The outcome of a login attempt.

/// Result of a single `authenticate`/`provide_2fa` call against a
/// [`crate::session::SessionCore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoginResult {
    /// Whether the credentials (or 2FA code) were accepted.
    pub success: bool,
    /// Whether the session is now fully authenticated (no pending 2FA).
    pub authenticated: bool,
    /// Whether a 2FA code is now required to complete authentication.
    pub twofa_required: bool,
}

impl LoginResult {
    pub(crate) fn from_session(success: bool, authenticated: bool, twofa_required: bool) -> Self {
        Self { success, authenticated, twofa_required }
    }
}
