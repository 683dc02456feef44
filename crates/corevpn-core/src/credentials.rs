//! Data-plane username/password projection.

/// The data-plane (OpenVPN username/password mode) credential pair.
///
/// A thin projection of `VPNInfo`, as distinct from the certificate-based
/// credential pair held by `PubkeyCredentials`.
#[derive(Clone, PartialEq, Eq)]
pub struct UserPassCredentials {
    /// Equal to `VPNInfo::name`.
    pub username: String,
    /// Equal to `VPNInfo::password`.
    pub password: String,
}

impl std::fmt::Debug for UserPassCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserPassCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl UserPassCredentials {
    /// Project from the account's `name`/`password` fields.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self { username: username.into(), password: password.into() }
    }
}
