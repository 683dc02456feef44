//! `VPNAccount`: the full account aggregate held by a session.

use corevpn_core::{UserPassCredentials, VPNCertificate, VPNInfo, VPNLocation, VPNSecrets};
use serde_json::{json, Value};

use crate::error::{Result, SessionError};
use crate::pubkey_credentials::PubkeyCredentials;

/// Everything a session knows about the logged-in account: its entitlement
/// record, its certificate-based credentials, and its last observed network
/// location.
///
/// Cloning is cheap relative to the data involved (no network I/O, no
/// re-parsing); [`crate::session::SessionCore`] stores this behind an
/// `ArcSwapOption` and clones out an `Arc` snapshot on each read.
#[derive(Clone)]
pub struct VPNAccount {
    info: VPNInfo,
    credentials: PubkeyCredentials,
    location: Option<VPNLocation>,
}

impl VPNAccount {
    /// Assemble an account from its three independently-fetched parts.
    pub fn new(info: VPNInfo, credentials: PubkeyCredentials, location: Option<VPNLocation>) -> Self {
        Self { info, credentials, location }
    }

    /// The account's entitlement record.
    pub fn info(&self) -> &VPNInfo {
        &self.info
    }

    /// Maximum tier this account can connect to.
    pub fn max_tier(&self) -> i64 {
        self.info.max_tier
    }

    /// Maximum number of simultaneous sessions.
    pub fn max_connections(&self) -> i64 {
        self.info.max_connect
    }

    /// Whether the account is delinquent (`delinquent > 2`).
    pub fn delinquent(&self) -> bool {
        self.info.is_delinquent()
    }

    /// The account's last observed network location, if one has been fetched.
    pub fn location(&self) -> Option<&VPNLocation> {
        self.location.as_ref()
    }

    /// The certificate-based credential pair.
    pub fn pubkey_credentials(&self) -> &PubkeyCredentials {
        &self.credentials
    }

    /// The data-plane username/password pair, projected from `info`.
    pub fn userpass_credentials(&self) -> UserPassCredentials {
        UserPassCredentials::new(self.info.name.clone(), self.info.password.clone())
    }

    /// Serialize into the persisted-state layout used by the keyring and
    /// ancillary cache:
    ///
    /// ```json
    /// {
    ///   "vpn": {
    ///     "vpninfo": { ... },
    ///     "certcreds": { "api_certificate": { ... }, "secrets": { ... } }
    ///   },
    ///   "location": { ... }
    /// }
    /// ```
    ///
    /// Absent credentials or location serialize as JSON `null` in their slot.
    pub fn to_persisted_value(&self) -> Result<Value> {
        let certcreds = match (self.credentials.certificate_record(), self.credentials.secrets()) {
            (Some(cert), Some(secrets)) => json!({
                "api_certificate": cert,
                "secrets": secrets,
            }),
            _ => Value::Null,
        };

        Ok(json!({
            "vpn": {
                "vpninfo": self.info,
                "certcreds": certcreds,
            },
            "location": self.location,
        }))
    }

    /// Reconstruct an account from the persisted-state layout produced by
    /// [`Self::to_persisted_value`].
    ///
    /// Reruns the [`PubkeyCredentials`] fingerprint check; a cache file that
    /// was hand-edited or corrupted between writes surfaces as
    /// [`SessionError::FingerprintMismatch`] rather than silently installing
    /// mismatched secrets.
    pub fn from_persisted_value(value: &Value) -> Result<Self> {
        let vpn = value.get("vpn").ok_or_else(|| {
            SessionError::MalformedState("missing `vpn` key in persisted account state".to_string())
        })?;
        let vpninfo = vpn.get("vpninfo").ok_or_else(|| {
            SessionError::MalformedState("missing `vpn.vpninfo` key in persisted account state".to_string())
        })?;
        let info: VPNInfo = serde_json::from_value(vpninfo.clone())?;

        let credentials = match vpn.get("certcreds") {
            None | Some(Value::Null) => PubkeyCredentials::empty(),
            Some(certcreds) => {
                let api_certificate = certcreds.get("api_certificate").ok_or_else(|| {
                    SessionError::MalformedState(
                        "missing `vpn.certcreds.api_certificate` in persisted account state".to_string(),
                    )
                })?;
                let secrets_value = certcreds.get("secrets").ok_or_else(|| {
                    SessionError::MalformedState(
                        "missing `vpn.certcreds.secrets` in persisted account state".to_string(),
                    )
                })?;
                let cert: VPNCertificate = serde_json::from_value(api_certificate.clone())?;
                let secrets: VPNSecrets = serde_json::from_value(secrets_value.clone())?;
                PubkeyCredentials::new(cert, secrets)?
            }
        };

        let location = match value.get("location") {
            None | Some(Value::Null) => None,
            Some(loc) => Some(serde_json::from_value::<VPNLocation>(loc.clone())?),
        };

        Ok(Self { info, credentials, location })
    }
}
