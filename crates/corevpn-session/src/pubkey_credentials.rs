//! `PubkeyCredentials`: the guarded (certificate, secrets) pair.

use base64::Engine;
use chrono::{DateTime, Utc};
use corevpn_core::{VPNCertificate, VPNSecrets};
use corevpn_crypto::{Certificate, KeyHandler};

use crate::error::{Result, SessionError};

/// Remaining-validity floor used by `certificate_pem` and `wireguard_private_key`.
pub const MINIMUM_VALIDITY_PERIOD_SECS: i64 = 300;
/// Remaining-validity floor used by `openvpn_private_key`. Deliberately lower
/// than [`MINIMUM_VALIDITY_PERIOD_SECS`]; the difference is observable and
/// intentionally not unified (see the design notes in the project root).
pub const OPENVPN_MINIMUM_VALIDITY_PERIOD_SECS: i64 = 60;

struct Bundle {
    certificate_record: VPNCertificate,
    secrets: VPNSecrets,
    parsed: Certificate,
}

/// Guards access to the current certificate and its matching secrets.
///
/// A pure value object: it never reaches back into a session to trigger a
/// refresh. Accessors classify the bundle against wall-clock time and
/// either return the requested field or report the state
/// (`NotAvailable`/`Expired`/`NeedsRefresh`) for the caller to act on.
pub struct PubkeyCredentials {
    bundle: Option<Bundle>,
}

impl PubkeyCredentials {
    /// An empty set of credentials, as held before the first successful refresh.
    pub fn empty() -> Self {
        Self { bundle: None }
    }

    /// Construct credentials from a certificate record and matching secrets.
    ///
    /// Builds a [`KeyHandler`] from the secrets' Ed25519 seed, computes its
    /// X25519 fingerprint, parses the certificate PEM and computes the
    /// fingerprint embedded in the certified public key, and fails with
    /// [`SessionError::FingerprintMismatch`] if they disagree. This is the
    /// one invariant every construction path enforces, whether called
    /// right after a fetch or while rehydrating from the keyring.
    pub fn new(certificate_record: VPNCertificate, secrets: VPNSecrets) -> Result<Self> {
        let seed = base64::engine::general_purpose::STANDARD
            .decode(&secrets.ed25519_privatekey)
            .map_err(|e| SessionError::Crypto(corevpn_crypto::CryptoError::KeyDecode(e.to_string())))?;
        let key_handler = KeyHandler::from_seed(&seed)?;
        let fingerprint_from_secrets = key_handler.fingerprint();

        let parsed = Certificate::from_pem(&certificate_record.certificate)?;
        let fingerprint_from_certificate = parsed.service_fingerprint()?;

        if fingerprint_from_secrets != fingerprint_from_certificate {
            return Err(SessionError::FingerprintMismatch);
        }

        Ok(Self { bundle: Some(Bundle { certificate_record, secrets, parsed }) })
    }

    /// Whether a bundle is currently loaded at all.
    pub fn is_available(&self) -> bool {
        self.bundle.is_some()
    }

    /// The X.509 client certificate, in PEM, for client-based authentication.
    pub fn certificate_pem_at(&self, now: DateTime<Utc>) -> Result<&str> {
        let bundle = self.require_fresh_at(now, MINIMUM_VALIDITY_PERIOD_SECS)?;
        Ok(bundle.parsed.pem())
    }

    /// [`Self::certificate_pem_at`] evaluated at the current wall-clock time.
    pub fn certificate_pem(&self) -> Result<&str> {
        self.certificate_pem_at(Utc::now())
    }

    /// The WireGuard private key, base64-encoded.
    pub fn wireguard_private_key_at(&self, now: DateTime<Utc>) -> Result<&str> {
        let bundle = self.require_fresh_at(now, MINIMUM_VALIDITY_PERIOD_SECS)?;
        Ok(&bundle.secrets.wireguard_privatekey)
    }

    /// [`Self::wireguard_private_key_at`] evaluated at the current wall-clock time.
    pub fn wireguard_private_key(&self) -> Result<&str> {
        self.wireguard_private_key_at(Utc::now())
    }

    /// The OpenVPN private key, as a PKCS#8 PEM document.
    ///
    /// Uses the lower [`OPENVPN_MINIMUM_VALIDITY_PERIOD_SECS`] floor.
    pub fn openvpn_private_key_at(&self, now: DateTime<Utc>) -> Result<&str> {
        let bundle = self.require_fresh_at(now, OPENVPN_MINIMUM_VALIDITY_PERIOD_SECS)?;
        Ok(&bundle.secrets.openvpn_privatekey)
    }

    /// [`Self::openvpn_private_key_at`] evaluated at the current wall-clock time.
    pub fn openvpn_private_key(&self) -> Result<&str> {
        self.openvpn_private_key_at(Utc::now())
    }

    /// The raw Ed25519 private key seed.
    ///
    /// Unlike the other accessors this never fails on expiry: a
    /// [`crate::session::SessionCore`] refresh needs the seed of an
    /// *expired* bundle in order to keep the client's long-lived
    /// fingerprint stable across re-issuance.
    pub fn ed25519_private_key_raw(&self) -> Result<Vec<u8>> {
        let bundle = self.bundle.as_ref().ok_or(SessionError::NotAvailable)?;
        base64::engine::general_purpose::STANDARD
            .decode(&bundle.secrets.ed25519_privatekey)
            .map_err(|e| SessionError::Crypto(corevpn_crypto::CryptoError::KeyDecode(e.to_string())))
    }

    /// The wire-provided `ClientKeyFingerprint`, for informational cross-checks.
    ///
    /// Not used by the constructor's own invariant (which compares the
    /// locally-derived fingerprint against the certificate's certified
    /// key), but available to callers that want an extra safety net.
    pub fn wire_fingerprint(&self) -> Option<&str> {
        self.bundle.as_ref().map(|b| b.certificate_record.client_key_fingerprint.as_str())
    }

    /// The underlying certificate wire record, for serialization.
    pub fn certificate_record(&self) -> Option<&VPNCertificate> {
        self.bundle.as_ref().map(|b| &b.certificate_record)
    }

    /// The underlying secrets record, for serialization.
    pub fn secrets(&self) -> Option<&VPNSecrets> {
        self.bundle.as_ref().map(|b| &b.secrets)
    }

    /// Remaining validity, in seconds, relative to `now`. `None` if no bundle is loaded.
    pub fn remaining_validity_seconds_at(&self, now: DateTime<Utc>) -> Option<i64> {
        self.bundle.as_ref().map(|b| b.parsed.remaining_validity_seconds_at(now))
    }

    /// [`Self::remaining_validity_seconds_at`] evaluated at the current wall-clock time.
    pub fn remaining_validity_seconds(&self) -> Option<i64> {
        self.remaining_validity_seconds_at(Utc::now())
    }

    /// Total certificate validity window length, in seconds. `None` if no bundle is loaded.
    pub fn duration_seconds(&self) -> Option<i64> {
        self.bundle.as_ref().map(|b| b.parsed.duration_seconds())
    }

    fn require_fresh_at(&self, now: DateTime<Utc>, floor_secs: i64) -> Result<&Bundle> {
        let bundle = self.bundle.as_ref().ok_or(SessionError::NotAvailable)?;
        if !bundle.parsed.is_currently_valid_at(now) {
            return Err(SessionError::Expired);
        }
        if bundle.parsed.remaining_validity_seconds_at(now) <= floor_secs {
            return Err(SessionError::NeedsRefresh);
        }
        Ok(bundle)
    }
}

impl Clone for PubkeyCredentials {
    fn clone(&self) -> Self {
        match &self.bundle {
            None => Self::empty(),
            Some(bundle) => Self {
                bundle: Some(Bundle {
                    certificate_record: bundle.certificate_record.clone(),
                    secrets: bundle.secrets.clone(),
                    parsed: bundle.parsed.clone(),
                }),
            },
        }
    }
}
