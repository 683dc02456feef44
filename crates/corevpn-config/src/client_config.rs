//! The client-configuration record (`GET /vpn/clientconfig`).
//!
//! Opaque to the credential/certificate lifecycle engine: fetched and
//! cached alongside the account bundle, but governed by its own freshness
//! rule rather than the certificate's fingerprint/validity invariants.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{ClientConfigError, Result};
use crate::feature_flags::{FeatureFlags, WireFeatureFlags};
use crate::ports::{OpenVpnPorts, WireDefaultPorts};

/// Base refresh interval before jitter: 3 hours.
pub const REFRESH_INTERVAL_SECS: i64 = 3 * 60 * 60;
/// Jitter applied to the base interval: +/- 22%.
pub const REFRESH_RANDOMNESS: f64 = 0.22;

/// Default client configuration, used when no value has ever been fetched
/// or cached. Mirrors the constant baked into the reference client.
pub const DEFAULT_CLIENT_CONFIG_JSON: &str = r#"{
    "OpenVPNConfig": {
        "DefaultPorts": {
            "UDP": [80, 51820, 4569, 1194, 5060],
            "TCP": [443, 7770, 8443]
        }
    },
    "HolesIPs": ["62.112.9.168", "104.245.144.186"],
    "ServerRefreshInterval": 10,
    "FeatureFlags": {
        "NetShield": false,
        "GuestHoles": false,
        "ServerRefresh": true,
        "StreamingServicesLogos": true,
        "PortForwarding": false,
        "ModerateNAT": true,
        "SafeMode": false,
        "StartConnectOnBoot": true,
        "PollNotificationAPI": true,
        "VpnAccelerator": true,
        "SmartReconnect": true,
        "PromoCode": false,
        "WireGuardTls": true
    }
}"#;

/// General configuration used to connect to VPN servers: default ports,
/// always-reachable "holes" IPs, the server-catalog refresh cadence, and a
/// fixed-shape feature-flag block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Default OpenVPN UDP/TCP ports.
    pub openvpn_ports: OpenVpnPorts,
    /// IPs that should remain reachable even while the VPN tunnel is active.
    pub holes_ips: Vec<String>,
    /// How often the server catalog should be refreshed, in seconds.
    pub server_refresh_interval: i64,
    /// Account feature-flag block.
    pub feature_flags: FeatureFlags,
    /// Epoch (seconds) at which this record should be considered stale.
    pub expiration_time: i64,
}

impl ClientConfig {
    /// Parse a `GET /vpn/clientconfig` response body.
    ///
    /// If the response carries no `ExpirationTime`, one is computed from
    /// `now` plus a jittered refresh interval and baked into the returned
    /// value, so repeated freshness checks against the stored record are
    /// deterministic.
    pub fn from_wire_json(value: &serde_json::Value, now: DateTime<Utc>) -> Result<Self> {
        let wire: WireClientConfig = serde_json::from_value(value.clone())
            .map_err(|e| ClientConfigError::ClientConfigDecode(e.to_string()))?;

        let expiration_time = wire.expiration_time.unwrap_or_else(|| expiration_epoch(now));

        Ok(Self {
            openvpn_ports: wire.openvpn_config.default_ports.into(),
            holes_ips: wire.holes_ips,
            server_refresh_interval: wire.server_refresh_interval,
            feature_flags: wire.feature_flags.into(),
            expiration_time,
        })
    }

    /// The built-in default configuration, with a freshly jittered expiration.
    pub fn default_at(now: DateTime<Utc>) -> Self {
        let value: serde_json::Value = serde_json::from_str(DEFAULT_CLIENT_CONFIG_JSON)
            .expect("DEFAULT_CLIENT_CONFIG_JSON is a valid, fixed literal");
        Self::from_wire_json(&value, now).expect("DEFAULT_CLIENT_CONFIG_JSON matches the wire shape")
    }

    /// The built-in default configuration, using the current wall-clock time.
    pub fn default() -> Self {
        Self::default_at(Utc::now())
    }

    /// Whether this record is stale as of `now` (`now > expiration_time`).
    pub fn is_stale_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() > self.expiration_time
    }

    /// Whether this record is stale as of the current wall-clock time.
    pub fn is_stale(&self) -> bool {
        self.is_stale_at(Utc::now())
    }

    /// Seconds remaining until this record is considered stale, relative to `now`.
    ///
    /// Never negative; clamped to zero once past expiration.
    pub fn seconds_until_stale_at(&self, now: DateTime<Utc>) -> i64 {
        (self.expiration_time - now.timestamp()).max(0)
    }
}

/// Epoch (seconds) at which a client config fetched at `now` should expire:
/// `now + REFRESH_INTERVAL_SECS * (1 +/- REFRESH_RANDOMNESS)`.
pub fn expiration_epoch(now: DateTime<Utc>) -> i64 {
    let jitter = 1.0 + REFRESH_RANDOMNESS * (2.0 * rand::thread_rng().gen::<f64>() - 1.0);
    let interval = (REFRESH_INTERVAL_SECS as f64 * jitter).round() as i64;
    now.timestamp() + interval
}

#[derive(Deserialize)]
struct WireClientConfig {
    #[serde(rename = "OpenVPNConfig")]
    openvpn_config: WireOpenVpnConfig,
    #[serde(rename = "HolesIPs")]
    holes_ips: Vec<String>,
    #[serde(rename = "ServerRefreshInterval")]
    server_refresh_interval: i64,
    #[serde(rename = "FeatureFlags")]
    feature_flags: WireFeatureFlags,
    #[serde(rename = "ExpirationTime")]
    expiration_time: Option<i64>,
}

#[derive(Deserialize)]
struct WireOpenVpnConfig {
    #[serde(rename = "DefaultPorts")]
    default_ports: WireDefaultPorts,
}
