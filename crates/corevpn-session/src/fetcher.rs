//! Thin, instrumented wrappers over `AuthenticatedSession::async_request`
//! for each endpoint the session core needs.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use corevpn_auth::AuthenticatedSession;
use corevpn_config::ClientConfig;
use corevpn_core::{CertificateRequest, VPNCertificate, VPNInfo, VPNLocation, VPNSessions};
use serde_json::Value;

use crate::error::Result;

const ROUTE_VPN_INFO: &str = "/vpn";
const ROUTE_CERTIFICATE: &str = "/vpn/v1/certificate";
const ROUTE_LOCATION: &str = "/vpn/location";
const ROUTE_SESSIONS: &str = "/vpn/sessions";
const ROUTE_CLIENT_CONFIG: &str = "/vpn/clientconfig";

/// Issues the session core's remote reads through an injected
/// [`AuthenticatedSession`], decoding each response into its typed record.
///
/// Holds no state of its own; every call is independently routed through
/// `async_request`, so two fetches can run concurrently via `tokio::try_join!`
/// without the fetcher needing to coordinate anything.
pub struct Fetcher {
    session: Arc<dyn AuthenticatedSession>,
}

impl Fetcher {
    /// Wrap an authenticated-session collaborator.
    pub fn new(session: Arc<dyn AuthenticatedSession>) -> Self {
        Self { session }
    }

    /// `GET /vpn`: the account entitlement record.
    #[tracing::instrument(skip(self))]
    pub async fn fetch_vpn_info(&self) -> Result<VPNInfo> {
        let body = self.session.async_request(ROUTE_VPN_INFO, None, false).await?;
        Ok(VPNInfo::from_wire_json(&body)?)
    }

    /// `POST /vpn/v1/certificate`: request a fresh certificate for `client_public_key_pem`.
    #[tracing::instrument(skip(self, client_public_key_pem, features))]
    pub async fn fetch_certificate(
        &self,
        client_public_key_pem: String,
        duration_minutes: u32,
        features: Option<Value>,
    ) -> Result<VPNCertificate> {
        let mut request = CertificateRequest::with_duration(client_public_key_pem, duration_minutes);
        if let Some(features) = features {
            request = request.with_features(features);
        }
        let body = self
            .session
            .async_request(ROUTE_CERTIFICATE, Some(serde_json::to_value(&request)?), false)
            .await?;
        Ok(serde_json::from_value(body)?)
    }

    /// `GET /vpn/location`: the account's currently observed network location.
    #[tracing::instrument(skip(self))]
    pub async fn fetch_location(&self) -> Result<VPNLocation> {
        let body = self.session.async_request(ROUTE_LOCATION, None, false).await?;
        Ok(serde_json::from_value(body)?)
    }

    /// `GET /vpn/sessions`: the account's currently active data-plane sessions.
    #[tracing::instrument(skip(self))]
    pub async fn fetch_sessions(&self) -> Result<VPNSessions> {
        let body = self.session.async_request(ROUTE_SESSIONS, None, false).await?;
        Ok(serde_json::from_value(body)?)
    }

    /// `GET /vpn/clientconfig`: feature flags, default ports, refresh cadence.
    #[tracing::instrument(skip(self))]
    pub async fn fetch_client_config(&self, now: DateTime<Utc>) -> Result<ClientConfig> {
        let body = self.session.async_request(ROUTE_CLIENT_CONFIG, None, false).await?;
        Ok(ClientConfig::from_wire_json(&body, now)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use corevpn_auth::InMemoryAuthSession;
    use serde_json::json;

    #[tokio::test]
    async fn fetches_vpn_info() {
        let session = Arc::new(InMemoryAuthSession::new("jdoe", "hunter2"));
        session.authenticate("jdoe", "hunter2").await.unwrap();
        session.set_response(
            "/vpn",
            json!({
                "VPN": {
                    "ExpirationTime": 1, "Name": "jdoe", "Password": "p", "GroupID": "g",
                    "Status": 1, "PlanName": "vpnplus", "PlanTitle": "VPN Plus", "MaxTier": 2,
                    "MaxConnect": 10, "Groups": [], "NeedConnectionAllocation": false
                },
                "Delinquent": 0
            }),
        );
        let fetcher = Fetcher::new(session);
        let info = fetcher.fetch_vpn_info().await.unwrap();
        assert_eq!(info.name, "jdoe");
    }

    #[tokio::test]
    async fn fetches_certificate_with_features() {
        let session = Arc::new(InMemoryAuthSession::new("jdoe", "hunter2"));
        session.authenticate("jdoe", "hunter2").await.unwrap();
        session.set_response(
            "/vpn/v1/certificate",
            json!({
                "SerialNumber": "1", "ClientKeyFingerprint": "fp", "ClientKey": "pem",
                "Certificate": "cert-pem", "ExpirationTime": 1, "RefreshTime": 1,
                "Mode": "ed25519", "DeviceName": "laptop", "ServerPublicKeyMode": "x25519",
                "ServerPublicKey": "srv"
            }),
        );
        let fetcher = Fetcher::new(session);
        let cert = fetcher
            .fetch_certificate("pem".to_string(), 1440, Some(json!({"a": 1})))
            .await
            .unwrap();
        assert_eq!(cert.serial_number, "1");
    }

    #[tokio::test]
    async fn propagates_authentication_needed() {
        let session = Arc::new(InMemoryAuthSession::new("jdoe", "hunter2"));
        let fetcher = Fetcher::new(session);
        let err = fetcher.fetch_location().await.unwrap_err();
        assert!(matches!(err, crate::error::SessionError::AuthenticationNeeded));
    }

    #[tokio::test]
    async fn fetches_client_config() {
        let session = Arc::new(InMemoryAuthSession::new("jdoe", "hunter2"));
        session.authenticate("jdoe", "hunter2").await.unwrap();
        session.set_response(
            "/vpn/clientconfig",
            json!({
                "OpenVPNConfig": {"DefaultPorts": {"UDP": [80], "TCP": [443]}},
                "HolesIPs": ["10.0.0.1"],
                "ServerRefreshInterval": 10800,
                "FeatureFlags": {},
                "ExpirationTime": 9_999_999_999i64
            }),
        );
        let fetcher = Fetcher::new(session);
        let config = fetcher.fetch_client_config(Utc::now()).await.unwrap();
        assert_eq!(config.holes_ips, vec!["10.0.0.1".to_string()]);
    }
}
