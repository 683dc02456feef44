//! Wire record for `GET /vpn/sessions`.
//!
//! Informational, read-only view of the account's other active VPN
//! sessions on the infrastructure; never written back, only fetched and
//! surfaced for display.

use serde::{Deserialize, Serialize};

/// One active session reported by the infrastructure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct APIVPNSession {
    /// Session identifier.
    #[serde(rename = "SessionID")]
    pub session_id: String,
    /// Exit IP used by the session.
    #[serde(rename = "ExitIP")]
    pub exit_ip: String,
    /// Protocol in use (e.g. "openvpn-udp", "wireguard").
    #[serde(rename = "Protocol")]
    pub protocol: String,
}

/// Ordered list of the account's active sessions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VPNSessions {
    /// The sessions, in the order returned by the API.
    #[serde(rename = "Sessions")]
    pub sessions: Vec<APIVPNSession>,
}

impl VPNSessions {
    /// Number of currently active sessions.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether there are no active sessions.
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
