//! Account-level VPN entitlement record (`GET /vpn`).

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Mirrors the remote account record returned by `GET /vpn`.
///
/// Immutable once constructed; a refresh always replaces it wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VPNInfo {
    /// Account display name.
    pub name: String,
    /// Data-plane (OpenVPN username/password mode) password.
    pub password: String,
    /// Group identifier for the account.
    pub group_id: String,
    /// Account status code.
    pub status: i64,
    /// Plan identifier.
    pub plan_name: String,
    /// Human-readable plan title.
    pub plan_title: String,
    /// Maximum tier this account can connect to.
    pub max_tier: i64,
    /// Maximum number of simultaneous sessions on the infrastructure.
    pub max_connect: i64,
    /// Groups this account belongs to.
    pub groups: Vec<String>,
    /// Delinquency level; a value greater than 2 means the account is delinquent.
    pub delinquent: i64,
    /// Account expiration epoch (seconds).
    pub expiration_time: i64,
    /// Server-side signal that address allocation is pending. Surfaced, not acted upon.
    pub need_connection_allocation: bool,
}

impl VPNInfo {
    /// Whether the account is delinquent (`delinquent > 2`).
    pub fn is_delinquent(&self) -> bool {
        self.delinquent > 2
    }

    /// Parse a `GET /vpn` response body.
    ///
    /// The wire shape nests the per-account fields under a `VPN` object and
    /// carries `Delinquent` (and a few account-wide fields this core does
    /// not project) alongside it; this flattens that envelope into a single
    /// record.
    pub fn from_wire_json(value: &serde_json::Value) -> Result<Self> {
        let envelope: VpnInfoEnvelope =
            serde_json::from_value(value.clone()).map_err(CoreError::MalformedVpnInfo)?;
        Ok(Self {
            name: envelope.vpn.name,
            password: envelope.vpn.password,
            group_id: envelope.vpn.group_id,
            status: envelope.vpn.status,
            plan_name: envelope.vpn.plan_name,
            plan_title: envelope.vpn.plan_title,
            max_tier: envelope.vpn.max_tier,
            max_connect: envelope.vpn.max_connect,
            groups: envelope.vpn.groups,
            delinquent: envelope.delinquent,
            expiration_time: envelope.vpn.expiration_time,
            need_connection_allocation: envelope.vpn.need_connection_allocation,
        })
    }
}

#[derive(Deserialize)]
struct VpnInfoEnvelope {
    #[serde(rename = "VPN")]
    vpn: VpnInfoInner,
    #[serde(rename = "Delinquent")]
    delinquent: i64,
}

#[derive(Deserialize)]
struct VpnInfoInner {
    #[serde(rename = "ExpirationTime")]
    expiration_time: i64,
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Password")]
    password: String,
    #[serde(rename = "GroupID")]
    group_id: String,
    #[serde(rename = "Status")]
    status: i64,
    #[serde(rename = "PlanName")]
    plan_name: String,
    #[serde(rename = "PlanTitle")]
    plan_title: String,
    #[serde(rename = "MaxTier")]
    max_tier: i64,
    #[serde(rename = "MaxConnect")]
    max_connect: i64,
    #[serde(rename = "Groups")]
    groups: Vec<String>,
    #[serde(rename = "NeedConnectionAllocation")]
    need_connection_allocation: bool,
}
