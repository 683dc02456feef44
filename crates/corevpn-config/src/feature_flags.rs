//! The fixed-shape boolean feature-flag block carried by the client-configuration record.

use serde::{Deserialize, Serialize};

/// Feature flags, some of which are gated by account tier. Opaque to this
/// crate: callers interpret individual flags, this type only carries them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureFlags {
    /// NetShield ad/malware/tracker blocking.
    pub netshield: bool,
    /// "Guest holes" — always-on connectivity probes to a fixed IP set.
    pub guest_holes: bool,
    /// Whether the server catalog should be periodically refreshed.
    pub server_refresh: bool,
    /// Whether streaming-service logos should be shown in the server list UI.
    pub streaming_services_logos: bool,
    /// Port forwarding.
    pub port_forwarding: bool,
    /// Moderate NAT.
    pub moderate_nat: bool,
    /// Safe Mode (restrict LAN access while connected).
    pub safe_mode: bool,
    /// Auto-connect when the client starts at boot.
    pub start_connect_on_boot: bool,
    /// Poll the notification API for in-app announcements.
    pub poll_notification_api: bool,
    /// VPN Accelerator.
    pub vpn_accelerator: bool,
    /// Smart Reconnect.
    pub smart_reconnect: bool,
    /// Promo code redemption UI.
    pub promo_code: bool,
    /// WireGuard over TLS.
    pub wireguard_tls: bool,
}

#[derive(Deserialize)]
pub(crate) struct WireFeatureFlags {
    #[serde(rename = "NetShield")]
    netshield: bool,
    #[serde(rename = "GuestHoles")]
    guest_holes: bool,
    #[serde(rename = "ServerRefresh")]
    server_refresh: bool,
    #[serde(rename = "StreamingServicesLogos")]
    streaming_services_logos: bool,
    #[serde(rename = "PortForwarding")]
    port_forwarding: bool,
    #[serde(rename = "ModerateNAT")]
    moderate_nat: bool,
    #[serde(rename = "SafeMode")]
    safe_mode: bool,
    #[serde(rename = "StartConnectOnBoot")]
    start_connect_on_boot: bool,
    #[serde(rename = "PollNotificationAPI")]
    poll_notification_api: bool,
    #[serde(rename = "VpnAccelerator")]
    vpn_accelerator: bool,
    #[serde(rename = "SmartReconnect")]
    smart_reconnect: bool,
    #[serde(rename = "PromoCode")]
    promo_code: bool,
    #[serde(rename = "WireGuardTls")]
    wireguard_tls: bool,
}

impl From<WireFeatureFlags> for FeatureFlags {
    fn from(wire: WireFeatureFlags) -> Self {
        Self {
            netshield: wire.netshield,
            guest_holes: wire.guest_holes,
            server_refresh: wire.server_refresh,
            streaming_services_logos: wire.streaming_services_logos,
            port_forwarding: wire.port_forwarding,
            moderate_nat: wire.moderate_nat,
            safe_mode: wire.safe_mode,
            start_connect_on_boot: wire.start_connect_on_boot,
            poll_notification_api: wire.poll_notification_api,
            vpn_accelerator: wire.vpn_accelerator,
            smart_reconnect: wire.smart_reconnect,
            promo_code: wire.promo_code,
            wireguard_tls: wire.wireguard_tls,
        }
    }
}
