//! Default OpenVPN port lists carried by the client-configuration record.

use serde::{Deserialize, Serialize};

/// Default OpenVPN ports advertised by the client-configuration record.
///
/// These are merely defaults surfaced to the tunnel stack; this crate never
/// opens a socket or validates reachability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenVpnPorts {
    /// Default UDP ports, in the order the API returned them.
    pub udp: Vec<u16>,
    /// Default TCP ports, in the order the API returned them.
    pub tcp: Vec<u16>,
}

#[derive(Deserialize)]
pub(crate) struct WireDefaultPorts {
    #[serde(rename = "UDP")]
    udp: Vec<u16>,
    #[serde(rename = "TCP")]
    tcp: Vec<u16>,
}

impl From<WireDefaultPorts> for OpenVpnPorts {
    fn from(wire: WireDefaultPorts) -> Self {
        Self { udp: wire.udp, tcp: wire.tcp }
    }
}
