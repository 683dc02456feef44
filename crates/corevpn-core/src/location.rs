//! Wire record for `GET /vpn/location`.

use serde::{Deserialize, Serialize};

/// The account's currently observed network location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VPNLocation {
    /// Observed public IP address.
    pub ip: String,
    /// Latitude.
    pub lat: f64,
    /// Longitude.
    pub long: f64,
    /// ISO 3166-1 country code.
    pub country: String,
    /// ISP name.
    pub isp: String,
}
