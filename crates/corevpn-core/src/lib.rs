//! Wire-shaped data model for a CoreVPN client account.
//!
//! These types mirror the remote account records byte-for-byte where the
//! specification calls for it (certificate request/response field names in
//! particular); they carry no policy beyond plain projections such as
//! `VPNInfo::is_delinquent`.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

pub mod certificate_record;
pub mod credentials;
pub mod error;
pub mod location;
pub mod secrets;
pub mod sessions;
pub mod vpn_info;

pub use certificate_record::{
    CertificateRequest, VPNCertificate, DEFAULT_CERTIFICATE_DURATION_MINUTES,
};
pub use credentials::UserPassCredentials;
pub use error::{CoreError, Result};
pub use location::VPNLocation;
pub use secrets::VPNSecrets;
pub use sessions::{APIVPNSession, VPNSessions};
pub use vpn_info::VPNInfo;
