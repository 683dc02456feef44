//! The client-configuration record for CoreVPN client sessions.
//!
//! This crate owns exactly one thing: the shape and freshness rule of the
//! "client config" blob fetched from `GET /vpn/clientconfig` (default
//! OpenVPN ports, always-reachable "holes" IPs, the server-refresh
//! cadence, and a feature-flag block). It is opaque to the certificate
//! lifecycle engine in `corevpn-session` - that crate fetches, caches and
//! serves staleness checks against it, but never interprets individual
//! flags itself.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

pub mod client_config;
pub mod error;
pub mod feature_flags;
pub mod ports;

pub use client_config::{ClientConfig, REFRESH_INTERVAL_SECS, REFRESH_RANDOMNESS};
pub use error::{ClientConfigError, Result};
pub use feature_flags::FeatureFlags;
pub use ports::OpenVpnPorts;
