//! Credential/certificate lifecycle engine for CoreVPN client sessions.
//!
//! Ties the account's entitlement record, its certificate-based
//! credentials, and its client-configuration record together behind a
//! single refresh pipeline with an injected authenticated-session
//! collaborator (`corevpn-auth`), a keyring collaborator, and an
//! ancillary-cache collaborator. Everything server-side - issuing
//! certificates, running the data plane, rendering OpenVPN/WireGuard
//! config files - lives outside this crate.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

pub mod account;
pub mod cache;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod keyring;
pub mod login;
pub mod pubkey_credentials;
pub mod session;

pub use account::VPNAccount;
pub use cache::{AncillaryCache, FileCache, InMemoryCache};
pub use config::SessionConfig;
pub use error::{Result, SessionError};
pub use fetcher::Fetcher;
pub use keyring::{Keyring, InMemoryKeyring};
pub use login::LoginResult;
pub use pubkey_credentials::{
    PubkeyCredentials, MINIMUM_VALIDITY_PERIOD_SECS, OPENVPN_MINIMUM_VALIDITY_PERIOD_SECS,
};
pub use session::SessionCore;
