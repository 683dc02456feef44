//! Key handling and certificate parsing for CoreVPN client sessions.
//!
//! This crate provides the cryptographic foundation the session layer
//! builds on: Ed25519 key pair management with a derived X25519
//! equivalent, and read-only X.509 certificate parsing. It does not issue
//! certificates, run a key exchange protocol, or encrypt data channel
//! traffic - all of that lives on the server or in the tunnel stack.
//!
//! # Security Principles
//! - All key material implements `Zeroize` for secure memory clearing
//! - No custom cryptography - only well-audited implementations

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

pub mod cert;
pub mod error;
pub mod keys;

pub use cert::Certificate;
pub use error::{CryptoError, Result};
pub use keys::{ed25519_public_to_x25519, KeyHandler};
