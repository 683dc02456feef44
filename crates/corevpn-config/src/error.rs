//! Client-configuration error types

use thiserror::Error;

/// Result type for client-configuration operations
pub type Result<T> = std::result::Result<T, ClientConfigError>;

/// Errors produced while decoding a client-configuration record from wire JSON.
#[derive(Debug, Error)]
pub enum ClientConfigError {
    /// The `GET /vpn/clientconfig` response did not match the expected shape.
    #[error("client config decode error: {0}")]
    ClientConfigDecode(String),
}
