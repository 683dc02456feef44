//! Core error types

use thiserror::Error;

/// Result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors produced while decoding the account data model from wire JSON.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The `GET /vpn` response did not match the expected shape.
    #[error("malformed vpn info response: {0}")]
    MalformedVpnInfo(#[source] serde_json::Error),

    /// A `serde_json` decode failure for any of the other wire records.
    #[error("deserialization error: {0}")]
    Deserialize(#[from] serde_json::Error),
}
