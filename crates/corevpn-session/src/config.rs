//! Static configuration for a [`crate::session::SessionCore`].

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::keyring::default_keyring_key_prefix;
use corevpn_core::DEFAULT_CERTIFICATE_DURATION_MINUTES;

/// Ancillary-cache key under which the client-configuration record is persisted.
pub const CLIENT_CONFIG_CACHE_KEY: &str = "clientconfig";

/// Static, rarely-changing configuration for a session core.
///
/// Distinct from the dynamic, fetched [`corevpn_config::ClientConfig`]: this
/// struct is supplied by the embedding application at construction time and
/// never refreshed from the network.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Directory the [`crate::cache::FileCache`] should use for the ancillary cache.
    pub cache_dir: PathBuf,
    /// Prefix used when deriving the per-account keyring entry name.
    pub keyring_key_prefix: String,
    /// Validity duration requested for new certificates, in minutes.
    pub default_certificate_duration_minutes: u32,
    /// Base path prepended to every API route (unused by the in-memory collaborators,
    /// kept for a real HTTP-backed `AuthenticatedSession` to consult).
    pub api_base_path: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cache_dir: default_cache_dir(),
            keyring_key_prefix: default_keyring_key_prefix().to_string(),
            default_certificate_duration_minutes: DEFAULT_CERTIFICATE_DURATION_MINUTES,
            api_base_path: "/api".to_string(),
        }
    }
}

impl SessionConfig {
    /// Parse a `SessionConfig` from a TOML document, falling back to
    /// [`Default::default`] for any field the document omits.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }
}

fn default_cache_dir() -> PathBuf {
    dirs::cache_dir().map(|base| base.join("corevpn")).unwrap_or_else(|| PathBuf::from(".corevpn-cache"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_well_formed() {
        let config = SessionConfig::default();
        assert_eq!(config.default_certificate_duration_minutes, DEFAULT_CERTIFICATE_DURATION_MINUTES);
        assert!(!config.keyring_key_prefix.is_empty());
    }

    #[test]
    fn partial_toml_falls_back_to_defaults() {
        let config = SessionConfig::from_toml_str(r#"keyring_key_prefix = "custom""#).unwrap();
        assert_eq!(config.keyring_key_prefix, "custom");
        assert_eq!(config.default_certificate_duration_minutes, DEFAULT_CERTIFICATE_DURATION_MINUTES);
    }

    #[test]
    fn rejects_malformed_toml() {
        assert!(SessionConfig::from_toml_str("not = [valid").is_err());
    }
}
