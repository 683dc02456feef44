//! The keyring collaborator: persists the account bundle under an
//! OS-keyring-style key/value entry.

use std::collections::HashMap;

use async_trait::async_trait;
use base32::Alphabet;
use parking_lot::Mutex;
use serde_json::Value;

use crate::error::{Result, SessionError};

const KEYRING_KEY_PREFIX: &str = "corevpn";

/// Derive the keyring entry name for `username`, namespaced under `prefix`.
///
/// Mirrors the reference client's `__keyring_key_name`: the username is
/// base32-encoded (lowercase, unpadded) before being appended, so usernames
/// containing characters a platform keyring backend would otherwise reject
/// (spaces, slashes, unicode) still produce a safe entry name.
pub fn keyring_key(prefix: &str, username: &str) -> String {
    let encoded = base32::encode(Alphabet::RFC4648 { padding: false }, username.as_bytes()).to_lowercase();
    format!("{prefix}-{encoded}")
}

/// The default keyring key prefix used when a [`crate::config::SessionConfig`]
/// does not override it.
pub fn default_keyring_key_prefix() -> &'static str {
    KEYRING_KEY_PREFIX
}

/// Persists opaque JSON values under string keys, the way an OS keyring
/// (Secret Service, Keychain, Credential Manager) does.
///
/// Implementations should treat values as secret: no logging of contents.
#[async_trait]
pub trait Keyring: Send + Sync {
    /// Fetch the value stored at `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<Value>>;

    /// Store `value` at `key`, overwriting any existing entry.
    async fn set(&self, key: &str, value: Value) -> Result<()>;

    /// Remove the entry at `key`, if present.
    async fn delete(&self, key: &str) -> Result<()>;

    /// Whether an entry exists at `key`.
    async fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.get(key).await?.is_some())
    }
}

/// An in-memory [`Keyring`], for tests and as a reference default when no
/// platform keyring integration is wired up.
#[derive(Default)]
pub struct InMemoryKeyring {
    entries: Mutex<HashMap<String, Value>>,
}

impl InMemoryKeyring {
    /// An empty keyring.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Keyring for InMemoryKeyring {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.entries.lock().get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        self.entries.lock().insert(key.to_string(), value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.entries.lock().remove(key);
        Ok(())
    }
}

/// Wrap a keyring backend error as a [`SessionError::Persistence`].
pub fn persistence_error(context: &str, err: impl std::fmt::Display) -> SessionError {
    SessionError::Persistence(format!("{context}: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyring_key_is_stable_and_prefixed() {
        let key = keyring_key("corevpn", "jdoe@example.com");
        assert!(key.starts_with("corevpn-"));
        assert_eq!(key, keyring_key("corevpn", "jdoe@example.com"));
    }

    #[test]
    fn keyring_key_differs_per_username() {
        assert_ne!(keyring_key("corevpn", "alice"), keyring_key("corevpn", "bob"));
    }

    #[test]
    fn keyring_key_has_no_padding_or_uppercase() {
        let key = keyring_key("corevpn", "x");
        assert!(!key.contains('='));
        assert_eq!(key, key.to_lowercase());
    }

    #[tokio::test]
    async fn in_memory_keyring_round_trips() {
        let keyring = InMemoryKeyring::new();
        assert!(!keyring.exists("k").await.unwrap());
        keyring.set("k", serde_json::json!({"a": 1})).await.unwrap();
        assert!(keyring.exists("k").await.unwrap());
        assert_eq!(keyring.get("k").await.unwrap(), Some(serde_json::json!({"a": 1})));
        keyring.delete("k").await.unwrap();
        assert!(!keyring.exists("k").await.unwrap());
    }
}
