//! Local, never-transmitted encodings of a client's Ed25519 key pair.

use serde::{Deserialize, Serialize};

/// Three parallel encodings of the same Ed25519 private key.
///
/// Generated or supplied locally and never sent to the server. All three
/// fields refer to the same underlying scalar; callers should construct
/// this from a single `corevpn_crypto::KeyHandler` rather than assembling
/// the fields independently.
#[derive(Clone, Serialize, Deserialize)]
pub struct VPNSecrets {
    /// X25519 private scalar derived from the Ed25519 secret, base64-encoded.
    pub wireguard_privatekey: String,
    /// Ed25519 secret rendered as a PKCS#8 PEM document.
    pub openvpn_privatekey: String,
    /// Ed25519 private key, raw base64.
    pub ed25519_privatekey: String,
}

impl std::fmt::Debug for VPNSecrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VPNSecrets").field("ed25519_privatekey", &"<redacted>").finish()
    }
}
