//! Credential wire types.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A stored public-key credential.
///
/// Immutable once issued. `id` is the stable handle used to re-authenticate;
/// `raw` carries the platform attestation/assertion data and is never parsed
/// by the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credential {
    /// Stable credential identifier
    pub id: String,
    /// Credential public key (base64 on the wire)
    #[serde(
        rename = "publicKey",
        serialize_with = "serialize_b64",
        deserialize_with = "deserialize_b64"
    )]
    pub public_key: Vec<u8>,
    /// Opaque platform data, carried through untouched
    #[serde(default)]
    pub raw: serde_json::Value,
}

/// Registration parameters issued by the backend.
///
/// Passed verbatim to the platform credential API; the engine treats the
/// contents (challenge, relying party, algorithms) as opaque.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreationOptions(pub serde_json::Value);

/// A credential freshly created by the platform authenticator, ready to be
/// submitted back to the backend for verification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedCredential {
    /// Credential identifier assigned by the authenticator
    pub id: String,
    /// Attestation response, opaque to the engine
    pub raw: serde_json::Value,
}

fn serialize_b64<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&BASE64.encode(bytes))
}

fn deserialize_b64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
    let encoded = String::deserialize(deserializer)?;
    BASE64
        .decode(encoded.as_bytes())
        .map_err(serde::de::Error::custom)
}
