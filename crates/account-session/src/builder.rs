//! Session builders.

use crate::{SessionBuildError, SessionResult, SigningSession, SmartSession};
use alloy::primitives::{Address, Bytes};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use futures_util::future::BoxFuture;
use passkey_gateway::Credential;
use serde::Deserialize;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info};

/// Builds a signing session from a verified credential.
///
/// Treated as a pure (but expensive, network-calling) function of
/// credential + chain; callers may invoke it repeatedly with the same inputs.
pub trait SessionBuilder: Send + Sync {
    /// Construct the smart-account session for this credential on this chain.
    fn build<'a>(
        &'a self,
        credential: &'a Credential,
        chain_id: u64,
    ) -> BoxFuture<'a, SessionResult<SmartSession>>;
}

#[derive(Debug, Deserialize)]
struct DeriveAccountResult {
    address: String,
}

// No `default` attributes: they would put a `T: Default` bound on the
// derived impl, and missing `Option` fields deserialize as `None` anyway.
#[derive(Debug, Deserialize)]
struct RpcEnvelope<T> {
    result: Option<T>,
    error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

/// Session builder backed by an account-abstraction bundler RPC.
///
/// One call derives the counterfactual smart account address for the
/// credential's public key; the returned session submits sponsored calls
/// through the same endpoint.
#[derive(Clone)]
pub struct BundlerSessionBuilder {
    http_client: reqwest::Client,
    rpc_url: String,
}

impl BundlerSessionBuilder {
    /// Create a builder against the given bundler endpoint.
    pub fn new(rpc_url: impl Into<String>) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            rpc_url: rpc_url.into(),
        }
    }

    async fn rpc<T: serde::de::DeserializeOwned>(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> SessionResult<T> {
        let body = serde_json::json!({
            "jsonrpc": "2.0",
            "id": uuid::Uuid::new_v4().to_string(),
            "method": method,
            "params": params,
        });

        debug!(method, url = %self.rpc_url, "Calling bundler");

        let response = self
            .http_client
            .post(&self.rpc_url)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?
            .error_for_status()?;

        let envelope: RpcEnvelope<T> = response.json().await?;
        if let Some(err) = envelope.error {
            return Err(SessionBuildError::Rpc {
                code: err.code,
                message: err.message,
            });
        }
        envelope
            .result
            .ok_or_else(|| SessionBuildError::Malformed(format!("{method}: empty envelope")))
    }
}

impl SessionBuilder for BundlerSessionBuilder {
    fn build<'a>(
        &'a self,
        credential: &'a Credential,
        chain_id: u64,
    ) -> BoxFuture<'a, SessionResult<SmartSession>> {
        Box::pin(async move {
            let result: DeriveAccountResult = self
                .rpc(
                    "gg_deriveSmartAccount",
                    serde_json::json!([{
                        "publicKey": BASE64.encode(&credential.public_key),
                        "credentialId": credential.id,
                        "chainId": chain_id,
                    }]),
                )
                .await?;

            let address = Address::from_str(&result.address)
                .map_err(|e| SessionBuildError::InvalidAddress(e.to_string()))?;

            info!(account = %address, chain_id, "Smart account session established");

            let signer = BundlerSigningSession {
                http: self.clone(),
                address,
                chain_id,
            };
            Ok(SmartSession {
                address,
                signer: Arc::new(signer),
            })
        })
    }
}

/// Signing session that routes sponsored calls through the bundler.
struct BundlerSigningSession {
    http: BundlerSessionBuilder,
    address: Address,
    chain_id: u64,
}

impl SigningSession for BundlerSigningSession {
    fn address(&self) -> Address {
        self.address
    }

    fn chain_id(&self) -> u64 {
        self.chain_id
    }

    fn send_call<'a>(&'a self, to: Address, data: Bytes) -> BoxFuture<'a, SessionResult<String>> {
        Box::pin(async move {
            let hash: String = self
                .http
                .rpc(
                    "gg_sponsorCall",
                    serde_json::json!([{
                        "from": self.address.to_string(),
                        "to": to.to_string(),
                        "data": data.to_string(),
                        "chainId": self.chain_id,
                    }]),
                )
                .await?;
            debug!(to = %to, hash = %hash, "Sponsored call submitted");
            Ok(hash)
        })
    }
}

/// Deterministic builder for tests: always yields the configured address and
/// a signer that records nothing.
#[derive(Clone)]
pub struct StaticSessionBuilder {
    address: Address,
}

impl StaticSessionBuilder {
    /// Build sessions that report the given address.
    pub fn new(address: Address) -> Self {
        Self { address }
    }
}

impl SessionBuilder for StaticSessionBuilder {
    fn build<'a>(
        &'a self,
        _credential: &'a Credential,
        chain_id: u64,
    ) -> BoxFuture<'a, SessionResult<SmartSession>> {
        let address = self.address;
        Box::pin(async move {
            Ok(SmartSession {
                address,
                signer: Arc::new(StaticSigningSession { address, chain_id }),
            })
        })
    }
}

struct StaticSigningSession {
    address: Address,
    chain_id: u64,
}

impl SigningSession for StaticSigningSession {
    fn address(&self) -> Address {
        self.address
    }

    fn chain_id(&self) -> u64 {
        self.chain_id
    }

    fn send_call<'a>(&'a self, _to: Address, _data: Bytes) -> BoxFuture<'a, SessionResult<String>> {
        Box::pin(async move { Ok(format!("0x{:064x}", 0u64)) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_credential() -> Credential {
        Credential {
            id: "cred-1".to_string(),
            public_key: vec![4; 65],
            raw: serde_json::Value::Null,
        }
    }

    #[test]
    fn rpc_result_envelope_parses() {
        let body = r#"{"result":{"address":"0x0000000000000000000000000000000000000001"}}"#;
        let envelope: RpcEnvelope<DeriveAccountResult> = serde_json::from_str(body).unwrap();
        assert_eq!(
            envelope.result.unwrap().address,
            "0x0000000000000000000000000000000000000001"
        );
    }

    #[test]
    fn rpc_error_envelope_parses() {
        let body = r#"{"error":{"code":-32600,"message":"bad request"}}"#;
        let envelope: RpcEnvelope<DeriveAccountResult> = serde_json::from_str(body).unwrap();
        assert!(envelope.result.is_none());
        assert_eq!(envelope.error.unwrap().code, -32600);
    }

    #[tokio::test]
    async fn static_builder_yields_configured_address() {
        let address = Address::from_str("0x00000000000000000000000000000000000000aa").unwrap();
        let builder = StaticSessionBuilder::new(address);

        let session = builder.build(&test_credential(), 42161).await.unwrap();
        assert_eq!(session.address, address);
        assert_eq!(session.signer.chain_id(), 42161);
        assert_eq!(session.signer.address(), address);
    }

    #[tokio::test]
    async fn static_signer_accepts_calls() {
        let address = Address::ZERO;
        let builder = StaticSessionBuilder::new(address);
        let session = builder.build(&test_credential(), 1).await.unwrap();

        let hash = session
            .signer
            .send_call(Address::ZERO, Bytes::new())
            .await
            .unwrap();
        assert!(hash.starts_with("0x"));
    }
}
