//! JSON-RPC-over-POST client for the credential backend.

use crate::{
    CreatedCredential, CreationOptions, Credential, CredentialGateway, GatewayError, GatewayResult,
};
use futures_util::future::BoxFuture;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

fn summarize_response_body(body: &str) -> String {
    let mut hasher = DefaultHasher::new();
    body.hash(&mut hasher);
    format!("len={},digest={:016x}", body.len(), hasher.finish())
}

/// Request envelope: method name plus a params array.
#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    id: String,
    method: &'a str,
    params: Vec<serde_json::Value>,
}

/// Response envelope: exactly one of `result` / `error`. Missing
/// `Option` fields already read as `None`; a `default` attribute here
/// would force a `T: Default` bound onto the derived impl.
#[derive(Debug, Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
struct RpcError {
    code: i64,
    message: String,
}

/// Credential backend client.
#[derive(Clone)]
pub struct PasskeyGateway {
    http_client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl PasskeyGateway {
    /// Create a new gateway client.
    ///
    /// # Arguments
    /// * `endpoint` - Backend RPC endpoint (e.g. `https://api.greengoods.app/passkeys`)
    /// * `api_key` - Publishable API key sent with every request
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> GatewayResult<Self> {
        let endpoint = endpoint.into();
        url::Url::parse(&endpoint)?;
        Ok(Self {
            http_client: reqwest::Client::new(),
            endpoint,
            api_key: api_key.into(),
        })
    }

    /// Endpoint this client posts to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Issue one RPC call and unwrap the result envelope.
    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Vec<serde_json::Value>,
    ) -> GatewayResult<T> {
        let request = RpcRequest {
            id: uuid::Uuid::new_v4().to_string(),
            method,
            params,
        };

        tracing::debug!(method, id = %request.id, "Calling credential backend");

        let response = self
            .http_client
            .post(&self.endpoint)
            .header("x-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            tracing::error!(method, status = %status, "Credential backend rejected API key");
            return Err(GatewayError::InvalidApiKey);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let summary = summarize_response_body(&body);
            tracing::error!(method, status = %status, body_summary = %summary, "Credential backend request failed");
            return Err(GatewayError::Http {
                status: status.as_u16(),
                summary,
            });
        }

        let envelope: RpcResponse<T> = response.json().await?;
        if let Some(err) = envelope.error {
            tracing::warn!(method, code = err.code, message = %err.message, "Credential backend returned error");
            return Err(GatewayError::Rpc {
                code: err.code,
                message: err.message,
            });
        }

        envelope
            .result
            .ok_or_else(|| GatewayError::Envelope(format!("{method}: missing result and error")))
    }
}

impl CredentialGateway for PasskeyGateway {
    fn start_registration<'a>(
        &'a self,
        user_name: &'a str,
    ) -> BoxFuture<'a, GatewayResult<CreationOptions>> {
        Box::pin(async move {
            let options: serde_json::Value = self
                .call(
                    "startRegistration",
                    vec![serde_json::json!({ "userName": user_name })],
                )
                .await?;
            Ok(CreationOptions(options))
        })
    }

    fn verify_registration<'a>(
        &'a self,
        credential: &'a CreatedCredential,
        user_name: &'a str,
    ) -> BoxFuture<'a, GatewayResult<Credential>> {
        Box::pin(async move {
            self.call(
                "verifyRegistration",
                vec![serde_json::json!({
                    "credential": credential,
                    "userName": user_name,
                })],
            )
            .await
        })
    }

    fn get_credentials<'a>(
        &'a self,
        user_name: &'a str,
    ) -> BoxFuture<'a, GatewayResult<Vec<Credential>>> {
        Box::pin(async move {
            self.call(
                "getCredentials",
                vec![serde_json::json!({ "userName": user_name })],
            )
            .await
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_creation() {
        let gateway = PasskeyGateway::new("https://api.test.app/passkeys", "test-key").unwrap();
        assert_eq!(gateway.endpoint(), "https://api.test.app/passkeys");
        assert_eq!(gateway.api_key, "test-key");
    }

    #[test]
    fn malformed_endpoint_is_rejected() {
        assert!(matches!(
            PasskeyGateway::new("not a url", "test-key"),
            Err(GatewayError::InvalidUrl(_))
        ));
    }

    #[test]
    fn request_envelope_shape() {
        let request = RpcRequest {
            id: "req-1".to_string(),
            method: "getCredentials",
            params: vec![serde_json::json!({ "userName": "alice" })],
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["method"], "getCredentials");
        assert_eq!(json["params"][0]["userName"], "alice");
        assert_eq!(json["id"], "req-1");
    }

    #[test]
    fn result_envelope_parses() {
        let body = r#"{"result":[{"id":"cred-1","publicKey":"AQID"}]}"#;
        let envelope: RpcResponse<Vec<Credential>> = serde_json::from_str(body).unwrap();
        let creds = envelope.result.unwrap();
        assert_eq!(creds.len(), 1);
        assert_eq!(creds[0].id, "cred-1");
        assert!(envelope.error.is_none());
    }

    #[test]
    fn envelope_works_for_payloads_without_default() {
        // Credential implements no Default; the envelope must not require one.
        let body = r#"{"result":{"id":"cred-5","publicKey":"AQID"}}"#;
        let envelope: RpcResponse<Credential> = serde_json::from_str(body).unwrap();
        assert_eq!(envelope.result.unwrap().id, "cred-5");
        assert!(envelope.error.is_none());
    }

    #[test]
    fn error_envelope_parses() {
        let body = r#"{"error":{"code":-32001,"message":"unknown user"}}"#;
        let envelope: RpcResponse<Vec<Credential>> = serde_json::from_str(body).unwrap();
        assert!(envelope.result.is_none());
        let err = envelope.error.unwrap();
        assert_eq!(err.code, -32001);
        assert_eq!(err.message, "unknown user");
    }

    #[test]
    fn body_summary_never_echoes_content() {
        let summary = summarize_response_body("secret credential material");
        assert!(summary.starts_with("len=26,digest="));
        assert!(!summary.contains("secret"));
    }
}
