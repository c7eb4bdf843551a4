//! Thin JSON-RPC 2.0 client over HTTP.

use std::sync::atomic::{AtomicU64, Ordering};

use alloy::sol_types::SolCall;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, instrument, warn};

use cloak_core::error::{CloakError, Result};
use cloak_core::types::EthAddress;

use crate::config::RpcConfig;
use crate::contracts::abi_error;

#[derive(Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

/// Sends JSON-RPC requests to a single endpoint.
pub struct JsonRpcClient {
    url: String,
    http: reqwest::Client,
    next_id: AtomicU64,
}

impl JsonRpcClient {
    /// Creates a client for the configured RPC URL.
    pub fn new(config: &RpcConfig) -> Result<Self> {
        Ok(Self::from_parts(config.rpc_url.clone(), config.http_client()?))
    }

    /// Creates a client from an existing HTTP client.
    pub fn from_parts(url: impl Into<String>, http: reqwest::Client) -> Self {
        Self {
            url: url.into(),
            http,
            next_id: AtomicU64::new(1),
        }
    }

    /// Endpoint URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Underlying HTTP client.
    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Performs a call and returns its `result`.
    ///
    /// A `null` result is returned as `Ok(None)`.
    ///
    /// # Errors
    /// - `ConnectionTimeout` if the request timed out
    /// - `HttpError` for transport failures and non-2xx responses
    /// - `RpcError` if the node answered with a JSON-RPC error
    #[instrument(skip(self, params), fields(url = %self.url))]
    pub async fn request<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<Option<T>> {
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };

        let response = self
            .http
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status().is_success() {
            return Err(CloakError::HttpError(format!(
                "{} returned status {}",
                method,
                response.status()
            )));
        }

        let body: RpcResponse<T> = response.json().await.map_err(transport_error)?;

        if let Some(error) = body.error {
            warn!(method, code = error.code, message = %error.message, "JSON-RPC error");
            return Err(CloakError::RpcError(format!(
                "{} failed ({}): {}",
                method, error.code, error.message
            )));
        }

        debug!(method, has_result = body.result.is_some(), "JSON-RPC response");
        Ok(body.result)
    }

    /// Executes a read-only contract call against the latest block.
    pub async fn eth_call(&self, to: &EthAddress, data: &[u8]) -> Result<Vec<u8>> {
        let params = json!([
            {
                "to": to.to_lower_hex(),
                "data": format!("0x{}", hex::encode(data)),
            },
            "latest"
        ]);

        let result: Option<String> = self.request("eth_call", params).await?;
        let raw = result.unwrap_or_default();
        Ok(hex::decode(raw.strip_prefix("0x").unwrap_or(&raw))?)
    }

    /// Calls a contract function and decodes its return values.
    ///
    /// Empty output, as returned for an address without code, is `Ok(None)`.
    pub async fn call_contract<C: SolCall>(&self, to: &EthAddress, call: C) -> Result<Option<C::Return>> {
        let output = self.eth_call(to, &call.abi_encode()).await?;
        if output.is_empty() {
            return Ok(None);
        }
        C::abi_decode_returns(&output, true).map(Some).map_err(abi_error)
    }
}

/// Maps a reqwest failure onto the error taxonomy.
pub(crate) fn transport_error(error: reqwest::Error) -> CloakError {
    if error.is_timeout() {
        CloakError::ConnectionTimeout(error.to_string())
    } else if error.is_decode() {
        CloakError::RpcError(format!("malformed response: {}", error))
    } else {
        CloakError::HttpError(error.to_string())
    }
}
