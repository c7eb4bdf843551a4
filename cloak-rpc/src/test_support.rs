//! wiremock helpers for JSON-RPC request bodies.

use serde_json::{json, Value};
use wiremock::{Match, Request, ResponseTemplate};

use cloak_core::types::EthAddress;

use crate::contracts::to_alloy;

/// Signer of the fixture transactions (private key `0x46` repeated).
pub const SENDER: &str = "0x9d8a62f656a8d1615c1294fd71e9cfb3e4855a4f";

fn body(request: &Request) -> Option<Value> {
    serde_json::from_slice(&request.body).ok()
}

/// Matches a JSON-RPC request by method name.
pub struct RpcMethod(String);

impl Match for RpcMethod {
    fn matches(&self, request: &Request) -> bool {
        body(request)
            .and_then(|b| b.get("method").and_then(Value::as_str).map(|m| m == self.0))
            .unwrap_or(false)
    }
}

pub fn rpc_method(name: &str) -> RpcMethod {
    RpcMethod(name.to_string())
}

/// Matches an `eth_call` to `contract` invoking the function with `selector`.
pub struct CallTo {
    contract: String,
    selector: String,
}

impl Match for CallTo {
    fn matches(&self, request: &Request) -> bool {
        let Some(body) = body(request) else {
            return false;
        };
        if body.get("method").and_then(Value::as_str) != Some("eth_call") {
            return false;
        }

        let call = &body["params"][0];
        let to = call["to"].as_str().unwrap_or_default();
        let data = call["data"].as_str().unwrap_or_default();
        to.eq_ignore_ascii_case(&self.contract) && data.starts_with(&self.selector)
    }
}

pub fn call_to(contract: &EthAddress, selector: [u8; 4]) -> CallTo {
    CallTo {
        contract: contract.to_lower_hex(),
        selector: format!("0x{}", hex::encode(selector)),
    }
}

/// A successful JSON-RPC response.
pub fn rpc_result(result: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "jsonrpc": "2.0",
        "id": 1,
        "result": result,
    }))
}

/// An `eth_call` result holding one address word.
pub fn word_result(address: &EthAddress) -> ResponseTemplate {
    rpc_result(json!(to_alloy(address).into_word()))
}
