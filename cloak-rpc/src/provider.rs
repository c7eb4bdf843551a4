//! Chain provider backed by a JSON-RPC node and an Etherscan-compatible
//! history API.
//!
//! Nodes return the signature and the transaction fields but not the hash
//! that was signed, so the unsigned transaction is rebuilt with the
//! consensus types and hashed with [`SignableTransaction::signature_hash`].
//! Legacy transactions whose `v` is EIP-155 encoded are rebuilt with the
//! chain ID it carries.

use alloy::consensus::{SignableTransaction, TxEip1559, TxEip2930, TxLegacy};
use alloy::eips::eip2930::AccessList;
use alloy::primitives::{Address, Bytes, TxKind, B256, U256};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, instrument};

use cloak_core::error::{CloakError, Result};
use cloak_core::traits::ChainProvider;
use cloak_core::types::{EthAddress, TransactionRecord, TransactionSummary, TransactionType, TxHash};

use crate::client::{transport_error, JsonRpcClient};
use crate::config::RpcConfig;
use crate::contracts::from_alloy;

// ═══════════════════════════════════════════════════════════════════════════════
// WIRE TYPES
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RpcTransaction {
    hash: B256,
    #[serde(rename = "type", default)]
    tx_type: Option<U256>,
    from: Address,
    #[serde(default)]
    to: Option<Address>,
    nonce: U256,
    gas: U256,
    #[serde(default)]
    gas_price: Option<U256>,
    #[serde(default)]
    max_priority_fee_per_gas: Option<U256>,
    #[serde(default)]
    max_fee_per_gas: Option<U256>,
    value: U256,
    input: Bytes,
    #[serde(default)]
    chain_id: Option<U256>,
    #[serde(default)]
    access_list: AccessList,
    v: U256,
    r: U256,
    s: U256,
    #[serde(default)]
    y_parity: Option<U256>,
    #[serde(default)]
    block_number: Option<U256>,
}

#[derive(Debug, Deserialize)]
struct HistoryResponse {
    status: String,
    message: String,
    result: Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HistoryEntry {
    hash: String,
    from: String,
    #[serde(default)]
    to: String,
    block_number: String,
}

// ═══════════════════════════════════════════════════════════════════════════════
// PROVIDER
// ═══════════════════════════════════════════════════════════════════════════════

struct HistoryApi {
    url: String,
    api_key: Option<String>,
}

/// [`ChainProvider`] over Ethereum JSON-RPC.
///
/// Transaction history needs an Etherscan-compatible endpoint
/// (`HISTORY_API_URL`); without one, history queries fail with
/// `ConfigError` while transaction lookups keep working.
pub struct JsonRpcProvider {
    rpc: JsonRpcClient,
    history: Option<HistoryApi>,
}

impl JsonRpcProvider {
    /// Creates a provider for the given RPC URL, without a history API.
    pub fn new(rpc_url: impl Into<String>) -> Result<Self> {
        Self::with_config(&RpcConfig::new(rpc_url))
    }

    /// Creates a provider from a full configuration.
    pub fn with_config(config: &RpcConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            rpc: JsonRpcClient::new(config)?,
            history: config.history_api_url.as_ref().map(|url| HistoryApi {
                url: url.clone(),
                api_key: config.history_api_key.clone(),
            }),
        })
    }

    /// Underlying JSON-RPC client.
    pub fn client(&self) -> &JsonRpcClient {
        &self.rpc
    }

    /// Returns true if a history endpoint is configured.
    pub fn has_history_api(&self) -> bool {
        self.history.is_some()
    }

    async fn fetch_history(&self, api: &HistoryApi, address: &EthAddress) -> Result<Vec<TransactionSummary>> {
        let address_hex = address.to_lower_hex();
        let mut query = vec![
            ("module", "account"),
            ("action", "txlist"),
            ("address", address_hex.as_str()),
            ("startblock", "0"),
            ("endblock", "99999999"),
            ("sort", "desc"),
        ];
        if let Some(key) = &api.api_key {
            query.push(("apikey", key.as_str()));
        }

        let response = self
            .rpc
            .http()
            .get(&api.url)
            .query(&query)
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status().is_success() {
            return Err(CloakError::HttpError(format!(
                "history API returned status {}",
                response.status()
            )));
        }

        let body: HistoryResponse = response.json().await.map_err(transport_error)?;
        parse_history(body)
    }
}

#[async_trait]
impl ChainProvider for JsonRpcProvider {
    #[instrument(skip(self), fields(hash = %hash))]
    async fn get_transaction(&self, hash: &TxHash) -> Result<Option<TransactionRecord>> {
        let raw: Option<RpcTransaction> = self
            .rpc
            .request("eth_getTransactionByHash", json!([hash.to_hex()]))
            .await?;

        match raw {
            Some(tx) => {
                let record = to_record(tx)?;
                debug!(tx_type = ?record.tx_type, from = %record.from, "fetched transaction");
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    #[instrument(skip(self), fields(address = %address))]
    async fn get_transaction_history(&self, address: &EthAddress) -> Result<Vec<TransactionSummary>> {
        let api = self.history.as_ref().ok_or_else(|| {
            CloakError::ConfigError("transaction history requires HISTORY_API_URL".into())
        })?;

        let history = self.fetch_history(api, address).await?;
        debug!(count = history.len(), "fetched transaction history");
        Ok(history)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// DECODING
// ═══════════════════════════════════════════════════════════════════════════════

fn to_record(tx: RpcTransaction) -> Result<TransactionRecord> {
    let tx_type = match tx.tx_type {
        Some(t) => {
            let byte = u8::try_from(t)
                .map_err(|_| CloakError::ValidationError(format!("unsupported transaction type {}", t)))?;
            TransactionType::from_type_byte(byte)?
        }
        None => TransactionType::Legacy,
    };

    // Typed transactions report y-parity; older nodes only fill `v`
    let v: u64 = match (tx_type, tx.y_parity) {
        (TransactionType::Legacy, _) | (_, None) => narrow(tx.v, "v")?,
        (_, Some(parity)) => narrow(parity, "yParity")?,
    };

    let signing_hash = signing_hash(&tx, tx_type, v)?;

    Ok(TransactionRecord {
        hash: TxHash::from_array(tx.hash.0),
        tx_type,
        from: from_alloy(tx.from),
        r: tx.r.to_be_bytes::<32>(),
        s: tx.s.to_be_bytes::<32>(),
        v,
        signing_hash,
        block_number: tx.block_number.map(|n| narrow(n, "blockNumber")).transpose()?,
    })
}

fn signing_hash(tx: &RpcTransaction, tx_type: TransactionType, v: u64) -> Result<[u8; 32]> {
    let to = tx.to.map_or(TxKind::Create, TxKind::Call);

    let hash = match tx_type {
        TransactionType::Legacy => TxLegacy {
            chain_id: TransactionType::legacy_chain_id(v),
            nonce: narrow(tx.nonce, "nonce")?,
            gas_price: narrow(required(tx.gas_price, "gasPrice")?, "gasPrice")?,
            gas_limit: narrow(tx.gas, "gas")?,
            to,
            value: tx.value,
            input: tx.input.clone(),
        }
        .signature_hash(),
        TransactionType::AccessList => TxEip2930 {
            chain_id: narrow(required(tx.chain_id, "chainId")?, "chainId")?,
            nonce: narrow(tx.nonce, "nonce")?,
            gas_price: narrow(required(tx.gas_price, "gasPrice")?, "gasPrice")?,
            gas_limit: narrow(tx.gas, "gas")?,
            to,
            value: tx.value,
            access_list: tx.access_list.clone(),
            input: tx.input.clone(),
        }
        .signature_hash(),
        TransactionType::FeeMarket => TxEip1559 {
            chain_id: narrow(required(tx.chain_id, "chainId")?, "chainId")?,
            nonce: narrow(tx.nonce, "nonce")?,
            gas_limit: narrow(tx.gas, "gas")?,
            max_fee_per_gas: narrow(required(tx.max_fee_per_gas, "maxFeePerGas")?, "maxFeePerGas")?,
            max_priority_fee_per_gas: narrow(
                required(tx.max_priority_fee_per_gas, "maxPriorityFeePerGas")?,
                "maxPriorityFeePerGas",
            )?,
            to,
            value: tx.value,
            access_list: tx.access_list.clone(),
            input: tx.input.clone(),
        }
        .signature_hash(),
    };
    Ok(hash.0)
}

fn parse_history(body: HistoryResponse) -> Result<Vec<TransactionSummary>> {
    if body.status != "1" {
        if body.message.starts_with("No transactions found") {
            return Ok(Vec::new());
        }
        let detail = body.result.as_str().unwrap_or_default();
        return Err(CloakError::RpcError(format!(
            "history API error: {} {}",
            body.message, detail
        )));
    }

    let entries: Vec<HistoryEntry> = serde_json::from_value(body.result)?;
    entries
        .into_iter()
        .map(|entry| {
            let block_number = entry.block_number.parse().map_err(|_| {
                CloakError::RpcError(format!("invalid block number: {}", entry.block_number))
            })?;
            let to = match entry.to.as_str() {
                "" => None,
                to => Some(EthAddress::from_hex(to)?),
            };
            Ok(TransactionSummary {
                hash: TxHash::from_hex(&entry.hash)?,
                from: EthAddress::from_hex(&entry.from)?,
                to,
                block_number,
            })
        })
        .collect()
}

// ═══════════════════════════════════════════════════════════════════════════════
// QUANTITIES
// ═══════════════════════════════════════════════════════════════════════════════

fn required(field: Option<U256>, name: &str) -> Result<U256> {
    field.ok_or_else(|| CloakError::RpcError(format!("transaction is missing {}", name)))
}

/// Narrows a quantity to the width its consensus field uses.
fn narrow<T: TryFrom<U256>>(value: U256, name: &str) -> Result<T> {
    T::try_from(value).map_err(|_| CloakError::RpcError(format!("{} {} is out of range", name, value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{rpc_method, rpc_result, SENDER};
    use cloak_crypto::{public_key_to_address, recover_from_prehash};
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TX_HASH: &str = "0x5e7f1a3b2c4d6e8f90a1b2c3d4e5f60718293a4b5c6d7e8f9012345678abcdef";

    fn fee_market_tx() -> Value {
        json!({
            "hash": TX_HASH,
            "type": "0x2",
            "from": SENDER,
            "to": "0x3535353535353535353535353535353535353535",
            "nonce": "0x7",
            "gas": "0x5208",
            "maxPriorityFeePerGas": "0x77359400",
            "maxFeePerGas": "0x6fc23ac00",
            "gasPrice": "0x6fc23ac00",
            "value": "0xde0b6b3a7640000",
            "input": "0xabcd",
            "chainId": "0x1",
            "accessList": [{
                "address": "0xdededededededededededededededededededede",
                "storageKeys": ["0x0000000000000000000000000000000000000000000000000000000000000001"]
            }],
            "v": "0x1",
            "yParity": "0x1",
            "r": "0xd47644539acec3da5e3ecf5fe8863c628a9c97e8b71e9ea9167a6f4f83c03c32",
            "s": "0x858819ee4292ffad8af601c2873b162b9b9f3e872d46e6d61589a1db0507cc8",
            "blockNumber": "0x10"
        })
    }

    fn access_list_tx() -> Value {
        json!({
            "hash": TX_HASH,
            "type": "0x1",
            "from": SENDER,
            "to": null,
            "nonce": "0x3",
            "gas": "0xc350",
            "gasPrice": "0x4a817c800",
            "value": "0x0",
            "input": "0x6080",
            "chainId": "0x1",
            "accessList": [],
            "v": "0x0",
            "yParity": "0x0",
            "r": "0xf30e4bd8094e53a679ddb8f55b5216b03c44623fc4279ef0791f9aa1f6930d49",
            "s": "0x735cc516abe3e31672d6a089888fcedab1c3daaa07fc86b9c53b9cbfe4a4e48c",
            "blockNumber": null
        })
    }

    fn legacy_tx() -> Value {
        json!({
            "hash": TX_HASH,
            "type": "0x0",
            "from": SENDER,
            "to": "0x3535353535353535353535353535353535353535",
            "nonce": "0x0",
            "gas": "0x5208",
            "gasPrice": "0x3b9aca00",
            "value": "0x5",
            "input": "0x",
            "v": "0x1c",
            "r": "0x5de9d5b6ec72637e54c2d4e7ad32b5f1845f31dc90edf47a940cec951d665913",
            "s": "0x563e1bc0c203db58bdd803e5215c0c83c07438be5602968448a9a93671d9f9d7",
            "blockNumber": "0x2a"
        })
    }

    fn eip155_tx() -> Value {
        json!({
            "hash": TX_HASH,
            "from": SENDER,
            "to": "0x3535353535353535353535353535353535353535",
            "nonce": "0x9",
            "gas": "0x5208",
            "gasPrice": "0x4a817c800",
            "value": "0xde0b6b3a7640000",
            "input": "0x",
            "v": "0x25",
            "r": "0x28ef61340bd939bc2195fe537567866003e1a15d3c71ff63e1590620aa636276",
            "s": "0x67cbe9d8997f761aecb703304b3800ccf555c9f3dc64214b297fb1966a3b6d83",
            "blockNumber": "0x1"
        })
    }

    fn decode(value: Value) -> TransactionRecord {
        to_record(serde_json::from_value(value).unwrap()).unwrap()
    }

    fn recovered_sender(record: &TransactionRecord) -> EthAddress {
        let signature = record.recoverable_signature().unwrap();
        let public_key = recover_from_prehash(&record.signing_hash, &signature).unwrap();
        public_key_to_address(&public_key).unwrap()
    }

    #[test]
    fn test_fee_market_signing_hash() {
        let record = decode(fee_market_tx());
        assert_eq!(record.tx_type, TransactionType::FeeMarket);
        assert_eq!(
            hex::encode(record.signing_hash),
            "c33fc8fa656f9938b041cb795e294a79ed6fc59064f99c24fef8f06045040f5c"
        );
        assert_eq!(record.v, 1);
        assert_eq!(record.block_number, Some(16));
        // s has a leading zero nibble and must be left-padded
        assert_eq!(record.s[0], 0x08);
        assert_eq!(recovered_sender(&record), record.from);
    }

    #[test]
    fn test_access_list_contract_creation() {
        let record = decode(access_list_tx());
        assert_eq!(record.tx_type, TransactionType::AccessList);
        assert_eq!(
            hex::encode(record.signing_hash),
            "d47cd2e9e7b61b20e6c2a48de54edd4b027c9270707356317c200a8e99d526dd"
        );
        assert!(record.block_number.is_none());
        assert_eq!(recovered_sender(&record), record.from);
    }

    #[test]
    fn test_legacy_without_chain_id() {
        let record = decode(legacy_tx());
        assert_eq!(record.tx_type, TransactionType::Legacy);
        assert_eq!(record.v, 28);
        assert_eq!(
            hex::encode(record.signing_hash),
            "c0b16a91bce0c730dd205e024c825d16fc37ab6a4805a2c4d964db989d4bc6e9"
        );
        assert_eq!(recovered_sender(&record), record.from);
    }

    #[test]
    fn test_legacy_eip155_without_type_field() {
        let record = decode(eip155_tx());
        assert_eq!(record.tx_type, TransactionType::Legacy);
        assert_eq!(record.v, 37);
        assert_eq!(
            hex::encode(record.signing_hash),
            "daf5a779ae972f972197303d7b574746c7ef83eadac0f2791ad23db92e4c8e53"
        );
        assert_eq!(recovered_sender(&record), record.from);
    }

    #[test]
    fn test_unsupported_type_rejected() {
        let mut tx = fee_market_tx();
        tx["type"] = json!("0x7e");
        let raw: RpcTransaction = serde_json::from_value(tx).unwrap();
        assert!(matches!(to_record(raw), Err(CloakError::ValidationError(_))));
    }

    #[test]
    fn test_missing_fee_field_rejected() {
        let mut tx = fee_market_tx();
        tx.as_object_mut().unwrap().remove("maxFeePerGas");
        let raw: RpcTransaction = serde_json::from_value(tx).unwrap();
        assert!(matches!(to_record(raw), Err(CloakError::RpcError(_))));
    }

    #[test]
    fn test_oversized_type_rejected() {
        let mut tx = fee_market_tx();
        tx["type"] = json!("0x102");
        let raw: RpcTransaction = serde_json::from_value(tx).unwrap();
        assert!(matches!(to_record(raw), Err(CloakError::ValidationError(_))));
    }

    #[test]
    fn test_quantities() {
        assert_eq!(narrow::<u64>(U256::from(37), "v").unwrap(), 37);
        assert!(narrow::<u64>(U256::MAX, "nonce").is_err());
        assert!(matches!(
            required(None, "gasPrice"),
            Err(CloakError::RpcError(ref m)) if m.contains("gasPrice")
        ));

        let mut tx = legacy_tx();
        tx["nonce"] = json!("0xzz");
        assert!(serde_json::from_value::<RpcTransaction>(tx).is_err());
    }

    #[tokio::test]
    async fn test_get_transaction_over_rpc() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(rpc_method("eth_getTransactionByHash"))
            .respond_with(rpc_result(eip155_tx()))
            .mount(&server)
            .await;

        let provider = JsonRpcProvider::new(server.uri()).unwrap();
        let hash = TxHash::from_hex(TX_HASH).unwrap();
        let record = provider.get_transaction(&hash).await.unwrap().unwrap();

        assert_eq!(record.hash, hash);
        assert_eq!(record.from, EthAddress::from_hex(SENDER).unwrap());
    }

    #[tokio::test]
    async fn test_unknown_transaction_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(rpc_result(Value::Null))
            .mount(&server)
            .await;

        let provider = JsonRpcProvider::new(server.uri()).unwrap();
        let hash = TxHash::from_array([7; 32]);
        assert!(provider.get_transaction(&hash).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_history_requires_configuration() {
        let provider = JsonRpcProvider::new("http://127.0.0.1:8545").unwrap();
        assert!(!provider.has_history_api());

        let err = provider
            .get_transaction_history(&EthAddress::zero())
            .await
            .unwrap_err();
        assert!(matches!(err, CloakError::ConfigError(_)));
    }

    #[tokio::test]
    async fn test_history_over_http() {
        let server = MockServer::start().await;
        let sender = EthAddress::from_hex(SENDER).unwrap();

        Mock::given(method("GET"))
            .and(path("/api"))
            .and(query_param("action", "txlist"))
            .and(query_param("address", sender.to_lower_hex().as_str()))
            .and(query_param("apikey", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "1",
                "message": "OK",
                "result": [
                    {
                        "blockNumber": "120",
                        "hash": TX_HASH,
                        "from": SENDER,
                        "to": ""
                    },
                    {
                        "blockNumber": "100",
                        "hash": format!("0x{}", "11".repeat(32)),
                        "from": "0x3535353535353535353535353535353535353535",
                        "to": SENDER
                    }
                ]
            })))
            .mount(&server)
            .await;

        let config = RpcConfig::new(server.uri())
            .with_history_api(format!("{}/api", server.uri()), Some("test-key".into()));
        let provider = JsonRpcProvider::with_config(&config).unwrap();

        let history = provider.get_transaction_history(&sender).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].block_number, 120);
        assert!(history[0].to.is_none());
        assert_eq!(history[1].to, Some(sender));
    }

    #[tokio::test]
    async fn test_empty_history() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "0",
                "message": "No transactions found",
                "result": []
            })))
            .mount(&server)
            .await;

        let config = RpcConfig::new(server.uri()).with_history_api(server.uri(), None);
        let provider = JsonRpcProvider::with_config(&config).unwrap();

        let history = provider.get_transaction_history(&EthAddress::zero()).await.unwrap();
        assert!(history.is_empty());
    }

    #[tokio::test]
    async fn test_history_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "0",
                "message": "NOTOK",
                "result": "Invalid API Key"
            })))
            .mount(&server)
            .await;

        let config = RpcConfig::new(server.uri()).with_history_api(server.uri(), Some("bad".into()));
        let provider = JsonRpcProvider::with_config(&config).unwrap();

        let err = provider
            .get_transaction_history(&EthAddress::zero())
            .await
            .unwrap_err();
        assert!(matches!(err, CloakError::RpcError(ref m) if m.contains("Invalid API Key")));
    }
}
