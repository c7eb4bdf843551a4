//! Client for the on-chain stealth key registry.
//!
//! The contract stores, per registrant, two compressed secp256k1 keys as
//! `(prefix, x)` pairs of `uint256`. A registrant that never registered
//! reads back as four zero words.

use std::sync::Arc;

use alloy::primitives::{Bytes, B256, U256};
use alloy::sol_types::SolEvent;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, instrument, warn};

use cloak_core::error::{CloakError, Result};
use cloak_core::traits::KeyRegistry;
use cloak_core::types::{CompressedPublicKey, EthAddress, PublicKeyPair, StealthKeyChangedEvent, TxHash};
use cloak_crypto::curve::decompress_public_key;
use cloak_scanner::latest_stealth_keys;

use crate::client::JsonRpcClient;
use crate::config::RpcConfig;
use crate::contracts::{abi_error, from_alloy, stealthKeysCall, to_alloy, StealthKeyChanged};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RpcLog {
    topics: Vec<B256>,
    data: Bytes,
    #[serde(default)]
    block_number: Option<U256>,
    #[serde(default)]
    transaction_hash: Option<B256>,
    #[serde(default)]
    removed: bool,
}

/// [`KeyRegistry`] backed by the stealth key registry contract.
pub struct RegistryContractClient {
    rpc: Arc<JsonRpcClient>,
    address: EthAddress,
}

impl RegistryContractClient {
    /// Creates a client for the given RPC URL and the default registry.
    pub fn new(rpc_url: impl Into<String>) -> Result<Self> {
        Self::with_config(&RpcConfig::new(rpc_url))
    }

    /// Creates a client from a full configuration.
    pub fn with_config(config: &RpcConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_client(
            Arc::new(JsonRpcClient::new(config)?),
            config.registry_address()?,
        ))
    }

    /// Creates a client sharing an existing JSON-RPC client.
    pub fn from_client(rpc: Arc<JsonRpcClient>, address: EthAddress) -> Self {
        Self { rpc, address }
    }

    /// Registry contract address.
    pub fn address(&self) -> &EthAddress {
        &self.address
    }

    /// Reads a registrant's current keys from contract storage.
    ///
    /// Returns `Ok(None)` if the registrant has not registered.
    ///
    /// # Errors
    /// - `InvalidPublicKey` if a stored prefix is not 2 or 3
    /// - `PointNotOnCurve` if a stored key does not decompress
    #[instrument(skip(self), fields(registrant = %registrant))]
    pub async fn stealth_keys(&self, registrant: &EthAddress) -> Result<Option<PublicKeyPair>> {
        let call = stealthKeysCall { registrant: to_alloy(registrant) };
        let keys = match self.rpc.call_contract(&self.address, call).await? {
            Some(keys) => keys,
            None => {
                warn!(registry = %self.address, "Registry returned no data; is the address a contract?");
                return Ok(None);
            }
        };

        let words = [
            keys.spendingPubKeyPrefix,
            keys.spendingPubKey,
            keys.viewingPubKeyPrefix,
            keys.viewingPubKey,
        ];
        if words.iter().all(U256::is_zero) {
            debug!("Registrant has no stealth keys");
            return Ok(None);
        }

        let spending = compressed_key(keys.spendingPubKeyPrefix, keys.spendingPubKey)?;
        let viewing = compressed_key(keys.viewingPubKeyPrefix, keys.viewingPubKey)?;

        Ok(Some(PublicKeyPair::new(
            decompress_public_key(&spending)?,
            decompress_public_key(&viewing)?,
        )))
    }

    /// Fetches every `StealthKeyChanged` log for a registrant.
    ///
    /// Pending and removed logs are skipped. Order is whatever the node
    /// returned.
    #[instrument(skip(self), fields(registrant = %registrant))]
    pub async fn stealth_key_logs(&self, registrant: &EthAddress) -> Result<Vec<StealthKeyChangedEvent>> {
        let params = json!([{
            "address": self.address.to_lower_hex(),
            "fromBlock": "0x0",
            "toBlock": "latest",
            "topics": [StealthKeyChanged::SIGNATURE_HASH, to_alloy(registrant).into_word()],
        }]);

        let logs: Vec<RpcLog> = self.rpc.request("eth_getLogs", params).await?.unwrap_or_default();
        debug!(count = logs.len(), "Fetched registry logs");

        logs.into_iter()
            .filter(|log| !log.removed)
            .filter_map(|log| {
                let block = log.block_number?;
                Some(to_event(log, block))
            })
            .collect()
    }

    /// Folds the registrant's logs into its latest keys.
    pub async fn latest_logged_keys(&self, registrant: &EthAddress) -> Result<Option<PublicKeyPair>> {
        let logs = self.stealth_key_logs(registrant).await?;
        latest_stealth_keys(&logs, registrant)
    }
}

#[async_trait]
impl KeyRegistry for RegistryContractClient {
    async fn lookup(&self, address: &EthAddress) -> Result<Option<PublicKeyPair>> {
        self.stealth_keys(address).await
    }
}

fn to_event(log: RpcLog, block: U256) -> Result<StealthKeyChangedEvent> {
    let event = StealthKeyChanged::decode_raw_log(log.topics, &log.data, true).map_err(abi_error)?;

    let block_number = u64::try_from(block)
        .map_err(|_| CloakError::RpcError(format!("block number {} out of range", block)))?;

    Ok(StealthKeyChangedEvent {
        registrant: from_alloy(event.registrant),
        spending_public_key: compressed_key(event.spendingPubKeyPrefix, event.spendingPubKey)?,
        viewing_public_key: compressed_key(event.viewingPubKeyPrefix, event.viewingPubKey)?,
        block_number,
        tx_hash: log.transaction_hash.map(|hash| TxHash::from_array(hash.0)),
    })
}

/// Builds a compressed key from a `(prefix, x)` pair of words.
fn compressed_key(prefix: U256, x: U256) -> Result<CompressedPublicKey> {
    let prefix = u8::try_from(prefix)
        .map_err(|_| CloakError::InvalidPublicKey(format!("registry prefix {} is not 2 or 3", prefix)))?;
    CompressedPublicKey::from_prefix_and_x(prefix, &x.to_be_bytes::<32>())
}
