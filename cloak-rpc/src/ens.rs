//! ENS client for resolving `.eth` names to addresses.
//!
//! Resolution is two `eth_call`s: `resolver(namehash)` on the ENS registry,
//! then `addr(namehash)` on the returned resolver.

use std::sync::Arc;

use alloy::primitives::{Address, B256};
use async_trait::async_trait;
use tracing::{debug, instrument};

use cloak_core::error::{CloakError, Result};
use cloak_core::traits::NameResolver;
use cloak_core::types::EthAddress;
use cloak_crypto::keccak256;

use crate::client::JsonRpcClient;
use crate::config::RpcConfig;
use crate::contracts::{addrCall, from_alloy, resolverCall};

/// Computes the ENS namehash of a normalized name.
///
/// ```rust
/// use cloak_rpc::namehash;
///
/// assert_eq!(
///     hex::encode(namehash("eth")),
///     "93cdeb708b7545dc668eb9280176169d1c33cfd8ed6f04690a0bcc88a93fc4ae"
/// );
/// ```
pub fn namehash(name: &str) -> [u8; 32] {
    let mut node = [0u8; 32];
    if name.is_empty() {
        return node;
    }

    for label in name.rsplit('.') {
        let label_hash = keccak256(label.as_bytes());
        let mut combined = [0u8; 64];
        combined[..32].copy_from_slice(&node);
        combined[32..].copy_from_slice(&label_hash);
        node = keccak256(&combined);
    }
    node
}

/// Lowercases and trims an ENS name, rejecting empty labels.
pub fn normalize_name(name: &str) -> Result<String> {
    let normalized = name.trim().to_lowercase();

    if normalized.is_empty() {
        return Err(CloakError::ValidationError("ENS name cannot be empty".into()));
    }
    if normalized.split('.').any(str::is_empty) {
        return Err(CloakError::ValidationError(format!(
            "ENS name '{}' has an empty label",
            name
        )));
    }
    if !normalized.contains('.') {
        return Err(CloakError::ValidationError(format!(
            "ENS name '{}' must be a full domain",
            name
        )));
    }

    Ok(normalized)
}

/// ENS name resolver over JSON-RPC.
pub struct EnsClient {
    rpc: Arc<JsonRpcClient>,
    registry: EthAddress,
}

impl EnsClient {
    /// Creates a client for the given RPC URL and the mainnet ENS registry.
    pub fn new(rpc_url: impl Into<String>) -> Result<Self> {
        Self::with_config(&RpcConfig::new(rpc_url))
    }

    /// Creates a client from a full configuration.
    pub fn with_config(config: &RpcConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_client(
            Arc::new(JsonRpcClient::new(config)?),
            config.ens_registry_address()?,
        ))
    }

    /// Creates a client sharing an existing JSON-RPC client.
    pub fn from_client(rpc: Arc<JsonRpcClient>, registry: EthAddress) -> Self {
        Self { rpc, registry }
    }

    /// Returns the resolver contract of a name, if one is set.
    #[instrument(skip(self))]
    pub async fn resolver_address(&self, name: &str) -> Result<Option<EthAddress>> {
        let node = B256::from(namehash(&normalize_name(name)?));
        self.resolver_of(node).await
    }

    async fn resolver_of(&self, node: B256) -> Result<Option<EthAddress>> {
        let result = self
            .rpc
            .call_contract(&self.registry, resolverCall { node })
            .await?;
        Ok(non_zero(result.map(|r| r._0)))
    }

    async fn address_of(&self, resolver: &EthAddress, node: B256) -> Result<Option<EthAddress>> {
        let result = self.rpc.call_contract(resolver, addrCall { node }).await?;
        Ok(non_zero(result.map(|r| r._0)))
    }
}

/// The zero address means "no record".
fn non_zero(address: Option<Address>) -> Option<EthAddress> {
    address.filter(|a| !a.is_zero()).map(from_alloy)
}

#[async_trait]
impl NameResolver for EnsClient {
    #[instrument(skip(self))]
    async fn resolve(&self, name: &str) -> Result<Option<EthAddress>> {
        let normalized = normalize_name(name)?;
        let node = B256::from(namehash(&normalized));

        let resolver = match self.resolver_of(node).await? {
            Some(resolver) => resolver,
            None => {
                debug!(name = %normalized, "No resolver set");
                return Ok(None);
            }
        };

        let address = self.address_of(&resolver, node).await?;
        debug!(name = %normalized, resolver = %resolver, found = address.is_some(), "Resolved ENS name");
        Ok(address)
    }

    fn supports(&self, name: &str) -> bool {
        name.trim().to_lowercase().ends_with(".eth")
    }
}
