//! Collaborator configuration.
//!
//! Read from the environment (and a `.env` file, if present):
//!
//! | Variable               | Default                              |
//! |------------------------|--------------------------------------|
//! | `ETH_RPC_URL`          | `https://ethereum.publicnode.com`    |
//! | `HISTORY_API_URL`      | unset (advanced lookups disabled)    |
//! | `HISTORY_API_KEY`      | unset                                |
//! | `STEALTH_KEY_REGISTRY` | the mainnet stealth key registry     |
//! | `RPC_TIMEOUT_SECONDS`  | `30`                                 |

use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use cloak_core::constants::{DEFAULT_STEALTH_KEY_REGISTRY, ENS_REGISTRY_ADDRESS};
use cloak_core::error::{CloakError, Result};
use cloak_core::types::EthAddress;

/// Default Ethereum RPC URL when none is provided.
pub const DEFAULT_ETH_RPC_URL: &str = "https://ethereum.publicnode.com";

/// Default request timeout.
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

/// Settings shared by the JSON-RPC provider, ENS client and registry client.
#[derive(Clone, Serialize, Deserialize)]
pub struct RpcConfig {
    /// Ethereum JSON-RPC endpoint
    pub rpc_url: String,
    /// Etherscan-compatible API endpoint for transaction history
    pub history_api_url: Option<String>,
    /// API key for the history endpoint
    pub history_api_key: Option<String>,
    /// Stealth key registry contract
    pub registry_address: String,
    /// ENS registry contract
    pub ens_registry_address: String,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            rpc_url: DEFAULT_ETH_RPC_URL.into(),
            history_api_url: None,
            history_api_key: None,
            registry_address: DEFAULT_STEALTH_KEY_REGISTRY.into(),
            ens_registry_address: ENS_REGISTRY_ADDRESS.into(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
        }
    }
}

impl std::fmt::Debug for RpcConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcConfig")
            .field("rpc_url", &self.rpc_url)
            .field("history_api_url", &self.history_api_url)
            .field("history_api_key", &self.history_api_key.as_ref().map(|_| "[REDACTED]"))
            .field("registry_address", &self.registry_address)
            .field("ens_registry_address", &self.ens_registry_address)
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

impl RpcConfig {
    /// Creates a configuration for the given RPC URL.
    pub fn new(rpc_url: impl Into<String>) -> Self {
        Self {
            rpc_url: rpc_url.into(),
            ..Default::default()
        }
    }

    /// Loads the configuration from the environment.
    ///
    /// # Errors
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from a variable lookup function.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let timeout_seconds = match lookup("RPC_TIMEOUT_SECONDS") {
            Some(raw) => raw.trim().parse().map_err(|_| {
                CloakError::ConfigError(format!("RPC_TIMEOUT_SECONDS is not a number: {}", raw))
            })?,
            None => defaults.timeout_seconds,
        };

        let config = Self {
            rpc_url: lookup("ETH_RPC_URL").unwrap_or(defaults.rpc_url),
            history_api_url: lookup("HISTORY_API_URL"),
            history_api_key: lookup("HISTORY_API_KEY"),
            registry_address: lookup("STEALTH_KEY_REGISTRY").unwrap_or(defaults.registry_address),
            ens_registry_address: defaults.ens_registry_address,
            timeout_seconds,
        };
        config.validate()?;
        Ok(config)
    }

    /// Sets the transaction-history endpoint.
    pub fn with_history_api(mut self, url: impl Into<String>, api_key: Option<String>) -> Self {
        self.history_api_url = Some(url.into());
        self.history_api_key = api_key;
        self
    }

    /// Sets the stealth key registry contract.
    pub fn with_registry_address(mut self, address: impl Into<String>) -> Self {
        self.registry_address = address.into();
        self
    }

    /// Sets the ENS registry contract.
    pub fn with_ens_registry_address(mut self, address: impl Into<String>) -> Self {
        self.ens_registry_address = address.into();
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout_seconds = seconds;
        self
    }

    /// Checks URLs, addresses and the timeout.
    pub fn validate(&self) -> Result<()> {
        validate_http_url("ETH_RPC_URL", &self.rpc_url)?;
        if let Some(url) = &self.history_api_url {
            validate_http_url("HISTORY_API_URL", url)?;
        }
        self.registry_address()?;
        self.ens_registry_address()?;
        if self.timeout_seconds == 0 {
            return Err(CloakError::ConfigError("timeout must be at least one second".into()));
        }
        Ok(())
    }

    /// Parsed stealth key registry address.
    pub fn registry_address(&self) -> Result<EthAddress> {
        parse_address("STEALTH_KEY_REGISTRY", &self.registry_address)
    }

    /// Parsed ENS registry address.
    pub fn ens_registry_address(&self) -> Result<EthAddress> {
        parse_address("ENS registry", &self.ens_registry_address)
    }

    /// Request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Builds an HTTP client with this configuration's timeout.
    pub fn http_client(&self) -> Result<reqwest::Client> {
        reqwest::Client::builder()
            .timeout(self.timeout())
            .build()
            .map_err(|e| CloakError::ConfigError(format!("failed to create HTTP client: {}", e)))
    }
}

fn validate_http_url(name: &str, raw: &str) -> Result<()> {
    let url = Url::parse(raw)
        .map_err(|e| CloakError::ConfigError(format!("{} is not a valid URL ({}): {}", name, e, raw)))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(CloakError::ConfigError(format!(
            "{} must use http or https, got {}",
            name, other
        ))),
    }
}

fn parse_address(name: &str, raw: &str) -> Result<EthAddress> {
    EthAddress::from_hex(raw)
        .map_err(|e| CloakError::ConfigError(format!("{} is not a valid address: {}", name, e)))
}
