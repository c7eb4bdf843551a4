//! # Cloak RPC
//!
//! Network-backed collaborators for the Cloak resolver:
//!
//! - [`JsonRpcProvider`]: transactions over JSON-RPC, history over an
//!   Etherscan-compatible API
//! - [`EnsClient`]: `.eth` names to addresses
//! - [`RegistryContractClient`]: keys from the on-chain stealth key registry
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use cloak_rpc::{EnsClient, JsonRpcProvider, RegistryContractClient, RpcConfig};
//! use cloak_stealth::RecipientResolver;
//!
//! let config = RpcConfig::from_env()?;
//! let resolver = RecipientResolver::new(
//!     Arc::new(JsonRpcProvider::with_config(&config)?),
//!     Arc::new(RegistryContractClient::with_config(&config)?),
//!     Arc::new(EnsClient::with_config(&config)?),
//! );
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod client;
mod config;
mod contracts;
mod ens;
mod provider;
mod registry_contract;

#[cfg(test)]
#[allow(missing_docs)]
mod test_support;

pub use client::JsonRpcClient;
pub use config::{RpcConfig, DEFAULT_ETH_RPC_URL, DEFAULT_TIMEOUT_SECONDS};
pub use ens::{namehash, normalize_name, EnsClient};
pub use provider::JsonRpcProvider;
pub use registry_contract::RegistryContractClient;
