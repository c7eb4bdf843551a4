//! Collaborator traits for Cloak.
//!
//! The stealth core never talks to a chain, a registry, or a name service
//! directly. It consumes these interfaces, so any backend (JSON-RPC, an
//! indexer, an in-memory fixture) can be plugged in.
//!
//! Implementations own their timeouts. Callers in this workspace never retry
//! a failed call.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{EthAddress, PublicKeyPair, TransactionRecord, TransactionSummary, TxHash};

// ═══════════════════════════════════════════════════════════════════════════════
// CHAIN PROVIDER
// ═══════════════════════════════════════════════════════════════════════════════

/// Read access to chain data.
#[async_trait]
pub trait ChainProvider: Send + Sync {
    /// Fetches a transaction by hash.
    ///
    /// Returns `Ok(None)` if the provider does not know the hash.
    async fn get_transaction(&self, hash: &TxHash) -> Result<Option<TransactionRecord>>;

    /// Returns the transaction history of an address.
    ///
    /// Order is provider-defined; consumers must not rely on it.
    async fn get_transaction_history(&self, address: &EthAddress) -> Result<Vec<TransactionSummary>>;
}

// ═══════════════════════════════════════════════════════════════════════════════
// KEY REGISTRY
// ═══════════════════════════════════════════════════════════════════════════════

/// Public-key registry keyed by address.
///
/// Implementations might use:
/// - In-memory storage (for testing/development)
/// - The on-chain stealth key registry contract
#[async_trait]
pub trait KeyRegistry: Send + Sync {
    /// Looks up the registered keys for an address.
    ///
    /// Returns `Ok(None)` if the address has not registered.
    async fn lookup(&self, address: &EthAddress) -> Result<Option<PublicKeyPair>>;
}

// ═══════════════════════════════════════════════════════════════════════════════
// NAME SERVICE
// ═══════════════════════════════════════════════════════════════════════════════

/// Name-service resolution (ENS, CNS, ...).
#[async_trait]
pub trait NameResolver: Send + Sync {
    /// Resolves a name to an address.
    ///
    /// Returns `Ok(None)` if the name has no address record.
    async fn resolve(&self, name: &str) -> Result<Option<EthAddress>>;

    /// Returns true if this resolver handles the given name.
    fn supports(&self, name: &str) -> bool {
        crate::constants::NAME_SERVICE_SUFFIXES
            .iter()
            .any(|suffix| name.ends_with(suffix))
    }
}
