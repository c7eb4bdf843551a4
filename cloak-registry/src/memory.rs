//! In-memory public-key registry.
//!
//! Fast, thread-safe storage suitable for development, testing,
//! and single-process deployments.

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use cloak_core::error::Result;
use cloak_core::traits::KeyRegistry;
use cloak_core::types::{EthAddress, PublicKeyPair, StealthKeyChangedEvent};
use cloak_crypto::curve::point_from_public_key;
use cloak_scanner::latest_stealth_keys;

/// Registry counters.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryStats {
    /// Registrations written, including key rotations
    pub registrations: u64,
    /// Lookups served
    pub lookups: u64,
    /// Lookups that found keys
    pub hits: u64,
}

impl RegistryStats {
    /// Lookups that found nothing.
    pub fn misses(&self) -> u64 {
        self.lookups.saturating_sub(self.hits)
    }
}

/// In-memory public-key registry.
///
/// Every stored key has passed the curve check, so a lookup never hands out
/// a point the deriver would reject.
///
/// # Thread Safety
///
/// All operations are thread-safe and can be called concurrently.
#[derive(Debug, Default)]
pub struct MemoryKeyRegistry {
    /// Primary storage: address → keys
    keys: DashMap<EthAddress, PublicKeyPair>,
    /// Registry statistics
    stats: RwLock<RegistryStats>,
}

impl MemoryKeyRegistry {
    /// Creates a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry with preallocated capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            keys: DashMap::with_capacity(capacity),
            stats: RwLock::new(RegistryStats::default()),
        }
    }

    /// Registers (or rotates) the keys for an address.
    ///
    /// Returns the keys that were replaced, if any.
    ///
    /// # Errors
    /// Returns `PointNotOnCurve` if either key is not a curve point.
    #[instrument(skip(self, keys))]
    pub fn register(
        &self,
        address: EthAddress,
        keys: PublicKeyPair,
    ) -> Result<Option<PublicKeyPair>> {
        point_from_public_key(&keys.spending_public_key)?;
        point_from_public_key(&keys.viewing_public_key)?;

        let previous = self.keys.insert(address, keys);
        self.stats.write().registrations += 1;

        debug!(rotated = previous.is_some(), "Registered stealth keys");
        Ok(previous)
    }

    /// Removes an address's keys.
    pub fn unregister(&self, address: &EthAddress) -> Option<PublicKeyPair> {
        self.keys.remove(address).map(|(_, keys)| keys)
    }

    /// Loads the current keys of every registrant found in a set of
    /// `StealthKeyChanged` logs.
    ///
    /// Logs may be in any order; the latest per registrant wins. Returns the
    /// number of registrants loaded.
    pub fn import_logs(&self, events: &[StealthKeyChangedEvent]) -> Result<usize> {
        let mut registrants: Vec<EthAddress> = events.iter().map(|e| e.registrant).collect();
        registrants.sort();
        registrants.dedup();

        let mut imported = 0;
        for registrant in registrants {
            if let Some(keys) = latest_stealth_keys(events, &registrant)? {
                self.register(registrant, keys)?;
                imported += 1;
            }
        }

        debug!(imported, logs = events.len(), "Imported StealthKeyChanged logs");
        Ok(imported)
    }

    /// Returns every registration (for export/backup).
    pub fn all_registrations(&self) -> Vec<(EthAddress, PublicKeyPair)> {
        self.keys
            .iter()
            .map(|entry| (*entry.key(), *entry.value()))
            .collect()
    }

    /// Returns the current statistics.
    pub fn stats(&self) -> RegistryStats {
        self.stats.read().clone()
    }

    /// Clears all registrations and statistics.
    pub fn clear(&self) {
        self.keys.clear();
        *self.stats.write() = RegistryStats::default();
    }

    /// Returns the number of registered addresses.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Returns true if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

#[async_trait]
impl KeyRegistry for MemoryKeyRegistry {
    #[instrument(skip(self))]
    async fn lookup(&self, address: &EthAddress) -> Result<Option<PublicKeyPair>> {
        let found = self.keys.get(address).map(|entry| *entry.value());

        let mut stats = self.stats.write();
        stats.lookups += 1;
        if found.is_some() {
            stats.hits += 1;
        }

        debug!(found = found.is_some(), "Registry lookup");
        Ok(found)
    }
}
