//! Announcement events read from chain logs.
//!
//! Log sources do not guarantee emission order, so every event exposes its
//! block number through [`BlockOrdered`] and is re-ordered before use.

use serde::{Deserialize, Serialize};

use super::{CompressedPublicKey, EthAddress, TxHash};

/// An event that can be ordered by the block it was emitted in.
pub trait BlockOrdered {
    /// Block the event was emitted in.
    fn block_number(&self) -> u64;
}

/// A generic announcement: a block number plus an opaque payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnouncementEvent<T> {
    /// Block the event was emitted in
    pub block_number: u64,
    /// Event payload
    pub payload: T,
}

impl<T> AnnouncementEvent<T> {
    /// Creates a new announcement event.
    pub fn new(block_number: u64, payload: T) -> Self {
        Self {
            block_number,
            payload,
        }
    }
}

impl<T> BlockOrdered for AnnouncementEvent<T> {
    fn block_number(&self) -> u64 {
        self.block_number
    }
}

/// A `StealthKeyChanged` log from the stealth key registry.
///
/// The registry stores each key as a compressed point; the latest event for a
/// registrant (by block) holds its current keys.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StealthKeyChangedEvent {
    /// Address whose keys changed
    pub registrant: EthAddress,
    /// New spending key
    pub spending_public_key: CompressedPublicKey,
    /// New viewing key
    pub viewing_public_key: CompressedPublicKey,
    /// Block the log was emitted in
    pub block_number: u64,
    /// Transaction that emitted the log
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<TxHash>,
}

impl BlockOrdered for StealthKeyChangedEvent {
    fn block_number(&self) -> u64 {
        self.block_number
    }
}

impl<E: BlockOrdered + ?Sized> BlockOrdered for &E {
    fn block_number(&self) -> u64 {
        (**self).block_number()
    }
}
