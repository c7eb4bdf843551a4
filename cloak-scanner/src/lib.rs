//! # Cloak Scanner
//!
//! Read-side helpers over chain history.
//!
//! ## Features
//!
//! - **Log Ordering**: Registry logs re-ordered by block, ties kept in arrival order
//! - **Current Keys**: Fold `StealthKeyChanged` logs into a registrant's live keys
//! - **Sent Transactions**: Find the latest transaction an address signed
//!
//! ## Example
//!
//! ```rust,ignore
//! use cloak_scanner::{get_sent_transaction, latest_stealth_keys};
//!
//! // Hash of a transaction the address signed, for key recovery
//! let tx_hash = get_sent_transaction(&address, &provider).await?;
//!
//! // Keys the address most recently registered
//! let keys = latest_stealth_keys(&logs, &address)?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

use tracing::{debug, info, instrument};

use cloak_core::error::{CloakError, Result};
use cloak_core::traits::ChainProvider;
use cloak_core::types::{
    BlockOrdered, EthAddress, PublicKeyPair, StealthKeyChangedEvent, TransactionSummary, TxHash,
};
use cloak_crypto::curve::decompress_public_key;

// ═══════════════════════════════════════════════════════════════════════════════
// LOG ORDERING
// ═══════════════════════════════════════════════════════════════════════════════

/// Sorts events by ascending block number.
///
/// The sort is stable: events from the same block keep the order they
/// arrived in, which for a single log query is their log index order.
pub fn sort_stealth_key_logs<E: BlockOrdered>(mut events: Vec<E>) -> Vec<E> {
    events.sort_by_key(|event| event.block_number());
    events
}

/// Returns the registrant's current keys from a set of registry logs.
///
/// Logs may arrive in any order. The latest one by block wins; within a block
/// the last one in arrival order wins. Returns `Ok(None)` if the registrant
/// never emitted a log.
///
/// # Errors
/// Returns `PointNotOnCurve` if the winning log carries a key that does not
/// decompress.
pub fn latest_stealth_keys(
    events: &[StealthKeyChangedEvent],
    registrant: &EthAddress,
) -> Result<Option<PublicKeyPair>> {
    let ordered = sort_stealth_key_logs(
        events
            .iter()
            .filter(|event| &event.registrant == registrant)
            .collect::<Vec<_>>(),
    );

    let Some(latest) = ordered.last() else {
        debug!(%registrant, "No StealthKeyChanged logs for registrant");
        return Ok(None);
    };

    debug!(
        %registrant,
        block = latest.block_number,
        logs = ordered.len(),
        "Using latest StealthKeyChanged log"
    );

    Ok(Some(PublicKeyPair::new(
        decompress_public_key(&latest.spending_public_key)?,
        decompress_public_key(&latest.viewing_public_key)?,
    )))
}

// ═══════════════════════════════════════════════════════════════════════════════
// SENT TRANSACTIONS
// ═══════════════════════════════════════════════════════════════════════════════

/// Picks the most recent transaction sent by `address` from a history list.
///
/// Entries where `address` is only the recipient are skipped. Among entries in
/// the same block, the later one in the list wins.
pub fn latest_sent<'a>(
    history: &'a [TransactionSummary],
    address: &EthAddress,
) -> Option<&'a TransactionSummary> {
    history
        .iter()
        .filter(|tx| &tx.from == address)
        .max_by_key(|tx| tx.block_number)
}

/// Returns the hash of the latest transaction `address` signed.
///
/// # Errors
///
/// - `NoHistory` if the address never sent a transaction
/// - Any provider error, unchanged
#[instrument(skip(provider), fields(address = %address))]
pub async fn get_sent_transaction(
    address: &EthAddress,
    provider: &dyn ChainProvider,
) -> Result<TxHash> {
    let history = provider.get_transaction_history(address).await?;
    debug!(entries = history.len(), "Fetched transaction history");

    let sent = latest_sent(&history, address)
        .ok_or_else(|| CloakError::NoHistory(address.to_checksum_string()))?;

    info!(tx_hash = %sent.hash, block = sent.block_number, "Found sent transaction");
    Ok(sent.hash)
}
