//! Public-key recovery from signed transactions.
//!
//! ```text
//! tx hash ──provider──▶ TransactionRecord { r, s, v, signing_hash, from }
//!                              │
//!               recovery id from v (per wire type)
//!                              │
//!                 ecrecover(signing_hash, r, s, id)
//!                              │
//!             address(recovered) == from ?  ──no──▶ RecoveryMismatch
//! ```

use tracing::{debug, instrument, warn};

use cloak_core::error::{CloakError, Result};
use cloak_core::traits::ChainProvider;
use cloak_core::types::{PublicKey, TransactionRecord, TxHash};
use cloak_crypto::recover_public_key_for_address;

/// Recovers the public key of whoever signed the transaction `tx_hash`.
///
/// # Errors
///
/// - `InvalidTransactionHash` if `tx_hash` is not `0x` + 64 hex characters
/// - `TransactionNotFound` if the provider does not know the hash
/// - `RecoveryMismatch` if the recovered key does not belong to the sender
pub async fn recover_public_key_from_transaction(
    tx_hash: &str,
    provider: &dyn ChainProvider,
) -> Result<PublicKey> {
    let hash = TxHash::from_hex(tx_hash)?;
    recover_public_key_from_tx_hash(&hash, provider).await
}

/// Like [`recover_public_key_from_transaction`] for an already parsed hash.
#[instrument(skip(provider), fields(tx_hash = %hash))]
pub async fn recover_public_key_from_tx_hash(
    hash: &TxHash,
    provider: &dyn ChainProvider,
) -> Result<PublicKey> {
    let record = provider
        .get_transaction(hash)
        .await?
        .ok_or_else(|| CloakError::TransactionNotFound(hash.to_hex()))?;

    if record.hash != *hash {
        return Err(CloakError::RpcError(format!(
            "provider returned transaction {} for {}",
            record.hash, hash
        )));
    }

    let public_key = recover_public_key_from_record(&record).map_err(|e| {
        if e.is_mismatch() {
            warn!(declared = %record.from, "Recovered key does not match declared sender");
        }
        e
    })?;

    debug!(signer = %record.from, tx_type = ?record.tx_type, "Recovered signer public key");
    Ok(public_key)
}

/// Recovers and checks the signer of an already fetched transaction.
pub fn recover_public_key_from_record(record: &TransactionRecord) -> Result<PublicKey> {
    let signature = record.recoverable_signature()?;
    recover_public_key_for_address(&record.signing_hash, &signature, &record.from)
}
