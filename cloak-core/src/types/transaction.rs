//! Transaction records returned by a chain provider.
//!
//! Only the fields needed to recover the signer are modelled: the signature,
//! the declared sender, and the hash that was signed.

use serde::{Deserialize, Serialize};

use crate::constants::{EIP155_V_OFFSET, LEGACY_V_OFFSET, RECOVERABLE_SIGNATURE_SIZE};
use crate::error::{CloakError, Result};

use super::{EthAddress, TxHash};

/// Transaction wire type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    /// Type 0: pre-EIP-2718, `v` is 27/28 or EIP-155 encoded
    Legacy,
    /// Type 1: EIP-2930 access-list transaction
    AccessList,
    /// Type 2: EIP-1559 fee-market transaction
    FeeMarket,
}

impl TransactionType {
    /// Maps an EIP-2718 type byte.
    pub fn from_type_byte(byte: u8) -> Result<Self> {
        match byte {
            0 => Ok(TransactionType::Legacy),
            1 => Ok(TransactionType::AccessList),
            2 => Ok(TransactionType::FeeMarket),
            other => Err(CloakError::ValidationError(format!(
                "unsupported transaction type {}",
                other
            ))),
        }
    }

    /// Returns the EIP-2718 type byte.
    pub fn type_byte(&self) -> u8 {
        match self {
            TransactionType::Legacy => 0,
            TransactionType::AccessList => 1,
            TransactionType::FeeMarket => 2,
        }
    }

    /// Extracts the ECDSA recovery id (0 or 1) from a `v` value.
    pub fn recovery_id(&self, v: u64) -> Result<u8> {
        let id = match self {
            TransactionType::Legacy => match v {
                27 | 28 => v - LEGACY_V_OFFSET,
                v if v >= EIP155_V_OFFSET => (v - EIP155_V_OFFSET) % 2,
                _ => {
                    return Err(CloakError::InvalidSignature(format!(
                        "legacy transaction has invalid v = {}",
                        v
                    )))
                }
            },
            // Typed transactions carry y-parity; some nodes still report 27/28
            TransactionType::AccessList | TransactionType::FeeMarket => match v {
                0 | 1 => v,
                27 | 28 => v - LEGACY_V_OFFSET,
                _ => {
                    return Err(CloakError::InvalidSignature(format!(
                        "typed transaction has invalid y-parity = {}",
                        v
                    )))
                }
            },
        };
        Ok(id as u8)
    }

    /// Returns the EIP-155 chain id encoded in a legacy `v`, if any.
    pub fn legacy_chain_id(v: u64) -> Option<u64> {
        if v >= EIP155_V_OFFSET {
            Some((v - EIP155_V_OFFSET) / 2)
        } else {
            None
        }
    }
}

/// A signed transaction as seen by the key recovery engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// Transaction hash
    pub hash: TxHash,
    /// Wire type
    pub tx_type: TransactionType,
    /// Declared sender
    pub from: EthAddress,
    /// Signature `r`
    #[serde(with = "hex")]
    pub r: [u8; 32],
    /// Signature `s`
    #[serde(with = "hex")]
    pub s: [u8; 32],
    /// Signature `v` as reported by the provider
    pub v: u64,
    /// Hash of the unsigned payload that was signed
    #[serde(with = "hex")]
    pub signing_hash: [u8; 32],
    /// Block the transaction was mined in, if mined
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_number: Option<u64>,
}

impl TransactionRecord {
    /// Returns the normalized recovery id for this transaction's type.
    pub fn recovery_id(&self) -> Result<u8> {
        self.tx_type.recovery_id(self.v)
    }

    /// Reassembles the 65-byte recoverable signature `r || s || recovery_id`.
    pub fn recoverable_signature(&self) -> Result<[u8; RECOVERABLE_SIGNATURE_SIZE]> {
        let mut sig = [0u8; RECOVERABLE_SIGNATURE_SIZE];
        sig[..32].copy_from_slice(&self.r);
        sig[32..64].copy_from_slice(&self.s);
        sig[64] = self.recovery_id()?;
        Ok(sig)
    }
}

/// One entry of an address's transaction history.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionSummary {
    /// Transaction hash
    pub hash: TxHash,
    /// Sender
    pub from: EthAddress,
    /// Recipient (None for contract creation)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<EthAddress>,
    /// Block number
    pub block_number: u64,
}
