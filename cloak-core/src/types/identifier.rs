//! Recipient identifiers.
//!
//! A recipient can be named by a raw public key, by the hash of a transaction
//! they signed, by their address, or by a name-service name. [`Identifier`]
//! is the closed set of those forms; resolution matches on it exhaustively.

use crate::constants::{TX_HASH_SIZE, UNCOMPRESSED_PUBLIC_KEY_SIZE};
use crate::error::{CloakError, Result};

use super::{EthAddress, PublicKey, TxHash};

/// A parsed recipient identifier.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Identifier {
    /// Uncompressed public key (`0x04` + 128 hex characters)
    PublicKey(PublicKey),
    /// Hash of a transaction the recipient signed (`0x` + 64 hex characters)
    TransactionHash(TxHash),
    /// Ethereum address (`0x` + 40 hex characters)
    Address(EthAddress),
    /// Name-service name, normalized to lowercase
    Name(String),
}

impl Identifier {
    /// Parses an identifier string.
    ///
    /// Format errors from the underlying type are returned unchanged, so a
    /// caller can tell a malformed address apart from an unknown one.
    pub fn parse(input: &str) -> Result<Self> {
        let s = input.trim();
        if s.is_empty() {
            return Err(CloakError::ValidationError("identifier cannot be empty".into()));
        }

        // Checked first: names such as `0xsplits.eth` also start with 0x
        if s.contains('.') {
            return Ok(Identifier::Name(s.to_lowercase()));
        }

        if let Some(digits) = s.strip_prefix("0x") {
            let all_hex = digits.chars().all(|c| c.is_ascii_hexdigit());
            let key_len = UNCOMPRESSED_PUBLIC_KEY_SIZE * 2;

            // Raw X || Y or a wrong prefix still reads as a malformed key
            if all_hex && (digits.len() == key_len || digits.len() == key_len - 2) {
                return Ok(Identifier::PublicKey(PublicKey::from_hex(s)?));
            }
            if all_hex && digits.len() == TX_HASH_SIZE * 2 {
                return Ok(Identifier::TransactionHash(TxHash::from_hex(s)?));
            }
            return Ok(Identifier::Address(EthAddress::from_hex(s)?));
        }

        // Bare 40-character hex is still an address
        EthAddress::from_hex(s).map(Identifier::Address)
    }

    /// Short label of the identifier kind, for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Identifier::PublicKey(_) => "public_key",
            Identifier::TransactionHash(_) => "transaction_hash",
            Identifier::Address(_) => "address",
            Identifier::Name(_) => "name",
        }
    }
}

impl std::str::FromStr for Identifier {
    type Err = CloakError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
