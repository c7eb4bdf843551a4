//! Address and hash types for Cloak.
//!
//! - [`EthAddress`]: A 20-byte Ethereum address with EIP-55 checksum casing
//! - [`TxHash`]: A 32-byte transaction hash

use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};

use crate::constants::{ETH_ADDRESS_SIZE, TX_HASH_SIZE};
use crate::error::{CloakError, Result};

// ═══════════════════════════════════════════════════════════════════════════════
// ETHEREUM ADDRESS
// ═══════════════════════════════════════════════════════════════════════════════

/// A standard 20-byte Ethereum address.
///
/// Displayed with EIP-55 checksum casing. Parsing accepts all-lowercase and
/// all-uppercase input, and rejects mixed-case input whose checksum is wrong.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EthAddress {
    bytes: [u8; ETH_ADDRESS_SIZE],
}

impl EthAddress {
    /// Creates an address from raw bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != ETH_ADDRESS_SIZE {
            return Err(CloakError::InvalidAddress(format!(
                "expected {} bytes, got {}",
                ETH_ADDRESS_SIZE,
                bytes.len()
            )));
        }

        let mut arr = [0u8; ETH_ADDRESS_SIZE];
        arr.copy_from_slice(bytes);
        Ok(Self { bytes: arr })
    }

    /// Creates from a fixed-size array.
    pub fn from_array(bytes: [u8; ETH_ADDRESS_SIZE]) -> Self {
        Self { bytes }
    }

    /// Returns the raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Parses from hex string (with or without 0x prefix).
    ///
    /// # Errors
    /// Returns `InvalidAddress` on bad length, bad hex, or a bad checksum.
    pub fn from_hex(s: &str) -> Result<Self> {
        let s = s.trim();
        let digits = s.strip_prefix("0x").unwrap_or(s);
        if digits.len() != ETH_ADDRESS_SIZE * 2 {
            return Err(CloakError::InvalidAddress(format!(
                "'{}' must be {} hex characters",
                s,
                ETH_ADDRESS_SIZE * 2
            )));
        }

        let bytes = hex::decode(digits)
            .map_err(|e| CloakError::InvalidAddress(format!("'{}' is not hex: {}", s, e)))?;
        let address = Self::from_bytes(&bytes)?;

        let has_lower = digits.chars().any(|c| c.is_ascii_lowercase());
        let has_upper = digits.chars().any(|c| c.is_ascii_uppercase());
        if has_lower && has_upper {
            let expected = address.to_checksum_string();
            if expected[2..] != *digits {
                return Err(CloakError::InvalidAddress(format!(
                    "bad address checksum for '{}'",
                    s
                )));
            }
        }

        Ok(address)
    }

    /// Returns the EIP-55 checksummed hex string.
    pub fn to_checksum_string(&self) -> String {
        let lower = hex::encode(self.bytes);
        let hash = Keccak256::digest(lower.as_bytes());

        let mut out = String::with_capacity(2 + lower.len());
        out.push_str("0x");
        for (i, c) in lower.chars().enumerate() {
            let nibble = (hash[i / 2] >> (if i % 2 == 0 { 4 } else { 0 })) & 0x0f;
            if c.is_ascii_alphabetic() && nibble >= 8 {
                out.push(c.to_ascii_uppercase());
            } else {
                out.push(c);
            }
        }
        out
    }

    /// Returns the lowercase hex string with 0x prefix.
    pub fn to_lower_hex(&self) -> String {
        format!("0x{}", hex::encode(self.bytes))
    }

    /// Returns the zero address.
    pub fn zero() -> Self {
        Self {
            bytes: [0u8; ETH_ADDRESS_SIZE],
        }
    }

    /// Returns true if this is the zero address.
    pub fn is_zero(&self) -> bool {
        self.bytes.iter().all(|&b| b == 0)
    }
}

impl std::fmt::Debug for EthAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EthAddress({})", self.to_checksum_string())
    }
}

impl std::fmt::Display for EthAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_checksum_string())
    }
}

impl std::str::FromStr for EthAddress {
    type Err = CloakError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_hex(s)
    }
}

impl Serialize for EthAddress {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_checksum_string())
    }
}

impl<'de> Deserialize<'de> for EthAddress {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// TRANSACTION HASH
// ═══════════════════════════════════════════════════════════════════════════════

/// A 32-byte transaction hash.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TxHash {
    bytes: [u8; TX_HASH_SIZE],
}

impl TxHash {
    /// Creates from a fixed-size array.
    pub fn from_array(bytes: [u8; TX_HASH_SIZE]) -> Self {
        Self { bytes }
    }

    /// Parses a `0x`-prefixed 64-character hex hash.
    ///
    /// # Errors
    /// Returns `InvalidTransactionHash` if the string is empty or malformed.
    pub fn from_hex(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(CloakError::InvalidTransactionHash(
                "transaction hash is empty".into(),
            ));
        }
        let digits = s.strip_prefix("0x").ok_or_else(|| {
            CloakError::InvalidTransactionHash(format!("'{}' is missing the 0x prefix", s))
        })?;
        if digits.len() != TX_HASH_SIZE * 2 {
            return Err(CloakError::InvalidTransactionHash(format!(
                "'{}' must be {} hex characters",
                s,
                TX_HASH_SIZE * 2
            )));
        }

        let bytes = hex::decode(digits)
            .map_err(|e| CloakError::InvalidTransactionHash(format!("'{}' is not hex: {}", s, e)))?;
        let mut arr = [0u8; TX_HASH_SIZE];
        arr.copy_from_slice(&bytes);
        Ok(Self { bytes: arr })
    }

    /// Returns the raw bytes.
    pub fn as_bytes(&self) -> &[u8; TX_HASH_SIZE] {
        &self.bytes
    }

    /// Returns the `0x`-prefixed lowercase hex string.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.bytes))
    }
}

impl std::fmt::Debug for TxHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TxHash({})", self.to_hex())
    }
}

impl std::fmt::Display for TxHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for TxHash {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for TxHash {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHECKSUMMED: &str = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";

    #[test]
    fn test_eip55_checksum() {
        let addr = EthAddress::from_hex(&CHECKSUMMED.to_lowercase()).unwrap();
        assert_eq!(addr.to_checksum_string(), CHECKSUMMED);
    }

    #[test]
    fn test_eip55_accepts_valid_mixed_case() {
        assert!(EthAddress::from_hex(CHECKSUMMED).is_ok());
    }

    #[test]
    fn test_eip55_rejects_bad_checksum() {
        // Flip the case of one letter
        let bad = CHECKSUMMED.replacen('a', "A", 1);
        let err = EthAddress::from_hex(&bad).unwrap_err();
        assert!(matches!(err, CloakError::InvalidAddress(_)));
        assert!(err.to_string().contains("checksum"));
    }

    #[test]
    fn test_eth_address_formatting() {
        let addr = EthAddress::from_array([0xAB; 20]);
        let s = addr.to_checksum_string();
        assert!(s.starts_with("0x"));
        assert_eq!(s.len(), 42); // "0x" + 40 hex chars
        assert_eq!(addr.to_lower_hex(), format!("0x{}", "ab".repeat(20)));
    }

    proptest::proptest! {
        #[test]
        fn test_checksum_parses_back(bytes in proptest::array::uniform20(proptest::prelude::any::<u8>())) {
            let addr = EthAddress::from_array(bytes);
            proptest::prop_assert_eq!(EthAddress::from_hex(&addr.to_checksum_string()).unwrap(), addr);
            proptest::prop_assert_eq!(EthAddress::from_hex(&addr.to_lower_hex()).unwrap(), addr);
        }
    }

    #[test]
    fn test_eth_address_wrong_length() {
        assert!(matches!(
            EthAddress::from_hex("0x1234"),
            Err(CloakError::InvalidAddress(_))
        ));
    }

    #[test]
    fn test_eth_address_zero() {
        let zero = EthAddress::zero();
        assert!(zero.is_zero());

        let non_zero = EthAddress::from_array([1; 20]);
        assert!(!non_zero.is_zero());
    }

    #[test]
    fn test_tx_hash_parse() {
        let hex = format!("0x{}", "ab".repeat(32));
        let hash = TxHash::from_hex(&hex).unwrap();
        assert_eq!(hash.to_hex(), hex);
    }

    #[test]
    fn test_tx_hash_rejects_malformed() {
        assert!(matches!(
            TxHash::from_hex(""),
            Err(CloakError::InvalidTransactionHash(_))
        ));
        assert!(matches!(
            TxHash::from_hex(&"ab".repeat(32)),
            Err(CloakError::InvalidTransactionHash(_))
        ));
        assert!(matches!(
            TxHash::from_hex("0x1234"),
            Err(CloakError::InvalidTransactionHash(_))
        ));
        assert!(matches!(
            TxHash::from_hex(&format!("0x{}", "zz".repeat(32))),
            Err(CloakError::InvalidTransactionHash(_))
        ));
    }
}
