//! Public key types for Cloak.
//!
//! - [`PublicKey`]: Uncompressed secp256k1 point (65 bytes)
//! - [`CompressedPublicKey`]: Compressed point as stored by the key registry (33 bytes)
//! - [`PublicKeyPair`]: A recipient's spending + viewing keys
//!
//! These types validate *encoding* only. Curve membership is checked by
//! `cloak-crypto`, which owns the curve arithmetic.

use serde::{Deserialize, Serialize};

use crate::constants::{
    COMPRESSED_PUBLIC_KEY_SIZE, COORDINATE_SIZE, UNCOMPRESSED_PREFIX, UNCOMPRESSED_PUBLIC_KEY_SIZE,
};
use crate::error::{CloakError, Result};

// ═══════════════════════════════════════════════════════════════════════════════
// UNCOMPRESSED PUBLIC KEY
// ═══════════════════════════════════════════════════════════════════════════════

/// Uncompressed secp256k1 public key: `0x04 || X (32) || Y (32)`.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PublicKey {
    bytes: [u8; UNCOMPRESSED_PUBLIC_KEY_SIZE],
}

impl PublicKey {
    /// Creates a public key from raw SEC1 bytes.
    ///
    /// # Errors
    /// Returns `InvalidPublicKey` if the length or prefix is wrong.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != UNCOMPRESSED_PUBLIC_KEY_SIZE {
            return Err(CloakError::InvalidPublicKey(format!(
                "expected {} bytes, got {}",
                UNCOMPRESSED_PUBLIC_KEY_SIZE,
                bytes.len()
            )));
        }
        if bytes[0] != UNCOMPRESSED_PREFIX {
            return Err(CloakError::InvalidPublicKey(format!(
                "expected prefix 0x04, got 0x{:02x}",
                bytes[0]
            )));
        }

        let mut arr = [0u8; UNCOMPRESSED_PUBLIC_KEY_SIZE];
        arr.copy_from_slice(bytes);
        Ok(Self { bytes: arr })
    }

    /// Creates a public key from its two 32-byte coordinates.
    pub fn from_coordinates(x: &[u8; COORDINATE_SIZE], y: &[u8; COORDINATE_SIZE]) -> Self {
        let mut bytes = [0u8; UNCOMPRESSED_PUBLIC_KEY_SIZE];
        bytes[0] = UNCOMPRESSED_PREFIX;
        bytes[1..1 + COORDINATE_SIZE].copy_from_slice(x);
        bytes[1 + COORDINATE_SIZE..].copy_from_slice(y);
        Self { bytes }
    }

    /// Parses a `0x`-prefixed (or bare) hex public key.
    pub fn from_hex(s: &str) -> Result<Self> {
        let s = s.trim();
        let digits = s.strip_prefix("0x").unwrap_or(s);
        if digits.len() != UNCOMPRESSED_PUBLIC_KEY_SIZE * 2 {
            return Err(CloakError::InvalidPublicKey(format!(
                "expected {} hex characters, got {}",
                UNCOMPRESSED_PUBLIC_KEY_SIZE * 2,
                digits.len()
            )));
        }
        let bytes = hex::decode(digits)
            .map_err(|e| CloakError::InvalidPublicKey(format!("invalid hex: {}", e)))?;
        Self::from_bytes(&bytes)
    }

    /// Returns the raw SEC1 bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Returns the X coordinate.
    pub fn x(&self) -> &[u8] {
        &self.bytes[1..1 + COORDINATE_SIZE]
    }

    /// Returns the Y coordinate.
    pub fn y(&self) -> &[u8] {
        &self.bytes[1 + COORDINATE_SIZE..]
    }

    /// Returns the `0x`-prefixed hex encoding.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.bytes))
    }
}

impl std::fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "PublicKey(0x{}...{})",
            hex::encode(&self.bytes[..5]),
            hex::encode(&self.bytes[UNCOMPRESSED_PUBLIC_KEY_SIZE - 4..])
        )
    }
}

impl std::fmt::Display for PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl std::str::FromStr for PublicKey {
    type Err = CloakError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_hex(s)
    }
}

// Serde implementation that uses hex encoding
impl Serialize for PublicKey {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// COMPRESSED PUBLIC KEY
// ═══════════════════════════════════════════════════════════════════════════════

/// Compressed secp256k1 public key: `0x02|0x03 || X`.
///
/// The stealth key registry stores keys as a prefix plus the X coordinate.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct CompressedPublicKey {
    bytes: [u8; COMPRESSED_PUBLIC_KEY_SIZE],
}

impl CompressedPublicKey {
    /// Creates a compressed key from raw SEC1 bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != COMPRESSED_PUBLIC_KEY_SIZE {
            return Err(CloakError::InvalidPublicKey(format!(
                "expected {} bytes for compressed key, got {}",
                COMPRESSED_PUBLIC_KEY_SIZE,
                bytes.len()
            )));
        }
        Self::from_prefix_and_x(bytes[0], &bytes[1..])
    }

    /// Creates a compressed key from a registry prefix (2 or 3) and X coordinate.
    pub fn from_prefix_and_x(prefix: u8, x: &[u8]) -> Result<Self> {
        if prefix != 0x02 && prefix != 0x03 {
            return Err(CloakError::InvalidPublicKey(format!(
                "compressed prefix must be 0x02 or 0x03, got 0x{:02x}",
                prefix
            )));
        }
        if x.len() != COORDINATE_SIZE {
            return Err(CloakError::InvalidPublicKey(format!(
                "expected {} byte X coordinate, got {}",
                COORDINATE_SIZE,
                x.len()
            )));
        }

        let mut bytes = [0u8; COMPRESSED_PUBLIC_KEY_SIZE];
        bytes[0] = prefix;
        bytes[1..].copy_from_slice(x);
        Ok(Self { bytes })
    }

    /// Parses a hex-encoded compressed key.
    pub fn from_hex(s: &str) -> Result<Self> {
        let s = s.trim();
        let digits = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(digits)
            .map_err(|e| CloakError::InvalidPublicKey(format!("invalid hex: {}", e)))?;
        Self::from_bytes(&bytes)
    }

    /// Returns the raw SEC1 bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Returns the prefix byte (2 = even Y, 3 = odd Y).
    pub fn prefix(&self) -> u8 {
        self.bytes[0]
    }

    /// Returns the X coordinate.
    pub fn x(&self) -> &[u8] {
        &self.bytes[1..]
    }

    /// Returns the `0x`-prefixed hex encoding.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.bytes))
    }
}

impl std::fmt::Debug for CompressedPublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CompressedPublicKey({})", self.to_hex())
    }
}

impl Serialize for CompressedPublicKey {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for CompressedPublicKey {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// RECIPIENT KEY PAIR
// ═══════════════════════════════════════════════════════════════════════════════

/// A recipient's published stealth-capable identity.
///
/// Recreated on every resolution; never cached by the resolver.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicKeyPair {
    /// Key that stealth addresses are derived from
    pub spending_public_key: PublicKey,
    /// Key used to encrypt the random secret for scanning
    pub viewing_public_key: PublicKey,
}

impl PublicKeyPair {
    /// Creates a pair from distinct spending and viewing keys.
    pub fn new(spending_public_key: PublicKey, viewing_public_key: PublicKey) -> Self {
        Self {
            spending_public_key,
            viewing_public_key,
        }
    }

    /// Uses a single key as both the spending and the viewing key.
    ///
    /// Recovery-based resolution only ever yields one key.
    pub fn single(public_key: PublicKey) -> Self {
        Self::new(public_key, public_key)
    }

    /// Returns true if spending and viewing keys are the same key.
    pub fn is_single_key(&self) -> bool {
        self.spending_public_key == self.viewing_public_key
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_key_hex() -> String {
        format!("0x04{}{}", "11".repeat(32), "22".repeat(32))
    }

    #[test]
    fn test_public_key_from_hex() {
        let pk = PublicKey::from_hex(&sample_key_hex()).unwrap();
        assert_eq!(pk.as_bytes()[0], 0x04);
        assert_eq!(pk.x(), &[0x11; 32]);
        assert_eq!(pk.y(), &[0x22; 32]);
    }

    #[test]
    fn test_public_key_wrong_length() {
        let result = PublicKey::from_hex("0x04abcd");
        assert!(matches!(result, Err(CloakError::InvalidPublicKey(_))));
    }

    #[test]
    fn test_public_key_wrong_prefix() {
        let hex = format!("0x05{}", "11".repeat(64));
        let result = PublicKey::from_hex(&hex);
        assert!(matches!(result, Err(CloakError::InvalidPublicKey(_))));
    }

    #[test]
    fn test_public_key_hex_roundtrip() {
        let pk = PublicKey::from_hex(&sample_key_hex()).unwrap();
        assert_eq!(pk.to_hex(), sample_key_hex());
        assert_eq!(pk, PublicKey::from_coordinates(&[0x11; 32], &[0x22; 32]));
    }

    #[test]
    fn test_public_key_serde() {
        let pk = PublicKey::from_hex(&sample_key_hex()).unwrap();
        let json = serde_json::to_string(&pk).unwrap();
        assert_eq!(json, format!("\"{}\"", sample_key_hex()));
        let pk2: PublicKey = serde_json::from_str(&json).unwrap();
        assert_eq!(pk, pk2);
    }

    #[test]
    fn test_compressed_key_prefix_validation() {
        assert!(CompressedPublicKey::from_prefix_and_x(0x02, &[1u8; 32]).is_ok());
        assert!(CompressedPublicKey::from_prefix_and_x(0x03, &[1u8; 32]).is_ok());
        assert!(CompressedPublicKey::from_prefix_and_x(0x04, &[1u8; 32]).is_err());
        assert!(CompressedPublicKey::from_prefix_and_x(0x02, &[1u8; 31]).is_err());
    }

    #[test]
    fn test_public_key_pair_single() {
        let pk = PublicKey::from_hex(&sample_key_hex()).unwrap();
        let pair = PublicKeyPair::single(pk);
        assert!(pair.is_single_key());
        assert_eq!(pair.spending_public_key, pair.viewing_public_key);
    }

    #[test]
    fn test_public_key_pair_json_field_names() {
        let pk = PublicKey::from_hex(&sample_key_hex()).unwrap();
        let json = serde_json::to_value(PublicKeyPair::single(pk)).unwrap();
        assert!(json.get("spendingPublicKey").is_some());
        assert!(json.get("viewingPublicKey").is_some());
    }
}
