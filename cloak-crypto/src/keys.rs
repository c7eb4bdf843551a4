//! secp256k1 private keys and key pairs.

use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use cloak_core::constants::SCALAR_SIZE;
use cloak_core::error::{CloakError, Result};
use cloak_core::types::{EthAddress, PublicKey};
use k256::Scalar;

use crate::curve::{public_key_from_scalar, public_key_to_address, scalar_from_bytes};
use crate::random::draw_scalar_bytes;

// ═══════════════════════════════════════════════════════════════════════════════
// SECRET KEY
// ═══════════════════════════════════════════════════════════════════════════════

/// A private key: a scalar in `[1, n)`.
///
/// Zeroized on drop. `Debug` never prints the value.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SecretKey {
    bytes: [u8; SCALAR_SIZE],
}

impl SecretKey {
    /// Creates a key from 32 big-endian bytes.
    ///
    /// # Errors
    /// Returns `InvalidScalar` for zero, `>= n`, or a wrong length.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        scalar_from_bytes(bytes)?;
        let mut arr = [0u8; SCALAR_SIZE];
        arr.copy_from_slice(bytes);
        Ok(Self { bytes: arr })
    }

    /// Creates a key from a `0x`-prefixed (or bare) hex string.
    pub fn from_hex(s: &str) -> Result<Self> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        let bytes = Zeroizing::new(hex::decode(digits)?);
        Self::from_bytes(&bytes)
    }

    /// Creates a key from a curve scalar.
    ///
    /// # Errors
    /// Returns `InvalidScalar` if the scalar is zero.
    pub fn from_scalar(scalar: &Scalar) -> Result<Self> {
        let mut bytes: [u8; SCALAR_SIZE] = scalar.to_bytes().into();
        let key = Self::from_bytes(&bytes);
        bytes.zeroize();
        key
    }

    /// Returns the raw bytes.
    pub fn as_bytes(&self) -> &[u8; SCALAR_SIZE] {
        &self.bytes
    }

    /// Exports the key as `0x`-prefixed hex.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.bytes))
    }

    /// Returns the key as a curve scalar.
    pub fn to_scalar(&self) -> Result<Scalar> {
        scalar_from_bytes(&self.bytes)
    }

    /// Computes the matching public key `k · G`.
    pub fn public_key(&self) -> Result<PublicKey> {
        public_key_from_scalar(&self.to_scalar()?)
    }
}

impl std::fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SecretKey([REDACTED])")
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// KEY PAIR
// ═══════════════════════════════════════════════════════════════════════════════

/// A private key with its public key.
///
/// Invariant: `public_key == private_key · G`.
#[derive(Debug)]
pub struct KeyPair {
    private_key: SecretKey,
    public_key: PublicKey,
}

impl KeyPair {
    /// Generates a key pair from the operating system RNG.
    pub fn generate() -> Result<Self> {
        Self::generate_with_rng(&mut OsRng)
    }

    /// Generates a key pair from the given cryptographic RNG.
    pub fn generate_with_rng<R: RngCore + CryptoRng>(rng: &mut R) -> Result<Self> {
        let bytes = Zeroizing::new(draw_scalar_bytes(rng));
        Self::from_private_key(SecretKey::from_bytes(bytes.as_slice())?)
    }

    /// Builds the pair for an existing private key.
    pub fn from_private_key(private_key: SecretKey) -> Result<Self> {
        let public_key = private_key.public_key()?;
        Ok(Self {
            private_key,
            public_key,
        })
    }

    /// Builds the pair for a hex-encoded private key.
    pub fn from_private_key_hex(s: &str) -> Result<Self> {
        Self::from_private_key(SecretKey::from_hex(s)?)
    }

    /// Returns the private key.
    pub fn private_key(&self) -> &SecretKey {
        &self.private_key
    }

    /// Returns the public key.
    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// Returns the Ethereum address of the public key.
    pub fn address(&self) -> Result<EthAddress> {
        public_key_to_address(&self.public_key)
    }

    /// Checks that this pair's public key equals `expected`.
    ///
    /// # Errors
    /// Returns `KeyMismatch` carrying both keys.
    pub fn ensure_public_key(&self, expected: &PublicKey) -> Result<()> {
        if &self.public_key != expected {
            return Err(CloakError::KeyMismatch {
                expected: expected.to_hex(),
                actual: self.public_key.to_hex(),
            });
        }
        Ok(())
    }
}
