//! Single-use random secrets.
//!
//! The sender draws a fresh [`RandomSecret`] for every payment and hands it
//! to the recipient out of band. It is a valid non-zero scalar, so the
//! recipient can multiply it into their private key directly.

use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use cloak_core::constants::SCALAR_SIZE;
use cloak_core::error::{CloakError, Result};
use k256::Scalar;

use crate::curve::scalar_from_bytes;

/// Draws 32 bytes from `rng` until they form a scalar in `[1, n)`.
///
/// A draw is rejected with probability below 2^-127, so this loops at most
/// once in practice.
pub(crate) fn draw_scalar_bytes<R: RngCore + CryptoRng>(rng: &mut R) -> [u8; SCALAR_SIZE] {
    let mut bytes = [0u8; SCALAR_SIZE];
    loop {
        rng.fill_bytes(&mut bytes);
        if scalar_from_bytes(&bytes).is_ok() {
            return bytes;
        }
    }
}

/// A uniformly random 32-byte scalar used once per payment.
///
/// Zeroized on drop. `Debug` never prints the value.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct RandomSecret {
    bytes: [u8; SCALAR_SIZE],
}

impl RandomSecret {
    /// Draws a secret from the operating system RNG.
    pub fn generate() -> Self {
        Self::generate_with_rng(&mut OsRng)
    }

    /// Draws a secret from the given cryptographic RNG.
    pub fn generate_with_rng<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        Self {
            bytes: draw_scalar_bytes(rng),
        }
    }

    /// Wraps existing bytes, e.g. a secret received from the sender.
    ///
    /// # Errors
    /// Returns `InvalidScalar` unless the bytes are a scalar in `[1, n)`.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        scalar_from_bytes(bytes)?;
        let mut arr = [0u8; SCALAR_SIZE];
        arr.copy_from_slice(bytes);
        Ok(Self { bytes: arr })
    }

    /// Parses a `0x`-prefixed (or bare) hex secret.
    pub fn from_hex(s: &str) -> Result<Self> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        let bytes = Zeroizing::new(hex::decode(digits)?);
        if bytes.len() != SCALAR_SIZE {
            return Err(CloakError::InvalidScalar(format!(
                "expected {} bytes, got {}",
                SCALAR_SIZE,
                bytes.len()
            )));
        }
        Self::from_bytes(&bytes)
    }

    /// Returns the raw bytes.
    pub fn as_bytes(&self) -> &[u8; SCALAR_SIZE] {
        &self.bytes
    }

    /// Encodes the secret as `0x`-prefixed hex for transport to the recipient.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.bytes))
    }

    /// Returns the secret as a curve scalar.
    pub fn to_scalar(&self) -> Result<Scalar> {
        scalar_from_bytes(&self.bytes)
    }
}

impl ConstantTimeEq for RandomSecret {
    fn ct_eq(&self, other: &Self) -> subtle::Choice {
        self.bytes.ct_eq(&other.bytes)
    }
}

impl PartialEq for RandomSecret {
    fn eq(&self, other: &Self) -> bool {
        self.ct_eq(other).into()
    }
}

impl Eq for RandomSecret {}

impl std::fmt::Debug for RandomSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("RandomSecret([REDACTED])")
    }
}
