//! ECDSA public-key recovery.
//!
//! A recovered key is only returned after it has been checked against what
//! the caller expected (a public key or a signer address). A signature that
//! recovers to a different key is a hard failure, never a silent fallback.

use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};
use subtle::ConstantTimeEq;

use cloak_core::constants::{LEGACY_V_OFFSET, RECOVERABLE_SIGNATURE_SIZE};
use cloak_core::error::{CloakError, Result};
use cloak_core::types::{EthAddress, PublicKey};

use crate::curve::public_key_to_address;

/// Recovers the signer's public key from a 32-byte prehash and a 65-byte
/// `r || s || v` signature.
///
/// `v` may be a raw recovery id (0/1) or the legacy 27/28 form. High-`s`
/// signatures are normalized before recovery.
///
/// # Errors
/// Returns `InvalidSignature` for a malformed signature or if no key can be
/// recovered.
pub fn recover_from_prehash(prehash: &[u8; 32], signature: &[u8]) -> Result<PublicKey> {
    if signature.len() != RECOVERABLE_SIGNATURE_SIZE {
        return Err(CloakError::InvalidSignature(format!(
            "expected {} bytes, got {}",
            RECOVERABLE_SIGNATURE_SIZE,
            signature.len()
        )));
    }

    let mut recovery_byte = match signature[64] {
        v @ (0 | 1) => v,
        v @ (27 | 28) => v - LEGACY_V_OFFSET as u8,
        other => {
            return Err(CloakError::InvalidSignature(format!(
                "invalid recovery byte {}",
                other
            )))
        }
    };

    let mut sig = Signature::from_slice(&signature[..64])
        .map_err(|e| CloakError::InvalidSignature(e.to_string()))?;

    // Negating s mirrors R, which flips its y parity
    if let Some(normalized) = sig.normalize_s() {
        sig = normalized;
        recovery_byte ^= 1;
    }

    let recovery_id = RecoveryId::from_byte(recovery_byte)
        .ok_or_else(|| CloakError::InvalidSignature("invalid recovery id".into()))?;

    let verifying_key = VerifyingKey::recover_from_prehash(prehash, &sig, recovery_id)
        .map_err(|e| CloakError::InvalidSignature(e.to_string()))?;

    PublicKey::from_bytes(verifying_key.to_encoded_point(false).as_bytes())
}

/// Recovers the signer and checks it against `expected`.
///
/// # Errors
/// Returns `RecoveryMismatch` carrying both keys if they differ.
pub fn recover_public_key(
    message_hash: &[u8; 32],
    signature: &[u8],
    expected: &PublicKey,
) -> Result<PublicKey> {
    let recovered = recover_from_prehash(message_hash, signature)?;

    let matches: bool = recovered.as_bytes().ct_eq(expected.as_bytes()).into();
    if !matches {
        return Err(CloakError::RecoveryMismatch {
            expected: expected.to_hex(),
            actual: recovered.to_hex(),
        });
    }
    Ok(recovered)
}

/// Recovers the signer and checks that its address is `expected`.
///
/// # Errors
/// Returns `RecoveryMismatch` carrying both addresses if they differ.
pub fn recover_public_key_for_address(
    message_hash: &[u8; 32],
    signature: &[u8],
    expected: &EthAddress,
) -> Result<PublicKey> {
    let recovered = recover_from_prehash(message_hash, signature)?;
    let actual = public_key_to_address(&recovered)?;

    let matches: bool = actual.as_bytes().ct_eq(expected.as_bytes()).into();
    if !matches {
        return Err(CloakError::RecoveryMismatch {
            expected: expected.to_checksum_string(),
            actual: actual.to_checksum_string(),
        });
    }
    Ok(recovered)
}
