//! Keccak256 hashing.
//!
//! Ethereum uses the original Keccak padding, not the NIST SHA3-256 one, for
//! addresses, function selectors, and signed messages.

use sha3::{Digest, Keccak256};

use cloak_core::constants::PERSONAL_MESSAGE_PREFIX;

// ═══════════════════════════════════════════════════════════════════════════════
// KECCAK256
// ═══════════════════════════════════════════════════════════════════════════════

/// Computes the Keccak256 hash of `input`.
///
/// Note: Keccak256 is NOT SHA3-256. They use different padding.
pub fn keccak256(input: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(input);
    hasher.finalize().into()
}

/// Computes Keccak256 over several parts as if they were concatenated.
pub fn keccak256_concat(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}

// ═══════════════════════════════════════════════════════════════════════════════
// EIP-191 PERSONAL MESSAGES
// ═══════════════════════════════════════════════════════════════════════════════

/// Hashes a message the way `personal_sign` does:
///
/// ```text
/// keccak256("\x19Ethereum Signed Message:\n" || len(message) || message)
/// ```
///
/// The length is the decimal byte length of the message.
pub fn hash_message(message: &[u8]) -> [u8; 32] {
    let length = message.len().to_string();
    keccak256_concat(&[
        PERSONAL_MESSAGE_PREFIX.as_bytes(),
        length.as_bytes(),
        message,
    ])
}
