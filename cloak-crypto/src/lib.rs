//! # Cloak Cryptography
//!
//! secp256k1 primitives for the Cloak stealth address protocol.
//!
//! This crate provides:
//!
//! - **Curve**: Scalar multiplication, point decoding, coordinate padding, reduction mod `n`
//! - **Hash**: Keccak256 and EIP-191 message hashing
//! - **Keys**: Private keys, key pairs, and single-use random secrets
//! - **Derivation**: Sender and recipient stealth key derivation
//! - **Recovery**: ECDSA public-key recovery with signer self-checks
//!
//! ## Security Properties
//!
//! - Secret scalars are zeroized on drop and redacted from `Debug`
//! - Self-checks compare with constant-time equality
//! - No secret material outlives the call that derived it
//!
//! ## Example
//!
//! ```rust,ignore
//! use cloak_crypto::{KeyPair, derive_stealth_address, derive_stealth_private_key};
//!
//! // Recipient publishes a public key
//! let recipient = KeyPair::generate();
//!
//! // Sender derives a one-time address and a random secret to hand over
//! let payment = derive_stealth_address(recipient.public_key())?;
//!
//! // Recipient recomputes the address and its private key
//! let keys = derive_stealth_private_key(
//!     recipient.private_key(),
//!     recipient.public_key(),
//!     &payment.shared_secret,
//! )?;
//! assert_eq!(keys.stealth_address, payment.stealth_address);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

pub mod curve;
pub mod hash;
pub mod keys;
pub mod random;
pub mod derive;
pub mod recover;

// Re-export main functions at crate root
pub use curve::{
    encode_coordinate, point_from_public_key, public_key_to_address, reduce_modulo_order,
    scalar_multiply,
};
pub use hash::{hash_message, keccak256};
pub use keys::{KeyPair, SecretKey};
pub use random::RandomSecret;
pub use derive::{
    derive_stealth_address, derive_stealth_address_with_rng, derive_stealth_address_with_secret,
    derive_stealth_private_key, verify_stealth_address, StealthKeyMaterial, StealthPayment,
};
pub use recover::{recover_from_prehash, recover_public_key, recover_public_key_for_address};
