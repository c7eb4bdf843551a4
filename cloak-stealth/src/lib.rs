//! # Cloak Stealth Address Protocol
//!
//! High-level API for finding out who to pay.
//!
//! This crate provides:
//!
//! - **Key Recovery**: Recover a signer's public key from a transaction hash
//! - **Recipient Resolution**: Turn a public key, transaction hash, address,
//!   or name into the keys a sender derives stealth addresses from
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use cloak_stealth::{LookupOptions, RecipientResolver};
//! use cloak_crypto::derive_stealth_address;
//!
//! let resolver = RecipientResolver::new(provider, registry, names);
//!
//! // Sender: resolve the recipient, then derive a one-time address
//! let keys = resolver.lookup("alice.eth", LookupOptions::default()).await?;
//! let payment = derive_stealth_address(&keys.spending_public_key)?;
//! // Send funds to payment.stealth_address
//! // Hand payment.shared_secret to the recipient
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

pub mod recovery;
pub mod lookup;

#[cfg(test)]
mod fixtures;

pub use recovery::{
    recover_public_key_from_record, recover_public_key_from_transaction,
    recover_public_key_from_tx_hash,
};
pub use lookup::{LookupOptions, RecipientResolver};
