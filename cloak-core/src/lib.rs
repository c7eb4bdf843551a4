//! # Cloak Core
//!
//! Core types, errors, and traits for the Cloak secp256k1 stealth address protocol.
//!
//! This crate provides the foundational building blocks used by all other Cloak crates:
//!
//! - **Types**: Public keys, addresses, transaction records, identifiers, registry logs
//! - **Errors**: One error taxonomy with the compared values attached to every mismatch
//! - **Constants**: Encoding sizes and curve parameters
//! - **Traits**: The chain provider, key registry, and name service collaborators
//!
//! ## Example
//!
//! ```rust
//! use cloak_core::{EthAddress, Identifier};
//!
//! let id = Identifier::parse("0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed").unwrap();
//! assert!(matches!(id, Identifier::Address(_)));
//!
//! let address = EthAddress::from_hex("0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed").unwrap();
//! assert_eq!(address.to_checksum_string(), "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, clippy::all)]

pub mod constants;
pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used items at crate root
pub use constants::*;
pub use error::{CloakError, Result};
pub use traits::*;
pub use types::*;
