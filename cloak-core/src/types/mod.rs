//! Domain types for Cloak.
//!
//! - [`PublicKey`] / [`PublicKeyPair`]: Recipient keys
//! - [`EthAddress`] / [`TxHash`]: Ethereum encodings
//! - [`Identifier`]: The forms a recipient can be named by
//! - [`TransactionRecord`]: Signed transaction fields for key recovery
//! - [`StealthKeyChangedEvent`]: Registry logs for the scanner

mod keys;
mod address;
mod announcement;
mod identifier;
mod transaction;

pub use keys::*;
pub use address::*;
pub use announcement::*;
pub use identifier::*;
pub use transaction::*;
