//! # Cloak Registry
//!
//! Public-key registry backends for the Cloak recipient resolver.
//!
//! - **Memory**: Thread-safe in-memory storage for development and testing,
//!   optionally seeded from on-chain `StealthKeyChanged` logs
//!
//! The on-chain registry contract client lives in `cloak-rpc`.
//!
//! ## Example
//!
//! ```rust,ignore
//! use cloak_registry::{KeyRegistry, MemoryKeyRegistry};
//!
//! let registry = MemoryKeyRegistry::new();
//! registry.register(address, keys)?;
//!
//! let found = registry.lookup(&address).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod memory;

pub use memory::{MemoryKeyRegistry, RegistryStats};

// Re-export the trait from core
pub use cloak_core::traits::KeyRegistry;
