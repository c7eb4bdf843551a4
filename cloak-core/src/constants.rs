//! Protocol constants for Cloak.
//!
//! Sizes follow the SEC1 encoding of secp256k1 points and the Ethereum
//! encodings of addresses and transaction hashes.

// ═══════════════════════════════════════════════════════════════════════════════
// SECP256K1 SIZES
// ═══════════════════════════════════════════════════════════════════════════════

/// Size of a secp256k1 scalar (private key, random secret) in bytes.
pub const SCALAR_SIZE: usize = 32;

/// Size of one affine coordinate in bytes.
pub const COORDINATE_SIZE: usize = 32;

/// Length of a coordinate once hex-encoded and zero-padded.
pub const COORDINATE_HEX_LEN: usize = COORDINATE_SIZE * 2;

/// Size of an uncompressed SEC1 public key: `0x04 || X || Y`.
pub const UNCOMPRESSED_PUBLIC_KEY_SIZE: usize = 1 + 2 * COORDINATE_SIZE;

/// Size of a compressed SEC1 public key: `0x02|0x03 || X`.
pub const COMPRESSED_PUBLIC_KEY_SIZE: usize = 1 + COORDINATE_SIZE;

/// SEC1 tag byte of an uncompressed point.
pub const UNCOMPRESSED_PREFIX: u8 = 0x04;

/// Size of a recoverable ECDSA signature: `r || s || v`.
pub const RECOVERABLE_SIGNATURE_SIZE: usize = 65;

/// The secp256k1 group order `n`, big-endian hex.
pub const CURVE_ORDER_HEX: &str =
    "fffffffffffffffffffffffffffffffebaaedce6af48a03bbfd25e8cd0364141";

// ═══════════════════════════════════════════════════════════════════════════════
// ETHEREUM ENCODINGS
// ═══════════════════════════════════════════════════════════════════════════════

/// Size of an Ethereum address in bytes.
pub const ETH_ADDRESS_SIZE: usize = 20;

/// Size of keccak256 hash output.
pub const KECCAK256_OUTPUT_SIZE: usize = 32;

/// Size of a transaction hash in bytes.
pub const TX_HASH_SIZE: usize = 32;

/// Prefix of an EIP-191 personal message.
pub const PERSONAL_MESSAGE_PREFIX: &str = "\x19Ethereum Signed Message:\n";

/// Legacy `v` offset for pre-EIP-155 signatures (27/28).
pub const LEGACY_V_OFFSET: u64 = 27;

/// EIP-155 `v` offset: `v = chain_id * 2 + 35 + y_parity`.
pub const EIP155_V_OFFSET: u64 = 35;

// ═══════════════════════════════════════════════════════════════════════════════
// NAME SERVICE & REGISTRY
// ═══════════════════════════════════════════════════════════════════════════════

/// ENS registry contract (same address on mainnet and the public testnets).
pub const ENS_REGISTRY_ADDRESS: &str = "0x00000000000c2e074ec69a0dfb2997ba6c7d2e1e";

/// Default stealth key registry contract.
pub const DEFAULT_STEALTH_KEY_REGISTRY: &str = "0x31fe56609c65cd0c510e7125f051d440424d38f3";

/// Name suffixes routed to the name-service collaborator.
pub const NAME_SERVICE_SUFFIXES: &[&str] = &[".eth", ".crypto"];
