//! Error types for Cloak.
//!
//! Every mismatch between an independently recomputed value and a published
//! value carries both values, so a caller can tell a data-source inconsistency
//! from a logic defect.

use thiserror::Error;

/// Result type alias using `CloakError`.
pub type Result<T> = std::result::Result<T, CloakError>;

/// Main error type for all Cloak operations.
#[derive(Debug, Error)]
pub enum CloakError {
    // ═══════════════════════════════════════════════════════════════════════════
    // CURVE ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Scalar is zero or not below the curve order.
    #[error("Invalid scalar: {0}")]
    InvalidScalar(String),

    /// Coordinates do not satisfy the secp256k1 curve equation.
    #[error("Point is not on the secp256k1 curve: {0}")]
    PointNotOnCurve(String),

    /// Public key has the wrong length, prefix, or encoding.
    #[error("Invalid public key: {0}")]
    InvalidPublicKey(String),

    /// Signature bytes are malformed or cannot be recovered.
    #[error("Invalid signature: {0}")]
    InvalidSignature(String),

    // ═══════════════════════════════════════════════════════════════════════════
    // SELF-CHECK MISMATCHES
    // ═══════════════════════════════════════════════════════════════════════════

    /// Recovered signer does not match the declared signer.
    #[error("Recovered signer mismatch: expected {expected}, recovered {actual}")]
    RecoveryMismatch {
        /// Declared public key or address
        expected: String,
        /// Value derived from the recovered key
        actual: String,
    },

    /// Private key does not correspond to the published public key.
    #[error("Private key does not match published public key: expected {expected}, derived {actual}")]
    KeyMismatch {
        /// Published public key
        expected: String,
        /// Public key derived from the private key
        actual: String,
    },

    /// Recipient-side stealth address differs from the sender-side address.
    #[error("Stealth address mismatch: expected {expected}, derived {actual}")]
    StealthAddressMismatch {
        /// Address computed by the sender
        expected: String,
        /// Address computed by the recipient
        actual: String,
    },

    // ═══════════════════════════════════════════════════════════════════════════
    // TRANSACTION ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Transaction hash is absent or malformed.
    #[error("Invalid transaction hash: {0}")]
    InvalidTransactionHash(String),

    /// Provider has no transaction with this hash.
    #[error("Transaction not found: {0}")]
    TransactionNotFound(String),

    /// Address has never sent a transaction.
    #[error("Address {0} has not sent any transactions, so its public key cannot be recovered")]
    NoHistory(String),

    // ═══════════════════════════════════════════════════════════════════════════
    // RECIPIENT RESOLUTION ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Identifier kind is valid but disabled by the lookup options.
    #[error("Unsupported identifier: {0}")]
    UnsupportedIdentifier(String),

    /// Address string is malformed or fails its checksum.
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Name service returned no address for the name.
    #[error("Could not resolve identifier '{0}' to an address")]
    IdentifierNotResolved(String),

    /// Address has no entry in the stealth key registry.
    #[error("Address {0} has not registered stealth keys. Please ask them to register their stealth keys")]
    NotRegistered(String),

    // ═══════════════════════════════════════════════════════════════════════════
    // SERIALIZATION ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Invalid hex encoding.
    #[error("Invalid hex encoding: {0}")]
    HexError(#[from] hex::FromHexError),

    // ═══════════════════════════════════════════════════════════════════════════
    // PROVIDER ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    /// Connection timeout.
    #[error("Connection timeout: {0}")]
    ConnectionTimeout(String),

    /// RPC call failed.
    #[error("RPC call failed: {0}")]
    RpcError(String),

    // ═══════════════════════════════════════════════════════════════════════════
    // VALIDATION ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Input validation failed.
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Internal invariant violation (should never happen).
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl CloakError {
    /// Returns true if this error reports a failed self-check.
    pub fn is_mismatch(&self) -> bool {
        matches!(
            self,
            CloakError::RecoveryMismatch { .. }
                | CloakError::KeyMismatch { .. }
                | CloakError::StealthAddressMismatch { .. }
        )
    }

    /// Returns true if this is an input-format error.
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            CloakError::ValidationError(_)
                | CloakError::InvalidAddress(_)
                | CloakError::InvalidPublicKey(_)
                | CloakError::InvalidTransactionHash(_)
                | CloakError::InvalidSignature(_)
                | CloakError::UnsupportedIdentifier(_)
                | CloakError::HexError(_)
        )
    }

    /// Returns true if this error came from an external provider.
    ///
    /// Provider errors are never retried inside this workspace.
    pub fn is_provider_error(&self) -> bool {
        matches!(
            self,
            CloakError::HttpError(_) | CloakError::ConnectionTimeout(_) | CloakError::RpcError(_)
        )
    }
}
