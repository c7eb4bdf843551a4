//! secp256k1 curve arithmetic.
//!
//! A thin adapter over `k256` that speaks the workspace's encodings:
//!
//! ```text
//! PublicKey (0x04 || X || Y)  ──point_from_public_key──▶  AffinePoint
//! AffinePoint                 ──point_to_public_key────▶  PublicKey
//! PublicKey                   ──public_key_to_address──▶  keccak256(X || Y)[12..32]
//! ```
//!
//! Every coordinate is left-padded to 32 bytes before it is concatenated or
//! hashed. A coordinate with leading zero bytes must hash the same whether it
//! arrived as a full 64-character string or as a trimmed big-number string.

use k256::elliptic_curve::bigint::U512;
use k256::elliptic_curve::ops::Reduce;
use k256::elliptic_curve::sec1::{FromEncodedPoint, ToEncodedPoint};
use k256::elliptic_curve::PrimeField;
use k256::{AffinePoint, EncodedPoint, FieldBytes, ProjectivePoint, Scalar, U256};

use cloak_core::constants::{COORDINATE_HEX_LEN, COORDINATE_SIZE, ETH_ADDRESS_SIZE, SCALAR_SIZE};
use cloak_core::error::{CloakError, Result};
use cloak_core::types::{CompressedPublicKey, EthAddress, PublicKey};

use crate::hash::keccak256_concat;

// ═══════════════════════════════════════════════════════════════════════════════
// SCALARS
// ═══════════════════════════════════════════════════════════════════════════════

/// Parses a 32-byte big-endian scalar in `[1, n)`.
///
/// # Errors
/// Returns `InvalidScalar` for a wrong length, zero, or a value `>= n`.
pub fn scalar_from_bytes(bytes: &[u8]) -> Result<Scalar> {
    if bytes.len() != SCALAR_SIZE {
        return Err(CloakError::InvalidScalar(format!(
            "expected {} bytes, got {}",
            SCALAR_SIZE,
            bytes.len()
        )));
    }
    if bytes.iter().all(|&b| b == 0) {
        return Err(CloakError::InvalidScalar("scalar is zero".into()));
    }

    let repr = FieldBytes::clone_from_slice(bytes);
    Option::<Scalar>::from(Scalar::from_repr(repr))
        .ok_or_else(|| CloakError::InvalidScalar("scalar is not below the curve order".into()))
}

/// Multiplies two 32-byte big-endian integers into their full 512-bit product.
///
/// No reduction happens here; feed the result to [`reduce_modulo_order`].
pub fn multiply_wide(a: &[u8; SCALAR_SIZE], b: &[u8; SCALAR_SIZE]) -> U512 {
    let a = U256::from_be_slice(a);
    let b = U256::from_be_slice(b);
    let (lo, hi) = a.mul_wide(&b);
    U512::from((lo, hi))
}

/// Reduces a 512-bit integer into `[0, n)`.
pub fn reduce_modulo_order(value: &U512) -> Scalar {
    <Scalar as Reduce<U512>>::reduce(*value)
}

/// Reduces a big-endian byte string of at most 64 bytes into `[0, n)`.
///
/// # Errors
/// Returns `ValidationError` if the input is wider than 512 bits.
pub fn reduce_bytes_modulo_order(bytes: &[u8]) -> Result<Scalar> {
    if bytes.len() > 64 {
        return Err(CloakError::ValidationError(format!(
            "value of {} bytes is wider than 512 bits",
            bytes.len()
        )));
    }
    let mut wide = [0u8; 64];
    wide[64 - bytes.len()..].copy_from_slice(bytes);
    Ok(reduce_modulo_order(&U512::from_be_slice(&wide)))
}

// ═══════════════════════════════════════════════════════════════════════════════
// COORDINATES
// ═══════════════════════════════════════════════════════════════════════════════

/// Left-pads a hex coordinate to exactly 64 lowercase hex characters.
///
/// Accepts an optional `0x` prefix. Idempotent: padding an already padded
/// value returns it unchanged (modulo case).
///
/// # Errors
/// Returns `ValidationError` if the value is not hex or is wider than 32 bytes.
///
/// # Example
///
/// ```rust
/// use cloak_crypto::encode_coordinate;
///
/// let padded = encode_coordinate("0x1f").unwrap();
/// assert_eq!(padded.len(), 64);
/// assert!(padded.ends_with("1f"));
/// ```
pub fn encode_coordinate(value: &str) -> Result<String> {
    let digits = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .unwrap_or(value);

    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(CloakError::ValidationError(format!(
            "coordinate is not hex: {}",
            value
        )));
    }

    let significant = digits.trim_start_matches('0');
    if significant.len() > COORDINATE_HEX_LEN {
        return Err(CloakError::ValidationError(format!(
            "coordinate is wider than {} bytes",
            COORDINATE_SIZE
        )));
    }

    Ok(format!(
        "{:0>width$}",
        significant.to_ascii_lowercase(),
        width = COORDINATE_HEX_LEN
    ))
}

/// Left-pads a big-endian coordinate to exactly 32 bytes.
///
/// # Errors
/// Returns `ValidationError` if the value does not fit in 32 bytes.
pub fn pad_coordinate(bytes: &[u8]) -> Result<[u8; COORDINATE_SIZE]> {
    let first = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len());
    let significant = &bytes[first..];
    if significant.len() > COORDINATE_SIZE {
        return Err(CloakError::ValidationError(format!(
            "coordinate is wider than {} bytes",
            COORDINATE_SIZE
        )));
    }

    let mut out = [0u8; COORDINATE_SIZE];
    out[COORDINATE_SIZE - significant.len()..].copy_from_slice(significant);
    Ok(out)
}

/// Builds a curve-checked public key from two hex coordinates of any width
/// up to 32 bytes.
pub fn public_key_from_coordinates_hex(x: &str, y: &str) -> Result<PublicKey> {
    let mut x_bytes = [0u8; COORDINATE_SIZE];
    let mut y_bytes = [0u8; COORDINATE_SIZE];
    hex::decode_to_slice(encode_coordinate(x)?, &mut x_bytes)?;
    hex::decode_to_slice(encode_coordinate(y)?, &mut y_bytes)?;

    let public_key = PublicKey::from_coordinates(&x_bytes, &y_bytes);
    point_from_public_key(&public_key)?;
    Ok(public_key)
}

// ═══════════════════════════════════════════════════════════════════════════════
// POINTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Decodes a public key into a curve point.
///
/// # Errors
/// Returns `PointNotOnCurve` if `(X, Y)` does not satisfy `y² = x³ + 7`.
pub fn point_from_public_key(public_key: &PublicKey) -> Result<AffinePoint> {
    let encoded = EncodedPoint::from_affine_coordinates(
        FieldBytes::from_slice(public_key.x()),
        FieldBytes::from_slice(public_key.y()),
        false,
    );

    Option::<AffinePoint>::from(AffinePoint::from_encoded_point(&encoded))
        .ok_or_else(|| CloakError::PointNotOnCurve(public_key.to_hex()))
}

/// Encodes a curve point as an uncompressed public key.
///
/// # Errors
/// Returns `PointNotOnCurve` for the point at infinity, which has no
/// uncompressed encoding.
pub fn point_to_public_key(point: &AffinePoint) -> Result<PublicKey> {
    let encoded = point.to_encoded_point(false);
    match (encoded.x(), encoded.y()) {
        (Some(x), Some(y)) => Ok(PublicKey::from_coordinates(
            &pad_coordinate(x)?,
            &pad_coordinate(y)?,
        )),
        _ => Err(CloakError::PointNotOnCurve("point at infinity".into())),
    }
}

/// Multiplies a curve point by a 32-byte scalar.
///
/// # Errors
/// Returns `InvalidScalar` if the scalar is zero or `>= n`.
pub fn scalar_multiply(point: &AffinePoint, scalar: &[u8]) -> Result<AffinePoint> {
    let k = scalar_from_bytes(scalar)?;
    Ok((ProjectivePoint::from(*point) * k).to_affine())
}

/// Computes `k · G` for an already validated scalar.
pub fn public_key_from_scalar(scalar: &Scalar) -> Result<PublicKey> {
    point_to_public_key(&(ProjectivePoint::GENERATOR * scalar).to_affine())
}

/// Compresses a public key to the 33-byte form stored by the key registry.
pub fn compress_public_key(public_key: &PublicKey) -> Result<CompressedPublicKey> {
    let point = point_from_public_key(public_key)?;
    CompressedPublicKey::from_bytes(point.to_encoded_point(true).as_bytes())
}

/// Decompresses a 33-byte registry key.
///
/// # Errors
/// Returns `PointNotOnCurve` if X has no matching Y on the curve.
pub fn decompress_public_key(compressed: &CompressedPublicKey) -> Result<PublicKey> {
    let encoded = EncodedPoint::from_bytes(compressed.as_bytes())
        .map_err(|e| CloakError::InvalidPublicKey(e.to_string()))?;

    let point = Option::<AffinePoint>::from(AffinePoint::from_encoded_point(&encoded))
        .ok_or_else(|| CloakError::PointNotOnCurve(compressed.to_hex()))?;
    point_to_public_key(&point)
}

// ═══════════════════════════════════════════════════════════════════════════════
// ADDRESSES
// ═══════════════════════════════════════════════════════════════════════════════

/// Derives the Ethereum address of a public key.
///
/// ```text
/// address = keccak256(pad32(X) || pad32(Y))[12..32]
/// ```
pub fn public_key_to_address(public_key: &PublicKey) -> Result<EthAddress> {
    let x = pad_coordinate(public_key.x())?;
    let y = pad_coordinate(public_key.y())?;
    let hash = keccak256_concat(&[&x, &y]);
    EthAddress::from_bytes(&hash[32 - ETH_ADDRESS_SIZE..])
}
