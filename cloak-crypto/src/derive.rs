//! Stealth address derivation.
//!
//! ## Sender
//!
//! ```text
//! P  = recipient public key (on-curve check first)
//! r  = fresh RandomSecret
//! S  = r · P
//! stealth_address = keccak256(pad32(S.x) || pad32(S.y))[12..32]
//! ```
//!
//! The sender publishes `r` to the recipient and pays `stealth_address`.
//!
//! ## Recipient
//!
//! ```text
//! p  = recipient private key, checked against the published P
//! s  = (p · r) mod n          (full 512-bit product, then reduced)
//! S' = s · G
//! ```
//!
//! Since `s · G = r · (p · G) = r · P`, both sides reach the same address,
//! and only the recipient holds `s`.

use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use subtle::ConstantTimeEq;

use cloak_core::error::{CloakError, Result};
use cloak_core::types::{EthAddress, PublicKey};
use k256::AffinePoint;

use crate::curve::{
    multiply_wide, point_from_public_key, point_to_public_key, public_key_from_scalar,
    public_key_to_address, reduce_modulo_order, scalar_multiply,
};
use crate::keys::SecretKey;
use crate::random::RandomSecret;

/// A derived stealth key and its address.
///
/// `stealth_private_key` is only present on the recipient side.
#[derive(Debug)]
pub struct StealthKeyMaterial {
    /// One-time public key `S`
    pub stealth_public_key: PublicKey,
    /// Address of `S`
    pub stealth_address: EthAddress,
    /// Private key of `S` (recipient only, zeroized on drop)
    pub stealth_private_key: Option<SecretKey>,
}

/// What the sender gets back from [`derive_stealth_address`].
#[derive(Debug)]
pub struct StealthPayment {
    /// One-time public key `S`
    pub stealth_public_key: PublicKey,
    /// Address to pay
    pub stealth_address: EthAddress,
    /// Secret to hand to the recipient
    pub shared_secret: RandomSecret,
}

// ═══════════════════════════════════════════════════════════════════════════════
// SENDER SIDE
// ═══════════════════════════════════════════════════════════════════════════════

/// Derives a fresh stealth address for `recipient`.
///
/// Every call draws a new secret from the OS RNG, so two calls for the same
/// recipient never return the same address.
///
/// # Errors
/// Returns `PointNotOnCurve` if `recipient` is not a curve point. No
/// randomness is drawn in that case.
pub fn derive_stealth_address(recipient: &PublicKey) -> Result<StealthPayment> {
    derive_stealth_address_with_rng(recipient, &mut OsRng)
}

/// Like [`derive_stealth_address`], drawing the secret from `rng`.
pub fn derive_stealth_address_with_rng<R: RngCore + CryptoRng>(
    recipient: &PublicKey,
    rng: &mut R,
) -> Result<StealthPayment> {
    let point = point_from_public_key(recipient)?;
    let shared_secret = RandomSecret::generate_with_rng(rng);
    let (stealth_public_key, stealth_address) = multiply_into_address(&point, &shared_secret)?;

    Ok(StealthPayment {
        stealth_public_key,
        stealth_address,
        shared_secret,
    })
}

/// Re-derives the sender's view of a payment from a known secret.
pub fn derive_stealth_address_with_secret(
    recipient: &PublicKey,
    shared_secret: &RandomSecret,
) -> Result<StealthKeyMaterial> {
    let point = point_from_public_key(recipient)?;
    let (stealth_public_key, stealth_address) = multiply_into_address(&point, shared_secret)?;

    Ok(StealthKeyMaterial {
        stealth_public_key,
        stealth_address,
        stealth_private_key: None,
    })
}

fn multiply_into_address(
    point: &AffinePoint,
    shared_secret: &RandomSecret,
) -> Result<(PublicKey, EthAddress)> {
    let stealth_point = scalar_multiply(point, shared_secret.as_bytes())?;
    let stealth_public_key = point_to_public_key(&stealth_point)?;
    let stealth_address = public_key_to_address(&stealth_public_key)?;
    Ok((stealth_public_key, stealth_address))
}

// ═══════════════════════════════════════════════════════════════════════════════
// RECIPIENT SIDE
// ═══════════════════════════════════════════════════════════════════════════════

/// Derives the stealth private key for a received payment.
///
/// # Arguments
///
/// * `private_key` - Recipient's private key
/// * `published_public_key` - The public key senders were given
/// * `shared_secret` - Secret received from the sender
///
/// # Errors
///
/// - `PointNotOnCurve` if the published key is not a curve point
/// - `KeyMismatch` if `private_key · G` differs from the published key
pub fn derive_stealth_private_key(
    private_key: &SecretKey,
    published_public_key: &PublicKey,
    shared_secret: &RandomSecret,
) -> Result<StealthKeyMaterial> {
    point_from_public_key(published_public_key)?;

    let actual = private_key.public_key()?;
    if actual != *published_public_key {
        return Err(CloakError::KeyMismatch {
            expected: published_public_key.to_hex(),
            actual: actual.to_hex(),
        });
    }

    let product = multiply_wide(private_key.as_bytes(), shared_secret.as_bytes());
    let stealth_scalar = reduce_modulo_order(&product);

    let stealth_private_key = SecretKey::from_scalar(&stealth_scalar)?;
    let stealth_public_key = public_key_from_scalar(&stealth_scalar)?;
    let stealth_address = public_key_to_address(&stealth_public_key)?;

    Ok(StealthKeyMaterial {
        stealth_public_key,
        stealth_address,
        stealth_private_key: Some(stealth_private_key),
    })
}

/// Checks a derived address against the one the sender reported.
///
/// # Errors
/// Returns `StealthAddressMismatch` carrying both addresses.
pub fn verify_stealth_address(material: &StealthKeyMaterial, expected: &EthAddress) -> Result<()> {
    let matches: bool = material
        .stealth_address
        .as_bytes()
        .ct_eq(expected.as_bytes())
        .into();

    if !matches {
        return Err(CloakError::StealthAddressMismatch {
            expected: expected.to_checksum_string(),
            actual: material.stealth_address.to_checksum_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::KeyPair;
    use proptest::prelude::*;
    use rand_chacha::rand_core::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn off_curve_key() -> PublicKey {
        PublicKey::from_coordinates(&[0x01; 32], &[0x02; 32])
    }

    #[test]
    fn test_known_vector() {
        let recipient = KeyPair::from_private_key_hex(&"11".repeat(32)).unwrap();
        let secret = RandomSecret::from_hex(&"22".repeat(32)).unwrap();

        let sent = derive_stealth_address_with_secret(recipient.public_key(), &secret).unwrap();
        assert_eq!(
            sent.stealth_address.to_checksum_string(),
            "0x783647b8Ee995d78c783177584251718A8e8db29"
        );
        assert!(sent.stealth_private_key.is_none());

        let received =
            derive_stealth_private_key(recipient.private_key(), recipient.public_key(), &secret)
                .unwrap();
        assert_eq!(received.stealth_address, sent.stealth_address);
        assert_eq!(
            received.stealth_private_key.unwrap().to_hex(),
            "0x6b366461789ec75ba4c07f575cf9dba878328988726146263532b3725cf60983"
        );
    }

    #[test]
    fn test_roundtrip() {
        let recipient = KeyPair::generate().unwrap();
        let payment = derive_stealth_address(recipient.public_key()).unwrap();

        let received = derive_stealth_private_key(
            recipient.private_key(),
            recipient.public_key(),
            &payment.shared_secret,
        )
        .unwrap();

        assert_eq!(received.stealth_address, payment.stealth_address);
        assert_eq!(received.stealth_public_key, payment.stealth_public_key);
        assert!(verify_stealth_address(&received, &payment.stealth_address).is_ok());
    }

    #[test]
    fn test_stealth_private_key_controls_address() {
        let recipient = KeyPair::generate().unwrap();
        let payment = derive_stealth_address(recipient.public_key()).unwrap();
        let received = derive_stealth_private_key(
            recipient.private_key(),
            recipient.public_key(),
            &payment.shared_secret,
        )
        .unwrap();

        let stealth_key = received.stealth_private_key.unwrap();
        let pair = KeyPair::from_private_key_hex(&stealth_key.to_hex()).unwrap();
        assert_eq!(pair.address().unwrap(), payment.stealth_address);
    }

    #[test]
    fn test_fresh_address_per_call() {
        let recipient = KeyPair::generate().unwrap();
        let first = derive_stealth_address(recipient.public_key()).unwrap();
        let second = derive_stealth_address(recipient.public_key()).unwrap();
        assert_ne!(first.stealth_address, second.stealth_address);
        assert_ne!(first.shared_secret, second.shared_secret);
    }

    #[test]
    fn test_with_rng_is_deterministic() {
        let recipient = KeyPair::generate().unwrap();
        let a = derive_stealth_address_with_rng(
            recipient.public_key(),
            &mut ChaCha20Rng::seed_from_u64(9),
        )
        .unwrap();
        let b = derive_stealth_address_with_rng(
            recipient.public_key(),
            &mut ChaCha20Rng::seed_from_u64(9),
        )
        .unwrap();
        assert_eq!(a.stealth_address, b.stealth_address);
    }

    #[test]
    fn test_sender_rejects_off_curve_key() {
        assert!(matches!(
            derive_stealth_address(&off_curve_key()),
            Err(CloakError::PointNotOnCurve(_))
        ));
    }

    #[test]
    fn test_recipient_rejects_off_curve_key() {
        let recipient = KeyPair::generate().unwrap();
        let secret = RandomSecret::generate();
        assert!(matches!(
            derive_stealth_private_key(recipient.private_key(), &off_curve_key(), &secret),
            Err(CloakError::PointNotOnCurve(_))
        ));
    }

    #[test]
    fn test_recipient_rejects_wrong_private_key() {
        let recipient = KeyPair::generate().unwrap();
        let impostor = KeyPair::generate().unwrap();
        let payment = derive_stealth_address(recipient.public_key()).unwrap();

        let err = derive_stealth_private_key(
            impostor.private_key(),
            recipient.public_key(),
            &payment.shared_secret,
        )
        .unwrap_err();

        match err {
            CloakError::KeyMismatch { expected, actual } => {
                assert_eq!(expected, recipient.public_key().to_hex());
                assert_eq!(actual, impostor.public_key().to_hex());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_tampered_secret_changes_address() {
        let recipient = KeyPair::generate().unwrap();
        let payment = derive_stealth_address(recipient.public_key()).unwrap();

        let mut tampered = *payment.shared_secret.as_bytes();
        tampered[31] ^= 0x01;
        let tampered = RandomSecret::from_bytes(&tampered).unwrap();

        let received =
            derive_stealth_private_key(recipient.private_key(), recipient.public_key(), &tampered)
                .unwrap();

        let err = verify_stealth_address(&received, &payment.stealth_address).unwrap_err();
        assert!(matches!(err, CloakError::StealthAddressMismatch { .. }));
        assert!(err.is_mismatch());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_sender_and_recipient_agree(key_seed in any::<u64>(), secret_seed in any::<u64>()) {
            let recipient =
                KeyPair::generate_with_rng(&mut ChaCha20Rng::seed_from_u64(key_seed)).unwrap();
            let payment = derive_stealth_address_with_rng(
                recipient.public_key(),
                &mut ChaCha20Rng::seed_from_u64(secret_seed),
            )
            .unwrap();

            let received = derive_stealth_private_key(
                recipient.private_key(),
                recipient.public_key(),
                &payment.shared_secret,
            )
            .unwrap();

            prop_assert_eq!(received.stealth_address, payment.stealth_address);
        }
    }
}
