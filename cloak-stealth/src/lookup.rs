//! Recipient resolution.
//!
//! Turns whatever the sender was given into the keys stealth addresses are
//! derived from:
//!
//! | Identifier        | Requires          | Keys from                            |
//! |-------------------|-------------------|--------------------------------------|
//! | Public key        | `support_pub_key` | the key itself                       |
//! | Transaction hash  | `support_tx_hash` | signer recovered from the transaction|
//! | Address / name    | -                 | key registry                         |
//! | Address / name    | `advanced`        | signer of the latest sent transaction|
//!
//! Every returned key has passed the curve check. Nothing is cached; each
//! call re-resolves from its collaborators.

use std::sync::Arc;

use futures::future::try_join_all;
use tracing::{debug, info, instrument};

use cloak_core::error::{CloakError, Result};
use cloak_core::traits::{ChainProvider, KeyRegistry, NameResolver};
use cloak_core::types::{EthAddress, Identifier, PublicKey, PublicKeyPair};
use cloak_crypto::curve::{point_from_public_key, public_key_to_address};
use cloak_scanner::get_sent_transaction;

use crate::recovery::recover_public_key_from_tx_hash;

/// Which identifier forms and strategies a lookup may use.
///
/// Everything is off by default: only addresses and names, resolved through
/// the key registry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LookupOptions {
    /// Resolve addresses from transaction history instead of the registry
    pub advanced: bool,
    /// Accept a raw public key as the identifier
    pub support_pub_key: bool,
    /// Accept a transaction hash as the identifier
    pub support_tx_hash: bool,
}

impl LookupOptions {
    /// Creates the default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves addresses from transaction history.
    pub fn advanced(mut self) -> Self {
        self.advanced = true;
        self
    }

    /// Accepts raw public keys.
    pub fn support_pub_key(mut self) -> Self {
        self.support_pub_key = true;
        self
    }

    /// Accepts transaction hashes.
    pub fn support_tx_hash(mut self) -> Self {
        self.support_tx_hash = true;
        self
    }
}

/// Resolves recipient identifiers to public keys.
///
/// Cheap to clone; collaborators are shared.
#[derive(Clone)]
pub struct RecipientResolver {
    provider: Arc<dyn ChainProvider>,
    registry: Arc<dyn KeyRegistry>,
    names: Arc<dyn NameResolver>,
}

impl std::fmt::Debug for RecipientResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecipientResolver").finish_non_exhaustive()
    }
}

impl RecipientResolver {
    /// Creates a resolver over the given collaborators.
    pub fn new(
        provider: Arc<dyn ChainProvider>,
        registry: Arc<dyn KeyRegistry>,
        names: Arc<dyn NameResolver>,
    ) -> Self {
        Self {
            provider,
            registry,
            names,
        }
    }

    /// Parses and resolves an identifier string.
    ///
    /// Parse errors (bad address checksum, malformed hash, ...) are returned
    /// unchanged.
    pub async fn lookup(&self, identifier: &str, options: LookupOptions) -> Result<PublicKeyPair> {
        let parsed = Identifier::parse(identifier)?;
        self.lookup_identifier(&parsed, options).await
    }

    /// Resolves an already parsed identifier.
    #[instrument(skip(self, identifier), fields(kind = identifier.kind()))]
    pub async fn lookup_identifier(
        &self,
        identifier: &Identifier,
        options: LookupOptions,
    ) -> Result<PublicKeyPair> {
        match identifier {
            Identifier::PublicKey(public_key) => {
                if !options.support_pub_key {
                    return Err(CloakError::UnsupportedIdentifier(
                        "public keys are not accepted; enable support_pub_key".into(),
                    ));
                }
                point_from_public_key(public_key)?;
                Ok(PublicKeyPair::single(*public_key))
            }
            Identifier::TransactionHash(hash) => {
                if !options.support_tx_hash {
                    return Err(CloakError::UnsupportedIdentifier(
                        "transaction hashes are not accepted; enable support_tx_hash".into(),
                    ));
                }
                let public_key = recover_public_key_from_tx_hash(hash, self.provider.as_ref()).await?;
                point_from_public_key(&public_key)?;
                Ok(PublicKeyPair::single(public_key))
            }
            Identifier::Address(address) => self.resolve_address(address, options).await,
            Identifier::Name(name) => {
                let address = self.resolve_name(name).await?;
                self.resolve_address(&address, options).await
            }
        }
    }

    /// Resolves several identifiers concurrently.
    ///
    /// Fails as soon as any one of them fails.
    pub async fn lookup_many<S: AsRef<str>>(
        &self,
        identifiers: &[S],
        options: LookupOptions,
    ) -> Result<Vec<PublicKeyPair>> {
        try_join_all(
            identifiers
                .iter()
                .map(|identifier| self.lookup(identifier.as_ref(), options)),
        )
        .await
    }

    /// Resolves a name-service name to an address.
    ///
    /// # Errors
    ///
    /// - `UnsupportedIdentifier` if no name service handles the suffix
    /// - `IdentifierNotResolved` if the name has no address record
    #[instrument(skip(self))]
    pub async fn resolve_name(&self, name: &str) -> Result<EthAddress> {
        if !self.names.supports(name) {
            return Err(CloakError::UnsupportedIdentifier(format!(
                "no name service handles '{}'",
                name
            )));
        }

        let address = self
            .names
            .resolve(name)
            .await?
            .ok_or_else(|| CloakError::IdentifierNotResolved(name.to_string()))?;

        debug!(%address, "Resolved name");
        Ok(address)
    }

    async fn resolve_address(
        &self,
        address: &EthAddress,
        options: LookupOptions,
    ) -> Result<PublicKeyPair> {
        if options.advanced {
            self.resolve_from_history(address).await
        } else {
            self.resolve_from_registry(address).await
        }
    }

    /// Looks the address up in the key registry.
    ///
    /// # Errors
    /// Returns `NotRegistered` naming the address if it has no keys.
    #[instrument(skip(self), fields(address = %address))]
    pub async fn resolve_from_registry(&self, address: &EthAddress) -> Result<PublicKeyPair> {
        let keys = self
            .registry
            .lookup(address)
            .await?
            .ok_or_else(|| CloakError::NotRegistered(address.to_checksum_string()))?;

        point_from_public_key(&keys.spending_public_key)?;
        point_from_public_key(&keys.viewing_public_key)?;

        info!("Resolved keys from registry");
        Ok(keys)
    }

    /// Recovers the address's public key from the latest transaction it sent.
    ///
    /// # Errors
    ///
    /// - `NoHistory` if the address never sent a transaction
    /// - `RecoveryMismatch` if the recovered key belongs to another address
    #[instrument(skip(self), fields(address = %address))]
    pub async fn resolve_from_history(&self, address: &EthAddress) -> Result<PublicKeyPair> {
        let tx_hash = get_sent_transaction(address, self.provider.as_ref()).await?;
        let public_key = recover_public_key_from_tx_hash(&tx_hash, self.provider.as_ref()).await?;
        ensure_owner(&public_key, address)?;

        info!(%tx_hash, "Recovered keys from transaction history");
        Ok(PublicKeyPair::single(public_key))
    }
}

fn ensure_owner(public_key: &PublicKey, address: &EthAddress) -> Result<()> {
    let actual = public_key_to_address(public_key)?;
    if &actual != address {
        return Err(CloakError::RecoveryMismatch {
            expected: address.to_checksum_string(),
            actual: actual.to_checksum_string(),
        });
    }
    Ok(())
}
