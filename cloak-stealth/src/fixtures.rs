//! Test collaborators shared by the recovery and lookup tests.

use std::collections::HashMap;

use async_trait::async_trait;
use k256::ecdsa::SigningKey;

use cloak_core::error::{CloakError, Result};
use cloak_core::traits::{ChainProvider, NameResolver};
use cloak_core::types::{
    EthAddress, TransactionRecord, TransactionSummary, TransactionType, TxHash,
};
use cloak_crypto::{keccak256, KeyPair};

/// Chain provider backed by maps.
#[derive(Default)]
pub(crate) struct MockChain {
    transactions: HashMap<TxHash, TransactionRecord>,
    history: HashMap<EthAddress, Vec<TransactionSummary>>,
    offline: bool,
}

impl MockChain {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Stores the transaction and lists it in its sender's history.
    pub(crate) fn with_transaction(mut self, record: TransactionRecord) -> Self {
        self.history
            .entry(record.from)
            .or_default()
            .push(TransactionSummary {
                hash: record.hash,
                from: record.from,
                to: Some(EthAddress::from_array([0xee; 20])),
                block_number: record.block_number.unwrap_or_default(),
            });
        self.transactions.insert(record.hash, record);
        self
    }

    /// Serves `record` when asked for `hash`, whatever its own hash is.
    pub(crate) fn with_transaction_at(mut self, hash: TxHash, record: TransactionRecord) -> Self {
        self.transactions.insert(hash, record);
        self
    }

    pub(crate) fn with_history_entry(mut self, address: EthAddress, entry: TransactionSummary) -> Self {
        self.history.entry(address).or_default().push(entry);
        self
    }

    pub(crate) fn offline() -> Self {
        Self {
            offline: true,
            ..Self::default()
        }
    }
}

#[async_trait]
impl ChainProvider for MockChain {
    async fn get_transaction(&self, hash: &TxHash) -> Result<Option<TransactionRecord>> {
        if self.offline {
            return Err(CloakError::ConnectionTimeout("mock chain offline".into()));
        }
        Ok(self.transactions.get(hash).cloned())
    }

    async fn get_transaction_history(&self, address: &EthAddress) -> Result<Vec<TransactionSummary>> {
        if self.offline {
            return Err(CloakError::ConnectionTimeout("mock chain offline".into()));
        }
        Ok(self.history.get(address).cloned().unwrap_or_default())
    }
}

/// Name service backed by a map.
#[derive(Default)]
pub(crate) struct StaticNames {
    names: HashMap<String, EthAddress>,
}

impl StaticNames {
    pub(crate) fn with(mut self, name: &str, address: EthAddress) -> Self {
        self.names.insert(name.to_string(), address);
        self
    }
}

#[async_trait]
impl NameResolver for StaticNames {
    async fn resolve(&self, name: &str) -> Result<Option<EthAddress>> {
        Ok(self.names.get(name).copied())
    }
}

/// Signs a synthetic transaction with `signer`.
///
/// The transaction hash is `[tag; 32]`; legacy transactions use EIP-155 on
/// chain 1.
pub(crate) fn signed_record(
    signer: &KeyPair,
    tag: u8,
    tx_type: TransactionType,
    block_number: u64,
) -> TransactionRecord {
    let signing_hash = keccak256(&[tag, tx_type.type_byte()]);
    let signing_key = SigningKey::from_slice(signer.private_key().as_bytes()).unwrap();
    let (sig, recovery_id) = signing_key.sign_prehash_recoverable(&signing_hash).unwrap();

    let bytes = sig.to_bytes();
    let mut r = [0u8; 32];
    let mut s = [0u8; 32];
    r.copy_from_slice(&bytes[..32]);
    s.copy_from_slice(&bytes[32..]);

    let parity = u64::from(recovery_id.to_byte());
    let v = match tx_type {
        TransactionType::Legacy => 37 + parity,
        TransactionType::AccessList | TransactionType::FeeMarket => parity,
    };

    TransactionRecord {
        hash: TxHash::from_array([tag; 32]),
        tx_type,
        from: signer.address().unwrap(),
        r,
        s,
        v,
        signing_hash,
        block_number: Some(block_number),
    }
}

/// The worked example from EIP-155 (nonce 9, chain 1, key 0x4646...46).
pub(crate) fn eip155_example_record() -> TransactionRecord {
    let decode = |s: &str| {
        let mut out = [0u8; 32];
        hex::decode_to_slice(s, &mut out).unwrap();
        out
    };

    TransactionRecord {
        hash: TxHash::from_array([0x9d; 32]),
        tx_type: TransactionType::Legacy,
        from: EthAddress::from_hex("0x9d8A62f656a8d1615C1294fd71e9CFb3E4855A4F").unwrap(),
        r: decode("28ef61340bd939bc2195fe537567866003e1a15d3c71ff63e1590620aa636276"),
        s: decode("67cbe9d8997f761aecb703304b3800ccf555c9f3dc64214b297fb1966a3b6d83"),
        v: 37,
        signing_hash: decode("daf5a779ae972f972197303d7b574746c7ef83eadac0f2791ad23db92e4c8e53"),
        block_number: Some(1),
    }
}
