//! Contract interfaces called over `eth_call` and `eth_getLogs`.

use alloy::primitives::Address;
use alloy::sol;

use cloak_core::error::CloakError;
use cloak_core::types::EthAddress;

sol! {
    #![sol(all_derives)]

    /// ENS registry: resolver contract of a node.
    function resolver(bytes32 node) external view returns (address);

    /// ENS public resolver: address record of a node.
    function addr(bytes32 node) external view returns (address);

    /// Stealth key registry: a registrant's keys as `(prefix, x)` pairs.
    function stealthKeys(address registrant) external view returns (
        uint256 spendingPubKeyPrefix,
        uint256 spendingPubKey,
        uint256 viewingPubKeyPrefix,
        uint256 viewingPubKey
    );

    /// Stealth key registry: emitted on every (re)registration.
    event StealthKeyChanged(
        address indexed registrant,
        uint256 spendingPubKeyPrefix,
        uint256 spendingPubKey,
        uint256 viewingPubKeyPrefix,
        uint256 viewingPubKey
    );
}

pub(crate) fn to_alloy(address: &EthAddress) -> Address {
    Address::from_slice(address.as_bytes())
}

pub(crate) fn from_alloy(address: Address) -> EthAddress {
    EthAddress::from_array(address.0 .0)
}

pub(crate) fn abi_error(error: alloy::sol_types::Error) -> CloakError {
    CloakError::RpcError(format!("malformed contract return data: {}", error))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::sol_types::{SolCall, SolEvent};

    #[test]
    fn test_known_selectors() {
        assert_eq!(hex::encode(resolverCall::SELECTOR), "0178b8bf");
        assert_eq!(hex::encode(addrCall::SELECTOR), "3b3b57de");
        assert_eq!(hex::encode(stealthKeysCall::SELECTOR), "cec2a787");
    }

    #[test]
    fn test_event_topic() {
        assert_eq!(
            hex::encode(StealthKeyChanged::SIGNATURE_HASH),
            "e879dede910dd3b22239a11044df83c95adcd4b54003516f42866cc1fe4f0a19"
        );
    }

    #[test]
    fn test_address_conversion() {
        let address = EthAddress::from_array([0xab; 20]);
        assert_eq!(from_alloy(to_alloy(&address)), address);

        let call = stealthKeysCall { registrant: to_alloy(&address) }.abi_encode();
        assert_eq!(call.len(), 36);
        assert_eq!(&call[4..16], &[0u8; 12]);
        assert_eq!(&call[16..], &[0xab; 20]);
    }
}
