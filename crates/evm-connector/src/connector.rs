//! The foreign-chain collaborator boundary.
//!
//! The Universal NFT client only ever asks the EVM side for two things:
//! register the local program as a connected counterpart, and wait for the
//! resulting receipt. Transport, signing and gas policy live behind
//! [`ForeignChain`].

use std::future::Future;

use alloy_primitives::{Address, B256};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::abi::{encode_function_call, selector, AbiParam};
use crate::address::{parse_address, parse_address_input, AddressInput};
use crate::error::EvmError;

/// Canonical signature of the counterpart contract's registration method.
pub const SET_CONNECTED_SIGNATURE: &str = "setConnected(address,bytes)";

/// Connector behavior switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectorConfig {
    /// When false, every address argument must be a literal 0x address and
    /// names are rejected instead of looked up.
    pub resolve_names: bool,
}

/// A contract call ready to be signed and sent by a [`ForeignChain`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractCall {
    pub to: Address,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReceiptStatus {
    Success,
    Reverted,
}

/// Inclusion receipt for a foreign-chain transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub tx_hash: B256,
    pub block_number: u64,
    pub status: ReceiptStatus,
}

/// Builds the `setConnected(zrc20, local_program)` call.
///
/// `zrc20` must be a literal address; the gas-token contract is never looked
/// up by name regardless of `config`.
pub fn set_connected_call(
    contract: &str,
    zrc20: &str,
    local_program: &[u8],
    config: &ConnectorConfig,
) -> Result<ContractCall, EvmError> {
    let to = match parse_address_input(contract, config)? {
        AddressInput::Raw(address) => address,
        AddressInput::Name(name) => {
            return Err(EvmError::InvalidAddress(format!(
                "contract {name:?} must be resolved by the connector before building calls"
            )))
        }
    };
    let zrc20 = parse_address(zrc20)?;
    if local_program.is_empty() {
        return Err(EvmError::EncodingError(
            "local program identity must not be empty".into(),
        ));
    }

    let data = encode_function_call(
        selector(SET_CONNECTED_SIGNATURE),
        &[
            AbiParam::Address(zrc20),
            AbiParam::Bytes(local_program.to_vec()),
        ],
    );
    Ok(ContractCall { to, data })
}

/// A foreign chain the client can register connections on.
pub trait ForeignChain: Sync {
    fn config(&self) -> &ConnectorConfig;

    /// Signs and broadcasts `call`, returning the transaction hash.
    fn send_call(&self, call: ContractCall) -> impl Future<Output = Result<B256, EvmError>> + Send;

    /// Waits until `tx_hash` is included and returns its receipt.
    fn wait_for_receipt(
        &self,
        tx_hash: B256,
    ) -> impl Future<Output = Result<Receipt, EvmError>> + Send;

    /// Registers `local_record` (the local program identity) as the
    /// counterpart of `contract` and waits for the receipt. A reverted
    /// receipt is an error.
    fn register_connection(
        &self,
        contract: &str,
        zrc20: &str,
        local_record: &[u8],
    ) -> impl Future<Output = Result<Receipt, EvmError>> + Send {
        let call = set_connected_call(contract, zrc20, local_record, self.config());
        async move {
            let call = call?;
            let tx_hash = self.send_call(call).await?;
            info!(%tx_hash, "setConnected sent");
            let receipt = self.wait_for_receipt(tx_hash).await?;
            match receipt.status {
                ReceiptStatus::Success => Ok(receipt),
                ReceiptStatus::Reverted => Err(EvmError::Reverted(tx_hash.to_string())),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    const CONTRACT: &str = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";
    const ZRC20: &str = "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359";

    struct RecordingChain {
        config: ConnectorConfig,
        sent: Mutex<Vec<ContractCall>>,
        status: ReceiptStatus,
    }

    impl RecordingChain {
        fn new(status: ReceiptStatus) -> Self {
            Self {
                config: ConnectorConfig::default(),
                sent: Mutex::new(Vec::new()),
                status,
            }
        }
    }

    impl ForeignChain for RecordingChain {
        fn config(&self) -> &ConnectorConfig {
            &self.config
        }

        async fn send_call(&self, call: ContractCall) -> Result<B256, EvmError> {
            self.sent.lock().unwrap().push(call);
            Ok(B256::repeat_byte(0x11))
        }

        async fn wait_for_receipt(&self, tx_hash: B256) -> Result<Receipt, EvmError> {
            Ok(Receipt {
                tx_hash,
                block_number: 42,
                status: self.status,
            })
        }
    }

    #[test]
    fn set_connected_layout() {
        let program = [0x77u8; 32];
        let call = set_connected_call(CONTRACT, ZRC20, &program, &ConnectorConfig::default())
            .unwrap();

        assert_eq!(call.to, parse_address(CONTRACT).unwrap());
        assert_eq!(&call.data[..4], &selector(SET_CONNECTED_SIGNATURE));
        // address word, offset word, length word, one data word
        assert_eq!(call.data.len(), 4 + 32 * 4);
        assert_eq!(&call.data[4 + 12..4 + 32], parse_address(ZRC20).unwrap().as_slice());
        assert_eq!(call.data[4 + 63], 64);
        assert_eq!(call.data[4 + 95], 32);
        assert_eq!(&call.data[4 + 96..], &program);
    }

    #[test]
    fn receipt_serializes_hash_as_hex() {
        let receipt = Receipt {
            tx_hash: B256::repeat_byte(0xab),
            block_number: 7,
            status: ReceiptStatus::Reverted,
        };
        let value = serde_json::to_value(&receipt).unwrap();
        assert_eq!(value["tx_hash"], format!("0x{}", "ab".repeat(32)));
        assert_eq!(value["status"], "reverted");

        let back: Receipt = serde_json::from_value(value).unwrap();
        assert_eq!(back, receipt);
    }

    #[test]
    fn zrc20_name_is_rejected_even_when_names_enabled() {
        let config = ConnectorConfig { resolve_names: true };
        assert!(set_connected_call(CONTRACT, "zeta.eth", &[1; 32], &config).is_err());
    }

    #[test]
    fn contract_name_is_rejected_by_default() {
        assert_eq!(
            set_connected_call("nft.eth", ZRC20, &[1; 32], &ConnectorConfig::default()),
            Err(EvmError::NameResolutionDisabled("nft.eth".into()))
        );
    }

    #[test]
    fn empty_program_identity_is_rejected() {
        assert!(matches!(
            set_connected_call(CONTRACT, ZRC20, &[], &ConnectorConfig::default()),
            Err(EvmError::EncodingError(_))
        ));
    }

    #[test]
    fn config_defaults_to_raw_addresses() {
        let parsed: ConnectorConfig = serde_json::from_str("{}").unwrap();
        assert!(!parsed.resolve_names);
    }

    #[tokio::test]
    async fn register_connection_sends_once_and_returns_receipt() {
        let chain = RecordingChain::new(ReceiptStatus::Success);
        let receipt = chain
            .register_connection(CONTRACT, ZRC20, &[9; 32])
            .await
            .unwrap();
        assert_eq!(receipt.block_number, 42);
        assert_eq!(chain.sent.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn reverted_receipt_is_an_error() {
        let chain = RecordingChain::new(ReceiptStatus::Reverted);
        let err = chain
            .register_connection(CONTRACT, ZRC20, &[9; 32])
            .await
            .unwrap_err();
        assert!(matches!(err, EvmError::Reverted(_)));
    }

    #[tokio::test]
    async fn invalid_input_never_reaches_the_chain() {
        let chain = RecordingChain::new(ReceiptStatus::Success);
        assert!(chain.register_connection("bad", ZRC20, &[9; 32]).await.is_err());
        assert!(chain.sent.lock().unwrap().is_empty());
    }
}
