//! EVM counterpart boundary for the Universal NFT client.
//!
//! This crate provides:
//! - Address parsing with an explicit name-resolution policy
//! - Minimal ABI encoding, including dynamic `bytes`
//! - The `setConnected(address,bytes)` registration call
//! - The [`ForeignChain`] trait a transport implements

pub mod abi;
pub mod address;
pub mod connector;
pub mod error;

pub use address::{parse_address, parse_address_input, AddressInput};
pub use connector::{
    set_connected_call, ConnectorConfig, ContractCall, ForeignChain, Receipt, ReceiptStatus,
};
pub use error::EvmError;

pub use alloy_primitives::{Address as EvmAddress, B256};
