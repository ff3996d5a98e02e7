//! Client for the Universal NFT ledger program.
//!
//! Layers, bottom up:
//! - [`seeds`] and [`instructions`]: deterministic account derivation and
//!   instruction payloads
//! - [`accounts`]: typed decoders for program-owned accounts
//! - [`submit`] and [`confirm`]: one transaction attempt, from assembly to a
//!   confirmed, expired or failed outcome
//! - [`client`]: high-level flows and reads over any [`Ledger`]
//! - [`rpc`]: the HTTP JSON-RPC [`Ledger`]

pub mod accounts;
pub mod client;
pub mod config;
pub mod confirm;
pub mod error;
pub mod instructions;
pub mod ledger;
pub mod rpc;
pub mod seeds;
pub mod signer;
pub mod submit;
pub mod types;

pub use accounts::{
    AccountRecord, ChainConnection, EnumerableRecord, NftOrigin, NftRecord, PendingTransfer,
    ProgramState,
};
pub use client::{Signers, UniversalNftClient};
pub use config::{ClientConfig, ConfirmConfig, DEFAULT_PROGRAM_ID};
pub use confirm::ConfirmationResolver;
pub use error::{ClientError, Outcome};
pub use ledger::Ledger;
pub use rpc::RpcLedger;
pub use signer::{BoxFuture, SignAndSubmit, SignTransaction, SubmitOnly, WalletSigner};
pub use submit::{AttemptState, TransactionSubmitter};
pub use types::{Cluster, Commitment, FlowReceipt, FreshnessAnchor, SignatureStatus, Submission};
