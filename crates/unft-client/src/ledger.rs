//! The ledger service the client reads from and submits to.

use std::future::Future;

use sol_codec::{Address, Signature};

use crate::error::ClientError;
use crate::types::{Commitment, FreshnessAnchor, SignatureStatus};

/// Read and write primitives of the remote ledger.
///
/// Implementations must not retry submissions on their own.
pub trait Ledger: Send + Sync {
    /// Raw account data, or `None` if the account does not exist.
    fn get_account(
        &self,
        address: &Address,
    ) -> impl Future<Output = Result<Option<Vec<u8>>, ClientError>> + Send;

    /// A fresh anchor. Never reuse one across attempts.
    fn latest_anchor(&self) -> impl Future<Output = Result<FreshnessAnchor, ClientError>> + Send;

    /// Send fully signed wire bytes; returns the submission identifier.
    fn submit(&self, wire: Vec<u8>) -> impl Future<Output = Result<Signature, ClientError>> + Send;

    /// Current status of a submission, `None` if the ledger has not seen it.
    fn signature_status(
        &self,
        signature: &Signature,
    ) -> impl Future<Output = Result<Option<SignatureStatus>, ClientError>> + Send;

    /// Primary confirmation path: resolves once `signature` reaches
    /// `commitment`, or fails with [`ClientError::Expired`] once the anchor's
    /// last valid block height has passed.
    fn confirm(
        &self,
        signature: &Signature,
        anchor: &FreshnessAnchor,
        commitment: Commitment,
    ) -> impl Future<Output = Result<SignatureStatus, ClientError>> + Send;
}
