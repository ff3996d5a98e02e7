use evm_connector::EvmError;
use sol_codec::{Address, Signature, SolError};
use thiserror::Error;

use crate::types::SignatureStatus;

/// Whether a failed operation may still have changed ledger state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The operation definitely did not take effect.
    NotApplied,
    /// The operation may or may not have taken effect; re-query before
    /// retrying.
    Unknown,
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("encoding failed: {0}")]
    Encoding(String),

    #[error("decoding failed: {0}")]
    Decoding(String),

    #[error("address derivation exhausted: {0}")]
    DerivationExhausted(String),

    #[error("signing failed: {0}")]
    Signing(String),

    #[error("submission rejected: {0}")]
    Submission(String),

    #[error("confirmation of {signature} not observed after polling")]
    ConfirmationTimeout {
        signature: Signature,
        last_status: Option<SignatureStatus>,
    },

    #[error("transaction {signature} expired before it was confirmed")]
    Expired { signature: Signature },

    #[error("transaction {signature} failed on chain: {reason}")]
    Failed { signature: Signature, reason: String },

    /// Transport or node failure once a transaction may be in flight.
    #[error("rpc error: {0}")]
    Rpc(String),

    /// The ledger could not be reached while preparing; nothing was sent.
    #[error("ledger unavailable before submission: {0}")]
    Unavailable(String),

    #[error("account not found: {0}")]
    AccountNotFound(Address),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("foreign chain: {0}")]
    Foreign(#[from] EvmError),
}

impl ClientError {
    /// Decided by the phase the error was raised in: only failures after a
    /// transaction may have reached the ledger are ambiguous.
    pub fn outcome(&self) -> Outcome {
        match self {
            ClientError::ConfirmationTimeout { .. } | ClientError::Rpc(_) => Outcome::Unknown,
            ClientError::Foreign(EvmError::Rpc(_) | EvmError::ReceiptUnavailable(_)) => {
                Outcome::Unknown
            }
            _ => Outcome::NotApplied,
        }
    }

    /// Reclassify a transport failure raised while no transaction had been
    /// sent.
    pub(crate) fn before_submission(self) -> Self {
        match self {
            ClientError::Rpc(msg) => ClientError::Unavailable(msg),
            other => other,
        }
    }

    /// The submission this error is about, if one was produced.
    pub fn signature(&self) -> Option<&Signature> {
        match self {
            ClientError::ConfirmationTimeout { signature, .. }
            | ClientError::Expired { signature }
            | ClientError::Failed { signature, .. } => Some(signature),
            _ => None,
        }
    }
}

impl From<SolError> for ClientError {
    fn from(e: SolError) -> Self {
        match e {
            SolError::DerivationExhausted(_) => ClientError::DerivationExhausted(e.to_string()),
            SolError::SigningError(_) | SolError::InvalidKeypair(_) => {
                ClientError::Signing(e.to_string())
            }
            SolError::ShortBuffer { .. }
            | SolError::DiscriminatorMismatch { .. }
            | SolError::InvalidValue { .. }
            | SolError::SerializationError(_) => ClientError::Decoding(e.to_string()),
            SolError::InvalidAddress(_)
            | SolError::Encoding(_)
            | SolError::TransactionBuildError(_) => ClientError::Encoding(e.to_string()),
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        ClientError::Rpc(e.to_string())
    }
}
