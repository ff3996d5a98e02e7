use thiserror::Error;

/// Codec, derivation and transaction-assembly errors.
///
/// Every variant here is a programmer-level failure: bad input to a builder,
/// a buffer that does not match the remote layout, or a seed set that cannot
/// produce a program address. None of them involve the network.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SolError {
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid keypair: {0}")]
    InvalidKeypair(String),

    #[error("encoding error: {0}")]
    Encoding(String),

    #[error("short buffer reading {field}: needed {needed} bytes at offset {offset}, {available} available")]
    ShortBuffer {
        field: &'static str,
        offset: usize,
        needed: usize,
        available: usize,
    },

    #[error("discriminator mismatch for {type_name}: expected {expected}, found {found}")]
    DiscriminatorMismatch {
        type_name: &'static str,
        expected: String,
        found: String,
    },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("no off-curve bump seed found for program {0}")]
    DerivationExhausted(String),

    #[error("transaction build error: {0}")]
    TransactionBuildError(String),

    #[error("signing error: {0}")]
    SigningError(String),

    #[error("serialization error: {0}")]
    SerializationError(String),
}
