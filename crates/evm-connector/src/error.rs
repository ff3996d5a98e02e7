use thiserror::Error;

/// Foreign-chain boundary errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EvmError {
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("name resolution is disabled, refusing to resolve {0:?}")]
    NameResolutionDisabled(String),

    #[error("encoding error: {0}")]
    EncodingError(String),

    #[error("rpc error: {0}")]
    Rpc(String),

    #[error("call reverted in transaction {0}")]
    Reverted(String),

    #[error("no receipt for transaction {0}")]
    ReceiptUnavailable(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_invalid_address() {
        let err = EvmError::InvalidAddress("bad checksum".into());
        assert_eq!(err.to_string(), "invalid address: bad checksum");
    }

    #[test]
    fn display_name_resolution_disabled() {
        let err = EvmError::NameResolutionDisabled("vitalik.eth".into());
        assert_eq!(
            err.to_string(),
            "name resolution is disabled, refusing to resolve \"vitalik.eth\""
        );
    }

    #[test]
    fn display_reverted() {
        let err = EvmError::Reverted("0xabc".into());
        assert_eq!(err.to_string(), "call reverted in transaction 0xabc");
    }

    #[test]
    fn error_trait_is_implemented() {
        let err: Box<dyn std::error::Error> = Box::new(EvmError::Rpc("timeout".into()));
        assert!(err.to_string().contains("timeout"));
    }
}
