use alloy_primitives::Address;

use crate::connector::ConnectorConfig;
use crate::error::EvmError;

/// A caller-supplied account reference on the foreign chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddressInput {
    /// A literal 20-byte address.
    Raw(Address),
    /// A human-readable name the connector implementation must resolve.
    /// Only produced when [`ConnectorConfig::resolve_names`] is set.
    Name(String),
}

/// Classifies `input` as a raw address or a name, honoring the connector's
/// name-resolution policy.
///
/// Anything starting with `0x` must be a well-formed address; a mixed-case
/// address must carry a valid EIP-55 checksum.
pub fn parse_address_input(input: &str, config: &ConnectorConfig) -> Result<AddressInput, EvmError> {
    let trimmed = input.trim();
    if trimmed.starts_with("0x") || trimmed.starts_with("0X") {
        return parse_address(trimmed).map(AddressInput::Raw);
    }
    if config.resolve_names {
        Ok(AddressInput::Name(trimmed.to_string()))
    } else {
        Err(EvmError::NameResolutionDisabled(trimmed.to_string()))
    }
}

/// Parses a 0x-prefixed hex address, verifying EIP-55 when the input is
/// mixed case.
pub fn parse_address(address: &str) -> Result<Address, EvmError> {
    let hex_part = address
        .strip_prefix("0x")
        .or_else(|| address.strip_prefix("0X"))
        .ok_or_else(|| EvmError::InvalidAddress("address must start with 0x".into()))?;

    if hex_part.len() != 40 {
        return Err(EvmError::InvalidAddress(format!(
            "expected 40 hex characters, got {}",
            hex_part.len()
        )));
    }

    let bytes = hex::decode(hex_part)
        .map_err(|e| EvmError::InvalidAddress(format!("invalid hex: {e}")))?;
    let parsed = Address::from_slice(&bytes);

    let is_all_lower = hex_part.chars().all(|c| !c.is_ascii_uppercase());
    let is_all_upper = hex_part.chars().all(|c| !c.is_ascii_lowercase());
    if !is_all_lower && !is_all_upper && checksum_address(&parsed) != format!("0x{hex_part}") {
        return Err(EvmError::InvalidAddress(format!(
            "bad EIP-55 checksum for {address}"
        )));
    }

    Ok(parsed)
}

/// EIP-55 mixed-case rendering of an address.
pub fn checksum_address(address: &Address) -> String {
    address.to_checksum(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHECKSUMMED: &str = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";

    fn raw_only() -> ConnectorConfig {
        ConnectorConfig::default()
    }

    #[test]
    fn eip55_known_addresses() {
        let cases = [
            "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed",
            "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359",
            "0xdbF03B407c01E7cD3CBea99509d93f8DDDC8C6FB",
            "0xD1220A0cf47c7B9Be7A2E6BA89F429762e7b9aDb",
        ];
        for expected in cases {
            let lower = format!("0x{}", expected[2..].to_lowercase());
            let parsed = parse_address(&lower).unwrap();
            assert_eq!(checksum_address(&parsed), expected);
        }
    }

    #[test]
    fn accepts_single_case_addresses() {
        assert!(parse_address("0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed").is_ok());
        assert!(parse_address("0x5AAEB6053F3E94C9B9A09F33669435E7EF1BEAED").is_ok());
        assert!(parse_address(CHECKSUMMED).is_ok());
    }

    #[test]
    fn rejects_bad_checksum() {
        let bad = "0x5AAEB6053F3E94C9b9A09f33669435E7Ef1BeAed";
        assert!(matches!(parse_address(bad), Err(EvmError::InvalidAddress(_))));
    }

    #[test]
    fn rejects_short_and_non_hex() {
        assert!(parse_address("0x5aAeb6053F").is_err());
        assert!(parse_address("0xGGGGb6053F3E94C9b9A09f33669435E7Ef1BeAed").is_err());
        assert!(parse_address("5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed").is_err());
    }

    #[test]
    fn names_are_refused_by_default() {
        assert_eq!(
            parse_address_input("vitalik.eth", &raw_only()),
            Err(EvmError::NameResolutionDisabled("vitalik.eth".into()))
        );
    }

    #[test]
    fn names_pass_through_when_enabled() {
        let config = ConnectorConfig { resolve_names: true };
        assert_eq!(
            parse_address_input("vitalik.eth", &config).unwrap(),
            AddressInput::Name("vitalik.eth".into())
        );
    }

    #[test]
    fn hex_input_is_raw_under_either_policy() {
        let enabled = ConnectorConfig { resolve_names: true };
        for config in [raw_only(), enabled] {
            assert!(matches!(
                parse_address_input(CHECKSUMMED, &config),
                Ok(AddressInput::Raw(_))
            ));
        }
    }
}
