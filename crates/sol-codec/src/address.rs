//! Ledger addresses.
//!
//! An address is a 32-byte identity rendered as Base58. Ordinary addresses
//! are Ed25519 public keys; program-derived addresses are SHA-256 outputs that
//! deliberately do NOT decompress to a curve point, so no private key exists
//! for them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::SolError;

/// A 32-byte ledger address.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address([u8; 32]);

impl Address {
    /// Length of an address in bytes.
    pub const LEN: usize = 32;

    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Build an address from a slice that must be exactly 32 bytes long.
    pub fn try_from_slice(bytes: &[u8]) -> Result<Self, SolError> {
        let arr: [u8; 32] = bytes.try_into().map_err(|_| {
            SolError::InvalidAddress(format!("expected 32 bytes, got {}", bytes.len()))
        })?;
        Ok(Self(arr))
    }

    pub fn to_bytes(self) -> [u8; 32] {
        self.0
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Whether the bytes decompress to a valid Ed25519 point.
    ///
    /// Keypair-backed addresses are on the curve; program-derived addresses
    /// must not be.
    pub fn is_on_curve(&self) -> bool {
        is_on_curve(&self.0)
    }
}

impl AsRef<[u8]> for Address {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 32]> for Address {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&bytes_to_address(&self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({self})")
    }
}

impl FromStr for Address {
    type Err = SolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        address_to_bytes(s).map(Self)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Decode a Base58 address string to its 32-byte representation.
pub fn address_to_bytes(address: &str) -> Result<[u8; 32], SolError> {
    let bytes = bs58::decode(address)
        .into_vec()
        .map_err(|e| SolError::InvalidAddress(format!("base58 decode failed: {e}")))?;

    let arr: [u8; 32] = bytes.try_into().map_err(|v: Vec<u8>| {
        SolError::InvalidAddress(format!("expected 32 bytes, got {}", v.len()))
    })?;

    Ok(arr)
}

/// Encode 32 bytes as a Base58 address string.
pub fn bytes_to_address(bytes: &[u8; 32]) -> String {
    bs58::encode(bytes).into_string()
}

/// Check if 32 bytes represent a valid Ed25519 curve point.
pub(crate) fn is_on_curve(bytes: &[u8; 32]) -> bool {
    curve25519_dalek::edwards::CompressedEdwardsY(*bytes)
        .decompress()
        .is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// The System Program address is 32 zero bytes.
    #[test]
    fn system_program_address() {
        let addr = Address::new([0u8; 32]);
        assert_eq!(addr.to_string(), "11111111111111111111111111111111");
    }

    #[test]
    fn roundtrip_known_address() {
        let s = "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA";
        let addr: Address = s.parse().unwrap();
        assert_eq!(addr.to_string(), s);
    }

    #[test]
    fn parse_garbage_returns_error() {
        assert!("not-a-valid-address!!!".parse::<Address>().is_err());
    }

    #[test]
    fn parse_too_short_returns_error() {
        // "1" decodes to a single zero byte.
        let err = "1".parse::<Address>().unwrap_err();
        assert_eq!(
            err,
            SolError::InvalidAddress("expected 32 bytes, got 1".into())
        );
    }

    #[test]
    fn try_from_slice_checks_length() {
        assert!(Address::try_from_slice(&[7u8; 32]).is_ok());
        assert!(Address::try_from_slice(&[7u8; 31]).is_err());
        assert!(Address::try_from_slice(&[7u8; 33]).is_err());
    }

    #[test]
    fn basepoint_is_on_curve() {
        let mut basepoint = [0x66u8; 32];
        basepoint[0] = 0x58;
        assert!(Address::new(basepoint).is_on_curve());
    }

    #[test]
    fn repeated_twos_are_off_curve() {
        assert!(!Address::new([0x02; 32]).is_on_curve());
    }

    #[test]
    fn serde_uses_base58_string() {
        let addr: Address = "MemoSq4gqABAXKb96qnH8TysNcWxMyWCqXgDLGmfcHr".parse().unwrap();
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, "\"MemoSq4gqABAXKb96qnH8TysNcWxMyWCqXgDLGmfcHr\"");
        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(back, addr);
    }

    #[test]
    fn debug_shows_base58() {
        let addr = Address::new([0u8; 32]);
        assert_eq!(
            format!("{addr:?}"),
            "Address(11111111111111111111111111111111)"
        );
    }
}
