//! Minimal ABI encoding for contract calls.
//!
//! Supports the handful of types the connector needs. Static parameters are
//! encoded in place; dynamic `bytes` put an offset in the head and a
//! length-prefixed, right-padded payload in the tail.

use alloy_primitives::Address;
use sha3::{Digest, Keccak256};

/// A single ABI-encoded parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbiParam {
    /// A 20-byte address, left-padded to 32 bytes.
    Address(Address),
    /// A 256-bit unsigned integer as a big-endian 32-byte array.
    Uint256([u8; 32]),
    /// Dynamic `bytes` of any length.
    Bytes(Vec<u8>),
}

impl AbiParam {
    /// `uint256` from a `u64`.
    pub fn uint(value: u64) -> Self {
        let mut word = [0u8; 32];
        word[24..].copy_from_slice(&value.to_be_bytes());
        Self::Uint256(word)
    }

    fn is_dynamic(&self) -> bool {
        matches!(self, Self::Bytes(_))
    }
}

/// First 4 bytes of keccak256 of a canonical function signature such as
/// `"transfer(address,uint256)"`.
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = Keccak256::digest(signature.as_bytes());
    let mut out = [0u8; 4];
    out.copy_from_slice(&hash[..4]);
    out
}

/// Encodes `selector || head || tail` for the given parameters.
pub fn encode_function_call(selector: [u8; 4], params: &[AbiParam]) -> Vec<u8> {
    let head_len = params.len() * 32;
    let mut head = Vec::with_capacity(head_len);
    let mut tail = Vec::new();

    for param in params {
        if param.is_dynamic() {
            head.extend_from_slice(&usize_word(head_len + tail.len()));
            tail.extend_from_slice(&encode_tail(param));
        } else {
            head.extend_from_slice(&encode_static(param));
        }
    }

    let mut data = Vec::with_capacity(4 + head.len() + tail.len());
    data.extend_from_slice(&selector);
    data.extend_from_slice(&head);
    data.extend_from_slice(&tail);
    data
}

fn usize_word(value: usize) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[24..].copy_from_slice(&(value as u64).to_be_bytes());
    word
}

fn encode_static(param: &AbiParam) -> [u8; 32] {
    match param {
        AbiParam::Address(addr) => {
            let mut word = [0u8; 32];
            word[12..].copy_from_slice(addr.as_slice());
            word
        }
        AbiParam::Uint256(value) => *value,
        AbiParam::Bytes(_) => [0u8; 32],
    }
}

fn encode_tail(param: &AbiParam) -> Vec<u8> {
    match param {
        AbiParam::Bytes(bytes) => {
            let padded = bytes.len().div_ceil(32) * 32;
            let mut out = Vec::with_capacity(32 + padded);
            out.extend_from_slice(&usize_word(bytes.len()));
            out.extend_from_slice(bytes);
            out.resize(32 + padded, 0);
            out
        }
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(last: u8) -> Address {
        let mut raw = [0u8; 20];
        raw[19] = last;
        Address::from(raw)
    }

    #[test]
    fn known_selectors() {
        assert_eq!(selector("transfer(address,uint256)"), [0xa9, 0x05, 0x9c, 0xbb]);
        assert_eq!(selector("balanceOf(address)"), [0x70, 0xa0, 0x82, 0x31]);
    }

    #[test]
    fn static_params_are_single_words() {
        let data = encode_function_call(
            [0xa9, 0x05, 0x9c, 0xbb],
            &[AbiParam::Address(addr(1)), AbiParam::uint(100)],
        );
        assert_eq!(data.len(), 68);
        assert_eq!(&data[4..16], &[0u8; 12]);
        assert_eq!(data[35], 0x01);
        assert_eq!(data[67], 100);
    }

    #[test]
    fn dynamic_bytes_use_offset_and_tail() {
        let payload = vec![0xAB; 32];
        let data = encode_function_call(
            [0, 0, 0, 0],
            &[AbiParam::Address(addr(7)), AbiParam::Bytes(payload.clone())],
        );
        // selector + 2 head words + length word + 1 data word
        assert_eq!(data.len(), 4 + 32 * 4);
        // offset to the tail is 64 (two head words)
        assert_eq!(data[4 + 63], 64);
        // length word
        assert_eq!(data[4 + 95], 32);
        assert_eq!(&data[4 + 96..], payload.as_slice());
    }

    #[test]
    fn dynamic_bytes_are_right_padded() {
        let data = encode_function_call([0; 4], &[AbiParam::Bytes(vec![0xCA, 0xFE])]);
        assert_eq!(data.len(), 4 + 32 * 3);
        assert_eq!(data[4 + 31], 32);
        assert_eq!(data[4 + 63], 2);
        assert_eq!(&data[4 + 64..4 + 66], &[0xCA, 0xFE]);
        assert_eq!(&data[4 + 66..], &[0u8; 30]);
    }

    #[test]
    fn empty_bytes_have_only_a_length_word() {
        let data = encode_function_call([0; 4], &[AbiParam::Bytes(Vec::new())]);
        assert_eq!(data.len(), 4 + 64);
        assert_eq!(&data[4 + 32..], &[0u8; 32]);
    }

    #[test]
    fn uint_from_u64_is_big_endian() {
        let AbiParam::Uint256(word) = AbiParam::uint(0x0102) else {
            panic!("expected uint");
        };
        assert_eq!(word[30], 0x01);
        assert_eq!(word[31], 0x02);
    }
}
